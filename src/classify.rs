// Value reclassification: turns one SQLite literal token into its
// PostgreSQL rendering. A single entry point serves both modes. When the
// column is known from the schema registry its declared type and name pick
// the rule; otherwise the token's own shape and the statement text decide.

use crate::parser::schema::ColumnSchema;
use crate::parser::values::split_values;
use crate::profile::{DialectProfile, TypeClass};
use chrono::{DateTime, Datelike, Utc};
use regex::Regex;

// Rule that produced a converted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Timestamp,
    // Epoch conversion failed; raw text quoted instead.
    TimestampFallback,
    Boolean,
    Json,
    Text,
    Numeric,
    // Blob literal X'..' rendered as a bytea hex string.
    Blob,
    // Left as-is (quoted timestamps, non 0/1 booleans).
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedValue {
    pub text: String,
    pub kind: ValueKind,
    // True when the column schema selected the rule.
    pub schema_driven: bool,
    // True when an epoch repair rule forced the timestamp.
    pub repaired: bool,
}

// Where a token sits.
#[derive(Debug, Clone, Copy)]
pub struct ValueContext<'a> {
    pub table: &'a str,
    pub position: usize,
    pub column: Option<&'a ColumnSchema>,
    // Whether the enclosing statement mentions a boolean pattern.
    pub boolean_hint: bool,
}

pub struct Classifier<'a> {
    profile: &'a DialectProfile,
    number_re: Regex,
    blob_re: Regex,
}

impl<'a> Classifier<'a> {
    pub fn new(profile: &'a DialectProfile) -> Self {
        let number_re = Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$")
            .expect("valid number regex");
        let blob_re = Regex::new(r"^[xX]'([0-9A-Fa-f]*)'$").expect("valid blob regex");
        Self {
            profile,
            number_re,
            blob_re,
        }
    }

    pub fn convert(&self, token: &str, ctx: &ValueContext<'_>) -> ConvertedValue {
        if token == "NULL" {
            return ConvertedValue {
                text: "NULL".to_string(),
                kind: ValueKind::Null,
                schema_driven: ctx.column.is_some(),
                repaired: false,
            };
        }

        if let Some(hex) = self.blob_re.captures(token).and_then(|c| c.get(1)) {
            return ConvertedValue {
                text: format!("'\\x{}'", hex.as_str()),
                kind: ValueKind::Blob,
                schema_driven: ctx.column.is_some(),
                repaired: false,
            };
        }

        // Dumps encode raw newlines as replace('..','\n',char(10)); fold them
        // back into a plain quoted literal before the rules run.
        let unwrapped;
        let token = match unwrap_char_replace(token) {
            Some(raw) => {
                unwrapped = format!("'{}'", raw.replace('\'', "''"));
                unwrapped.as_str()
            }
            None => token,
        };

        let (text, kind, schema_driven) = match ctx.column.and_then(|c| self.by_schema(token, c)) {
            Some((text, kind)) => (text, kind, true),
            None => {
                let (text, kind) = self.by_shape(token, ctx);
                (text, kind, false)
            }
        };

        // Epoch repair: positions known to hold timestamps get converted even
        // when the heuristics left the digits alone. A declared type wins.
        if !schema_driven
            && !matches!(kind, ValueKind::Timestamp | ValueKind::TimestampFallback)
            && self.profile.is_repair_position(ctx.table, ctx.position)
            && self.is_epoch_candidate(token)
        {
            let (text, kind) = epoch_or_quoted(token);
            return ConvertedValue {
                text,
                kind,
                schema_driven,
                repaired: true,
            };
        }

        ConvertedValue {
            text,
            kind,
            schema_driven,
            repaired: false,
        }
    }

    // Schema-driven rules. None means the declared type carries no rule and
    // the shape heuristics should decide.
    fn by_schema(&self, token: &str, column: &ColumnSchema) -> Option<(String, ValueKind)> {
        let base = column.base_type();
        let class = self.profile.type_class(&base);

        if self.profile.has_timestamp_suffix(&column.name) {
            return Some(self.timestamp_value(token));
        }

        let converted = match class {
            Some(TypeClass::Timestamp) => self.timestamp_value(token),
            Some(TypeClass::Boolean) => match token {
                "0" => ("false".to_string(), ValueKind::Boolean),
                "1" => ("true".to_string(), ValueKind::Boolean),
                _ => (token.to_string(), ValueKind::Unchanged),
            },
            Some(TypeClass::Text) => (escape_string(token), ValueKind::Text),
            Some(TypeClass::Numeric) => (token.to_string(), ValueKind::Numeric),
            Some(TypeClass::Json) => {
                if is_quoted(token) {
                    (token.to_string(), ValueKind::Json)
                } else {
                    (escape_string(token), ValueKind::Json)
                }
            }
            None if base.is_empty() => return None,
            None => {
                if self.is_number(token) {
                    (token.to_string(), ValueKind::Numeric)
                } else {
                    (escape_string(token), ValueKind::Text)
                }
            }
        };
        Some(converted)
    }

    fn timestamp_value(&self, token: &str) -> (String, ValueKind) {
        if is_quoted(token) {
            (token.to_string(), ValueKind::Unchanged)
        } else if self.is_epoch_candidate(token) {
            epoch_or_quoted(token)
        } else {
            (escape_string(token), ValueKind::Text)
        }
    }

    // Heuristic rules, in precedence order.
    fn by_shape(&self, token: &str, ctx: &ValueContext<'_>) -> (String, ValueKind) {
        if is_digits(token) && token.len() == self.profile.heuristic_epoch_digits {
            return epoch_or_quoted(token);
        }
        if (token == "0" || token == "1")
            && (ctx.boolean_hint || self.profile.is_boolean_position(ctx.table, ctx.position))
        {
            let text = if token == "1" { "true" } else { "false" };
            return (text.to_string(), ValueKind::Boolean);
        }
        if is_quoted(token) && is_json_body(&token[1..token.len() - 1]) {
            return (token.to_string(), ValueKind::Json);
        }
        if is_quoted(token) {
            return (escape_string(token), ValueKind::Text);
        }
        if self.is_number(token) {
            return (token.to_string(), ValueKind::Numeric);
        }
        (escape_string(token), ValueKind::Text)
    }

    fn is_epoch_candidate(&self, token: &str) -> bool {
        is_digits(token) && token.len() >= self.profile.min_epoch_digits
    }

    fn is_number(&self, token: &str) -> bool {
        self.number_re.is_match(token)
    }
}

// Convert epoch milliseconds to a UTC timestamp literal such as
// `'2023-09-30 16:00:00.000+00'`. None on overflow or years past 9999.
pub fn epoch_millis_to_timestamp(digits: &str) -> Option<String> {
    let millis: i64 = digits.parse().ok()?;
    let dt = DateTime::<Utc>::from_timestamp_millis(millis)?;
    if dt.year() > 9999 {
        return None;
    }
    Some(format!("'{}+00'", dt.format("%Y-%m-%d %H:%M:%S%.3f")))
}

fn epoch_or_quoted(token: &str) -> (String, ValueKind) {
    match epoch_millis_to_timestamp(token) {
        Some(ts) => (ts, ValueKind::Timestamp),
        None => (format!("'{}'", token), ValueKind::TimestampFallback),
    }
}

// Render a string literal. One pair of outer quotes is stripped and any
// existing `''` escapes collapsed before quotes are doubled again, so an
// already-escaped literal comes back unchanged.
pub fn escape_string(value: &str) -> String {
    let inner = if is_quoted(value) {
        &value[1..value.len() - 1]
    } else {
        value
    };
    let raw = inner.replace("''", "'");
    format!("'{}'", raw.replace('\'', "''"))
}

// Decode `replace(<string or nested replace>,'<seq>',char(<n>))` into the raw
// string it denotes. None for any other shape.
fn unwrap_char_replace(token: &str) -> Option<String> {
    let head = token.get(..8)?;
    if !head.eq_ignore_ascii_case("replace(") || !token.ends_with(')') {
        return None;
    }
    let args = split_values(&token[8..token.len() - 1]);
    if args.len() != 3 {
        return None;
    }

    let base = if is_quoted(&args[0]) {
        unquote_string(&args[0])
    } else {
        unwrap_char_replace(&args[0])?
    };
    if !is_quoted(&args[1]) {
        return None;
    }
    let pattern = unquote_string(&args[1]);
    if pattern.is_empty() {
        return None;
    }

    let call = &args[2];
    if !call.get(..5).is_some_and(|h| h.eq_ignore_ascii_case("char(")) || !call.ends_with(')') {
        return None;
    }
    let ch = char::from_u32(call[5..call.len() - 1].trim().parse().ok()?)?;
    Some(base.replace(&pattern, &ch.to_string()))
}

fn unquote_string(token: &str) -> String {
    token[1..token.len() - 1].replace("''", "'")
}

pub fn is_quoted(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'')
}

fn is_json_body(inner: &str) -> bool {
    inner.starts_with('{') && inner.ends_with('}')
}

fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}
