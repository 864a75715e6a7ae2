// Schema parser: extracts table names and ordered column definitions from
// CREATE TABLE statements, and the registry built from them in the first
// pass over a dump.

use crate::logger;
use crate::parser::statement::{Statement, StatementKind};
use crate::parser::{strip_sql_comments, unquote_ident, values};
use regex::Regex;
use std::collections::HashMap;

// Words that open a table-level constraint instead of a column.
const CONSTRAINT_KEYWORDS: &[&str] = &["CONSTRAINT", "PRIMARY", "FOREIGN", "UNIQUE", "CHECK"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: String,
    pub declared_type: String,
    pub position: usize,
}

impl ColumnSchema {
    // Upper-cased type keyword without any (precision, scale) suffix.
    pub fn base_type(&self) -> String {
        base_type(&self.declared_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn column_at(&self, position: usize) -> Option<&ColumnSchema> {
        self.columns.get(position)
    }

    pub fn column_named(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .or_else(|| self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name)))
    }
}

// A CREATE TABLE statement split into its header and body definitions.
#[derive(Debug, Clone)]
pub struct CreateTable {
    pub table_name: String,
    // Top-level definitions of the body, trimmed, without separating commas.
    pub definitions: Vec<String>,
    // Anything after the closing parenthesis, e.g. "WITHOUT ROWID".
    pub trailer: String,
}

impl CreateTable {
    // Build the column list, skipping constraint definitions. Constraints do
    // not take a position slot.
    pub fn to_schema(&self) -> TableSchema {
        let mut columns = Vec::new();
        for def in &self.definitions {
            if is_constraint(def) {
                continue;
            }
            if let Some(col) = ColumnDefinition::parse(def) {
                columns.push(ColumnSchema {
                    name: col.name,
                    declared_type: def[col.type_start..col.type_end].to_string(),
                    position: columns.len(),
                });
            }
        }
        TableSchema {
            table_name: self.table_name.clone(),
            columns,
        }
    }
}

// Byte offsets of the pieces of one column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub type_start: usize,
    pub type_end: usize,
}

impl ColumnDefinition {
    // Parse `name [type ...]`. The name may be quoted; the type runs to the
    // first whitespace outside parentheses. A missing type yields an empty
    // range at the end of the name.
    pub fn parse(def: &str) -> Option<Self> {
        let def_trimmed_start = def.len() - def.trim_start().len();
        let rest = &def[def_trimmed_start..];
        let first = rest.chars().next()?;

        let name_len = match first {
            '"' | '`' | '[' => {
                let close = if first == '[' { ']' } else { first };
                rest[1..].find(close).map(|i| i + 2).unwrap_or(rest.len())
            }
            _ => rest.find(char::is_whitespace).unwrap_or(rest.len()),
        };
        let name = unquote_ident(&rest[..name_len]);
        if name.is_empty() {
            return None;
        }

        let after_name = def_trimmed_start + name_len;
        let type_start = after_name + (def[after_name..].len() - def[after_name..].trim_start().len());
        let mut depth = 0i32;
        let mut type_end = def.len();
        for (i, c) in def[type_start..].char_indices() {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                c if c.is_whitespace() && depth <= 0 => {
                    type_end = type_start + i;
                    break;
                }
                _ => {}
            }
        }

        Some(Self {
            name,
            type_start,
            type_end,
        })
    }
}

pub fn is_constraint(def: &str) -> bool {
    let word = def
        .trim_start()
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or("");
    CONSTRAINT_KEYWORDS
        .iter()
        .any(|kw| word.eq_ignore_ascii_case(kw))
}

pub fn base_type(declared: &str) -> String {
    declared
        .split('(')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_uppercase()
}

pub struct SchemaParser {
    create_table_re: Regex,
}

impl SchemaParser {
    // Build regexes once for reuse.
    pub fn new() -> Self {
        let create_table_re = Regex::new(
            r#"(?is)^\s*CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?("(?:[^"]|"")+"|`[^`]+`|\[[^\]]+\]|[A-Za-z_][\w$]*)\s*\("#,
        )
        .expect("valid create table regex");
        Self { create_table_re }
    }

    // Split a CREATE TABLE statement into name and body definitions.
    // Comments are dropped first. Returns None when the header or the body
    // parentheses are not found.
    pub fn parse_create_table(&self, stmt: &str) -> Option<CreateTable> {
        let stripped = strip_sql_comments(stmt);
        let stmt = stripped.as_str();
        let cap = self.create_table_re.captures(stmt)?;
        let table_name = unquote_ident(cap.get(1)?.as_str());
        let body_start = cap.get(0)?.end();
        let body_end = stmt.rfind(')')?;
        if body_end < body_start {
            return None;
        }

        let definitions = values::split_values(&stmt[body_start..body_end])
            .into_iter()
            .filter(|d| !d.is_empty())
            .collect();
        let trailer = stmt[body_end + 1..]
            .trim()
            .trim_end_matches(';')
            .trim()
            .to_string();

        Some(CreateTable {
            table_name,
            definitions,
            trailer,
        })
    }
}

// Column metadata for every table in the dump, keyed by table name.
// Filled once by `build`, read-only afterwards. `by_lowercase` maps a
// lower-cased name to the first table declared under it.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    tables: HashMap<String, TableSchema>,
    by_lowercase: HashMap<String, String>,
}

impl SchemaRegistry {
    // First pass: parse every CREATE TABLE statement.
    pub fn build(
        statements: &[Statement],
        parser: &SchemaParser,
        bar: Option<&indicatif::ProgressBar>,
    ) -> Self {
        let mut tables = HashMap::new();
        let mut by_lowercase = HashMap::new();
        for stmt in statements {
            if let Some(b) = bar {
                b.inc(stmt.lines);
            }
            if stmt.kind != StatementKind::CreateTable {
                continue;
            }
            match parser.parse_create_table(&stmt.text) {
                Some(create) => {
                    let schema = create.to_schema();
                    logger::debug(&format!(
                        "SchemaRegistry: {} has {} columns",
                        schema.table_name,
                        schema.columns.len()
                    ));
                    by_lowercase
                        .entry(schema.table_name.to_lowercase())
                        .or_insert_with(|| schema.table_name.clone());
                    tables.insert(schema.table_name.clone(), schema);
                }
                None => {
                    logger::debug(&format!(
                        "SchemaRegistry: could not parse CREATE TABLE: {}",
                        first_line(&stmt.text)
                    ));
                }
            }
        }

        if let Some(b) = bar {
            b.finish();
        }
        Self {
            tables,
            by_lowercase,
        }
    }

    // Exact lookup first, then a case-insensitive fallback.
    pub fn get(&self, table: &str) -> Option<&TableSchema> {
        self.tables.get(table).or_else(|| {
            self.by_lowercase
                .get(&table.to_lowercase())
                .and_then(|name| self.tables.get(name))
        })
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

pub fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}
