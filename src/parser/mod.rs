// Parser module: statement splitting, value tokenizing, CREATE TABLE schema
// extraction and INSERT decomposition. No full SQL grammar, just enough
// structure to rewrite a dump line by line.

pub mod insert;
pub mod schema;
pub mod statement;
pub mod values;

// Quote an identifier for PostgreSQL, doubling embedded double quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

// Strip one layer of identifier quoting: "x", `x` or [x].
pub fn unquote_ident(raw: &str) -> String {
    let raw = raw.trim();
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'`' && last == b'`') {
            let quote = first as char;
            let doubled = format!("{quote}{quote}");
            return raw[1..raw.len() - 1].replace(&doubled, &quote.to_string());
        }
        if first == b'[' && last == b']' {
            return raw[1..raw.len() - 1].to_string();
        }
    }
    raw.to_string()
}

// Remove `--` line comments and `/* */` block comments outside quotes.
// A block comment becomes one space so the tokens around it stay apart; an
// unterminated block comment runs to the end of the text.
pub fn strip_sql_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            out.push(c);
            continue;
        }
        match c {
            '-' if chars.peek() == Some(&'-') => {
                while chars.peek().is_some_and(|&n| n != '\n') {
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
                out.push(' ');
            }
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
