// Statement splitter: turns a dump into a sequence of statements.
// CREATE TABLE and INSERT statements may span several physical lines (table
// bodies, strings with raw newlines) and are accumulated until a terminating
// ';' outside quotes, comments and parentheses. Everything else is one line
// each. A line that starts a new statement closes whatever is still open, so
// a stray quote damages one statement only.

use crate::logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    CreateTable,
    Insert,
    Other,
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    // Trimmed text; multi-line statements keep their inner newlines.
    pub text: String,
    // Number of physical lines consumed, including skipped blank lines.
    pub lines: u64,
    // False when the statement was cut off by EOF or by the next statement.
    pub terminated: bool,
}

// Split a whole dump into statements. Blank lines are not emitted; their
// count is folded into the next statement's `lines`. `terminators` are the
// transaction-closing statements (e.g. `COMMIT;`) that also count as a
// statement start.
pub fn split_statements(input: &str, terminators: &[String]) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut acc = StatementAccumulator::new();
    let mut pending_lines: u64 = 0;

    for line in input.lines() {
        pending_lines += 1;

        if acc.is_active() {
            if !starts_statement(line.trim(), terminators) {
                if acc.push_line(line) {
                    statements.push(acc.finish(pending_lines, true));
                    pending_lines = 0;
                }
                continue;
            }
            logger::warn(&format!(
                "statement: Unterminated statement closed before line: {}",
                line.trim()
            ));
            statements.push(acc.finish(pending_lines - 1, false));
            pending_lines = 1;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match classify_line(trimmed) {
            StatementKind::Other => {
                statements.push(Statement {
                    kind: StatementKind::Other,
                    text: trimmed.to_string(),
                    lines: pending_lines,
                    terminated: true,
                });
                pending_lines = 0;
            }
            kind => {
                acc.start(kind);
                if acc.push_line(line) {
                    statements.push(acc.finish(pending_lines, true));
                    pending_lines = 0;
                }
            }
        }
    }

    // Flush a statement left open at EOF (best effort).
    if acc.is_active() {
        statements.push(acc.finish(pending_lines, false));
    }
    statements
}

fn classify_line(trimmed: &str) -> StatementKind {
    if starts_with_keywords(trimmed, &["CREATE", "TABLE"]) {
        StatementKind::CreateTable
    } else if starts_with_keywords(trimmed, &["INSERT", "INTO"]) {
        StatementKind::Insert
    } else {
        StatementKind::Other
    }
}

fn starts_statement(trimmed: &str, terminators: &[String]) -> bool {
    classify_line(trimmed) != StatementKind::Other
        || terminators.iter().any(|t| trimmed.eq_ignore_ascii_case(t))
}

// Case-insensitive keyword sequence match on whitespace-separated words.
fn starts_with_keywords(line: &str, keywords: &[&str]) -> bool {
    let mut words = line.split_whitespace();
    keywords
        .iter()
        .all(|kw| words.next().is_some_and(|w| w.eq_ignore_ascii_case(kw)))
}

// Tracks one statement across multiple lines.
struct StatementAccumulator {
    kind: Option<StatementKind>,
    buffer: String,
    quote: Option<char>,
    in_block_comment: bool,
    paren_depth: i32,
}

impl StatementAccumulator {
    fn new() -> Self {
        Self {
            kind: None,
            buffer: String::new(),
            quote: None,
            in_block_comment: false,
            paren_depth: 0,
        }
    }

    fn is_active(&self) -> bool {
        self.kind.is_some()
    }

    fn start(&mut self, kind: StatementKind) {
        self.kind = Some(kind);
        self.buffer.clear();
        self.quote = None;
        self.in_block_comment = false;
        self.paren_depth = 0;
    }

    // Append a line; returns true once the statement is complete.
    fn push_line(&mut self, line: &str) -> bool {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(line);
        let ends_with_semicolon = self.scan(line);
        self.quote.is_none()
            && !self.in_block_comment
            && self.paren_depth <= 0
            && ends_with_semicolon
    }

    // Scan characters to keep track of quotes, comments and parenthesis depth.
    // Doubled quotes toggle twice, so they need no special case here.
    // Returns whether the last character outside comments is ';'.
    fn scan(&mut self, line: &str) -> bool {
        let mut last = None;
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            if self.in_block_comment {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    self.in_block_comment = false;
                }
                continue;
            }
            match self.quote {
                Some(q) => {
                    if c == q {
                        self.quote = None;
                    }
                }
                None => match c {
                    '-' if chars.peek() == Some(&'-') => break,
                    '/' if chars.peek() == Some(&'*') => {
                        chars.next();
                        self.in_block_comment = true;
                        continue;
                    }
                    '\'' | '"' | '`' => self.quote = Some(c),
                    '(' => self.paren_depth += 1,
                    ')' => self.paren_depth -= 1,
                    _ => {}
                },
            }
            if !c.is_whitespace() {
                last = Some(c);
            }
        }
        last == Some(';')
    }

    fn finish(&mut self, lines: u64, terminated: bool) -> Statement {
        let kind = self.kind.take().unwrap_or(StatementKind::Other);
        let text = self.buffer.trim().to_string();
        self.buffer.clear();
        Statement {
            kind,
            text,
            lines,
            terminated,
        }
    }
}
