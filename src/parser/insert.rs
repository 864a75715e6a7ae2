// INSERT parser: decomposes `INSERT INTO name [(cols)] VALUES (...)[, (...)];`
// into table name, optional explicit column list and per-row literal tokens.
// We intentionally keep parsing simple (no full SQL grammar).

use crate::parser::{unquote_ident, values};
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub table: String,
    // Explicit column names, unquoted, when the statement lists them.
    pub columns: Option<Vec<String>>,
    // One token list per VALUES group; quotes preserved.
    pub rows: Vec<Vec<String>>,
}

pub struct InsertParser {
    insert_re: Regex,
}

impl InsertParser {
    pub fn new() -> Self {
        let insert_re = Regex::new(
            r#"(?is)^\s*INSERT\s+INTO\s+("(?:[^"]|"")+"|`[^`]+`|\[[^\]]+\]|[A-Za-z_][\w$]*)\s*(\([^()]*\))?\s*VALUES\s*(\(.*\))\s*;?\s*$"#,
        )
        .expect("valid insert regex");
        Self { insert_re }
    }

    // Returns None when the statement does not have the expected shape.
    pub fn parse(&self, stmt: &str) -> Option<InsertStatement> {
        let cap = self.insert_re.captures(stmt)?;
        let table = unquote_ident(cap.get(1)?.as_str());

        let columns = cap.get(2).map(|m| {
            let list = m.as_str();
            values::split_values(&list[1..list.len() - 1])
                .iter()
                .map(|c| unquote_ident(c))
                .collect::<Vec<_>>()
        });

        let rows: Vec<Vec<String>> = values::split_value_groups(cap.get(3)?.as_str())
            .iter()
            .map(|group| values::split_values(group))
            .collect();
        if rows.is_empty() {
            return None;
        }

        Some(InsertStatement {
            table,
            columns,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_insert() {
        let parser = InsertParser::new();
        let stmt = parser
            .parse("INSERT INTO Category VALUES('c1','Tools, Hand',NULL,1696089600000);")
            .unwrap();
        assert_eq!(stmt.table, "Category");
        assert!(stmt.columns.is_none());
        assert_eq!(stmt.rows.len(), 1);
        assert_eq!(
            stmt.rows[0],
            vec!["'c1'", "'Tools, Hand'", "NULL", "1696089600000"]
        );
    }

    #[test]
    fn parses_quoted_table_name() {
        let parser = InsertParser::new();
        let stmt = parser.parse("INSERT INTO \"Order\" VALUES(1,2);").unwrap();
        assert_eq!(stmt.table, "Order");
        assert_eq!(stmt.rows[0], vec!["1", "2"]);
    }

    #[test]
    fn parses_explicit_columns_and_multiple_rows() {
        let parser = InsertParser::new();
        let stmt = parser
            .parse("INSERT INTO t (\"id\", name) VALUES (1,'a'), (2,'b(c)');")
            .unwrap();
        assert_eq!(stmt.columns, Some(vec!["id".to_string(), "name".to_string()]));
        assert_eq!(stmt.rows.len(), 2);
        assert_eq!(stmt.rows[1], vec!["2", "'b(c)'"]);
    }

    #[test]
    fn multi_line_values_are_parsed() {
        let parser = InsertParser::new();
        let stmt = parser
            .parse("INSERT INTO t VALUES(1,'first\nsecond');")
            .unwrap();
        assert_eq!(stmt.rows[0][1], "'first\nsecond'");
    }

    #[test]
    fn rejects_other_shapes() {
        let parser = InsertParser::new();
        assert!(parser.parse("INSERT INTO t SELECT * FROM u;").is_none());
        assert!(parser.parse("INSERT INTO t DEFAULT VALUES;").is_none());
    }
}
