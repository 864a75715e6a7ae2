// Value tokenizer: splits comma-separated SQL literal lists while respecting
// quotes and nested parentheses. Quotes are kept in the tokens; callers
// decide what a token means.

// Split a literal list (the text between the outer parentheses of a VALUES
// row) into trimmed tokens.
//
// A doubled quote inside a quoted segment is an escaped quote and does not
// end the string. An unterminated quote runs to end-of-input and the tail is
// returned as one best-effort token. A trailing empty token is dropped.
pub fn split_values(list: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut buf = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0i32;
    let mut chars = list.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            buf.push(c);
            if c == q {
                if chars.peek() == Some(&q) {
                    buf.push(q);
                    chars.next();
                } else {
                    quote = None;
                }
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                buf.push(c);
            }
            '(' => {
                depth += 1;
                buf.push(c);
            }
            ')' => {
                depth = (depth - 1).max(0);
                buf.push(c);
            }
            ',' if depth == 0 => {
                values.push(buf.trim().to_string());
                buf.clear();
            }
            _ => buf.push(c),
        }
    }

    let last = buf.trim();
    if !last.is_empty() {
        values.push(last.to_string());
    }
    values
}

// Split value groups: (...),(...),... while respecting quotes.
// Returns the inner text of each top-level parenthesized group.
pub fn split_value_groups(values_part: &str) -> Vec<String> {
    let mut groups = Vec::new();
    let mut buf = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0i32;
    let mut chars = values_part.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            buf.push(c);
            if c == q {
                if chars.peek() == Some(&q) {
                    buf.push(q);
                    chars.next();
                } else {
                    quote = None;
                }
            }
            continue;
        }
        match c {
            '\'' | '"' if depth > 0 => {
                quote = Some(c);
                buf.push(c);
            }
            '(' => {
                if depth > 0 {
                    buf.push(c);
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    groups.push(std::mem::take(&mut buf));
                } else {
                    buf.push(c);
                }
            }
            // Separators and stray text between groups are ignored.
            _ if depth == 0 => {}
            _ => buf.push(c),
        }
    }

    // Unterminated last group: keep what we have.
    if depth > 0 && !buf.trim().is_empty() {
        groups.push(buf);
    }
    groups
}

// Reassemble a converted row as a VALUES body.
pub fn join_values(values: &[String]) -> String {
    values.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_simple_list() {
        assert_eq!(split_values("1, 'a', NULL"), vec!["1", "'a'", "NULL"]);
    }

    #[test]
    fn commas_inside_quotes_do_not_split() {
        let values = split_values("'a,b', 'c, d, e', 3");
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], "'a,b'");
        assert_eq!(values[1], "'c, d, e'");
    }

    #[test]
    fn doubled_quotes_stay_inside_the_string() {
        let values = split_values("'O''Brien, Pat',2,'it''s'");
        assert_eq!(values, vec!["'O''Brien, Pat'", "2", "'it''s'"]);
    }

    #[test]
    fn nested_parentheses_do_not_split() {
        let values = split_values("1,replace('a,b','\\n',char(10)),3");
        assert_eq!(values.len(), 3);
        assert_eq!(values[1], "replace('a,b','\\n',char(10))");
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        let values = split_values("1,'abc, def");
        assert_eq!(values, vec!["1", "'abc, def"]);
    }

    #[test]
    fn trailing_empty_token_is_dropped_but_inner_kept() {
        assert_eq!(split_values("1,,2,"), vec!["1", "", "2"]);
        assert!(split_values("   ").is_empty());
    }

    #[test]
    fn json_bodies_stay_whole() {
        let values = split_values("'{\"a\":1,\"b\":[1,2]}',5");
        assert_eq!(values, vec!["'{\"a\":1,\"b\":[1,2]}'", "5"]);
    }

    #[test]
    fn splits_multiple_groups() {
        let groups = split_value_groups("(1,'a)'),(2,'b''c') ,(3,(4))");
        assert_eq!(groups, vec!["1,'a)'", "2,'b''c'", "3,(4)"]);
    }

    #[test]
    fn group_without_parentheses_yields_nothing() {
        assert!(split_value_groups("1, 2, 3").is_empty());
    }

    #[test]
    fn rejoined_values_retokenize_to_same_count() {
        let original = split_values("'x,y', NULL, 1696089600000, 'it''s'");
        let joined = join_values(&original);
        assert_eq!(split_values(&joined).len(), original.len());
    }
}
