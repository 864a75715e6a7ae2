// Dialect profile: every fixed lookup table the converter consults.
// The built-in default targets PostgreSQL 16 from a Prisma-style SQLite
// dump. A JSON file can override any subset of fields; missing fields keep
// the built-in values.

use crate::error::{ConvertError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// How a declared column type drives value conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Timestamp,
    Boolean,
    Text,
    Numeric,
    Json,
}

// Positions of a table whose still-unconverted epoch values are forced to
// timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochRepair {
    pub table: String,
    pub positions: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectProfile {
    // Source type keyword -> target type, keys upper-case.
    pub type_map: BTreeMap<String, String>,
    pub timestamp_types: Vec<String>,
    pub boolean_types: Vec<String>,
    pub text_types: Vec<String>,
    pub numeric_types: Vec<String>,
    pub json_types: Vec<String>,
    // Column name suffixes that mark a timestamp column whatever its type.
    pub timestamp_suffixes: Vec<String>,
    // Exact digit count treated as epoch millis when no schema is known.
    pub heuristic_epoch_digits: usize,
    // Minimum digit count treated as epoch millis in timestamp columns.
    pub min_epoch_digits: usize,
    // Table -> value positions known to hold 0/1 booleans.
    pub boolean_positions: BTreeMap<String, Vec<usize>>,
    // Lower-case substrings that flag a statement as carrying booleans.
    pub boolean_patterns: Vec<String>,
    pub epoch_repairs: Vec<EpochRepair>,
    // Statement prefixes dropped from the output.
    pub directive_prefixes: Vec<String>,
    // Statements that close the source transaction.
    pub commit_statements: Vec<String>,
    // Index statements emitted before the closing COMMIT.
    pub indexes: Vec<String>,
}

impl Default for DialectProfile {
    fn default() -> Self {
        let type_map = [
            ("TEXT", "VARCHAR"),
            ("INTEGER", "INTEGER"),
            ("DECIMAL", "DECIMAL"),
            ("REAL", "DOUBLE PRECISION"),
            ("BLOB", "BYTEA"),
            ("BOOLEAN", "BOOLEAN"),
            ("DATETIME", "TIMESTAMP WITH TIME ZONE"),
            ("JSONB", "JSONB"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let boolean_positions = [
            ("User", vec![11, 12]),
            ("Product", vec![12, 13]),
            ("Brand", vec![4]),
            ("SearchLanding", vec![5]),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            type_map,
            timestamp_types: strings(&["DATETIME", "TIMESTAMP", "TIMESTAMPTZ"]),
            boolean_types: strings(&["BOOLEAN", "BOOL"]),
            text_types: strings(&["TEXT", "VARCHAR", "CHAR"]),
            numeric_types: strings(&["INTEGER", "INT", "BIGINT", "DECIMAL", "NUMERIC", "REAL"]),
            json_types: strings(&["JSONB", "JSON"]),
            timestamp_suffixes: strings(&["_at"]),
            heuristic_epoch_digits: 13,
            min_epoch_digits: 10,
            boolean_positions,
            boolean_patterns: strings(&["is_active", "is_deleted", "is_published", "deleted"]),
            epoch_repairs: vec![EpochRepair {
                table: "Order".to_string(),
                positions: vec![8, 9, 10],
            }],
            directive_prefixes: strings(&["PRAGMA", "BEGIN TRANSACTION"]),
            commit_statements: strings(&["COMMIT;", "END TRANSACTION;"]),
            indexes: default_indexes(),
        }
    }
}

impl DialectProfile {
    // Load a profile from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        let profile: DialectProfile =
            serde_json::from_str(&text).map_err(|source| ConvertError::Profile {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(profile.normalized())
    }

    // Upper-case every type keyword and lower-case the boolean patterns so
    // lookups can compare directly.
    pub fn normalized(mut self) -> Self {
        self.type_map = self
            .type_map
            .into_iter()
            .map(|(k, v)| (k.to_ascii_uppercase(), v))
            .collect();
        for list in [
            &mut self.timestamp_types,
            &mut self.boolean_types,
            &mut self.text_types,
            &mut self.numeric_types,
            &mut self.json_types,
        ] {
            for t in list.iter_mut() {
                *t = t.to_ascii_uppercase();
            }
        }
        for p in self.boolean_patterns.iter_mut() {
            *p = p.to_lowercase();
        }
        self
    }

    // Target type for a source type keyword; unmapped keywords are kept.
    pub fn map_type<'a>(&'a self, base_type: &'a str) -> &'a str {
        self.type_map
            .get(&base_type.to_ascii_uppercase())
            .map(String::as_str)
            .unwrap_or(base_type)
    }

    pub fn type_class(&self, base_type: &str) -> Option<TypeClass> {
        let upper = base_type.to_ascii_uppercase();
        let has = |list: &[String]| list.iter().any(|t| *t == upper);
        if has(&self.timestamp_types) {
            Some(TypeClass::Timestamp)
        } else if has(&self.boolean_types) {
            Some(TypeClass::Boolean)
        } else if has(&self.text_types) {
            Some(TypeClass::Text)
        } else if has(&self.numeric_types) {
            Some(TypeClass::Numeric)
        } else if has(&self.json_types) {
            Some(TypeClass::Json)
        } else {
            None
        }
    }

    pub fn has_timestamp_suffix(&self, column: &str) -> bool {
        self.timestamp_suffixes.iter().any(|s| column.ends_with(s.as_str()))
    }

    pub fn is_boolean_position(&self, table: &str, position: usize) -> bool {
        self.boolean_positions
            .get(table)
            .is_some_and(|positions| positions.contains(&position))
    }

    // True when the lower-cased statement text contains a boolean pattern.
    pub fn mentions_boolean(&self, statement_lower: &str) -> bool {
        self.boolean_patterns
            .iter()
            .any(|p| statement_lower.contains(p.as_str()))
    }

    pub fn is_repair_position(&self, table: &str, position: usize) -> bool {
        self.epoch_repairs
            .iter()
            .any(|r| r.table == table && r.positions.contains(&position))
    }

    pub fn is_directive(&self, line: &str) -> bool {
        self.directive_prefixes
            .iter()
            .any(|p| starts_with_ignore_case(line, p))
    }

    pub fn is_commit(&self, line: &str) -> bool {
        self.commit_statements
            .iter()
            .any(|c| line.eq_ignore_ascii_case(c))
    }
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.len() >= prefix.len()
        && line.is_char_boundary(prefix.len())
        && line[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_indexes() -> Vec<String> {
    strings(&[
        "-- Indexes for better performance",
        "CREATE INDEX IF NOT EXISTS idx_category_parent_id ON \"Category\"(parent_id);",
        "CREATE INDEX IF NOT EXISTS idx_category_slug ON \"Category\"(slug);",
        "CREATE INDEX IF NOT EXISTS idx_product_sku ON \"Product\"(sku);",
        "CREATE INDEX IF NOT EXISTS idx_product_slug ON \"Product\"(slug);",
        "CREATE INDEX IF NOT EXISTS idx_product_category_id ON \"Product\"(category_id);",
        "CREATE INDEX IF NOT EXISTS idx_product_brand_id ON \"Product\"(brand_id);",
        "CREATE INDEX IF NOT EXISTS idx_product_is_active ON \"Product\"(is_active);",
        "CREATE INDEX IF NOT EXISTS idx_productimage_product_id ON \"ProductImage\"(product_id);",
        "CREATE INDEX IF NOT EXISTS idx_order_client_user_id ON \"Order\"(client_user_id);",
        "CREATE INDEX IF NOT EXISTS idx_order_seller_user_id ON \"Order\"(seller_user_id);",
        "CREATE INDEX IF NOT EXISTS idx_order_status ON \"Order\"(status);",
        "CREATE INDEX IF NOT EXISTS idx_order_type ON \"Order\"(type);",
        "CREATE INDEX IF NOT EXISTS idx_order_created_at ON \"Order\"(created_at);",
        "CREATE INDEX IF NOT EXISTS idx_orderitem_order_id ON \"OrderItem\"(order_id);",
        "CREATE INDEX IF NOT EXISTS idx_orderitem_product_id ON \"OrderItem\"(product_id);",
        "CREATE INDEX IF NOT EXISTS idx_user_email ON \"User\"(email);",
        "CREATE INDEX IF NOT EXISTS idx_user_role ON \"User\"(role);",
        "CREATE INDEX IF NOT EXISTS idx_user_is_active ON \"User\"(is_active);",
        "CREATE INDEX IF NOT EXISTS idx_user_assigned_seller_id ON \"User\"(assigned_seller_id);",
        "CREATE INDEX IF NOT EXISTS idx_brand_slug ON \"Brand\"(slug);",
        "CREATE INDEX IF NOT EXISTS idx_analytics_event_name ON \"AnalyticsEvent\"(event_name);",
        "CREATE INDEX IF NOT EXISTS idx_analytics_user_id ON \"AnalyticsEvent\"(user_id);",
        "CREATE INDEX IF NOT EXISTS idx_analytics_product_id ON \"AnalyticsEvent\"(product_id);",
        "CREATE INDEX IF NOT EXISTS idx_analytics_created_at ON \"AnalyticsEvent\"(created_at);",
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn maps_known_types_and_keeps_unknown() {
        let profile = DialectProfile::default();
        assert_eq!(profile.map_type("DATETIME"), "TIMESTAMP WITH TIME ZONE");
        assert_eq!(profile.map_type("datetime"), "TIMESTAMP WITH TIME ZONE");
        assert_eq!(profile.map_type("GEOMETRY"), "GEOMETRY");
    }

    #[test]
    fn classifies_declared_types() {
        let profile = DialectProfile::default();
        assert_eq!(profile.type_class("DATETIME"), Some(TypeClass::Timestamp));
        assert_eq!(profile.type_class("boolean"), Some(TypeClass::Boolean));
        assert_eq!(profile.type_class("TEXT"), Some(TypeClass::Text));
        assert_eq!(profile.type_class("DECIMAL"), Some(TypeClass::Numeric));
        assert_eq!(profile.type_class("JSONB"), Some(TypeClass::Json));
        assert_eq!(profile.type_class("UUID"), None);
    }

    #[test]
    fn directive_and_commit_detection() {
        let profile = DialectProfile::default();
        assert!(profile.is_directive("PRAGMA foreign_keys=OFF;"));
        assert!(profile.is_directive("BEGIN TRANSACTION;"));
        assert!(!profile.is_directive("CREATE INDEX x ON t(a);"));
        assert!(profile.is_commit("COMMIT;"));
        assert!(profile.is_commit("commit;"));
        assert!(!profile.is_commit("COMMIT"));
    }

    #[test]
    fn repair_and_boolean_positions() {
        let profile = DialectProfile::default();
        assert!(profile.is_repair_position("Order", 9));
        assert!(!profile.is_repair_position("Order", 11));
        assert!(profile.is_boolean_position("Brand", 4));
        assert!(!profile.is_boolean_position("Brand", 3));
    }

    #[test]
    fn partial_json_profile_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"type_map": {{"text": "TEXT"}}, "boolean_patterns": ["IS_ENABLED"]}}"#
        )
        .unwrap();

        let profile = DialectProfile::load(file.path()).unwrap();
        assert_eq!(profile.map_type("TEXT"), "TEXT");
        // Replaced map: DATETIME no longer mapped.
        assert_eq!(profile.map_type("DATETIME"), "DATETIME");
        assert!(profile.mentions_boolean("insert ... is_enabled"));
        assert_eq!(profile.heuristic_epoch_digits, 13);
        assert!(!profile.indexes.is_empty());
    }

    #[test]
    fn invalid_profile_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = DialectProfile::load(file.path()).unwrap_err();
        assert!(matches!(err, ConvertError::Profile { .. }));
    }
}
