// Statement rewriter: drives the whole conversion.
// Pass one fills the schema registry from CREATE TABLE statements; pass two
// rewrites every statement against it. Both passes read the same immutable
// statement list, so the transformation itself never touches the filesystem.

use crate::classify::{Classifier, ValueContext, ValueKind};
use crate::logger;
use crate::parser::insert::{InsertParser, InsertStatement};
use crate::parser::quote_ident;
use crate::parser::schema::{
    first_line, is_constraint, ColumnDefinition, CreateTable, SchemaParser, SchemaRegistry,
    TableSchema,
};
use crate::parser::statement::{split_statements, Statement, StatementKind};
use crate::parser::values::join_values;
use crate::profile::DialectProfile;
use crate::progress::ProgressManager;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    // Build the registry first; values with a known column use its type.
    Schema,
    // Shape and statement-text heuristics only.
    Heuristic,
}

// Counters describing one run.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ConversionSummary {
    pub tables_registered: usize,
    pub tables_rewritten: usize,
    pub tables_passed_through: usize,
    pub inserts_rewritten: usize,
    pub inserts_passed_through: usize,
    pub rows: usize,
    pub values_schema_driven: usize,
    pub values_heuristic: usize,
    // Values that had to use heuristics although a registry was built.
    pub schema_fallbacks: usize,
    pub timestamps_converted: usize,
    pub timestamp_fallbacks: usize,
    pub booleans_converted: usize,
    pub blobs_converted: usize,
    pub epoch_repairs: usize,
    pub directives_dropped: usize,
    pub lines_passed_through: usize,
}

pub struct ConvertOptions {
    pub mode: Mode,
    // Stamped into the header comment.
    pub generated_at: DateTime<Utc>,
}

pub struct Conversion {
    pub output: String,
    pub summary: ConversionSummary,
}

pub struct Converter<'a> {
    profile: &'a DialectProfile,
    schema_parser: SchemaParser,
    insert_parser: InsertParser,
    classifier: Classifier<'a>,
    options: ConvertOptions,
}

impl<'a> Converter<'a> {
    pub fn new(profile: &'a DialectProfile, options: ConvertOptions) -> Self {
        Self {
            profile,
            schema_parser: SchemaParser::new(),
            insert_parser: InsertParser::new(),
            classifier: Classifier::new(profile),
            options,
        }
    }

    // Convert a whole dump. Never fails: malformed statements pass through.
    pub fn convert(&self, input: &str, progress: &ProgressManager) -> Conversion {
        let statements = split_statements(input, &self.profile.commit_statements);
        let total_lines: u64 = statements.iter().map(|s| s.lines).sum();
        logger::debug(&format!(
            "Convert: {} statements over {} lines",
            statements.len(),
            total_lines
        ));

        let registry = match self.options.mode {
            Mode::Schema => {
                logger::info("Extracting table schemas...");
                let bar = progress.new_pass_bar(total_lines, "Schemas");
                let registry =
                    SchemaRegistry::build(&statements, &self.schema_parser, bar.as_ref());
                if registry.is_empty() {
                    logger::warn("No CREATE TABLE statements found; using heuristics only");
                }
                Some(registry)
            }
            Mode::Heuristic => None,
        };

        logger::info("Converting SQL statements...");
        let bar = progress.new_pass_bar(total_lines, "Converting");
        let mut summary = ConversionSummary {
            tables_registered: registry.as_ref().map_or(0, SchemaRegistry::len),
            ..ConversionSummary::default()
        };
        let mut out = self.header();
        let mut committed = false;

        for stmt in &statements {
            if let Some(b) = bar.as_ref() {
                b.inc(stmt.lines);
            }
            match stmt.kind {
                StatementKind::CreateTable => {
                    self.rewrite_create_table(stmt, &mut out, &mut summary);
                }
                StatementKind::Insert if !stmt.terminated => {
                    logger::warn(&format!(
                        "Convert: passing through unterminated INSERT: {}",
                        first_line(&stmt.text)
                    ));
                    out.push(stmt.text.clone());
                    summary.inserts_passed_through += 1;
                }
                StatementKind::Insert => {
                    let line = self.rewrite_insert(&stmt.text, registry.as_ref(), &mut summary);
                    out.push(line);
                }
                StatementKind::Other => {
                    if self.profile.is_directive(&stmt.text) {
                        logger::debug(&format!("Convert: dropping directive {}", stmt.text));
                        summary.directives_dropped += 1;
                    } else if self.profile.is_commit(&stmt.text) {
                        self.push_footer(&mut out);
                        committed = true;
                    } else {
                        out.push(stmt.text.clone());
                        summary.lines_passed_through += 1;
                    }
                }
            }
        }

        if !committed {
            logger::warn("Dump has no COMMIT; closing the transaction at end of output");
            self.push_footer(&mut out);
        }
        if let Some(b) = bar {
            b.finish();
        }

        let mut output = out.join("\n");
        output.push('\n');
        Conversion { output, summary }
    }

    fn header(&self) -> Vec<String> {
        vec![
            "-- PostgreSQL 16 Database Dump".to_string(),
            "-- Converted from SQLite".to_string(),
            format!(
                "-- Generated on: {}",
                self.options.generated_at.format("%Y-%m-%d %H:%M:%S")
            ),
            String::new(),
            "-- Disable foreign key checks during import".to_string(),
            "SET session_replication_role = replica;".to_string(),
            String::new(),
            "BEGIN;".to_string(),
            String::new(),
        ]
    }

    fn push_footer(&self, out: &mut Vec<String>) {
        out.push(String::new());
        out.push("-- Create indexes for performance".to_string());
        out.extend(self.profile.indexes.iter().cloned());
        out.push(String::new());
        out.push("-- Re-enable foreign key checks".to_string());
        out.push("SET session_replication_role = DEFAULT;".to_string());
        out.push(String::new());
        out.push("COMMIT;".to_string());
    }

    fn rewrite_create_table(
        &self,
        stmt: &Statement,
        out: &mut Vec<String>,
        summary: &mut ConversionSummary,
    ) {
        match self.schema_parser.parse_create_table(&stmt.text) {
            Some(create) => {
                out.push(self.render_create_table(&create));
                out.push(String::new());
                summary.tables_rewritten += 1;
            }
            None => {
                logger::debug(&format!(
                    "Convert: passing through CREATE TABLE {}",
                    first_line(&stmt.text)
                ));
                out.push(stmt.text.clone());
                summary.tables_passed_through += 1;
            }
        }
    }

    // CREATE TABLE IF NOT EXISTS "name" ( one definition per line ).
    pub fn render_create_table(&self, create: &CreateTable) -> String {
        let defs: Vec<String> = create
            .definitions
            .iter()
            .map(|def| format!("    {}", self.map_definition(def)))
            .collect();
        // SQLite table options (WITHOUT ROWID, STRICT) have no equivalent.
        if !create.trailer.is_empty() {
            logger::debug(&format!(
                "Convert: dropping table options '{}' on {}",
                create.trailer, create.table_name
            ));
        }
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
            quote_ident(&create.table_name),
            defs.join(",\n")
        )
    }

    // Swap the column type keyword for its target type. Constraints and
    // typeless columns are returned unchanged.
    fn map_definition(&self, def: &str) -> String {
        if is_constraint(def) {
            return def.to_string();
        }
        let Some(col) = ColumnDefinition::parse(def) else {
            return def.to_string();
        };
        if col.type_start == col.type_end {
            return def.to_string();
        }

        let declared = &def[col.type_start..col.type_end];
        let (base, suffix) = match declared.find('(') {
            Some(i) => declared.split_at(i),
            None => (declared, ""),
        };
        format!(
            "{}{}{}{}",
            &def[..col.type_start],
            self.profile.map_type(base),
            suffix,
            &def[col.type_end..]
        )
    }

    fn rewrite_insert(
        &self,
        text: &str,
        registry: Option<&SchemaRegistry>,
        summary: &mut ConversionSummary,
    ) -> String {
        let Some(insert) = self.insert_parser.parse(text) else {
            logger::debug(&format!(
                "Convert: INSERT did not match expected shape: {}",
                first_line(text)
            ));
            summary.inserts_passed_through += 1;
            return text.to_string();
        };

        let schema = registry.and_then(|r| r.get(&insert.table));
        if registry.is_some() && schema.is_none() {
            logger::debug(&format!(
                "Convert: no schema for table {}, using heuristics",
                insert.table
            ));
        }
        let boolean_hint = self.profile.mentions_boolean(&text.to_lowercase());

        let rows: Vec<String> = insert
            .rows
            .iter()
            .map(|row| {
                let values = self.convert_row(
                    &insert,
                    row,
                    schema,
                    boolean_hint,
                    registry.is_some(),
                    summary,
                );
                format!("({})", join_values(&values))
            })
            .collect();
        summary.inserts_rewritten += 1;
        summary.rows += insert.rows.len();

        let columns = match &insert.columns {
            Some(cols) => {
                let quoted: Vec<String> = cols.iter().map(|c| quote_ident(c)).collect();
                format!(" ({})", quoted.join(", "))
            }
            None => String::new(),
        };
        format!(
            "INSERT INTO {}{} VALUES{};",
            quote_ident(&insert.table),
            columns,
            rows.join(",")
        )
    }

    fn convert_row(
        &self,
        insert: &InsertStatement,
        row: &[String],
        schema: Option<&TableSchema>,
        boolean_hint: bool,
        schema_expected: bool,
        summary: &mut ConversionSummary,
    ) -> Vec<String> {
        row.iter()
            .enumerate()
            .map(|(position, token)| {
                let column = schema.and_then(|s| match &insert.columns {
                    Some(names) => names.get(position).and_then(|n| s.column_named(n)),
                    None => s.column_at(position),
                });
                let ctx = ValueContext {
                    table: &insert.table,
                    position,
                    column,
                    boolean_hint,
                };
                let converted = self.classifier.convert(token, &ctx);

                if converted.schema_driven {
                    summary.values_schema_driven += 1;
                } else {
                    summary.values_heuristic += 1;
                    if schema_expected {
                        summary.schema_fallbacks += 1;
                    }
                }
                match converted.kind {
                    ValueKind::Timestamp => summary.timestamps_converted += 1,
                    ValueKind::TimestampFallback => summary.timestamp_fallbacks += 1,
                    ValueKind::Boolean => summary.booleans_converted += 1,
                    ValueKind::Blob => summary.blobs_converted += 1,
                    _ => {}
                }
                if converted.repaired {
                    summary.epoch_repairs += 1;
                }
                converted.text
            })
            .collect()
    }
}
