// sqlite2pg: convert a SQLite `.dump` file into a PostgreSQL script.
// Reads the whole dump, builds the table schemas, rewrites every statement
// and writes the result in one go.

mod classify;
mod error;
mod logger;
mod parser;
mod profile;
mod progress;
mod rewriter;

use chrono::Utc;
use clap::{CommandFactory, Parser, ValueEnum};
use error::ConvertError;
use profile::DialectProfile;
use rewriter::{ConvertOptions, Converter, Mode};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    /// Use declared column types, falling back to heuristics.
    Schema,
    /// Infer types from value shape and statement text only.
    Heuristic,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Schema => Mode::Schema,
            ModeArg::Heuristic => Mode::Heuristic,
        }
    }
}

// Command-line flags and positional arguments.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Enable debug logging (disables progress bars).
    #[arg(long)]
    debug: bool,

    /// Value conversion mode.
    #[arg(long, value_enum, default_value_t = ModeArg::Schema)]
    mode: ModeArg,

    /// JSON dialect profile overriding the built-in lookup tables.
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Write the conversion summary as JSON to this file.
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// SQLite dump file path.
    input: PathBuf,

    /// Output PostgreSQL script (optional). If omitted, prints to stdout.
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if std::env::args().len() == 1 {
        Args::command().print_help()?;
        eprintln!();
        std::process::exit(1);
    }
    let args = Args::parse();

    logger::init(args.debug);
    if let Err(e) = run(&args) {
        logger::error(&e.to_string());
        return Err(e.into());
    }
    Ok(())
}

fn run(args: &Args) -> Result<(), ConvertError> {
    let start = Instant::now();
    logger::debug(&format!("main: Input file: {}", args.input.display()));

    let profile = match &args.profile {
        Some(path) => {
            logger::debug(&format!("main: Loading profile {}", path.display()));
            DialectProfile::load(path)?
        }
        None => DialectProfile::default(),
    };

    let input = fs::read_to_string(&args.input).map_err(|e| ConvertError::io(&args.input, e))?;

    // Progress bars are disabled in debug mode to avoid mangled output.
    let progress = progress::ProgressManager::new(!logger::is_debug());
    let converter = Converter::new(
        &profile,
        ConvertOptions {
            mode: args.mode.into(),
            generated_at: Utc::now(),
        },
    );
    let conversion = converter.convert(&input, &progress);

    match &args.output {
        Some(path) => {
            fs::write(path, &conversion.output).map_err(|e| ConvertError::io(path, e))?;
            logger::info(&format!("Conversion completed. Output written to: {}", path.display()));
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(conversion.output.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|e| ConvertError::io("<stdout>", e))?;
        }
    }

    if let Some(path) = &args.summary_json {
        let report = serde_json::json!({
            "mode": Mode::from(args.mode),
            "elapsed_ms": start.elapsed().as_millis(),
            "summary": conversion.summary,
        });
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).map_err(|e| ConvertError::io(path, e))?;
    }

    print_summary(&conversion.summary).map_err(|e| ConvertError::io("<stderr>", e))?;
    logger::debug(&format!("main: Conversion took {:?}", start.elapsed()));
    Ok(())
}

fn print_summary(summary: &rewriter::ConversionSummary) -> io::Result<()> {
    let sep = "=".repeat(60);
    let mut stderr = io::stderr();
    writeln!(stderr, "\n{}\nSUMMARY\n{}", sep, sep)?;
    writeln!(stderr, "Tables:            {}", summary.tables_rewritten)?;
    writeln!(stderr, "Inserts:           {}", summary.inserts_rewritten)?;
    writeln!(stderr, "Rows:              {}", summary.rows)?;
    writeln!(stderr, "Passed through:    {}", summary.inserts_passed_through)?;
    writeln!(stderr, "Timestamps:        {}", summary.timestamps_converted)?;
    writeln!(stderr, "Booleans:          {}", summary.booleans_converted)?;
    writeln!(stderr, "Blobs:             {}", summary.blobs_converted)?;
    writeln!(stderr, "Heuristic values:  {}", summary.values_heuristic)?;
    writeln!(stderr, "Schema fallbacks:  {}", summary.schema_fallbacks)?;
    writeln!(stderr, "{}", sep)?;
    Ok(())
}
