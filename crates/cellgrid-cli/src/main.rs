//! cellgrid CLI - drive the formula engine from scripts

use anyhow::{bail, Context, Result};
use cellgrid::prelude::*;
use cellgrid::{infer, parse_formula};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cellgrid")]
#[command(author, version, about = "Cell data and formula evaluation engine")]
struct Cli {
    #[command(flatten)]
    display: DisplayArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Default)]
struct DisplayArgs {
    /// JSON file with display settings
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Date display format (strftime syntax, e.g. "%Y-%m-%d")
    #[arg(long, global = true)]
    date_format: Option<String>,

    /// Do not group the digits of large numbers
    #[arg(long, global = true)]
    no_grouping: bool,

    /// Show the error code after #ERROR! (true/false)
    #[arg(long, global = true)]
    error_detail: Option<bool>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply edit lines ("ADDR RAW") and print the resulting cells
    Run {
        /// Script file (default: stdin)
        script: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Also print the cells changed by each edit
        #[arg(short, long)]
        changes: bool,
    },

    /// Show how a raw input would be classified and displayed
    Infer {
        /// Raw cell text
        text: String,
    },

    /// Parse a formula and show its tree and references
    Parse {
        /// Formula text, with or without the leading '='
        formula: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli.display)?;

    match cli.command {
        Commands::Run {
            script,
            format,
            changes,
        } => run_script(script.as_deref(), format, changes, settings),
        Commands::Infer { text } => show_inference(&text, &settings),
        Commands::Parse { formula } => show_parse(&formula),
    }
}

/// Build display settings from the optional file and flag overrides
fn load_settings(args: &DisplayArgs) -> Result<DisplaySettings> {
    let mut settings = match &args.settings {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid settings in '{}'", path.display()))?
        }
        None => DisplaySettings::default(),
    };

    if let Some(format) = &args.date_format {
        settings.date_format = format.clone();
    }
    if args.no_grouping {
        settings.thousands_separator = None;
    }
    if let Some(detail) = args.error_detail {
        settings.error_detail = detail;
    }
    if !settings.date_format_is_valid() {
        bail!("Invalid date format '{}'", settings.date_format);
    }

    Ok(settings)
}

/// One edit from a script
#[derive(Debug, Clone, PartialEq)]
struct Edit {
    /// 1-based line number in the script
    line: usize,
    address: CellAddress,
    raw: String,
}

/// Parse script text into edits
///
/// Each line is an address, a single space or tab, then the raw text (which
/// may be empty to clear the cell). Blank lines and lines starting with `#`
/// are skipped.
fn parse_script(text: &str) -> Result<Vec<Edit>> {
    let mut edits = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (address, raw) = match trimmed.split_once([' ', '\t']) {
            Some((address, raw)) => (address, raw),
            None => (trimmed, ""),
        };
        let address = CellAddress::parse(address)
            .with_context(|| format!("Line {}: bad address in '{}'", line_no, line))?;

        edits.push(Edit {
            line: line_no,
            address,
            raw: raw.trim_end_matches('\r').to_string(),
        });
    }

    Ok(edits)
}

#[derive(Debug, Serialize)]
struct CellRow {
    address: String,
    #[serde(flatten)]
    snapshot: CellSnapshot,
}

#[derive(Debug, Serialize)]
struct ChangeRow {
    line: usize,
    address: String,
    changed: Vec<String>,
    error: Option<ErrorKind>,
}

#[derive(Debug, Serialize)]
struct RunReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    changes: Option<Vec<ChangeRow>>,
    cells: Vec<CellRow>,
}

/// Apply edits to a fresh workbook
fn apply(edits: &[Edit], settings: DisplaySettings) -> (Workbook, Vec<ChangeRow>) {
    let mut workbook = Workbook::with_settings(settings);
    let mut changes = Vec::with_capacity(edits.len());

    for edit in edits {
        let outcome = workbook.write_at(edit.address, &edit.raw);
        changes.push(ChangeRow {
            line: edit.line,
            address: edit.address.to_string(),
            changed: outcome.changed.iter().map(|a| a.to_string()).collect(),
            error: outcome.error,
        });
    }

    (workbook, changes)
}

fn run_script(
    script: Option<&Path>,
    format: OutputFormat,
    show_changes: bool,
    settings: DisplaySettings,
) -> Result<()> {
    let text = match script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read script from stdin")?;
            text
        }
    };

    let edits = parse_script(&text)?;
    let (workbook, changes) = apply(&edits, settings);

    let report = RunReport {
        changes: show_changes.then_some(changes),
        cells: workbook
            .cells()
            .map(|(address, _)| CellRow {
                address: address.to_string(),
                snapshot: workbook.snapshot(address),
            })
            .collect(),
    };

    let output = match format {
        OutputFormat::Table => render_table(&report),
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(&report).context("Failed to serialize cells")?;
            json.push('\n');
            json
        }
    };

    io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write to stdout")?;

    Ok(())
}

/// Render a report as aligned text columns
fn render_table(report: &RunReport) -> String {
    let mut out = String::new();

    if let Some(changes) = &report.changes {
        for change in changes {
            out.push_str(&format!(
                "line {}: {} -> [{}]",
                change.line,
                change.address,
                change.changed.join(", ")
            ));
            if let Some(error) = change.error {
                out.push_str(&format!(" ({})", error.code()));
            }
            out.push('\n');
        }
        out.push('\n');
    }

    let headers = ["CELL", "KIND", "VALUE"];
    let rows: Vec<[String; 3]> = report
        .cells
        .iter()
        .map(|row| {
            [
                row.address.clone(),
                row.snapshot.kind.to_string(),
                row.snapshot.display_text.clone(),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, field) in widths.iter_mut().zip(row) {
            *width = (*width).max(field.chars().count());
        }
    }

    let mut push_row = |fields: [&str; 3]| {
        let line = format!(
            "{:<w0$}  {:<w1$}  {}",
            fields[0],
            fields[1],
            fields[2],
            w0 = widths[0],
            w1 = widths[1]
        );
        out.push_str(line.trim_end());
        out.push('\n');
    };

    push_row(headers);
    for row in &rows {
        push_row([row[0].as_str(), row[1].as_str(), row[2].as_str()]);
    }

    out
}

fn show_inference(text: &str, settings: &DisplaySettings) -> Result<()> {
    let kind = infer::infer_kind(text);
    let valid = infer::validate(text, kind).is_ok();

    println!("kind:    {}", kind);
    println!("valid:   {}", if valid { "yes" } else { "no" });
    println!("display: {}", infer::format(text, kind, settings));

    Ok(())
}

fn show_parse(formula: &str) -> Result<()> {
    let body = formula.strip_prefix('=').unwrap_or(formula);

    match parse_formula(body) {
        Ok(expr) => {
            println!("{:#?}", expr);
            let refs: Vec<String> = expr.references().iter().map(|a| a.to_string()).collect();
            println!("references: [{}]", refs.join(", "));
            Ok(())
        }
        Err(e) => bail!(
            "{} at position {}: {}",
            e.kind().code(),
            e.position(),
            e
        ),
    }
}
