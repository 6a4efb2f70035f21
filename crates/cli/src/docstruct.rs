//! docstruct - Structure recognition output into a semantic document
//!
//! Reads a JSON document bundle (tokens, detections, entity and pattern
//! candidates) and writes either the final semantic document or the
//! per-category structured layout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tessella_core::pipeline::{DocumentInput, NoopCorrector, Pipeline};
use tessella_core::{StructError, StructureParams};

/// Structure recognition output (tokens + detections) into rows,
/// tables and ordered semantic blocks.
#[derive(Parser, Debug)]
#[command(name = "docstruct")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the document bundle JSON: {document_id, tokens,
    /// detections, entities, patterns}
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Emit the per-category structured layout instead of the final
    /// semantic document
    #[arg(long, action = ArgAction::SetTrue)]
    layout_only: bool,

    /// Pretty-print the JSON output
    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Minimum detection score for Table regions
    #[arg(long, default_value = "0.7")]
    table_score_floor: f64,

    /// Minimum detection score for all other regions
    #[arg(long, default_value = "0.5")]
    other_score_floor: f64,

    /// Vertical distance within which token centers chain into one row
    #[arg(long, default_value = "15.0")]
    row_eps: f64,
}

fn run(args: &Args) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let input: DocumentInput = serde_json::from_str(&data)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    let params = StructureParams {
        table_score_floor: args.table_score_floor,
        other_score_floor: args.other_score_floor,
        row_cluster_eps: args.row_eps,
        ..StructureParams::default()
    };
    let pipeline = Pipeline::new(params);

    let value = if args.layout_only {
        let tokens = input
            .tokens
            .as_deref()
            .ok_or(StructError::MissingInput("tokens"))?;
        serde_json::to_value(pipeline.structure(tokens, &input.detections))?
    } else {
        serde_json::to_value(pipeline.process(input, &NoopCorrector)?)?
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };

    match &args.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            writeln!(writer, "{rendered}")?;
        }
        None => {
            writeln!(io::stdout(), "{rendered}")?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();

    run(&args)
}
