//! CLI entry point for dialogue_convert.
//!
//! Usage:
//!   dialogue_convert convert Abigail.json --expand-all --out abigail_de.json
//!   dialogue_convert add-line --doc abigail_de.json --tier 4 --line "Rainy again." --cond weather=Rainy
//!   dialogue_convert event --cycle 2 --id 9001 --script "..." --cond flag=mail=ccBoard

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dialogue_convert::config::{DEFAULT_CONFIG_FILE, load_config};
use dialogue_convert::{
    Condition, ConvertOptions, DialogueDocument, EventDocument, SourceDocument, add_event, add_line, convert_source,
    to_pretty_json,
};
use dialogue_data::{MAX_TIER, validate_document};
use log::{info, warn};

#[derive(Parser)]
#[command(author, version, about = "Convert game dialogue into Dialogue Expander JSON.")]
struct Cli {
    /// Converter config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a game dialogue file or a content-patch file.
    Convert(ConvertArgs),
    /// Add one line to a Dialogue Expander document.
    AddLine(AddLineArgs),
    /// Add one event to an event document.
    Event(EventArgs),
}

#[derive(Args)]
struct ConvertArgs {
    /// Source file (game file or content-patch file).
    file: PathBuf,
    /// Copy date, event and gift entries into every tier.
    #[arg(long)]
    expand_all: bool,
    /// Write the result here instead of printing it.
    #[arg(long, conflicts_with = "download")]
    out: Option<PathBuf>,
    /// Write the result under the configured output name in the current directory.
    #[arg(long)]
    download: bool,
}

#[derive(Args)]
struct AddLineArgs {
    /// Existing document to add to; starts from an empty one if omitted.
    #[arg(long)]
    doc: Option<PathBuf>,
    /// Affection tier of the line.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_TIER)))]
    tier: u8,
    /// Line text.
    #[arg(long, default_value = "")]
    line: String,
    /// Condition as kind=value (repeatable), e.g. `weather=Rainy` or `flag=mail=ccBoard`.
    #[arg(long = "cond")]
    conditions: Vec<Condition>,
    /// Write the result here instead of printing it.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct EventArgs {
    /// Existing event document to add to.
    #[arg(long)]
    doc: Option<PathBuf>,
    /// Event cycle (the affection tier the event belongs to).
    #[arg(long)]
    cycle: String,
    /// Event id.
    #[arg(long)]
    id: String,
    /// Event script.
    #[arg(long)]
    script: String,
    /// Condition as kind=value (repeatable).
    #[arg(long = "cond")]
    conditions: Vec<Condition>,
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Convert(args) => run_convert(&cli.config, args),
        Commands::AddLine(args) => run_add_line(args),
        Commands::Event(args) => run_event(args),
    }
}

fn run_convert(config_path: &Path, args: ConvertArgs) -> Result<()> {
    let config = load_config(config_path);
    let options = ConvertOptions {
        expand_all: args.expand_all || config.expand_all,
    };
    let text = fs::read_to_string(&args.file).with_context(|| format!("reading '{}'", args.file.display()))?;
    let source = SourceDocument::parse(&text).with_context(|| format!("parsing '{}'", args.file.display()))?;
    let doc = convert_source(&source, &options);
    info!("'{}': {} lines converted", args.file.display(), doc.line_count());

    if config.validate {
        for problem in validate_document(&doc) {
            warn!("validation: {problem}");
        }
    }

    let out = match (args.out, args.download) {
        (Some(path), _) => Some(path),
        (None, true) => Some(PathBuf::from(&config.output_name)),
        (None, false) => None,
    };
    emit(&to_pretty_json(&doc)?, out.as_deref())
}

fn run_add_line(args: AddLineArgs) -> Result<()> {
    let doc: DialogueDocument = match &args.doc {
        Some(path) => read_json(path)?,
        None => DialogueDocument::default(),
    };
    let doc = add_line(&doc, args.tier, &args.line, &args.conditions);
    emit(&to_pretty_json(&doc)?, args.out.as_deref())
}

fn run_event(args: EventArgs) -> Result<()> {
    let doc: EventDocument = match &args.doc {
        Some(path) => read_json(path)?,
        None => EventDocument::default(),
    };
    let doc = add_event(&doc, &args.cycle, &args.id, &args.script, &args.conditions);
    emit(&to_pretty_json(&doc)?, args.out.as_deref())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing '{}'", path.display()))
}

fn emit(json: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing '{}'", path.display()))?;
            info!("wrote '{}'", path.display());
        },
        None => println!("{json}"),
    }
    Ok(())
}
