mod document;
mod flags;

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use pubint_canonical_page::join_contiguous_rules;
use pubint_page_range::{
    covered_page_count, document_page_range_to_canonical_range_string, format_spans, merge_spans,
    parse_page_range, try_document_page_range_to_canonical_range_string, validate_page_range,
    Mention, PageNumber, RangeConfig, RangeFormatter,
};
use serde::Deserialize;

pub use document::{load_labels, DocumentConfig};

use crate::flags::{PagesFormatFlag, SpanPolicyFlag};

#[derive(Parser)]
#[command(
    name = "pubint-pages",
    about = "Page-range formatting and canonical page numbering for book indexes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge page mentions into a formatted range string
    Format(FormatArgs),

    /// Rewrite a document range string in canonical page labels
    Canonical(CanonicalArgs),

    /// Expand a range string into its sorted page list (JSON)
    Expand(ExpandArgs),

    /// Check a range string and report the first problem
    Validate(ValidateArgs),

    /// Compute canonical pages for a document layout
    Pages(PagesArgs),

    /// Join adjacent rules that continue the same numbering (JSON)
    JoinRules(JoinRulesArgs),
}

#[derive(Args)]
struct FormatArgs {
    /// Mentions as inline JSON
    #[arg(long, conflicts_with = "file")]
    json: Option<String>,

    /// Path to a JSON file with mentions
    #[arg(long)]
    file: Option<PathBuf>,

    /// How inverted spans (end before start) are handled
    #[arg(long, value_enum, default_value_t)]
    policy: SpanPolicyFlag,
}

#[derive(Args)]
struct CanonicalArgs {
    /// Document range string, e.g. "1-3, 7"
    range: String,

    /// JSON object mapping document pages to labels
    #[arg(long, conflicts_with = "document")]
    labels: Option<PathBuf>,

    /// TOML document layout to compute labels from
    #[arg(long)]
    document: Option<PathBuf>,

    /// Fail instead of echoing the input when the range cannot be parsed
    #[arg(long)]
    strict: bool,
}

#[derive(Args)]
struct ExpandArgs {
    range: String,
}

#[derive(Args)]
struct ValidateArgs {
    range: String,

    /// Highest page the document has
    #[arg(long)]
    max_page: Option<PageNumber>,
}

#[derive(Args)]
struct PagesArgs {
    /// TOML document layout
    #[arg(long)]
    document: PathBuf,

    #[arg(long, value_enum, default_value_t)]
    format: PagesFormatFlag,
}

#[derive(Args)]
struct JoinRulesArgs {
    /// TOML document layout
    #[arg(long)]
    document: PathBuf,
}

/// A bare mention array or `{ "mentions": [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum MentionsPayload {
    List(Vec<Mention>),
    Named { mentions: Vec<Mention> },
}

impl MentionsPayload {
    fn into_mentions(self) -> Vec<Mention> {
        match self {
            MentionsPayload::List(mentions) | MentionsPayload::Named { mentions } => mentions,
        }
    }
}

pub fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Format(args) => run_format(args),
        Commands::Canonical(args) => run_canonical(args),
        Commands::Expand(args) => run_expand(&args),
        Commands::Validate(args) => run_validate(&args),
        Commands::Pages(args) => run_pages(&args),
        Commands::JoinRules(args) => run_join_rules(&args),
    }
}

fn run_format(args: FormatArgs) -> Result<()> {
    let payload = read_payload(args.json, args.file)?;
    let mentions = serde_json::from_str::<MentionsPayload>(&payload)
        .context("Mentions must be a JSON array or an object with a `mentions` array")?
        .into_mentions();

    let config = RangeConfig {
        span_policy: args.policy.as_domain(),
        ..RangeConfig::default()
    };
    log::debug!(
        "Formatting {} mentions with {} span policy",
        mentions.len(),
        config.span_policy.as_str()
    );

    let formatter = RangeFormatter::try_new(config)?;
    let spans = merge_spans(formatter.normalize(&mentions)?);
    log::debug!(
        "Merged into {} spans covering {} pages",
        spans.len(),
        covered_page_count(&spans)
    );
    print_stdout(&format_spans(&spans));
    Ok(())
}

fn run_canonical(args: CanonicalArgs) -> Result<()> {
    let labels: BTreeMap<PageNumber, String> = match (&args.labels, &args.document) {
        (Some(path), _) => load_labels(path)?,
        (None, Some(path)) => DocumentConfig::load(path)?.compute()?.labels(),
        (None, None) => {
            log::warn!("No --labels or --document given; pages keep their document numbers");
            BTreeMap::new()
        }
    };

    let rendered = if args.strict {
        try_document_page_range_to_canonical_range_string(&args.range, &labels)
            .with_context(|| format!("Cannot convert range '{}'", args.range))?
    } else {
        document_page_range_to_canonical_range_string(&args.range, &labels)
    };
    print_stdout(&rendered);
    Ok(())
}

fn run_expand(args: &ExpandArgs) -> Result<()> {
    let pages = parse_page_range(&args.range)?;
    print_stdout(&serde_json::to_string(&pages)?);
    Ok(())
}

fn run_validate(args: &ValidateArgs) -> Result<()> {
    validate_page_range(&args.range, args.max_page)?;
    print_stdout("ok");
    Ok(())
}

fn run_pages(args: &PagesArgs) -> Result<()> {
    let document = DocumentConfig::load(&args.document)?;
    let pages = document.compute()?;
    log::debug!("Rendering canonical pages as {}", args.format.as_str());

    let output = match args.format {
        PagesFormatFlag::Display => pages.display(),
        PagesFormatFlag::Json => serde_json::to_string_pretty(pages.pages())?,
        PagesFormatFlag::Stats => serde_json::to_string_pretty(&pages.statistics())?,
        PagesFormatFlag::Segments => serde_json::to_string_pretty(&pages.segments(&document.rules))?,
    };
    print_stdout(&output);
    Ok(())
}

fn run_join_rules(args: &JoinRulesArgs) -> Result<()> {
    let document = DocumentConfig::load(&args.document)?;
    let before = document.rules.len();
    let joined = join_contiguous_rules(document.rules);
    log::info!("Joined {} rules into {}", before, joined.len());
    print_stdout(&serde_json::to_string_pretty(&joined)?);
    Ok(())
}

fn read_payload(json: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(json) = json {
        return Ok(json);
    }

    if let Some(path) = file {
        return fs::read_to_string(&path)
            .with_context(|| format!("Failed to read mentions from {}", path.display()));
    }

    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read mentions from stdin")?;
    if buf.trim().is_empty() {
        bail!("Provide mentions via --json, --file, or stdin");
    }
    Ok(buf)
}

fn print_stdout(text: &str) {
    let mut stdout = io::stdout().lock();
    if let Err(err) = writeln!(stdout, "{text}").and_then(|()| stdout.flush()) {
        if err.kind() != io::ErrorKind::BrokenPipe {
            log::warn!("Failed to write output: {err}");
        }
    }
}
