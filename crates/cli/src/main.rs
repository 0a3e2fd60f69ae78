mod echo;

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use harvest_core::{Document, FetchConfig, HarvestConfig, Harvester, fetch_file, fetch_stdin, fetch_url};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::echo::{
    format_size, print_banner, print_count, print_info, print_skipped, print_step, print_success, print_timing,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Which extraction to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Entities,
    Raw,
    Meta,
    All,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "entities" | "entity" => Ok(Self::Entities),
            "raw" => Ok(Self::Raw),
            "meta" => Ok(Self::Meta),
            "all" => Ok(Self::All),
            _ => Err(format!("Invalid mode: {}. Valid options: entities, raw, meta, all", s)),
        }
    }
}

/// Extract JSON-LD, Microdata and meta tag structured data from web pages
#[derive(Parser, Debug)]
#[command(name = "harvest")]
#[command(author = "Harvest Contributors")]
#[command(version)]
#[command(about = "Extract structured data from web pages", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// What to extract (entities, raw, meta, all)
    #[arg(short, long, default_value = "entities", value_name = "MODE")]
    mode: Mode,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Shorten Microdata itemtype URLs to their last segment
    #[arg(long)]
    short_types: bool,

    /// Keep relative Microdata URLs as written
    #[arg(long)]
    no_resolve_urls: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Install the tracing subscriber; `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "warn,harvest=debug,harvest_core=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Reads the input and returns its HTML plus the URL it came from, if any.
async fn read_input(args: &Args) -> anyhow::Result<(String, Option<Url>)> {
    if args.input == "-" {
        if args.verbose {
            print_step(1, 3, "Reading from stdin");
        }
        let html = fetch_stdin().context("Failed to read from stdin")?;
        Ok((html, None))
    } else if args.input.starts_with("http://") || args.input.starts_with("https://") {
        if args.verbose {
            print_step(
                1,
                3,
                &format!("Fetching from {}", args.input.bright_white().underline()),
            );
        }

        let mut config = FetchConfig::default().with_timeout(args.timeout);
        if let Some(user_agent) = &args.user_agent {
            config.user_agent = user_agent.clone();
        }

        let url = Url::parse(&args.input).with_context(|| format!("Invalid URL: {}", args.input))?;
        let html = fetch_url(&args.input, &config).await.context("Failed to fetch URL")?;
        Ok((html, Some(url)))
    } else {
        if args.verbose {
            print_step(1, 3, &format!("Reading from file {}", args.input.bright_white()));
        }
        let html = fetch_file(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?;
        Ok((html, None))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    let (html, url) = read_input(&args).await?;

    if args.verbose {
        eprintln!("  {} {}", "Size:".dimmed(), format_size(html.len()).bright_white());
        eprintln!();
        print_step(2, 3, &format!("Extracting {:?}", args.mode).to_lowercase());
    }

    let doc = match url {
        Some(url) => Document::parse_with_url(&html, url),
        None => Document::parse(&html),
    }
    .context("Failed to parse HTML")?;

    let config = HarvestConfig::builder()
        .short_type_names(args.short_types)
        .resolve_urls(!args.no_resolve_urls)
        .build();
    let harvester = Harvester::with_config(config);
    tracing::debug!(mode = ?args.mode, extractors = ?harvester.extractor_names(), "Starting extraction");

    let started = Instant::now();
    let (value, skipped) = match args.mode {
        Mode::Entities => {
            let report = harvester.extract_entities_report(&doc);
            (serde_json::to_value(&report.items)?, report.skipped)
        }
        Mode::Raw => {
            let report = harvester.extract_raw_report(&doc);
            (serde_json::to_value(&report.items)?, report.skipped)
        }
        Mode::Meta => (serde_json::to_value(harvester.extract_meta(&doc))?, Vec::new()),
        Mode::All => {
            let harvest = harvester.harvest(&doc);
            let skipped = harvest.skipped.clone();
            (serde_json::to_value(&harvest)?, skipped)
        }
    };

    if args.verbose {
        print_timing("Extraction", started.elapsed());
        let count = match &value {
            serde_json::Value::Array(items) => items.len(),
            serde_json::Value::Object(map) if args.mode == Mode::Meta => map.len(),
            serde_json::Value::Object(map) => map.get("entities").and_then(|e| e.as_array()).map_or(0, Vec::len),
            _ => 0,
        };
        print_count("Results", count);
        print_count("Skipped", skipped.len());
        print_skipped(&skipped);
        eprintln!();
        print_step(3, 3, "Writing output");
    }

    let mut output = if args.pretty { serde_json::to_string_pretty(&value)? } else { serde_json::to_string(&value)? };
    output.push('\n');

    match args.output {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            print!("{}", output);
        }
    }

    Ok(())
}
