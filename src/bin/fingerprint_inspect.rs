//! Fingerprint Inspect Binary
//!
//! Loads a JSON document into the in-memory host, fingerprints it and
//! prints the digest, optionally followed by the identity graph.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `FINGERPRINT_WIDTH`: "64" or "32" (default: 64)
//! - `FINGERPRINT_SEED`: accumulator seed (default: 0)
//! - `FINGERPRINT_INCLUDE_ID`: fold object identities, "true"/"false" (default: true)
//! - `RUST_LOG`: Log level filter (default: fingerprint_kernel=info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! fingerprint_inspect state.json --graph text
//! cat state.json | LOG_FORMAT=pretty fingerprint_inspect --graph json
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use fingerprint_kernel::{
    fingerprint, FingerprintOptions, HashWidth, InMemoryHost, TraversalMode,
    FINGERPRINT_SCHEMA_VERSION,
};

/// Initialize the tracing subscriber with JSON or pretty format.
///
/// Logs go to stderr; stdout carries only the digest and graph.
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fingerprint_kernel=info,fingerprint_inspect=info".into());

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .init();
    }
}

/// Identity graph output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GraphFormat {
    /// Compact arrow-joined text.
    Text,
    /// Nested JSON with `obj_id`, `obj_type` and `children`.
    Json,
}

/// Fingerprint a JSON document and optionally print its identity graph
#[derive(Parser, Debug)]
#[command(name = "fingerprint_inspect", version, about, long_about = None)]
struct Args {
    /// JSON document to load ("-" or omitted reads stdin)
    path: Option<PathBuf>,

    /// Also print the identity graph (default format: text)
    #[arg(long, value_enum, num_args = 0..=1, default_missing_value = "text")]
    graph: Option<GraphFormat>,
}

impl Args {
    /// File to read, or `None` for stdin.
    fn input_path(&self) -> Option<&Path> {
        self.path.as_deref().filter(|p| *p != Path::new("-"))
    }
}

/// Build options from the environment, warning on unparseable values.
fn options_from_env() -> FingerprintOptions {
    let mut options = FingerprintOptions::default();

    if let Ok(raw) = std::env::var("FINGERPRINT_WIDTH") {
        match raw.parse::<HashWidth>() {
            Ok(width) => options.hash_width = width,
            Err(e) => warn!(error = %e, "FINGERPRINT_WIDTH not recognized, using 64"),
        }
    }

    if let Ok(raw) = std::env::var("FINGERPRINT_SEED") {
        match raw.parse() {
            Ok(seed) => options.seed = seed,
            Err(_) => warn!(value = %raw, "FINGERPRINT_SEED is not a u64, using 0"),
        }
    }

    if let Ok(raw) = std::env::var("FINGERPRINT_INCLUDE_ID") {
        match raw.parse() {
            Ok(include) => options.include_identity = include,
            Err(_) => warn!(value = %raw, "FINGERPRINT_INCLUDE_ID is not a bool, using true"),
        }
    }

    options
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing();

    let mut options = options_from_env();
    if args.graph.is_some() {
        options.mode = TraversalMode::Both;
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        schema = FINGERPRINT_SCHEMA_VERSION,
        options_hash = %options.options_hash()?,
        "Starting fingerprint inspection"
    );

    let mut input = String::new();
    match args.input_path() {
        Some(path) => input = std::fs::read_to_string(path)?,
        None => {
            std::io::stdin().read_to_string(&mut input)?;
        }
    }
    let document: serde_json::Value = serde_json::from_str(&input)?;

    let mut host = InMemoryHost::new();
    let root = host.load_json(&document);
    info!(objects = host.num_objects(), root = %root, "Document loaded");

    let report = fingerprint(&host, root, &options)?;

    if let Some(digest) = report.digest {
        println!("{}", digest);
    }
    if let (Some(format), Some(graph)) = (args.graph, report.graph.as_ref()) {
        match format {
            GraphFormat::Text => println!("{}", graph.to_text()),
            GraphFormat::Json => println!("{}", graph.to_json()?),
        }
    }

    info!(
        objects_visited = report.stats.objects_visited,
        shared_hits = report.stats.shared_hits,
        max_stack = report.stats.max_stack,
        bytes_folded = report.stats.bytes_folded,
        "Inspection complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_and_graph() {
        let args = Args::try_parse_from(["fingerprint_inspect", "state.json", "--graph", "json"]).unwrap();
        assert_eq!(args.input_path(), Some(Path::new("state.json")));
        assert_eq!(args.graph, Some(GraphFormat::Json));
    }

    #[test]
    fn test_graph_defaults_to_text() {
        let args = Args::try_parse_from(["fingerprint_inspect", "--graph"]).unwrap();
        assert!(args.input_path().is_none());
        assert_eq!(args.graph, Some(GraphFormat::Text));
    }

    #[test]
    fn test_dash_reads_stdin() {
        let args = Args::try_parse_from(["fingerprint_inspect", "-"]).unwrap();
        assert!(args.input_path().is_none());
        assert!(args.graph.is_none());
    }

    #[test]
    fn test_rejects_unknown_input() {
        assert!(Args::try_parse_from(["fingerprint_inspect", "--verbose"]).is_err());
        assert!(Args::try_parse_from(["fingerprint_inspect", "--graph", "yaml"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
