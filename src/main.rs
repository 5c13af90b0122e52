use anyhow::Result;
use std::env;
use tracing_subscriber::EnvFilter;

use signals_ingest::{pipeline, PipelineConfig};

const USAGE: &str = "\
signals-ingest - refresh signals.json from the enforcement register

USAGE:
    signals-ingest                  fetch, map and write once
    signals-ingest classify <text>  print the risk level for an action type
    signals-ingest --help

ENVIRONMENT:
    SIGNALS_SOURCE_URL       register CSV url
    SIGNALS_OUT_DIR          output directory (default: public)
    SIGNALS_FILE             signals file name (default: signals.json)
    SIGNALS_META_FILE        status file name (default: meta.json)
    SIGNALS_USER_AGENT       User-Agent header
    SIGNALS_TIMEOUT_SECS     request timeout (default: 30)
    SIGNALS_MAX_REDIRECTS    redirect hops to follow (default: 5)
    SIGNALS_RULES            standard | extended | path to rules JSON
    SIGNALS_KEEP_INCOMPLETE  keep rows missing name or type (default: false)
    SIGNALS_MAX_RECORDS      cap on written signals
    RUST_LOG                 log filter (default: info)";

fn main() {
    // Logs go to stderr; stdout carries only the run summary
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dispatch() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn dispatch() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        None => run_ingest(),
        Some("classify") => run_classify(&args[2..]),
        Some("-h") | Some("--help") => {
            println!("{USAGE}");
            Ok(())
        }
        Some(other) => anyhow::bail!("unknown argument: {other}\n\n{USAGE}"),
    }
}

fn run_ingest() -> Result<()> {
    let config = PipelineConfig::from_env()?;
    tracing::info!(
        version = signals_ingest::VERSION,
        url = %config.source_url,
        out_dir = %config.out_dir.display(),
        "starting ingest"
    );

    // Stale outcomes are expected for a scheduled job and exit 0
    let outcome = pipeline::run(&config)?;
    println!("{outcome}");
    Ok(())
}

fn run_classify(words: &[String]) -> Result<()> {
    let config = PipelineConfig::from_env()?;
    let rules = config.rules.load()?;
    println!("{}", rules.classify(&words.join(" ")));
    Ok(())
}
