// 🚚 Pipeline - fetch → parse → map → write, once per invocation
//
// A run that cannot refresh the data keeps the last good signals file and
// marks meta STALE. Only filesystem failures come back as errors.

use crate::config::PipelineConfig;
use crate::fetcher::{FetchOutcome, Fetcher};
use crate::mapper::map_rows_with_stats;
use crate::parser::parse_csv;
use crate::rules::RiskRuleEngine;
use crate::writer::{ensure_dir, write_signals, write_status, StatusRecord};
use anyhow::Result;
use chrono::Utc;
use std::fmt;
use tracing::{info, warn};

pub const NOTE_NO_ROWS: &str = "no rows parsed";

// ============================================================================
// SOURCE SEAM
// ============================================================================

/// Anything that can hand back the register text for a URL
pub trait Source {
    fn fetch(&self, url: &str) -> FetchOutcome;
}

impl Source for Fetcher {
    fn fetch(&self, url: &str) -> FetchOutcome {
        Fetcher::fetch(self, url)
    }
}

// ============================================================================
// RUN OUTCOME
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Updated { records: usize },
    SourceUnavailable { reason: String },
    NoRowsParsed,
}

impl RunOutcome {
    pub fn is_stale(&self) -> bool {
        !matches!(self, RunOutcome::Updated { .. })
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Updated { records } => write!(f, "fetched and updated {records} records"),
            RunOutcome::SourceUnavailable { reason } => {
                write!(f, "kept existing data - source unavailable ({reason})")
            }
            RunOutcome::NoRowsParsed => write!(f, "kept existing data - {NOTE_NO_ROWS}"),
        }
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Build the HTTP fetcher and rules from config, then run once
pub fn run(config: &PipelineConfig) -> Result<RunOutcome> {
    let rules = config.rules.load()?;
    let fetcher = Fetcher::new(&config.user_agent, config.timeout, config.max_redirects)?;
    run_with_source(config, &fetcher, &rules)
}

pub fn run_with_source(
    config: &PipelineConfig,
    source: &dyn Source,
    rules: &RiskRuleEngine,
) -> Result<RunOutcome> {
    ensure_dir(&config.out_dir)?;

    let outcome = match source.fetch(&config.source_url) {
        FetchOutcome::Unavailable(reason) => RunOutcome::SourceUnavailable { reason },
        FetchOutcome::Body(body) if body.looks_like_html() => RunOutcome::SourceUnavailable {
            reason: format!("received HTML instead of CSV from {}", body.final_url),
        },
        FetchOutcome::Body(body) => {
            let rows = parse_csv(&body.text);
            let (signals, stats) = map_rows_with_stats(&rows, rules, &config.map_options());
            info!(
                rows = stats.considered,
                signals = stats.kept,
                dropped = stats.dropped,
                "mapped register"
            );

            if signals.is_empty() {
                RunOutcome::NoRowsParsed
            } else {
                let signals_path = config.signals_path();
                let digest = write_signals(&signals_path, &signals)?;
                info!(path = %signals_path.display(), records = signals.len(), "signals updated");

                let record = StatusRecord::ok(Utc::now(), signals.len(), digest)
                    .with_source(config.source_url.as_str());
                write_status(&config.meta_path(), &record)?;
                return Ok(RunOutcome::Updated {
                    records: signals.len(),
                });
            }
        }
    };

    let note = match &outcome {
        RunOutcome::SourceUnavailable { reason } => format!("source unavailable: {reason}"),
        _ => NOTE_NO_ROWS.to_string(),
    };
    warn!(%note, "keeping existing signals");

    let record = StatusRecord::stale(Utc::now(), note).with_source(config.source_url.as_str());
    write_status(&config.meta_path(), &record)?;
    Ok(outcome)
}

// ============================================================================
// TESTS
// ============================================================================
