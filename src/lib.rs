// Signals Ingest - Core Library
// Exposes the pipeline stages for the CLI and tests

pub mod config;
pub mod fetcher;
pub mod mapper;
pub mod parser;
pub mod pipeline;
pub mod rules;
pub mod writer;

// Re-export commonly used types
pub use config::{PipelineConfig, RulesSource};
pub use fetcher::{FetchOutcome, FetchedBody, Fetcher};
pub use mapper::{map_row, map_rows, map_rows_with_stats, MapOptions, MapStats, Signal};
pub use parser::{parse_csv, RawRow};
pub use pipeline::{run, run_with_source, RunOutcome, Source};
pub use rules::{risk_from_action, RiskLevel, RiskRule, RiskRuleEngine, RuleSet};
pub use writer::{Status, StatusRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
