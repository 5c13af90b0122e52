// ⚙️ Configuration - deploy-time constants with environment overrides

use crate::fetcher::{DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT};
use crate::mapper::MapOptions;
use crate::rules::{RiskRuleEngine, RuleSet};
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str = "https://www.ndiscommission.gov.au/about-us/compliance-and-enforcement/compliance-actions/search/export";
pub const DEFAULT_OUT_DIR: &str = "public";
pub const DEFAULT_SIGNALS_FILE: &str = "signals.json";
pub const DEFAULT_META_FILE: &str = "meta.json";

// ============================================================================
// RULE SOURCE
// ============================================================================

/// Where the classifier rules come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesSource {
    BuiltIn(RuleSet),
    File(PathBuf),
}

impl RulesSource {
    /// `standard`, `extended`, or a path to a JSON rules file
    pub fn parse(value: &str) -> Self {
        match RuleSet::from_name(value) {
            Some(set) => RulesSource::BuiltIn(set),
            None => RulesSource::File(PathBuf::from(value.trim())),
        }
    }

    pub fn load(&self) -> Result<RiskRuleEngine> {
        match self {
            RulesSource::BuiltIn(set) => Ok(RiskRuleEngine::with_rule_set(*set)),
            RulesSource::File(path) => RiskRuleEngine::from_file(path),
        }
    }
}

// ============================================================================
// PIPELINE CONFIG
// ============================================================================

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source_url: String,
    pub out_dir: PathBuf,
    pub signals_file: String,
    pub meta_file: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub max_redirects: usize,
    pub rules: RulesSource,
    pub keep_incomplete: bool,
    pub max_records: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            signals_file: DEFAULT_SIGNALS_FILE.to_string(),
            meta_file: DEFAULT_META_FILE.to_string(),
            // Some upstream servers reject requests without a browser-like agent
            user_agent: format!(
                "Mozilla/5.0 (compatible; signals-ingest/{})",
                env!("CARGO_PKG_VERSION")
            ),
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            rules: RulesSource::BuiltIn(RuleSet::Standard),
            keep_incomplete: false,
            max_records: None,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `SIGNALS_*` variables from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `SIGNALS_*` key
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = PipelineConfig::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SIGNALS_SOURCE_URL") {
            config.source_url = v.trim().to_string();
        }
        if let Some(v) = get("SIGNALS_OUT_DIR") {
            config.out_dir = PathBuf::from(v);
        }
        if let Some(v) = get("SIGNALS_FILE") {
            config.signals_file = v;
        }
        if let Some(v) = get("SIGNALS_META_FILE") {
            config.meta_file = v;
        }
        if let Some(v) = get("SIGNALS_USER_AGENT") {
            config.user_agent = v;
        }
        if let Some(v) = get("SIGNALS_TIMEOUT_SECS") {
            let secs: u64 = v
                .trim()
                .parse()
                .with_context(|| format!("SIGNALS_TIMEOUT_SECS is not a number: {v:?}"))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(v) = get("SIGNALS_MAX_REDIRECTS") {
            config.max_redirects = v
                .trim()
                .parse()
                .with_context(|| format!("SIGNALS_MAX_REDIRECTS is not a number: {v:?}"))?;
        }
        if let Some(v) = get("SIGNALS_RULES") {
            config.rules = RulesSource::parse(&v);
        }
        if let Some(v) = get("SIGNALS_KEEP_INCOMPLETE") {
            config.keep_incomplete = parse_bool(&v)
                .ok_or_else(|| anyhow!("SIGNALS_KEEP_INCOMPLETE is not a boolean: {v:?}"))?;
        }
        if let Some(v) = get("SIGNALS_MAX_RECORDS") {
            let max: usize = v
                .trim()
                .parse()
                .with_context(|| format!("SIGNALS_MAX_RECORDS is not a number: {v:?}"))?;
            config.max_records = Some(max);
        }

        Ok(config)
    }

    pub fn signals_path(&self) -> PathBuf {
        self.out_dir.join(&self.signals_file)
    }

    pub fn meta_path(&self) -> PathBuf {
        self.out_dir.join(&self.meta_file)
    }

    pub fn map_options(&self) -> MapOptions {
        MapOptions {
            keep_incomplete: self.keep_incomplete,
            max_records: self.max_records,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================
