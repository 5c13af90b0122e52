// 🏷️ Risk Rules - Rules as Data
// Keyword rules that turn a free-text action type into a risk level

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

// ============================================================================
// RISK LEVEL
// ============================================================================

/// Ordinal risk level attached to every Signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Med,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Med => "MED",
            RiskLevel::Low => "LOW",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskRule {
    /// Rule ID for tracking
    pub id: String,

    /// Substrings that trigger the rule (case-insensitive, any one matches)
    pub keywords: Vec<String>,

    /// Level assigned when the rule fires
    pub level: RiskLevel,

    /// Priority (higher = applied first)
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    0
}

impl RiskRule {
    pub fn new(id: &str, level: RiskLevel, priority: i32, keywords: &[&str]) -> Self {
        RiskRule {
            id: id.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            level,
            priority,
        }
    }

    /// Check if any keyword occurs in the given text
    pub fn matches(&self, text: &str) -> bool {
        let text_lower = text.to_lowercase();
        self.keywords
            .iter()
            .map(|k| k.to_lowercase())
            .any(|k| !k.is_empty() && text_lower.contains(&k))
    }
}

// ============================================================================
// RULE SETS
// ============================================================================

/// Named built-in rule sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSet {
    /// banning/revocation → HIGH, compliance/notice → MED
    Standard,
    /// Standard plus the wider enforcement vocabulary
    Extended,
}

impl RuleSet {
    pub fn name(&self) -> &str {
        match self {
            RuleSet::Standard => "standard",
            RuleSet::Extended => "extended",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "standard" => Some(RuleSet::Standard),
            "extended" => Some(RuleSet::Extended),
            _ => None,
        }
    }

    pub fn rules(&self) -> Vec<RiskRule> {
        match self {
            RuleSet::Standard => vec![
                RiskRule::new("high", RiskLevel::High, 20, &["banning", "revocation"]),
                RiskRule::new("med", RiskLevel::Med, 10, &["compliance", "notice"]),
            ],
            RuleSet::Extended => vec![
                RiskRule::new(
                    "high",
                    RiskLevel::High,
                    20,
                    &[
                        "banning",
                        "revocation",
                        "cancel",
                        "prohibition",
                        "injunction",
                        "civil penalty",
                    ],
                ),
                RiskRule::new(
                    "med",
                    RiskLevel::Med,
                    10,
                    &[
                        "compliance",
                        "notice",
                        "enforceable undertaking",
                        "direction",
                    ],
                ),
            ],
        }
    }
}

// ============================================================================
// RULE ENGINE
// ============================================================================

#[derive(Debug, Clone)]
pub struct RiskRuleEngine {
    rules: Vec<RiskRule>,
}

impl RiskRuleEngine {
    /// Create a new empty rule engine (everything classifies as LOW)
    pub fn new() -> Self {
        RiskRuleEngine { rules: Vec::new() }
    }

    pub fn with_rule_set(set: RuleSet) -> Self {
        RiskRuleEngine::from_rules(set.rules())
    }

    /// Load rules from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read rules file: {:?}", path.as_ref()))?;

        let rules: Vec<RiskRule> =
            serde_json::from_str(&content).context("Failed to parse rules JSON")?;

        Ok(RiskRuleEngine::from_rules(rules))
    }

    /// Create engine from a list of rules
    pub fn from_rules(mut rules: Vec<RiskRule>) -> Self {
        // Stable sort keeps declaration order among equal priorities
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        RiskRuleEngine { rules }
    }

    /// Add a single rule
    pub fn add_rule(&mut self, rule: RiskRule) {
        self.rules.push(rule);
        self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// First matching rule wins; no match is LOW
    pub fn classify(&self, action_type: &str) -> RiskLevel {
        self.rules
            .iter()
            .find(|rule| rule.matches(action_type))
            .map(|rule| rule.level)
            .unwrap_or(RiskLevel::Low)
    }

    /// Get number of rules loaded
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for RiskRuleEngine {
    fn default() -> Self {
        RiskRuleEngine::with_rule_set(RuleSet::Standard)
    }
}

/// Classify with the standard rule set
pub fn risk_from_action(action_type: &str) -> RiskLevel {
    RiskRuleEngine::default().classify(action_type)
}

// ============================================================================
// TESTS
// ============================================================================
