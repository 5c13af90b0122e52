// 🔁 Row Mapper - RawRow → Signal
// Column selection with fallbacks, trimming, and the data-quality gate

use crate::parser::RawRow;
use crate::rules::{RiskLevel, RiskRuleEngine};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// COLUMN ALIASES
// ============================================================================

// First non-empty column wins. Register exports have renamed columns over time.
pub const TYPE_COLUMNS: &[&str] = &[
    "Action type",
    "Type",
    "Compliance action",
    "Compliance Action",
    "Action",
];
pub const NAME_COLUMNS: &[&str] = &[
    "Provider name",
    "Individual name",
    "Name",
    "Provider",
    "Registered provider",
    "Entity",
];
pub const STATE_COLUMNS: &[&str] = &["State", "Jurisdiction"];
pub const EFFECTIVE_COLUMNS: &[&str] = &[
    "Effective date",
    "Effective",
    "Start date",
    "Commencement date",
    "Date effective",
];
pub const END_COLUMNS: &[&str] = &["End date", "End", "Expiry date", "Cease date"];

// ============================================================================
// SIGNAL
// ============================================================================

/// Signal - normalized enforcement-action record read by the website
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub risk: RiskLevel,
    #[serde(rename = "type")]
    pub action_type: String,
    pub name: String,
    pub state: String,
    pub effective: String,
    pub end: String,
}

impl Signal {
    /// Rows without a name or a type are noise from header drift
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.action_type.is_empty()
    }
}

// ============================================================================
// MAPPING
// ============================================================================

/// Mapping policy
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    /// Keep rows with empty name or type
    pub keep_incomplete: bool,

    /// Stop after this many signals
    pub max_records: Option<usize>,
}

fn pick(row: &RawRow, columns: &[&str]) -> String {
    columns
        .iter()
        .filter_map(|c| row.get(c))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or("")
        .to_string()
}

pub fn map_row(row: &RawRow, rules: &RiskRuleEngine) -> Signal {
    let action_type = pick(row, TYPE_COLUMNS);

    Signal {
        risk: rules.classify(&action_type),
        name: pick(row, NAME_COLUMNS),
        state: pick(row, STATE_COLUMNS),
        effective: pick(row, EFFECTIVE_COLUMNS),
        end: pick(row, END_COLUMNS),
        action_type,
    }
}

/// Rows mapped, kept and dropped by one `map_rows` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapStats {
    pub considered: usize,
    pub kept: usize,
    /// Rows that failed the completeness gate, whether or not the cap was hit
    pub dropped: usize,
}

/// Map every row, then apply the completeness filter and the record cap
pub fn map_rows(rows: &[RawRow], rules: &RiskRuleEngine, options: &MapOptions) -> Vec<Signal> {
    map_rows_with_stats(rows, rules, options).0
}

pub fn map_rows_with_stats(
    rows: &[RawRow],
    rules: &RiskRuleEngine,
    options: &MapOptions,
) -> (Vec<Signal>, MapStats) {
    let mut stats = MapStats {
        considered: rows.len(),
        ..MapStats::default()
    };

    let mut signals: Vec<Signal> = rows
        .iter()
        .map(|row| map_row(row, rules))
        .filter(|signal| {
            let keep = options.keep_incomplete || signal.is_complete();
            if !keep {
                stats.dropped += 1;
            }
            keep
        })
        .collect();

    if let Some(max) = options.max_records {
        signals.truncate(max);
    }
    stats.kept = signals.len();

    debug!(
        considered = stats.considered,
        kept = stats.kept,
        dropped = stats.dropped,
        "mapped rows to signals"
    );
    (signals, stats)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_csv;
    use crate::rules::RuleSet;

    #[test]
    fn test_documented_example() {
        let rows = parse_csv("Action type,Provider name,State\nBanning Order,Acme Pty Ltd,VIC\n");
        let signals = map_rows(&rows, &RiskRuleEngine::default(), &MapOptions::default());

        assert_eq!(
            signals,
            vec![Signal {
                risk: RiskLevel::High,
                action_type: "Banning Order".to_string(),
                name: "Acme Pty Ltd".to_string(),
                state: "VIC".to_string(),
                effective: String::new(),
                end: String::new(),
            }]
        );
    }

    #[test]
    fn test_individual_name_fallback() {
        let rows = parse_csv(
            "Action type,Provider name,Individual name,State\n\
             Banning Order,,Jane Citizen,NSW\n\
             Compliance Notice,Acme,Ignored Person,VIC\n",
        );
        let signals = map_rows(&rows, &RiskRuleEngine::default(), &MapOptions::default());

        assert_eq!(signals[0].name, "Jane Citizen");
        assert_eq!(signals[1].name, "Acme");
        assert_eq!(signals[1].risk, RiskLevel::Med);
    }

    #[test]
    fn test_all_columns_and_trimming() {
        let rows = parse_csv(
            "Action type,Provider name,State,Effective date,End date\n\
             \x20Revocation , Care Co ,SA, 2026-02-01 ,2026-03-01\n",
        );
        let signal = map_row(&rows[0], &RiskRuleEngine::default());

        assert_eq!(signal.action_type, "Revocation");
        assert_eq!(signal.name, "Care Co");
        assert_eq!(signal.state, "SA");
        assert_eq!(signal.effective, "2026-02-01");
        assert_eq!(signal.end, "2026-03-01");
        assert_eq!(signal.risk, RiskLevel::High);
    }

    #[test]
    fn test_alternate_headers() {
        let rows = parse_csv("Type,Entity,Jurisdiction,Start date,Expiry date\nDirection,Foo Ltd,WA,d1,d2\n");
        let signal = map_row(&rows[0], &RiskRuleEngine::with_rule_set(RuleSet::Extended));

        assert_eq!(signal.action_type, "Direction");
        assert_eq!(signal.name, "Foo Ltd");
        assert_eq!(signal.state, "WA");
        assert_eq!(signal.effective, "d1");
        assert_eq!(signal.end, "d2");
        assert_eq!(signal.risk, RiskLevel::Med);
    }

    #[test]
    fn test_incomplete_rows_dropped_by_default() {
        let rows = parse_csv(
            "Action type,Provider name\n\
             Banning Order,\n\
             ,Acme\n\
             Compliance Notice,Acme\n",
        );
        let engine = RiskRuleEngine::default();

        let strict = map_rows(&rows, &engine, &MapOptions::default());
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].name, "Acme");

        let loose = MapOptions {
            keep_incomplete: true,
            ..MapOptions::default()
        };
        assert_eq!(map_rows(&rows, &engine, &loose).len(), 3);
    }

    #[test]
    fn test_unknown_schema_yields_nothing() {
        let rows = parse_csv("foo,bar\n1,2\n3,4\n");
        let signals = map_rows(&rows, &RiskRuleEngine::default(), &MapOptions::default());
        assert!(signals.is_empty());
    }

    #[test]
    fn test_max_records_cap() {
        let rows = parse_csv("Action type,Provider name\nA,1\nB,2\nC,3\n");
        let options = MapOptions {
            max_records: Some(2),
            ..MapOptions::default()
        };
        let signals = map_rows(&rows, &RiskRuleEngine::default(), &options);
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[1].name, "2");
    }

    #[test]
    fn test_dropped_count_ignores_cap() {
        let rows = parse_csv(
            "Action type,Provider name\n\
             A,1\n\
             B,2\n\
             C,\n\
             ,4\n",
        );
        let options = MapOptions {
            max_records: Some(1),
            ..MapOptions::default()
        };
        let (signals, stats) = map_rows_with_stats(&rows, &RiskRuleEngine::default(), &options);

        assert_eq!(signals.len(), 1);
        assert_eq!(
            stats,
            MapStats {
                considered: 4,
                kept: 1,
                dropped: 2,
            }
        );
    }

    #[test]
    fn test_comma_only_row_kept_when_incomplete_allowed() {
        let rows = parse_csv("Action type,Provider name,State\n,,\nNotice,Acme,VIC\n");
        let engine = RiskRuleEngine::default();

        assert_eq!(map_rows(&rows, &engine, &MapOptions::default()).len(), 1);

        let loose = MapOptions {
            keep_incomplete: true,
            ..MapOptions::default()
        };
        let signals = map_rows(&rows, &engine, &loose);
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].name, "");
        assert_eq!(signals[0].action_type, "");
        assert_eq!(signals[0].state, "");
        assert_eq!(signals[0].risk, RiskLevel::Low);
    }

    #[test]
    fn test_signal_json_shape() {
        let signal = Signal {
            risk: RiskLevel::Low,
            action_type: "Other".to_string(),
            name: "N".to_string(),
            state: "ACT".to_string(),
            effective: "e".to_string(),
            end: String::new(),
        };
        let value = serde_json::to_value(&signal).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "risk": "LOW", "type": "Other", "name": "N",
                "state": "ACT", "effective": "e", "end": ""
            })
        );
    }
}
