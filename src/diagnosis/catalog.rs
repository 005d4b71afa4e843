//! Static class catalog and issue table.
//!
//! The catalog order is the contract between the model's score vector and
//! class names: index position i of the score vector is `CLASSES[i]`. The
//! issue table is the single canonical mapping from fault class to severity,
//! component, and remediation text — initialized once, shared read-only
//! across all requests, never constructed per-request.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::types::{Issue, Severity};

/// Ordered class identifiers. Must match the deployed model's output head.
pub const CLASSES: [&str; 9] = [
    "normal",
    "misfire",
    "valve_clatter",
    "low_oil",
    "knocking",
    "ignition_fault",
    "weak_battery",
    "power_steering",
    "serpentine_belt",
];

/// Index of the "normal" class, the confidence-gate fallback label.
pub const NORMAL_CLASS: &str = "normal";

/// Number of classes the model must emit scores for.
pub const NUM_CLASSES: usize = CLASSES.len();

static ISSUE_MAP: OnceLock<HashMap<&'static str, Issue>> = OnceLock::new();

fn build_issue_map() -> HashMap<&'static str, Issue> {
    let entries = [
        Issue {
            id: "misfire".to_string(),
            severity: Severity::High,
            component: "Combustion System".to_string(),
            description: "Engine misfire detected".to_string(),
            recommendation: "Inspect spark plugs, injectors, and the fuel system".to_string(),
        },
        Issue {
            id: "valve_clatter".to_string(),
            severity: Severity::Medium,
            component: "Valve Train".to_string(),
            description: "Abnormal open-valve clatter".to_string(),
            recommendation: "Check valve clearances and engine mounts".to_string(),
        },
        Issue {
            id: "low_oil".to_string(),
            severity: Severity::Medium,
            component: "Lubrication".to_string(),
            description: "Indication of low or degraded engine oil".to_string(),
            recommendation: "Check the oil level and top up or replace as needed".to_string(),
        },
        Issue {
            id: "knocking".to_string(),
            severity: Severity::High,
            component: "Combustion Chamber".to_string(),
            description: "Engine knocking detected".to_string(),
            recommendation: "Use higher-octane fuel and verify ignition timing".to_string(),
        },
        Issue {
            id: "ignition_fault".to_string(),
            severity: Severity::Medium,
            component: "Ignition".to_string(),
            description: "Ignition system is not performing optimally".to_string(),
            recommendation: "Inspect the ignition coil and spark plugs".to_string(),
        },
    ];

    entries
        .into_iter()
        .map(|issue| {
            let key = CLASSES
                .iter()
                .find(|&&c| c == issue.id)
                .copied()
                .unwrap_or("unknown");
            (key, issue)
        })
        .collect()
}

/// The canonical class → issue table.
pub fn issue_map() -> &'static HashMap<&'static str, Issue> {
    ISSUE_MAP.get_or_init(build_issue_map)
}

/// Look up the static issue for a fault class, if it is an actionable one.
pub fn issue_for(class: &str) -> Option<&'static Issue> {
    issue_map().get(class)
}
