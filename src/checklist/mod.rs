//! Conformance checklist: groups, fixtures, the runner and its report.

mod fixtures;
mod runner;

pub use fixtures::Fixtures;
pub use runner::ChecklistRunner;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A capability group, in canonical run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Crypto,
    Json,
    Requests,
    /// The logger capability.
    Tools,
    System,
}

impl Group {
    pub const ALL: [Group; 5] = [
        Self::Crypto,
        Self::Json,
        Self::Requests,
        Self::Tools,
        Self::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crypto => "crypto",
            Self::Json => "json",
            Self::Requests => "requests",
            Self::Tools => "tools",
            Self::System => "system",
        }
    }

    /// Sort into canonical order and drop duplicates.
    pub fn canonical(groups: &[Group]) -> Vec<Group> {
        let mut ordered = groups.to_vec();
        ordered.sort();
        ordered.dedup();
        ordered
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crypto" => Ok(Self::Crypto),
            "json" => Ok(Self::Json),
            "requests" => Ok(Self::Requests),
            "tools" | "logger" | "tools/logger" => Ok(Self::Tools),
            "system" => Ok(Self::System),
            other => Err(format!("unknown group: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GroupStatus {
    Passed,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupOutcome {
    pub group: Group,
    #[serde(flatten)]
    pub status: GroupStatus,
    pub elapsed_ms: u64,
}

impl GroupOutcome {
    pub fn passed(&self) -> bool {
        matches!(self.status, GroupStatus::Passed)
    }
}

/// What happened during one checklist run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<GroupOutcome>,
}

impl RunReport {
    pub(crate) fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            outcomes: Vec::new(),
        }
    }

    /// True when every group that ran passed.
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(GroupOutcome::passed)
    }

    pub fn failed_groups(&self) -> Vec<Group> {
        self.outcomes
            .iter()
            .filter(|o| !o.passed())
            .map(|o| o.group)
            .collect()
    }

    pub fn outcome(&self, group: Group) -> Option<&GroupOutcome> {
        self.outcomes.iter().find(|o| o.group == group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_parse_aliases() {
        assert_eq!("logger".parse::<Group>().unwrap(), Group::Tools);
        assert_eq!(" Crypto ".parse::<Group>().unwrap(), Group::Crypto);
        assert!("network".parse::<Group>().is_err());
    }

    #[test]
    fn test_canonical_order_dedups() {
        let groups = Group::canonical(&[Group::System, Group::Crypto, Group::System]);
        assert_eq!(groups, vec![Group::Crypto, Group::System]);
    }

    #[test]
    fn test_report_serializes_flat_status() {
        let mut report = RunReport::new();
        report.outcomes.push(GroupOutcome {
            group: Group::Json,
            status: GroupStatus::Failed {
                error: "boom".into(),
            },
            elapsed_ms: 3,
        });
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["outcomes"][0]["group"], "json");
        assert_eq!(value["outcomes"][0]["status"], "failed");
        assert_eq!(value["outcomes"][0]["error"], "boom");
        assert!(!report.passed());
        assert_eq!(report.failed_groups(), vec![Group::Json]);
    }
}
