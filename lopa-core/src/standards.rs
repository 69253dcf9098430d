//! Regulatory clause catalog
//!
//! Clause metadata is loaded once (built in or from JSON) and passed by
//! reference to whatever needs it. There is no process-wide instance.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata for one clause of a published standard or regulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Clause {
    pub standard: String,
    pub clause: String,
    pub title: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Read-only collection of clauses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandardsCatalog {
    clauses: Vec<Clause>,
}

fn clause(standard: &str, id: &str, title: &str, topics: &[&str]) -> Clause {
    Clause {
        standard: standard.to_string(),
        clause: id.to_string(),
        title: title.to_string(),
        topics: topics.iter().map(|t| t.to_string()).collect(),
    }
}

impl StandardsCatalog {
    pub fn new(clauses: Vec<Clause>) -> Self {
        StandardsCatalog { clauses }
    }

    /// Clauses most often cited alongside a LOPA study
    pub fn builtin() -> Self {
        StandardsCatalog::new(vec![
            clause(
                "IEC 61511-1",
                "8",
                "Process hazard and risk assessment",
                &["lopa", "hazop"],
            ),
            clause(
                "IEC 61511-1",
                "9",
                "Allocation of safety functions to protection layers",
                &["lopa", "sil", "ipl"],
            ),
            clause(
                "IEC 61511-1",
                "11.9",
                "SIF probability of failure",
                &["sil", "pfd"],
            ),
            clause(
                "IEC 61511-1",
                "16",
                "SIS operation and maintenance",
                &["ipl", "proof-test"],
            ),
            clause("ISO 31000", "6.4", "Risk assessment", &["risk"]),
            clause(
                "OSHA 29 CFR 1910.119",
                "(e)",
                "Process hazard analysis",
                &["hazop", "lopa"],
            ),
            clause(
                "OSHA 29 CFR 1910.119",
                "(i)",
                "Pre-startup safety review",
                &["start-up"],
            ),
            clause(
                "OSHA 29 CFR 1910.119",
                "(l)",
                "Management of change",
                &["moc"],
            ),
            clause(
                "EPA 40 CFR 68",
                "68.67",
                "Process hazard analysis",
                &["hazop", "lopa"],
            ),
        ])
    }

    /// Load a catalog from a JSON file of the form `{"clauses": [...]}`
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read standards catalog: {}", path.display()))?;
        let catalog: StandardsCatalog = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse standards catalog: {}", path.display()))?;
        Ok(catalog)
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn find(&self, standard: &str, clause: &str) -> Option<&Clause> {
        self.clauses
            .iter()
            .find(|c| c.standard == standard && c.clause == clause)
    }

    /// Clauses tagged with `topic` (case-insensitive), in catalog order
    pub fn for_topic(&self, topic: &str) -> Vec<&Clause> {
        self.clauses
            .iter()
            .filter(|c| c.topics.iter().any(|t| t.eq_ignore_ascii_case(topic)))
            .collect()
    }

    /// Distinct standard names in first-appearance order
    pub fn standards(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for c in &self.clauses {
            if !names.contains(&c.standard.as_str()) {
                names.push(&c.standard);
            }
        }
        names
    }
}
