//! Core result types: what a check produces and how a whole scan is reported.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::rules::Section;

// ====== Enums ======

/// Verdict classification for a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Excellent,
    Good,
    NeedsImprovement,
    Warning,
    Poor,
    Critical,
    /// The check ran but could not reach a resource it needed
    Error,
    /// The rule does not apply to this page (e.g. no images at all)
    NotApplicable,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Excellent => "excellent",
            Status::Good => "good",
            Status::NeedsImprovement => "needs_improvement",
            Status::Warning => "warning",
            Status::Poor => "poor",
            Status::Critical => "critical",
            Status::Error => "error",
            Status::NotApplicable => "not_applicable",
        }
    }
}

/// How much a rule matters when triaging issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    HighPriority,
    AveragePriority,
    LowPriority,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::HighPriority => "high_priority",
            Priority::AveragePriority => "average_priority",
            Priority::LowPriority => "low_priority",
        }
    }
}

/// Scan lifecycle states persisted by the external store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::InProgress => "in_progress",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
        }
    }
}

// ====== Outcome ======

/// The primary measured value of an outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for CheckValue {
    fn from(v: bool) -> Self {
        CheckValue::Bool(v)
    }
}

impl From<i64> for CheckValue {
    fn from(v: i64) -> Self {
        CheckValue::Int(v)
    }
}

impl From<usize> for CheckValue {
    fn from(v: usize) -> Self {
        CheckValue::Int(v as i64)
    }
}

impl From<f64> for CheckValue {
    fn from(v: f64) -> Self {
        CheckValue::Float(v)
    }
}

impl From<&str> for CheckValue {
    fn from(v: &str) -> Self {
        CheckValue::Text(v.to_string())
    }
}

impl From<String> for CheckValue {
    fn from(v: String) -> Self {
        CheckValue::Text(v)
    }
}

/// Structured verdict a check writes for one rule.
///
/// `rating` is always in 0..=10; 0 means "not scored" and is excluded from
/// the weighted average and from the issues list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub value: CheckValue,
    pub status: Status,
    pub rating: u8,
    pub reason: String,
    pub category: Priority,
    /// Check-specific extras (counts, found headers, skipped levels, ...)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub details: IndexMap<String, serde_json::Value>,
}

impl Outcome {
    pub fn new(
        value: impl Into<CheckValue>,
        status: Status,
        rating: u8,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            value: value.into(),
            status,
            rating: rating.min(10),
            reason: reason.into(),
            category: Priority::AveragePriority,
            details: IndexMap::new(),
        }
    }

    pub fn with_category(mut self, category: Priority) -> Self {
        self.category = category;
        self
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Outcome for a rule that does not apply to this page.
    pub fn not_applicable(reason: impl Into<String>, rating: u8) -> Self {
        Self::new(false, Status::NotApplicable, rating, reason)
    }

    /// Outcome for a probe that failed to reach its resource.
    pub fn probe_error(reason: impl Into<String>) -> Self {
        Self::new(false, Status::Error, 1, reason)
    }
}

// ====== Result tree ======

/// One slot in the tree: either a single outcome or a nested group of
/// sub-results (heading structure uses the nested form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleResult {
    Outcome(Outcome),
    Nested(IndexMap<String, RuleResult>),
}

impl RuleResult {
    pub fn as_outcome(&self) -> Option<&Outcome> {
        match self {
            RuleResult::Outcome(o) => Some(o),
            RuleResult::Nested(_) => None,
        }
    }
}

/// Insertion-ordered `section -> rule -> result` map; the single shared
/// output of an analysis. Checks write disjoint `(section, rule)` keys by
/// construction (each rule belongs to exactly one check), so last-write-wins
/// on collision is tolerated but never exercised.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTree(pub IndexMap<Section, IndexMap<String, RuleResult>>);

impl ResultTree {
    pub fn insert(&mut self, section: Section, rule: &str, result: RuleResult) {
        self.0
            .entry(section)
            .or_default()
            .insert(rule.to_string(), result);
    }

    pub fn get(&self, section: Section, rule: &str) -> Option<&RuleResult> {
        self.0.get(&section).and_then(|rules| rules.get(rule))
    }

    pub fn outcome(&self, section: Section, rule: &str) -> Option<&Outcome> {
        self.get(section, rule).and_then(RuleResult::as_outcome)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shallow rule count, one level below each section. Nested sub-keys are
    /// not recursed into; a nested rule still counts as one rule.
    pub fn total_rules(&self) -> usize {
        self.0.values().map(|rules| rules.len()).sum()
    }
}

// ====== Report ======

/// One entry of the filtered issues list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub value: CheckValue,
    pub status: Status,
    pub rating: u8,
    pub reason: String,
    pub category: Priority,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub count: usize,
    pub issues: Vec<Issue>,
}

/// The composite report returned by one analysis. Immutable once built;
/// persistence is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub results: ResultTree,
    pub seo_final_rating: f64,
    pub total_rules: usize,
    /// `check name -> error message` for checks whose body escaped; the
    /// reserved key `base` means nothing ran at all.
    pub errors: BTreeMap<String, String>,
    pub issues: IssueSummary,
}

impl Report {
    /// Report for a run that could not even fetch/parse the page: empty
    /// tree, single `base` error.
    pub fn base_error(message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert("base".to_string(), message.into());
        Self {
            results: ResultTree::default(),
            seo_final_rating: 0.0,
            total_rules: 0,
            errors,
            issues: IssueSummary::default(),
        }
    }

    pub fn is_base_error(&self) -> bool {
        self.errors.contains_key("base")
    }
}

// ====== Scan record ======

/// Row shape the external document store persists, keyed by scan id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: String,
    pub url: String,
    pub status: ScanStatus,
    pub result: Option<Report>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_is_clamped_to_ten() {
        let outcome = Outcome::new(true, Status::Good, 12, "clamped");
        assert_eq!(outcome.rating, 10);
    }

    #[test]
    fn result_tree_counts_rules_shallowly() {
        let mut tree = ResultTree::default();
        tree.insert(
            Section::MetaTags,
            "title_tag",
            RuleResult::Outcome(Outcome::new(true, Status::Good, 10, "ok")),
        );
        let mut nested = IndexMap::new();
        nested.insert(
            "missing_h1".to_string(),
            RuleResult::Outcome(Outcome::new(false, Status::Poor, 2, "no h1")),
        );
        tree.insert(
            Section::Headings,
            "heading_structure",
            RuleResult::Nested(nested),
        );

        // heading_structure counts once even though it has a sub-key
        assert_eq!(tree.total_rules(), 2);
    }

    #[test]
    fn untagged_rule_result_round_trips() {
        let mut nested = IndexMap::new();
        nested.insert(
            "summary".to_string(),
            RuleResult::Outcome(Outcome::new("H1 to H3", Status::Poor, 3, "skipped level")),
        );
        let original = RuleResult::Nested(nested);

        let json = serde_json::to_string(&original).unwrap();
        let back: RuleResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }
}
