//! Shared state a check runs against: the page snapshot, the result sink
//! and the clients/configuration for network probes.

use dashmap::DashMap;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use url::Url;

use crate::config::EngineConfig;
use crate::document::ParsedPage;
use crate::domain::models::{Outcome, ResultTree, RuleResult};
use crate::domain::rules::RuleId;

/// Concurrent `check name -> error message` log. Populated only through the
/// scheduler's exception barrier; a probe failure inside a check becomes an
/// Error-status outcome instead.
#[derive(Debug, Default, Clone)]
pub struct ErrorLog(Arc<DashMap<String, String>>);

impl ErrorLog {
    pub fn record(&self, check: &str, message: impl Into<String>) {
        self.0.insert(check.to_string(), message.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_sorted(self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

/// Write handle over the shared result tree.
///
/// Each check owns a unique set of `(section, rule)` keys, assigned up
/// front by the registry, so concurrent writers never contend on the same
/// slot; the mutex only serializes the map insertions themselves.
#[derive(Debug, Clone, Default)]
pub struct ResultSink {
    inner: Arc<Mutex<ResultTree>>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one outcome under the rule's registered section, stamping the
    /// rule's priority onto it.
    pub fn record(&self, rule: RuleId, outcome: Outcome) {
        let outcome = outcome.with_category(rule.priority());
        self.inner
            .lock()
            .expect("result tree lock poisoned")
            .insert(rule.section(), rule.as_str(), RuleResult::Outcome(outcome));
    }

    /// Record a nested group of sub-outcomes under one rule (heading
    /// structure is the main user).
    pub fn record_nested(&self, rule: RuleId, entries: Vec<(String, Outcome)>) {
        let mut nested = IndexMap::new();
        for (key, outcome) in entries {
            let outcome = outcome.with_category(rule.priority());
            nested.insert(key, RuleResult::Outcome(outcome));
        }
        self.inner
            .lock()
            .expect("result tree lock poisoned")
            .insert(rule.section(), rule.as_str(), RuleResult::Nested(nested));
    }

    pub fn snapshot(&self) -> ResultTree {
        self.inner
            .lock()
            .expect("result tree lock poisoned")
            .clone()
    }
}

/// Everything a check may read. Checks never write anywhere except through
/// `sink` (and never to another check's keys).
pub struct CheckContext {
    pub page: Arc<ParsedPage>,
    /// The URL the scan was requested for
    pub source_url: Url,
    /// Site root derived from `source_url`, used by site-wide probes
    pub base_url: Url,
    pub keyword: Option<String>,
    pub sink: ResultSink,
    pub client: reqwest::Client,
    pub no_redirect_client: reqwest::Client,
    pub config: EngineConfig,
}
