//! The rule-evaluation engine: orchestrates every registered check over one
//! parsed page and assembles the composite report.

pub mod aggregator;
pub mod context;
pub mod scheduler;

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::checks;
use crate::config::EngineConfig;
use crate::document::ParsedPage;
use crate::domain::models::Report;
use crate::error::Result;
use crate::service::http::{create_client, ClientType};
use context::{CheckContext, ErrorLog, ResultSink};
use scheduler::Scheduler;

pub struct SeoEngine {
    config: EngineConfig,
    client: reqwest::Client,
    no_redirect_client: reqwest::Client,
}

impl SeoEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(ClientType::Standard)?,
            no_redirect_client: create_client(ClientType::NoRedirect)?,
            config,
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(EngineConfig::default())
    }

    /// The redirect-following client shared with checks, also used by
    /// callers that fetch the page before handing it to `run`.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Run every registered check against one parsed page and aggregate the
    /// results. Always returns a report: an overrun of the overall deadline
    /// degrades to a base-error report instead of failing the caller.
    pub async fn run(
        &self,
        page: Arc<ParsedPage>,
        source_url: Url,
        target_keyword: Option<&str>,
    ) -> Report {
        let deadline = Duration::from_secs(self.config.deadline_secs);
        match tokio::time::timeout(deadline, self.run_inner(page, source_url, target_keyword))
            .await
        {
            Ok(report) => report,
            Err(_) => {
                warn!(
                    "[ENGINE] analysis exceeded deadline of {}s",
                    self.config.deadline_secs
                );
                Report::base_error(
                    crate::error::AppError::DeadlineExceeded(self.config.deadline_secs).to_string(),
                )
            }
        }
    }

    async fn run_inner(
        &self,
        page: Arc<ParsedPage>,
        source_url: Url,
        target_keyword: Option<&str>,
    ) -> Report {
        let sink = ResultSink::new();
        let errors = ErrorLog::default();

        let ctx = Arc::new(CheckContext {
            base_url: site_root(&source_url),
            source_url,
            keyword: target_keyword.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()),
            page,
            sink: sink.clone(),
            client: self.client.clone(),
            no_redirect_client: self.no_redirect_client.clone(),
            config: self.config.clone(),
        });

        let (blocking, asynchronous) = checks::register(&ctx);
        info!(
            "[ENGINE] running {} blocking and {} async checks for {}",
            blocking.len(),
            asynchronous.len(),
            ctx.source_url
        );

        Scheduler::new(self.config.sync_workers)
            .run(blocking, asynchronous, &errors)
            .await;

        let results = sink.snapshot();
        let seo_final_rating = aggregator::final_rating(&results);
        let issues = aggregator::collect_issues(&results);
        let total_rules = results.total_rules();
        info!(
            "[ENGINE] finished: score {:.2} over {} rules, {} issues, {} errors",
            seo_final_rating,
            total_rules,
            issues.count,
            errors.len()
        );

        Report {
            total_rules,
            seo_final_rating,
            issues,
            errors: errors.into_sorted(),
            results,
        }
    }
}

/// Reduce any page URL to its site root (`scheme://host[:port]/`).
pub fn site_root(url: &Url) -> Url {
    let mut root = url.clone();
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    root
}
