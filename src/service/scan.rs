//! Scan lifecycle: validation, submission to a queue and the worker side
//! that turns a queued scan into a stored report.
//!
//! Storage and queuing are trait seams. The engine does not care whether the
//! store is a database or a map, or whether the queue is in-process or a
//! broker.

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use url::Url;
use uuid::Uuid;

use crate::document;
use crate::domain::models::{Report, ScanRecord, ScanStatus};
use crate::engine::SeoEngine;
use crate::error::{AppError, Result};

const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(5);

/// Persistence seam for scan records.
#[async_trait]
pub trait ScanStore: Send + Sync {
    async fn create(&self, record: ScanRecord) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<ScanRecord>>;
    async fn set_status(&self, id: &str, status: ScanStatus) -> Result<()>;
    async fn set_result(&self, id: &str, status: ScanStatus, report: Report) -> Result<()>;
}

/// A queued unit of work, everything `process_scan` needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanJob {
    pub scan_id: String,
    pub url: String,
    pub target_keyword: Option<String>,
}

/// Delivery seam for scan jobs.
#[async_trait]
pub trait ScanQueue: Send + Sync {
    async fn submit(&self, job: ScanJob) -> Result<()>;
}

/// Front door for scans: validates the target, records it as pending and
/// hands it to the queue.
pub struct ScanService {
    store: Arc<dyn ScanStore>,
    queue: Arc<dyn ScanQueue>,
    client: Client,
}

impl ScanService {
    pub fn new(store: Arc<dyn ScanStore>, queue: Arc<dyn ScanQueue>, client: Client) -> Self {
        Self { store, queue, client }
    }

    /// Validate, persist as pending and enqueue. Returns the fresh record.
    pub async fn start_scan(
        &self,
        raw_url: &str,
        target_keyword: Option<String>,
    ) -> Result<ScanRecord> {
        let url = validate_url(raw_url)?;
        self.check_reachable(&url).await?;

        let record = ScanRecord {
            id: Uuid::new_v4().to_string(),
            url: url.to_string(),
            status: ScanStatus::Pending,
            result: None,
            created_at: Utc::now(),
        };
        self.store.create(record.clone()).await?;
        self.queue
            .submit(ScanJob {
                scan_id: record.id.clone(),
                url: record.url.clone(),
                target_keyword,
            })
            .await?;
        info!("[SCAN] queued {} for {}", record.id, record.url);
        Ok(record)
    }

    pub async fn get_scan(&self, id: &str) -> Result<ScanRecord> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::ScanNotFound(id.to_string()))
    }

    /// Cheap HEAD request so unreachable targets are rejected at submission
    /// instead of failing later in the worker.
    async fn check_reachable(&self, url: &Url) -> Result<()> {
        self.client
            .head(url.as_str())
            .timeout(REACHABILITY_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::NetworkError(format!("{url} is not reachable: {e}")))?;
        Ok(())
    }
}

/// Normalize and validate a user-supplied URL. A bare domain gets an https
/// scheme, the host must look like a registrable domain or be an IP/localhost.
pub fn validate_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidUrl("empty url".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| AppError::InvalidUrl(format!("{trimmed}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::InvalidUrl(format!(
            "unsupported scheme {}",
            url.scheme()
        )));
    }

    match url.host() {
        Some(url::Host::Domain(domain)) => {
            if domain != "localhost" && !domain_re().is_match(domain) {
                return Err(AppError::InvalidUrl(format!("invalid domain {domain}")));
            }
        }
        Some(_) => {} // IP hosts are already validated by the parser
        None => return Err(AppError::InvalidUrl(format!("{trimmed} has no host"))),
    }
    Ok(url)
}

fn domain_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,}$")
            .unwrap_or_else(|_| unreachable!())
    })
}

/// Worker side: fetch, analyze and store. A failure at any stage marks the
/// scan failed with a base-error report instead of losing the record.
pub async fn process_scan(store: Arc<dyn ScanStore>, engine: Arc<SeoEngine>, job: ScanJob) {
    if let Err(e) = run_scan(&store, &engine, &job).await {
        error!("[SCAN] {} failed: {e}", job.scan_id);
        let report = Report::base_error(e.to_string());
        if let Err(e) = store
            .set_result(&job.scan_id, ScanStatus::Failed, report)
            .await
        {
            error!("[SCAN] could not record failure for {}: {e}", job.scan_id);
        }
    }
}

async fn run_scan(
    store: &Arc<dyn ScanStore>,
    engine: &Arc<SeoEngine>,
    job: &ScanJob,
) -> Result<()> {
    store.set_status(&job.scan_id, ScanStatus::InProgress).await?;
    let url = Url::parse(&job.url).map_err(|e| AppError::InvalidUrl(format!("{}: {e}", job.url)))?;

    let page = document::fetch_page(engine.client(), &url).await?;
    let report = engine
        .run(Arc::new(page), url, job.target_keyword.as_deref())
        .await;

    info!(
        "[SCAN] {} completed with score {:.2}",
        job.scan_id, report.seo_final_rating
    );
    store
        .set_result(&job.scan_id, ScanStatus::Completed, report)
        .await
}
