//! Bounded breadth-first page-depth prober.
//!
//! Measures how deep a site's internal link structure goes: start at the
//! root (depth 0), follow same-site links level by level. Both hard caps
//! (max depth, max total URLs) are enforced so the traversal always
//! terminates, whatever the shape of the site graph. Visited tracking owns
//! the set single-threaded between waves; only fetches run concurrently.

use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::Html;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};
use url::Url;

use crate::config::ProberConfig;
use crate::extractor::PageExtractor;

/// What one traversal measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthSample {
    /// Deepest level at which at least one page was fetched
    pub max_depth_reached: usize,
    pub pages_fetched: usize,
}

pub struct PageDepthProber {
    client: Client,
    config: ProberConfig,
}

impl PageDepthProber {
    pub fn new(client: Client, config: ProberConfig) -> Self {
        Self { client, config }
    }

    /// Strip query and fragment so `/page?a=1#x` and `/page` dedupe.
    fn normalize(mut url: Url) -> Url {
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    /// Fetch one page and return its normalized same-site links. Errors and
    /// non-success statuses contribute no edges but never abort anything.
    async fn fetch_links(&self, url: Url, delay: Duration) -> Vec<Url> {
        if !delay.is_zero() {
            sleep(delay).await;
        }

        let response = match self.client.get(url.as_str()).send().await {
            Ok(resp) => resp,
            Err(e) => {
                debug!("[PROBER] failed to fetch {}: {}", url, e);
                return Vec::new();
            }
        };
        if !response.status().is_success() {
            debug!("[PROBER] {} answered {}, no edges", url, response.status());
            return Vec::new();
        }
        let Ok(body) = response.text().await else {
            return Vec::new();
        };

        // Html is parsed and dropped inside this block, before any await
        let document = Html::parse_document(&body);
        PageExtractor::extract_links(&document, &url)
            .into_iter()
            .filter(|link| link.is_internal)
            .filter_map(|link| Url::parse(&link.href).ok())
            .map(Self::normalize)
            .collect()
    }

    /// Breadth-first traversal from `root`. Stops at whichever cap is hit
    /// first and reports the deepest level actually fetched.
    pub async fn probe(&self, root: &Url) -> DepthSample {
        let delay = Duration::from_millis(self.config.delay_between_requests_ms);
        let mut visited: HashSet<Url> = HashSet::new();
        let mut frontier = vec![Self::normalize(root.clone())];
        visited.insert(frontier[0].clone());

        let mut pages_fetched = 0;
        let mut max_depth_reached = 0;

        for depth in 0..=self.config.max_depth {
            if frontier.is_empty() || pages_fetched >= self.config.max_total_urls {
                break;
            }

            // Respect the total-URL budget before spending fetches
            let budget = self.config.max_total_urls - pages_fetched;
            frontier.truncate(budget);

            info!("[PROBER] depth {}: fetching {} pages", depth, frontier.len());
            pages_fetched += frontier.len();
            max_depth_reached = depth;

            let discovered: Vec<Vec<Url>> = stream::iter(
                frontier
                    .drain(..)
                    .map(|url| self.fetch_links(url, delay)),
            )
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

            if depth == self.config.max_depth {
                break;
            }

            for link in discovered.into_iter().flatten() {
                if visited.insert(link.clone()) {
                    frontier.push(link);
                }
            }
        }

        info!(
            "[PROBER] done: depth {} after {} fetches",
            max_depth_reached, pages_fetched
        );
        DepthSample {
            max_depth_reached,
            pages_fetched,
        }
    }
}
