//! HTTP client factory and retry-aware resource probing.
//!
//! Every outbound probe goes through `probe_url`: HEAD first (cheap), GET
//! fallback when a server rejects HEAD, bounded retries with flat backoff.
//! Fan-out across many resources is bounded by `buffer_unordered`.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use url::Url;

use crate::config::RetryPolicy;

#[derive(Debug, Clone, Copy)]
pub enum ClientType {
    /// Follows redirects, 10 s default timeout. Used for page fetches.
    Standard,
    /// Never follows redirects. Used for redirect-chain measurement.
    NoRedirect,
}

/// Factory for the shared HTTP clients the engine hands to its checks.
pub fn create_client(client_type: ClientType) -> Result<Client> {
    let builder = Client::builder()
        .user_agent(concat!("seoscan/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(10));

    match client_type {
        ClientType::Standard => builder.build().context("Failed to build standard client"),
        ClientType::NoRedirect => builder
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to build no-redirect client"),
    }
}

/// The verdict of probing one resource.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub url: String,
    pub status: Option<u16>,
    pub error: Option<String>,
}

impl ProbeResult {
    /// A resource is broken if it errored out or answered >= 400.
    pub fn is_broken(&self) -> bool {
        match self.status {
            Some(code) => code >= 400,
            None => true,
        }
    }
}

async fn request_once(
    client: &Client,
    method: Method,
    url: &str,
    timeout: Duration,
) -> std::result::Result<StatusCode, reqwest::Error> {
    client
        .request(method, url)
        .timeout(timeout)
        .send()
        .await
        .map(|resp| resp.status())
}

/// Probe one URL with retries. HEAD is tried first; servers that reject the
/// method (405/501) get a single GET instead.
pub async fn probe_url(client: &Client, url: &str, policy: &RetryPolicy) -> ProbeResult {
    let timeout = policy.per_attempt_timeout();
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts {
        match request_once(client, Method::HEAD, url, timeout).await {
            Ok(status)
                if status == StatusCode::METHOD_NOT_ALLOWED
                    || status == StatusCode::NOT_IMPLEMENTED =>
            {
                let status = request_once(client, Method::GET, url, timeout)
                    .await
                    .map(|s| s.as_u16())
                    .ok();
                return ProbeResult {
                    url: url.to_string(),
                    status,
                    error: None,
                };
            }
            Ok(status) => {
                return ProbeResult {
                    url: url.to_string(),
                    status: Some(status.as_u16()),
                    error: None,
                };
            }
            Err(e) => {
                debug!("[PROBE] attempt {}/{} failed for {}: {}", attempt, policy.max_attempts, url, e);
                last_error = Some(e.to_string());
                if attempt < policy.max_attempts {
                    sleep(policy.backoff()).await;
                }
            }
        }
    }

    ProbeResult {
        url: url.to_string(),
        status: None,
        error: last_error,
    }
}

/// Probe many URLs concurrently with a bounded in-flight count.
pub async fn probe_all(
    client: &Client,
    urls: Vec<String>,
    policy: &RetryPolicy,
    max_in_flight: usize,
) -> Vec<ProbeResult> {
    stream::iter(urls.into_iter().map(|url| {
        let client = client.clone();
        let policy = policy.clone();
        async move { probe_url(&client, &url, &policy).await }
    }))
    .buffer_unordered(max_in_flight.max(1))
    .collect()
    .await
}

/// HEAD many URLs concurrently and report the Content-Length each one
/// advertises, `None` when the request failed or the header is absent.
/// A HEAD response carries no body, so the advertised size has to come
/// from the raw header rather than the body-size accessor.
pub async fn head_content_lengths(
    client: &Client,
    urls: &[String],
    max_in_flight: usize,
    policy: &RetryPolicy,
) -> Vec<(String, Option<u64>)> {
    let timeout = policy.per_attempt_timeout();
    stream::iter(urls.iter().cloned().map(|url| {
        let client = client.clone();
        async move {
            let length = client
                .head(&url)
                .timeout(timeout)
                .send()
                .await
                .ok()
                .and_then(|resp| {
                    resp.headers()
                        .get(reqwest::header::CONTENT_LENGTH)?
                        .to_str()
                        .ok()?
                        .parse::<u64>()
                        .ok()
                });
            (url, length)
        }
    }))
    .buffer_unordered(max_in_flight.max(1))
    .collect()
    .await
}

/// GET a URL while counting redirect hops, up to `max_hops`. Returns the
/// hop count and the final status.
pub async fn count_redirects(
    no_redirect_client: &Client,
    start: &Url,
    max_hops: usize,
    policy: &RetryPolicy,
) -> Result<(usize, u16, Url)> {
    let timeout = policy.per_attempt_timeout();
    let mut current = start.clone();
    let mut hops = 0;

    loop {
        let response = no_redirect_client
            .get(current.as_str())
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("redirect probe failed at {current}"))?;
        let status = response.status();

        if !status.is_redirection() || hops >= max_hops {
            return Ok((hops, status.as_u16(), current));
        }

        let Some(location) = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
        else {
            return Ok((hops, status.as_u16(), current));
        };
        current = current
            .join(location)
            .with_context(|| format!("bad Location header at {current}"))?;
        hops += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn probe_reports_ok_for_200() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("HEAD", "/ok").with_status(200).create_async().await;

        let client = create_client(ClientType::Standard).unwrap();
        let result = probe_url(
            &client,
            &format!("{}/ok", server.url()),
            &RetryPolicy::default(),
        )
        .await;

        assert_eq!(result.status, Some(200));
        assert!(!result.is_broken());
    }

    #[tokio::test]
    async fn probe_falls_back_to_get_on_405() {
        let mut server = mockito::Server::new_async().await;
        let _head = server.mock("HEAD", "/page").with_status(405).create_async().await;
        let _get = server.mock("GET", "/page").with_status(200).create_async().await;

        let client = create_client(ClientType::Standard).unwrap();
        let result = probe_url(
            &client,
            &format!("{}/page", server.url()),
            &RetryPolicy::default(),
        )
        .await;

        assert_eq!(result.status, Some(200));
    }

    #[tokio::test]
    async fn probe_marks_404_broken() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("HEAD", "/gone").with_status(404).create_async().await;

        let client = create_client(ClientType::Standard).unwrap();
        let result = probe_url(
            &client,
            &format!("{}/gone", server.url()),
            &RetryPolicy::default(),
        )
        .await;

        assert!(result.is_broken());
        assert_eq!(result.status, Some(404));
    }

    #[tokio::test]
    async fn unreachable_host_exhausts_retries() {
        let client = create_client(ClientType::Standard).unwrap();
        let policy = RetryPolicy {
            max_attempts: 2,
            per_attempt_timeout_secs: 1,
            backoff_ms: 10,
        };
        // Reserved TEST-NET address, nothing listens there
        let result = probe_url(&client, "http://192.0.2.1:9/", &policy).await;
        assert!(result.is_broken());
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn head_reports_advertised_content_length() {
        let mut server = mockito::Server::new_async().await;
        let _sized = server
            .mock("HEAD", "/big.jpg")
            .with_header("content-length", "500000")
            .create_async()
            .await;
        let _bare = server.mock("HEAD", "/no-length").create_async().await;

        let client = create_client(ClientType::Standard).unwrap();
        let urls = vec![
            format!("{}/big.jpg", server.url()),
            format!("{}/no-length", server.url()),
        ];
        let mut sizes = head_content_lengths(&client, &urls, 2, &RetryPolicy::default()).await;
        sizes.sort();

        // The header must win even though a HEAD response has no body
        assert_eq!(sizes[0].1, Some(500_000));
        assert!(sizes[1].1.is_none() || sizes[1].1 == Some(0));
    }

    #[tokio::test]
    async fn counts_redirect_hops() {
        let mut server = mockito::Server::new_async().await;
        let _a = server
            .mock("GET", "/a")
            .with_status(301)
            .with_header("location", "/b")
            .create_async()
            .await;
        let _b = server
            .mock("GET", "/b")
            .with_status(302)
            .with_header("location", "/c")
            .create_async()
            .await;
        let _c = server.mock("GET", "/c").with_status(200).create_async().await;

        let client = create_client(ClientType::NoRedirect).unwrap();
        let start = Url::parse(&format!("{}/a", server.url())).unwrap();
        let (hops, status, _) =
            count_redirects(&client, &start, 10, &RetryPolicy::default()).await.unwrap();

        assert_eq!(hops, 2);
        assert_eq!(status, 200);
    }
}
