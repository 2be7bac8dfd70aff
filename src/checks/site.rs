//! Site-level checks that go back on the wire: canonical target, well-known
//! files, redirect behaviour and click depth.

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::domain::models::{Outcome, Status};
use crate::domain::rules::RuleId;
use crate::engine::context::CheckContext;
use crate::service::http;
use crate::service::prober::PageDepthProber;

pub async fn canonical_valid(ctx: Arc<CheckContext>) -> Result<()> {
    let Some(href) = ctx.page.canonical.clone() else {
        ctx.sink.record(
            RuleId::CanonicalTagValid,
            Outcome::not_applicable("no canonical tag to resolve", 0),
        );
        return Ok(());
    };

    let target = match ctx.base_url.join(&href) {
        Ok(url) => url,
        Err(e) => {
            ctx.sink.record(
                RuleId::CanonicalTagValid,
                Outcome::new(href.as_str(), Status::Poor, 2, format!("canonical href does not parse: {e}")),
            );
            return Ok(());
        }
    };

    let result = http::probe_url(&ctx.client, target.as_str(), &ctx.config.retry).await;
    let outcome = match result.status {
        Some(code) if code < 400 => {
            Outcome::new(target.as_str(), Status::Good, 9, "canonical target resolves")
        }
        Some(code) => Outcome::new(
            target.as_str(),
            Status::Poor,
            2,
            format!("canonical target answered {code}"),
        ),
        None => Outcome::probe_error(format!(
            "canonical target unreachable: {}",
            result.error.unwrap_or_else(|| "unknown error".into())
        )),
    };
    ctx.sink.record(RuleId::CanonicalTagValid, outcome);
    Ok(())
}

async fn well_known_file(ctx: &CheckContext, rule: RuleId, path: &str, label: &str) -> Result<()> {
    let target = match ctx.base_url.join(path) {
        Ok(url) => url,
        Err(e) => {
            ctx.sink.record(rule, Outcome::probe_error(format!("bad {label} url: {e}")));
            return Ok(());
        }
    };
    let result = http::probe_url(&ctx.client, target.as_str(), &ctx.config.retry).await;
    let outcome = match result.status {
        Some(code) if code < 300 => Outcome::new(true, Status::Good, 10, format!("{label} is served")),
        Some(401) | Some(403) => Outcome::new(
            false,
            Status::NeedsImprovement,
            5,
            format!("{label} exists but is access protected"),
        ),
        Some(code) => Outcome::new(false, Status::Poor, 3, format!("{label} answered {code}")),
        None => Outcome::probe_error(format!(
            "{label} unreachable: {}",
            result.error.unwrap_or_else(|| "unknown error".into())
        )),
    };
    ctx.sink.record(rule, outcome);
    Ok(())
}

pub async fn robots_txt(ctx: Arc<CheckContext>) -> Result<()> {
    well_known_file(&ctx, RuleId::RobotsTxtExists, "/robots.txt", "robots.txt").await
}

pub async fn xml_sitemap(ctx: Arc<CheckContext>) -> Result<()> {
    well_known_file(&ctx, RuleId::XmlSitemapExists, "/sitemap.xml", "sitemap.xml").await
}

pub async fn favicon_reachable(ctx: Arc<CheckContext>) -> Result<()> {
    let declared = ctx
        .page
        .favicons
        .first()
        .and_then(|href| ctx.base_url.join(href).ok());
    let target = match declared {
        Some(url) => url,
        None => match ctx.base_url.join("/favicon.ico") {
            Ok(url) => url,
            Err(e) => {
                ctx.sink
                    .record(RuleId::FaviconReachable, Outcome::probe_error(format!("bad favicon url: {e}")));
                return Ok(());
            }
        },
    };

    let result = http::probe_url(&ctx.client, target.as_str(), &ctx.config.retry).await;
    let outcome = match result.status {
        Some(code) if code < 400 => Outcome::new(target.as_str(), Status::Good, 9, "favicon is served"),
        Some(code) => Outcome::new(
            target.as_str(),
            Status::Poor,
            3,
            format!("favicon answered {code}"),
        ),
        None => Outcome::probe_error(format!(
            "favicon unreachable: {}",
            result.error.unwrap_or_else(|| "unknown error".into())
        )),
    };
    ctx.sink.record(RuleId::FaviconReachable, outcome);
    Ok(())
}

pub async fn redirects_minimized(ctx: Arc<CheckContext>) -> Result<()> {
    let outcome = match http::count_redirects(
        &ctx.no_redirect_client,
        &ctx.source_url,
        10,
        &ctx.config.retry,
    )
    .await
    {
        Ok((hops, _status, final_url)) => {
            debug!("[REDIRECTS] {} -> {} in {} hops", ctx.source_url, final_url, hops);
            match hops {
                0 => Outcome::new(0i64, Status::Good, 10, "page is served without redirects"),
                1 => Outcome::new(1i64, Status::Good, 8, "one redirect before the page"),
                2 => Outcome::new(2i64, Status::NeedsImprovement, 5, "two redirects before the page"),
                n => Outcome::new(n as i64, Status::Poor, 3, format!("{n} redirect hops before the page")),
            }
        }
        Err(e) => Outcome::probe_error(format!("redirect probe failed: {e:#}")),
    };
    ctx.sink.record(RuleId::RedirectsMinimized, outcome);
    Ok(())
}

/// Requests the plain-http variant of the page and verifies it lands back
/// on https.
pub async fn https_redirect(ctx: Arc<CheckContext>) -> Result<()> {
    if ctx.source_url.scheme() != "https" {
        ctx.sink.record(
            RuleId::HttpsRedirect,
            Outcome::new(false, Status::Poor, 2, "page is served over plain http"),
        );
        return Ok(());
    }

    let mut http_variant = ctx.source_url.clone();
    if http_variant.set_scheme("http").is_err() {
        ctx.sink
            .record(RuleId::HttpsRedirect, Outcome::probe_error("could not derive http variant"));
        return Ok(());
    }

    let outcome = match ctx.client.get(http_variant.as_str()).send().await {
        Ok(resp) if resp.url().scheme() == "https" => {
            Outcome::new(true, Status::Good, 10, "http requests are redirected to https")
        }
        Ok(resp) => Outcome::new(
            false,
            Status::Poor,
            2,
            format!("http variant stays on {}", resp.url().scheme()),
        ),
        Err(e) => Outcome::probe_error(format!("http variant probe failed: {e}")),
    };
    ctx.sink.record(RuleId::HttpsRedirect, outcome);
    Ok(())
}

pub async fn page_depth(ctx: Arc<CheckContext>) -> Result<()> {
    let prober = PageDepthProber::new(ctx.client.clone(), ctx.config.prober.clone());
    let sample = prober.probe(&ctx.base_url).await;
    debug!(
        "[DEPTH] reached depth {} over {} pages",
        sample.max_depth_reached, sample.pages_fetched
    );

    let outcome = if sample.max_depth_reached <= 3 {
        Outcome::new(
            sample.max_depth_reached,
            Status::Good,
            9,
            format!("content reachable within {} clicks", sample.max_depth_reached),
        )
    } else {
        Outcome::new(
            sample.max_depth_reached,
            Status::NeedsImprovement,
            5,
            format!("content buried {} clicks deep", sample.max_depth_reached),
        )
    }
    .with_detail("pages_fetched", serde_json::json!(sample.pages_fetched));
    ctx.sink.record(RuleId::PageDepth, outcome);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::Section;
    use crate::test_utils::{ctx_for, page_from_html};

    #[tokio::test]
    async fn served_robots_txt_scores_ten() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("HEAD", "/robots.txt").with_status(200).create_async().await;

        let ctx = ctx_for(page_from_html("<html></html>", &server.url()));
        robots_txt(ctx.clone()).await.unwrap();

        let tree = ctx.sink.snapshot();
        assert_eq!(tree.outcome(Section::Site, "robots_txt_exists").unwrap().rating, 10);
    }

    #[tokio::test]
    async fn missing_sitemap_scores_three() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("HEAD", "/sitemap.xml").with_status(404).create_async().await;

        let ctx = ctx_for(page_from_html("<html></html>", &server.url()));
        xml_sitemap(ctx.clone()).await.unwrap();

        let tree = ctx.sink.snapshot();
        let outcome = tree.outcome(Section::Site, "xml_sitemap_exists").unwrap();
        assert_eq!(outcome.rating, 3);
        assert_eq!(outcome.status, Status::Poor);
    }

    #[tokio::test]
    async fn canonical_pointing_at_404_is_poor() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("HEAD", "/canonical").with_status(404).create_async().await;

        let html = format!(
            r#"<html><head><link rel="canonical" href="{}/canonical"></head></html>"#,
            server.url()
        );
        let ctx = ctx_for(page_from_html(&html, &server.url()));
        canonical_valid(ctx.clone()).await.unwrap();

        let tree = ctx.sink.snapshot();
        assert_eq!(tree.outcome(Section::MetaTags, "canonical_tag_valid").unwrap().rating, 2);
    }

    #[tokio::test]
    async fn no_canonical_is_not_applicable() {
        let ctx = ctx_for(page_from_html("<html></html>", "https://example.com/"));
        canonical_valid(ctx.clone()).await.unwrap();
        let tree = ctx.sink.snapshot();
        let outcome = tree.outcome(Section::MetaTags, "canonical_tag_valid").unwrap();
        assert_eq!(outcome.status, Status::NotApplicable);
        assert_eq!(outcome.rating, 0);
    }

    #[tokio::test]
    async fn direct_page_has_zero_redirect_hops() {
        let mut server = mockito::Server::new_async().await;
        let _m = server.mock("GET", "/").with_status(200).create_async().await;

        let ctx = ctx_for(page_from_html("<html></html>", &format!("{}/", server.url())));
        redirects_minimized(ctx.clone()).await.unwrap();

        let tree = ctx.sink.snapshot();
        assert_eq!(tree.outcome(Section::Site, "redirects_minimized").unwrap().rating, 10);
    }
}
