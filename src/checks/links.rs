//! Link checks: presence of internal/external links, nofollow hygiene and
//! broken-link probing.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;

use crate::domain::models::{Outcome, Status};
use crate::domain::rules::RuleId;
use crate::engine::context::CheckContext;
use crate::service::http;

pub fn link_presence(ctx: &CheckContext) -> Result<()> {
    let internal: Vec<_> = ctx.page.internal_links().collect();
    let external: Vec<_> = ctx.page.external_links().collect();

    let internal_outcome = if internal.is_empty() {
        Outcome::new(0i64, Status::Poor, 4, "no internal links, the page is a dead end")
    } else {
        Outcome::new(internal.len(), Status::Good, 9, "internal links present")
    };
    ctx.sink.record(RuleId::InternalLinksExist, internal_outcome);

    let external_outcome = if external.is_empty() {
        Outcome::new(0i64, Status::NeedsImprovement, 5, "no outbound links")
    } else {
        Outcome::new(external.len(), Status::Good, 8, "outbound links present")
    };
    ctx.sink.record(RuleId::ExternalLinksExist, external_outcome);

    let nofollow_outcome = if external.is_empty() {
        Outcome::not_applicable("no external links to audit", 0)
    } else {
        let without = external
            .iter()
            .filter(|link| !link.rel.as_deref().map_or(false, |r| r.contains("nofollow")))
            .count();
        if without == 0 {
            Outcome::new(true, Status::Good, 9, "all external links carry rel=nofollow")
        } else {
            Outcome::new(
                without,
                Status::NeedsImprovement,
                5,
                format!("{without} external links are followed"),
            )
        }
    };
    ctx.sink.record(RuleId::NofollowOnExternalLinks, nofollow_outcome);
    Ok(())
}

fn resolved_targets<'a, I>(ctx: &CheckContext, links: I) -> Vec<String>
where
    I: Iterator<Item = &'a crate::extractor::page_extractor::ExtractedLink>,
{
    let distinct: HashSet<String> = links
        .filter_map(|link| ctx.base_url.join(&link.href).ok())
        .map(|u| u.to_string())
        .collect();
    distinct.into_iter().collect()
}

async fn probe_links(
    ctx: &CheckContext,
    urls: Vec<String>,
) -> (usize, Vec<String>) {
    let results = http::probe_all(
        &ctx.client,
        urls,
        &ctx.config.retry,
        ctx.config.max_in_flight_probes,
    )
    .await;
    let total = results.len();
    let broken: Vec<String> = results
        .into_iter()
        .filter(|r| r.is_broken())
        .map(|r| r.url)
        .collect();
    (total, broken)
}

pub async fn broken_internal_links(ctx: Arc<CheckContext>) -> Result<()> {
    let targets = resolved_targets(&ctx, ctx.page.internal_links());
    if targets.is_empty() {
        ctx.sink.record(
            RuleId::BrokenInternalLinks,
            Outcome::not_applicable("no internal links to probe", 0),
        );
        return Ok(());
    }

    let (total, broken) = probe_links(&ctx, targets).await;
    let outcome = if broken.is_empty() {
        Outcome::new(0i64, Status::Good, 10, format!("all {total} internal links resolve"))
    } else {
        Outcome::new(
            broken.len(),
            Status::Poor,
            2,
            format!("{} of {total} internal links are broken", broken.len()),
        )
        .with_detail(
            "broken",
            serde_json::json!(broken.iter().take(10).collect::<Vec<_>>()),
        )
    };
    ctx.sink.record(RuleId::BrokenInternalLinks, outcome);
    Ok(())
}

pub async fn broken_external_links(ctx: Arc<CheckContext>) -> Result<()> {
    let targets = resolved_targets(&ctx, ctx.page.external_links());
    if targets.is_empty() {
        ctx.sink.record(
            RuleId::BrokenExternalLinks,
            Outcome::not_applicable("no external links to probe", 0),
        );
        return Ok(());
    }

    let (total, broken) = probe_links(&ctx, targets).await;
    let outcome = if broken.is_empty() {
        Outcome::new(0i64, Status::Good, 9, format!("all {total} external links resolve"))
    } else {
        Outcome::new(
            broken.len(),
            Status::Poor,
            4,
            format!("{} of {total} external links are broken", broken.len()),
        )
        .with_detail(
            "broken",
            serde_json::json!(broken.iter().take(10).collect::<Vec<_>>()),
        )
    };
    ctx.sink.record(RuleId::BrokenExternalLinks, outcome);
    Ok(())
}
