//! Security checks: response hardening headers, mixed content and TLS
//! certificate lifetime.

use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::domain::models::{Outcome, Status};
use crate::domain::rules::RuleId;
use crate::engine::context::CheckContext;
use crate::service::tls;

const HARDENING_HEADERS: [&str; 7] = [
    "strict-transport-security",
    "content-security-policy",
    "x-frame-options",
    "x-content-type-options",
    "referrer-policy",
    "permissions-policy",
    "x-xss-protection",
];

pub fn security_headers(ctx: &CheckContext) -> Result<()> {
    let mut found = Vec::new();
    let mut missing = Vec::new();
    for name in HARDENING_HEADERS {
        if ctx.page.response.header(name).is_some() {
            found.push(name);
        } else {
            missing.push(name);
        }
    }

    let pct = found.len() as f64 / HARDENING_HEADERS.len() as f64 * 100.0;
    let (status, rating) = if found.is_empty() {
        (Status::Critical, 1)
    } else if pct < 30.0 {
        (Status::Poor, 3)
    } else if pct < 60.0 {
        (Status::NeedsImprovement, 5)
    } else if pct < 85.0 {
        (Status::Good, 8)
    } else {
        (Status::Excellent, 10)
    };

    let outcome = Outcome::new(
        (pct * 100.0).round() / 100.0,
        status,
        rating,
        format!("{} of {} hardening headers present", found.len(), HARDENING_HEADERS.len()),
    )
    .with_detail("found", serde_json::json!(found))
    .with_detail("missing", serde_json::json!(missing));
    ctx.sink.record(RuleId::SecurityHeaders, outcome);
    Ok(())
}

/// Flags http:// resources embedded in an https page.
pub fn mixed_content(ctx: &CheckContext) -> Result<()> {
    let outcome = if ctx.page.url.scheme() != "https" {
        Outcome::not_applicable("page is not served over https", 0)
    } else if ctx.page.http_resources.is_empty() {
        Outcome::new(0i64, Status::Good, 10, "no insecure resources on an https page")
    } else {
        warn!("[MIXED] {} insecure resources on {}", ctx.page.http_resources.len(), ctx.page.url);
        Outcome::new(
            ctx.page.http_resources.len(),
            Status::Critical,
            2,
            format!("{} resources load over plain http", ctx.page.http_resources.len()),
        )
        .with_detail(
            "insecure",
            serde_json::json!(ctx.page.http_resources.iter().take(10).collect::<Vec<_>>()),
        )
    };
    ctx.sink.record(RuleId::MixedContent, outcome);
    Ok(())
}

pub async fn ssl_certificate(ctx: Arc<CheckContext>) -> Result<()> {
    if ctx.source_url.scheme() != "https" {
        ctx.sink.record(
            RuleId::SslCertificate,
            Outcome::new(false, Status::Poor, 1, "no TLS, page is served over http"),
        );
        return Ok(());
    }

    let Some(host) = ctx.source_url.host_str().map(str::to_owned) else {
        ctx.sink
            .record(RuleId::SslCertificate, Outcome::probe_error("url has no host"));
        return Ok(());
    };
    let port = ctx.source_url.port().unwrap_or(443);

    let outcome = match tls::certificate_days_remaining(
        &host,
        port,
        ctx.config.retry.per_attempt_timeout(),
    )
    .await
    {
        Ok(days) if days < 7 => Outcome::new(
            days,
            Status::Critical,
            1,
            format!("certificate expires in {days} days"),
        ),
        Ok(days) if days < 30 => Outcome::new(
            days,
            Status::Warning,
            4,
            format!("certificate expires in {days} days"),
        ),
        Ok(days) => Outcome::new(days, Status::Good, 10, format!("certificate valid for {days} days")),
        Err(e) => Outcome::new(
            false,
            Status::Critical,
            1,
            format!("TLS handshake failed: {e}"),
        ),
    };
    ctx.sink.record(RuleId::SslCertificate, outcome);
    Ok(())
}
