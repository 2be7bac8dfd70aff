//! The check catalog: every rule evaluator, grouped by family, plus the
//! registration that hands the scheduler its two typed lists.
//!
//! A check owns one or more rules and is the only writer of those keys.
//! Blocking checks read the page snapshot and response headers; async
//! checks make their own network probes.

pub mod content;
pub mod headings;
pub mod links;
pub mod media;
pub mod meta;
pub mod mobile;
pub mod performance;
pub mod schema;
pub mod security;
pub mod site;

use std::future::Future;
use std::sync::Arc;

use crate::engine::context::CheckContext;
use crate::engine::scheduler::{AsyncCheck, BlockingCheck};

fn blocking(
    name: &'static str,
    ctx: &Arc<CheckContext>,
    f: fn(&CheckContext) -> anyhow::Result<()>,
) -> BlockingCheck {
    let ctx = Arc::clone(ctx);
    BlockingCheck::new(name, move || f(&ctx))
}

fn suspending<F, Fut>(name: &'static str, ctx: &Arc<CheckContext>, f: F) -> AsyncCheck
where
    F: FnOnce(Arc<CheckContext>) -> Fut,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    AsyncCheck::new(name, f(Arc::clone(ctx)))
}

/// Build the full check roster. The blocking/async split is fixed here at
/// registration time; the scheduler never inspects anything.
pub fn register(ctx: &Arc<CheckContext>) -> (Vec<BlockingCheck>, Vec<AsyncCheck>) {
    let blocking_checks = vec![
        blocking("title", ctx, meta::title),
        blocking("meta_description", ctx, meta::description),
        blocking("meta_keywords", ctx, meta::keywords),
        blocking("robots_directives", ctx, meta::robots_directives),
        blocking("canonical_declared", ctx, meta::canonical_declared),
        blocking("document_identity", ctx, meta::document_identity),
        blocking("social_tags", ctx, meta::social_tags),
        blocking("favicon_declared", ctx, meta::favicon_declared),
        blocking("h1_unique", ctx, headings::h1_unique),
        blocking("h2_tags", ctx, headings::h2_tags),
        blocking("heading_structure", ctx, headings::heading_structure),
        blocking("content_length", ctx, content::content_length),
        blocking("keyword_usage", ctx, content::keyword_usage),
        blocking("content_freshness", ctx, content::freshness),
        blocking("duplicate_content", ctx, content::duplicate_content),
        blocking("alt_attributes", ctx, media::alt_attributes),
        blocking("image_dimensions", ctx, media::image_dimensions),
        blocking("image_lazy_loading", ctx, media::image_lazy_loading),
        blocking("link_presence", ctx, links::link_presence),
        blocking("security_headers", ctx, security::security_headers),
        blocking("mixed_content", ctx, security::mixed_content),
        blocking("page_load_time", ctx, performance::page_load_time),
        blocking("page_size", ctx, performance::page_size),
        blocking("gzip_compression", ctx, performance::compression),
        blocking("browser_caching", ctx, performance::browser_caching),
        blocking("inline_styles", ctx, performance::inline_styles),
        blocking("responsive_design", ctx, mobile::responsive_design),
        blocking("structured_data", ctx, schema::structured_data),
    ];

    let async_checks = vec![
        suspending("canonical_valid", ctx, site::canonical_valid),
        suspending("robots_txt_exists", ctx, site::robots_txt),
        suspending("xml_sitemap_exists", ctx, site::xml_sitemap),
        suspending("favicon_reachable", ctx, site::favicon_reachable),
        suspending("redirects", ctx, site::redirects_minimized),
        suspending("https_redirect", ctx, site::https_redirect),
        suspending("page_depth", ctx, site::page_depth),
        suspending("ssl_certificate", ctx, security::ssl_certificate),
        suspending("broken_internal_links", ctx, links::broken_internal_links),
        suspending("broken_external_links", ctx, links::broken_external_links),
        suspending("image_file_size", ctx, media::image_file_size),
    ];

    (blocking_checks, async_checks)
}
