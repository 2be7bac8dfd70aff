//! Performance checks driven by the measured response: load time, payload
//! size, compression, caching headers and inline style count.

use anyhow::Result;

use crate::domain::models::{Outcome, Status};
use crate::domain::rules::RuleId;
use crate::engine::context::CheckContext;

pub fn page_load_time(ctx: &CheckContext) -> Result<()> {
    let ms = ctx.page.response.elapsed_ms;
    let seconds = ms as f64 / 1000.0;
    let outcome = if ms < 1_000 {
        Outcome::new(seconds, Status::Good, 10, format!("page answered in {ms} ms"))
    } else if ms < 3_000 {
        Outcome::new(seconds, Status::Good, 7, format!("page answered in {ms} ms"))
    } else {
        Outcome::new(seconds, Status::Poor, 4, format!("slow response, {ms} ms"))
    };
    ctx.sink.record(RuleId::PageLoadTime, outcome);
    Ok(())
}

pub fn page_size(ctx: &CheckContext) -> Result<()> {
    let bytes = ctx.page.response.body_bytes;
    let kb = bytes / 1024;
    let outcome = if bytes < 500 * 1024 {
        Outcome::new(kb, Status::Good, 9, format!("document weighs {kb} KB"))
    } else if bytes < 1_536 * 1024 {
        Outcome::new(kb, Status::NeedsImprovement, 6, format!("document weighs {kb} KB"))
    } else {
        Outcome::new(kb, Status::Poor, 4, format!("heavy document, {kb} KB"))
    };
    ctx.sink.record(RuleId::PageSize, outcome);
    Ok(())
}

pub fn compression(ctx: &CheckContext) -> Result<()> {
    let encoding = ctx
        .page
        .response
        .header("content-encoding")
        .map(str::to_lowercase);
    let compressed = encoding
        .as_deref()
        .map(|e| ["gzip", "br", "zstd"].iter().any(|alg| e.contains(alg)))
        .unwrap_or(false);
    let outcome = if compressed {
        // encoding is Some when compressed is true
        let algo = encoding.unwrap_or_default();
        Outcome::new(algo.as_str(), Status::Good, 9, format!("response compressed with {algo}"))
    } else {
        Outcome::new(false, Status::NeedsImprovement, 5, "response is not compressed")
    };
    ctx.sink.record(RuleId::GzipCompression, outcome);
    Ok(())
}

pub fn browser_caching(ctx: &CheckContext) -> Result<()> {
    let header = ctx
        .page
        .response
        .header("cache-control")
        .map(|v| ("cache-control", v))
        .or_else(|| ctx.page.response.header("expires").map(|v| ("expires", v)));
    let outcome = match header {
        Some((name, value)) => Outcome::new(
            format!("{name}: {value}"),
            Status::Good,
            9,
            "caching policy declared",
        ),
        None => Outcome::new(false, Status::NeedsImprovement, 5, "no caching headers"),
    };
    ctx.sink.record(RuleId::BrowserCaching, outcome);
    Ok(())
}

pub fn inline_styles(ctx: &CheckContext) -> Result<()> {
    let count = ctx.page.inline_style_count;
    let outcome = match count {
        0 => Outcome::new(0i64, Status::Good, 9, "no inline style attributes"),
        n if n <= 10 => Outcome::new(n, Status::Good, 7, format!("{n} inline style attributes")),
        n => Outcome::new(
            n,
            Status::NeedsImprovement,
            5,
            format!("{n} inline style attributes bloat the markup"),
        ),
    };
    ctx.sink.record(RuleId::InlineStyles, outcome);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::CheckValue;
    use crate::domain::rules::Section;
    use crate::test_utils::{ctx_for, page_from_html, page_with_response};

    #[test]
    fn fast_response_scores_ten() {
        let page = page_with_response("<html></html>", "https://example.com/", &[], 250);
        let ctx = ctx_for(page);
        page_load_time(&ctx).unwrap();
        let tree = ctx.sink.snapshot();
        let outcome = tree.outcome(Section::Performance, "page_load_time").unwrap();
        assert_eq!(outcome.rating, 10);
        assert_eq!(outcome.value, CheckValue::Float(0.25));
    }

    #[test]
    fn slow_response_scores_four() {
        let page = page_with_response("<html></html>", "https://example.com/", &[], 4_500);
        let ctx = ctx_for(page);
        page_load_time(&ctx).unwrap();
        let tree = ctx.sink.snapshot();
        assert_eq!(tree.outcome(Section::Performance, "page_load_time").unwrap().rating, 4);
    }

    #[test]
    fn small_document_scores_nine() {
        let ctx = ctx_for(page_from_html("<html><body>tiny</body></html>", "https://example.com/"));
        page_size(&ctx).unwrap();
        let tree = ctx.sink.snapshot();
        assert_eq!(tree.outcome(Section::Performance, "page_size").unwrap().rating, 9);
    }

    #[test]
    fn gzip_encoding_counts_as_compressed() {
        let page = page_with_response(
            "<html></html>",
            "https://example.com/",
            &[("content-encoding", "gzip")],
            10,
        );
        let ctx = ctx_for(page);
        compression(&ctx).unwrap();
        let tree = ctx.sink.snapshot();
        assert_eq!(tree.outcome(Section::Performance, "gzip_compression").unwrap().rating, 9);
    }

    #[test]
    fn expires_header_satisfies_caching() {
        let page = page_with_response(
            "<html></html>",
            "https://example.com/",
            &[("expires", "Thu, 01 Jan 2027 00:00:00 GMT")],
            10,
        );
        let ctx = ctx_for(page);
        browser_caching(&ctx).unwrap();
        let tree = ctx.sink.snapshot();
        assert_eq!(tree.outcome(Section::Performance, "browser_caching").unwrap().rating, 9);
    }

    #[test]
    fn heavy_inline_styling_is_flagged() {
        let spans: String = (0..12).map(|i| format!(r#"<span style="color:red">{i}</span>"#)).collect();
        let html = format!("<html><body>{spans}</body></html>");
        let ctx = ctx_for(page_from_html(&html, "https://example.com/"));
        inline_styles(&ctx).unwrap();
        let tree = ctx.sink.snapshot();
        assert_eq!(tree.outcome(Section::Performance, "inline_styles").unwrap().rating, 5);
    }
}
