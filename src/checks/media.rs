//! Image checks: alt text coverage, intrinsic dimensions, lazy loading and
//! remote file sizes.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;

use crate::domain::models::{Outcome, Status};
use crate::domain::rules::RuleId;
use crate::engine::context::CheckContext;
use crate::service::http;

const OVERSIZED_IMAGE_BYTES: u64 = 200_000;

pub fn alt_attributes(ctx: &CheckContext) -> Result<()> {
    let images = &ctx.page.images;
    let outcome = if images.is_empty() {
        Outcome::not_applicable("no images on the page", 10)
    } else {
        let missing: Vec<&str> = images
            .iter()
            .filter(|img| !img.is_decorative && img.alt.as_deref().map_or(true, str::is_empty))
            .map(|img| img.src.as_str())
            .collect();
        let total = images.len();
        if missing.is_empty() {
            Outcome::new(0i64, Status::Good, 10, format!("all {total} images carry alt text"))
        } else {
            let pct = missing.len() as f64 / total as f64 * 100.0;
            let base = if pct <= 20.0 {
                Outcome::new(
                    missing.len(),
                    Status::NeedsImprovement,
                    6,
                    format!("{} of {total} images lack alt text", missing.len()),
                )
            } else {
                Outcome::new(
                    missing.len(),
                    Status::Poor,
                    3,
                    format!("{} of {total} images lack alt text", missing.len()),
                )
            };
            base.with_detail("missing_alt", serde_json::json!(missing))
                .with_detail("total_images", serde_json::json!(total))
        }
    };
    ctx.sink.record(RuleId::AltAttributes, outcome);
    Ok(())
}

pub fn image_dimensions(ctx: &CheckContext) -> Result<()> {
    let images = &ctx.page.images;
    let outcome = if images.is_empty() {
        Outcome::not_applicable("no images on the page", 10)
    } else {
        let without = images
            .iter()
            .filter(|img| img.width.is_none() || img.height.is_none())
            .count();
        if without == 0 {
            Outcome::new(true, Status::Good, 9, "all images declare width and height")
        } else {
            Outcome::new(
                without,
                Status::NeedsImprovement,
                5,
                format!("{without} images missing explicit dimensions (layout shift risk)"),
            )
        }
    };
    ctx.sink.record(RuleId::ImageDimensions, outcome);
    Ok(())
}

pub fn image_lazy_loading(ctx: &CheckContext) -> Result<()> {
    let images = &ctx.page.images;
    let outcome = if images.is_empty() {
        Outcome::not_applicable("no images on the page", 10)
    } else {
        let lazy = images
            .iter()
            .filter(|img| img.loading.as_deref() == Some("lazy"))
            .count();
        if lazy > 0 {
            Outcome::new(lazy, Status::Good, 9, format!("{lazy} images use lazy loading"))
        } else {
            Outcome::new(0i64, Status::NeedsImprovement, 5, "no images use loading=\"lazy\"")
        }
    };
    ctx.sink.record(RuleId::ImageLazyLoading, outcome);
    Ok(())
}

/// Issues HEAD requests for every distinct image and flags files above the
/// size ceiling using the Content-Length they report.
pub async fn image_file_size(ctx: Arc<CheckContext>) -> Result<()> {
    if ctx.page.images.is_empty() {
        ctx.sink.record(
            RuleId::ImageFileSize,
            Outcome::not_applicable("no images on the page", 10),
        );
        return Ok(());
    }

    let distinct: HashSet<String> = ctx
        .page
        .images
        .iter()
        .filter_map(|img| ctx.base_url.join(&img.src).ok())
        .map(|u| u.to_string())
        .collect();
    let urls: Vec<String> = distinct.into_iter().collect();

    let sizes = http::head_content_lengths(
        &ctx.client,
        &urls,
        ctx.config.max_in_flight_probes,
        &ctx.config.retry,
    )
    .await;

    let oversized: Vec<String> = sizes
        .iter()
        .filter(|(_, len)| len.map_or(false, |l| l > OVERSIZED_IMAGE_BYTES))
        .map(|(url, _)| url.clone())
        .collect();

    let outcome = if oversized.is_empty() {
        Outcome::new(0i64, Status::Good, 9, "no oversized images detected")
    } else {
        Outcome::new(
            oversized.len(),
            Status::NeedsImprovement,
            5,
            format!("{} images exceed {} KB", oversized.len(), OVERSIZED_IMAGE_BYTES / 1000),
        )
        .with_detail("oversized", serde_json::json!(oversized))
    };
    ctx.sink.record(RuleId::ImageFileSize, outcome);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::Section;
    use crate::test_utils::{ctx_for, page_from_html};

    #[test]
    fn no_images_is_not_applicable_but_full_credit() {
        let ctx = ctx_for(page_from_html("<html><body><p>text</p></body></html>", "https://example.com/"));
        alt_attributes(&ctx).unwrap();
        let tree = ctx.sink.snapshot();
        let outcome = tree.outcome(Section::Media, "alt_attributes").unwrap();
        assert_eq!(outcome.status, Status::NotApplicable);
        assert_eq!(outcome.rating, 10);
    }

    #[test]
    fn missing_alt_over_threshold_is_poor() {
        let html = r#"<html><body>
            <img src="/a.png"><img src="/b.png"><img src="/c.png" alt="ok">
        </body></html>"#;
        let ctx = ctx_for(page_from_html(html, "https://example.com/"));
        alt_attributes(&ctx).unwrap();
        let tree = ctx.sink.snapshot();
        let outcome = tree.outcome(Section::Media, "alt_attributes").unwrap();
        assert_eq!(outcome.rating, 3);
        assert_eq!(outcome.status, Status::Poor);
    }

    #[test]
    fn decorative_images_do_not_need_alt() {
        let html = r#"<html><body><img src="/deco.png" role="presentation"></body></html>"#;
        let ctx = ctx_for(page_from_html(html, "https://example.com/"));
        alt_attributes(&ctx).unwrap();
        let tree = ctx.sink.snapshot();
        assert_eq!(tree.outcome(Section::Media, "alt_attributes").unwrap().rating, 10);
    }

    #[test]
    fn declared_dimensions_score_nine() {
        let html = r#"<html><body><img src="/a.png" alt="a" width="100" height="50"></body></html>"#;
        let ctx = ctx_for(page_from_html(html, "https://example.com/"));
        image_dimensions(&ctx).unwrap();
        let tree = ctx.sink.snapshot();
        assert_eq!(tree.outcome(Section::Media, "image_dimensions").unwrap().rating, 9);
    }

    #[tokio::test]
    async fn oversized_image_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _big = server
            .mock("HEAD", "/big.jpg")
            .with_header("content-length", "500000")
            .create_async()
            .await;
        let _small = server
            .mock("HEAD", "/small.jpg")
            .with_header("content-length", "10000")
            .create_async()
            .await;

        let html = r#"<html><body>
            <img src="/big.jpg" alt="b"><img src="/small.jpg" alt="s">
        </body></html>"#;
        let ctx = crate::test_utils::ctx_for(page_from_html(html, &server.url()));
        image_file_size(ctx.clone()).await.unwrap();

        let tree = ctx.sink.snapshot();
        let outcome = tree.outcome(Section::Media, "image_file_size").unwrap();
        assert_eq!(outcome.rating, 5);
        assert_eq!(outcome.details.get("oversized").unwrap().as_array().unwrap().len(), 1);
    }
}
