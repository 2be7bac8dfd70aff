//! Heading checks: H1 uniqueness, H2 presence and hierarchy order.

use anyhow::Result;

use crate::domain::models::{Outcome, Status};
use crate::domain::rules::RuleId;
use crate::engine::context::CheckContext;

pub fn h1_unique(ctx: &CheckContext) -> Result<()> {
    let count = ctx.page.h1_texts().len();
    let outcome = match count {
        1 => Outcome::new(1i64, Status::Good, 10, "exactly one H1"),
        0 => Outcome::new(0i64, Status::Poor, 3, "page has no H1"),
        n => Outcome::new(
            n,
            Status::NeedsImprovement,
            5,
            format!("{n} H1 tags dilute the main topic"),
        ),
    };
    ctx.sink.record(RuleId::H1Unique, outcome);
    Ok(())
}

pub fn h2_tags(ctx: &CheckContext) -> Result<()> {
    let count = ctx.page.headings.iter().filter(|h| h.level == 2).count();
    let outcome = if count > 0 {
        Outcome::new(count, Status::Good, 9, "H2 subheadings present")
    } else {
        Outcome::new(0i64, Status::NeedsImprovement, 5, "no H2 subheadings")
    };
    ctx.sink.record(RuleId::H2TagsExist, outcome);
    Ok(())
}

/// Walks headings in document order and flags level jumps greater than one,
/// e.g. an H1 followed directly by an H3.
pub fn heading_structure(ctx: &CheckContext) -> Result<()> {
    let headings = &ctx.page.headings;

    let summary = if headings.is_empty() {
        Outcome::new(false, Status::NotApplicable, 0, "page has no headings to order")
    } else {
        let mut skips: Vec<String> = Vec::new();
        for pair in headings.windows(2) {
            if pair[1].level > pair[0].level + 1 {
                skips.push(format!("H{} to H{}", pair[0].level, pair[1].level));
            }
        }
        if skips.is_empty() {
            Outcome::new(true, Status::Good, 9, "heading levels descend without skips")
        } else {
            Outcome::new(
                false,
                Status::Poor,
                3,
                format!("heading levels skipped: {}", skips.join(", ")),
            )
            .with_detail("skipped_levels", serde_json::json!(skips))
        }
    };

    let mut entries = vec![("summary".to_string(), summary)];
    if ctx.page.h1_texts().is_empty() {
        entries.push((
            "missing_h1".to_string(),
            Outcome::new(false, Status::Poor, 2, "document hierarchy has no H1 root"),
        ));
    }
    ctx.sink.record_nested(RuleId::HeadingStructure, entries);
    Ok(())
}
