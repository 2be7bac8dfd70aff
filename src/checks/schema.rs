//! Structured data: JSON-LD blocks.

use anyhow::Result;

use crate::domain::models::{Outcome, Status};
use crate::domain::rules::RuleId;
use crate::engine::context::CheckContext;

pub fn structured_data(ctx: &CheckContext) -> Result<()> {
    let count = ctx.page.json_ld_count;
    let outcome = if count > 0 {
        Outcome::new(count, Status::Good, 9, format!("{count} JSON-LD blocks found"))
    } else {
        Outcome::new(0i64, Status::NeedsImprovement, 5, "no structured data markup")
    };
    ctx.sink.record(RuleId::StructuredData, outcome);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::Section;
    use crate::test_utils::{ctx_for, page_from_html};

    #[test]
    fn json_ld_block_scores_nine() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type":"Article"}</script>
        </head></html>"#;
        let ctx = ctx_for(page_from_html(html, "https://example.com/"));
        structured_data(&ctx).unwrap();
        let tree = ctx.sink.snapshot();
        assert_eq!(tree.outcome(Section::Schema, "structured_data").unwrap().rating, 9);
    }

    #[test]
    fn absent_markup_scores_five() {
        let ctx = ctx_for(page_from_html("<html></html>", "https://example.com/"));
        structured_data(&ctx).unwrap();
        let tree = ctx.sink.snapshot();
        assert_eq!(tree.outcome(Section::Schema, "structured_data").unwrap().rating, 5);
    }
}
