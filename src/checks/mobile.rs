//! Mobile readiness: viewport meta tag.

use anyhow::Result;

use crate::domain::models::{Outcome, Status};
use crate::domain::rules::RuleId;
use crate::engine::context::CheckContext;

pub fn responsive_design(ctx: &CheckContext) -> Result<()> {
    let outcome = if ctx.page.has_viewport() {
        Outcome::new(true, Status::Good, 10, "viewport meta tag present")
    } else {
        Outcome::new(false, Status::Critical, 2, "no viewport meta tag, page is not mobile ready")
    };
    ctx.sink.record(RuleId::ResponsiveDesign, outcome);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::Section;
    use crate::test_utils::{ctx_for, page_from_html};

    #[test]
    fn viewport_tag_scores_ten() {
        let ctx = ctx_for(page_from_html(
            r#"<html><head><meta name="viewport" content="width=device-width"></head></html>"#,
            "https://example.com/",
        ));
        responsive_design(&ctx).unwrap();
        let tree = ctx.sink.snapshot();
        assert_eq!(tree.outcome(Section::Mobile, "responsive_design").unwrap().rating, 10);
    }

    #[test]
    fn missing_viewport_is_critical() {
        let ctx = ctx_for(page_from_html("<html><head></head></html>", "https://example.com/"));
        responsive_design(&ctx).unwrap();
        let tree = ctx.sink.snapshot();
        let outcome = tree.outcome(Section::Mobile, "responsive_design").unwrap();
        assert_eq!(outcome.status, Status::Critical);
        assert_eq!(outcome.rating, 2);
    }
}
