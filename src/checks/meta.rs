//! Meta-tag checks: title, description, robots directives, canonical
//! declaration, document identity and social markup.

use anyhow::Result;

use crate::domain::models::{Outcome, Status};
use crate::domain::rules::RuleId;
use crate::engine::context::CheckContext;

const TITLE_IDEAL: std::ops::RangeInclusive<usize> = 50..=60;
const DESCRIPTION_IDEAL: std::ops::RangeInclusive<usize> = 150..=160;

pub fn title(ctx: &CheckContext) -> Result<()> {
    match ctx.page.title.as_deref() {
        Some(text) => {
            ctx.sink.record(
                RuleId::TitleTag,
                Outcome::new(true, Status::Good, 10, "title tag is present"),
            );
            let len = text.chars().count();
            let outcome = if TITLE_IDEAL.contains(&len) {
                Outcome::new(len, Status::Good, 10, format!("title length {len} is ideal (50-60)"))
            } else {
                Outcome::new(
                    len,
                    Status::NeedsImprovement,
                    5,
                    format!("title length {len} is outside the ideal 50-60 range"),
                )
            };
            ctx.sink.record(RuleId::TitleTagLength, outcome);
        }
        None => {
            ctx.sink.record(
                RuleId::TitleTag,
                Outcome::new(false, Status::Critical, 1, "page has no title tag"),
            );
            ctx.sink.record(
                RuleId::TitleTagLength,
                Outcome::new(0i64, Status::Poor, 1, "no title to measure"),
            );
        }
    }
    Ok(())
}

pub fn description(ctx: &CheckContext) -> Result<()> {
    match ctx.page.meta("description") {
        Some(text) => {
            ctx.sink.record(
                RuleId::MetaDescription,
                Outcome::new(true, Status::Good, 10, "meta description is present"),
            );
            let len = text.chars().count();
            let outcome = if DESCRIPTION_IDEAL.contains(&len) {
                Outcome::new(
                    len,
                    Status::Good,
                    10,
                    format!("description length {len} is ideal (150-160)"),
                )
            } else {
                Outcome::new(
                    len,
                    Status::NeedsImprovement,
                    5,
                    format!("description length {len} is outside the ideal 150-160 range"),
                )
            };
            ctx.sink.record(RuleId::MetaDescriptionLength, outcome);
        }
        None => {
            ctx.sink.record(
                RuleId::MetaDescription,
                Outcome::new(false, Status::Poor, 1, "page has no meta description"),
            );
            ctx.sink.record(
                RuleId::MetaDescriptionLength,
                Outcome::new(0i64, Status::Poor, 1, "no description to measure"),
            );
        }
    }
    Ok(())
}

pub fn keywords(ctx: &CheckContext) -> Result<()> {
    let outcome = match ctx.page.meta("keywords") {
        Some(_) => Outcome::new(true, Status::Good, 8, "meta keywords present (minor signal)"),
        None => Outcome::new(false, Status::NeedsImprovement, 5, "no meta keywords tag"),
    };
    ctx.sink.record(RuleId::MetaKeywords, outcome);
    Ok(())
}

/// robots meta tag plus the noindex/nofollow directives it may carry.
pub fn robots_directives(ctx: &CheckContext) -> Result<()> {
    let robots = ctx.page.robots_meta().map(|s| s.to_lowercase());

    let presence = match &robots {
        Some(content) => Outcome::new(content.as_str(), Status::Good, 9, "robots meta tag present"),
        None => Outcome::new(
            false,
            Status::NeedsImprovement,
            5,
            "no robots meta tag (defaults to index,follow)",
        ),
    };
    ctx.sink.record(RuleId::RobotsMetaTag, presence);

    let noindex = robots.as_deref().map(|c| c.contains("noindex")).unwrap_or(false);
    ctx.sink.record(
        RuleId::NoindexCheck,
        if noindex {
            Outcome::new(true, Status::Critical, 1, "page is marked noindex and will not rank")
        } else {
            Outcome::new(false, Status::Good, 10, "page is indexable")
        },
    );

    let nofollow = robots.as_deref().map(|c| c.contains("nofollow")).unwrap_or(false);
    ctx.sink.record(
        RuleId::NofollowCheck,
        if nofollow {
            Outcome::new(true, Status::Warning, 4, "page-level nofollow blocks link equity")
        } else {
            Outcome::new(false, Status::Good, 10, "links on the page are followed")
        },
    );
    Ok(())
}

pub fn canonical_declared(ctx: &CheckContext) -> Result<()> {
    let outcome = match ctx.page.canonical.as_deref() {
        Some(href) => Outcome::new(href, Status::Good, 9, "canonical tag present"),
        None => Outcome::new(false, Status::NeedsImprovement, 5, "no canonical tag"),
    };
    ctx.sink.record(RuleId::CanonicalTagExists, outcome);
    Ok(())
}

/// `<html lang>` and the declared character encoding.
pub fn document_identity(ctx: &CheckContext) -> Result<()> {
    let lang = match ctx.page.lang.as_deref() {
        Some(lang) => Outcome::new(lang, Status::Good, 9, "html lang attribute declared"),
        None => Outcome::new(false, Status::Poor, 4, "missing html lang attribute"),
    };
    ctx.sink.record(RuleId::HtmlLang, lang);

    let header_charset = ctx
        .page
        .response
        .header("content-type")
        .map(|ct| ct.to_lowercase().contains("charset"))
        .unwrap_or(false);
    let charset = match (&ctx.page.charset, header_charset) {
        (Some(cs), _) => Outcome::new(cs.as_str(), Status::Good, 9, "charset declared in markup"),
        (None, true) => Outcome::new(true, Status::Good, 8, "charset declared via Content-Type header"),
        (None, false) => Outcome::new(false, Status::Poor, 4, "no character encoding declared"),
    };
    ctx.sink.record(RuleId::CharsetDeclared, charset);
    Ok(())
}

pub fn social_tags(ctx: &CheckContext) -> Result<()> {
    let og_present = ["og:title", "og:description", "og:image"]
        .iter()
        .filter(|key| ctx.page.meta(key).is_some())
        .count();
    let og = match og_present {
        3 => Outcome::new(3i64, Status::Good, 10, "all core Open Graph tags present"),
        0 => Outcome::new(0i64, Status::Poor, 4, "no Open Graph tags"),
        n => Outcome::new(
            n,
            Status::NeedsImprovement,
            6,
            format!("{n} of 3 core Open Graph tags present"),
        ),
    };
    ctx.sink.record(RuleId::OpenGraphTags, og);

    let twitter = match ctx.page.meta("twitter:card") {
        Some(kind) => Outcome::new(kind, Status::Good, 9, "twitter card declared"),
        None => Outcome::new(false, Status::NeedsImprovement, 5, "no twitter card tag"),
    };
    ctx.sink.record(RuleId::TwitterCard, twitter);
    Ok(())
}

pub fn favicon_declared(ctx: &CheckContext) -> Result<()> {
    let outcome = if ctx.page.favicons.is_empty() {
        Outcome::new(
            false,
            Status::NeedsImprovement,
            5,
            "no favicon declared (browsers fall back to /favicon.ico)",
        )
    } else {
        Outcome::new(ctx.page.favicons.len(), Status::Good, 9, "favicon declared")
    };
    ctx.sink.record(RuleId::FaviconDeclared, outcome);
    Ok(())
}
