//! Content checks: length, target-keyword usage, freshness signals and a
//! duplicate-content placeholder.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

use crate::domain::models::{Outcome, Status};
use crate::domain::rules::RuleId;
use crate::engine::context::CheckContext;

pub fn content_length(ctx: &CheckContext) -> Result<()> {
    let words = ctx.page.word_count();
    let outcome = match words {
        0 => Outcome::new(0i64, Status::Critical, 1, "page has no readable text"),
        w if w >= 600 => Outcome::new(w, Status::Excellent, 10, format!("{w} words, substantial content")),
        w if w >= 300 => Outcome::new(w, Status::Good, 7, format!("{w} words, adequate content")),
        w => Outcome::new(w, Status::Poor, 4, format!("thin content, only {w} words")),
    };
    ctx.sink.record(RuleId::ContentLength, outcome);
    Ok(())
}

/// Title, H1 and density checks for the target keyword. When no keyword was
/// supplied all three are recorded as not-applicable.
pub fn keyword_usage(ctx: &CheckContext) -> Result<()> {
    let Some(keyword) = ctx.keyword.as_deref() else {
        for rule in [RuleId::KeywordInTitle, RuleId::KeywordInH1, RuleId::KeywordDensity] {
            ctx.sink
                .record(rule, Outcome::not_applicable("no target keyword supplied", 0));
        }
        return Ok(());
    };

    let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword)))?;

    let in_title = match ctx.page.title.as_deref() {
        Some(title) if pattern.is_match(title) => {
            Outcome::new(true, Status::Good, 10, "keyword appears in the title")
        }
        Some(_) => Outcome::new(false, Status::Poor, 3, "keyword missing from the title"),
        None => Outcome::new(false, Status::Poor, 2, "no title to match against"),
    };
    ctx.sink.record(RuleId::KeywordInTitle, in_title);

    let in_h1 = if ctx.page.h1_texts().iter().any(|h| pattern.is_match(h)) {
        Outcome::new(true, Status::Good, 9, "keyword appears in an H1")
    } else {
        Outcome::new(false, Status::Poor, 4, "keyword missing from H1 headings")
    };
    ctx.sink.record(RuleId::KeywordInH1, in_h1);

    let words = ctx.page.word_count();
    let occurrences = pattern.find_iter(&ctx.page.body_text).count();
    let density = if words == 0 {
        0.0
    } else {
        (occurrences as f64 / words as f64 * 100.0 * 100.0).round() / 100.0
    };
    let density_outcome = if occurrences == 0 {
        Outcome::new(density, Status::Poor, 2, "keyword does not appear in the body")
    } else if (1.0..=3.0).contains(&density) {
        Outcome::new(density, Status::Good, 9, format!("keyword density {density:.2}% is healthy"))
    } else if density < 1.0 {
        Outcome::new(
            density,
            Status::NeedsImprovement,
            5,
            format!("keyword density {density:.2}% is low"),
        )
    } else {
        Outcome::new(
            density,
            Status::Warning,
            4,
            format!("keyword density {density:.2}% suggests stuffing"),
        )
    };
    ctx.sink.record(RuleId::KeywordDensity, density_outcome);
    Ok(())
}

/// Looks for a publish or modification date in headers, meta tags and body
/// text, then rates how recent it is.
pub fn freshness(ctx: &CheckContext) -> Result<()> {
    let found = detect_date(ctx);
    let outcome = match found {
        Some((date, source)) => {
            let age_days = (Utc::now() - date).num_days();
            let base = if age_days <= 30 {
                Outcome::new(date.to_rfc3339(), Status::Good, 9, format!("updated {age_days} days ago"))
            } else if age_days <= 180 {
                Outcome::new(
                    date.to_rfc3339(),
                    Status::NeedsImprovement,
                    6,
                    format!("last update {age_days} days ago"),
                )
            } else {
                Outcome::new(
                    date.to_rfc3339(),
                    Status::Poor,
                    4,
                    format!("content is stale, last update {age_days} days ago"),
                )
            };
            base.with_detail("source", serde_json::json!(source))
        }
        None => Outcome::not_applicable("no date signal found on the page", 0),
    };
    ctx.sink.record(RuleId::ContentFreshness, outcome);
    Ok(())
}

fn detect_date(ctx: &CheckContext) -> Option<(DateTime<Utc>, &'static str)> {
    if let Some(value) = ctx.page.response.header("last-modified") {
        if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
            return Some((parsed.with_timezone(&Utc), "last-modified header"));
        }
    }
    for key in ["article:published_time", "article:modified_time", "date"] {
        if let Some(value) = ctx.page.meta(key) {
            if let Some(parsed) = parse_loose_date(value) {
                return Some((parsed, "meta tag"));
            }
        }
    }
    static DATE_RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let re = DATE_RE.get_or_init(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").unwrap_or_else(|_| unreachable!()));
    if let Some(m) = re.find(&ctx.page.body_text) {
        if let Some(parsed) = parse_loose_date(m.as_str()) {
            return Some((parsed, "body text"));
        }
    }
    None
}

fn parse_loose_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
}

/// Duplicate detection needs a corpus of other pages to compare against,
/// which a single-page scan does not have.
pub fn duplicate_content(ctx: &CheckContext) -> Result<()> {
    ctx.sink.record(
        RuleId::DuplicateContent,
        Outcome::not_applicable("duplicate detection requires a content corpus", 0),
    );
    Ok(())
}
