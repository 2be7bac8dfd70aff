//! Roll-up over a completed result tree: the weighted overall score and the
//! recursive low-rating issues pass. Both are pure functions of the tree,
//! so running them twice always yields identical output.

use crate::domain::models::{Issue, IssueSummary, Outcome, ResultTree, RuleResult};
use crate::domain::rules::RuleId;

/// Ratings below this land in the issues list; 0 means "not scored" and is
/// excluded from both the average and the issues.
const ISSUE_THRESHOLD: u8 = 3;

/// Weighted average of every scored outcome, rounded to 2 decimals. The
/// walk is shallow (section, then rule): a nested rule carries no rating of
/// its own and does not contribute.
pub fn final_rating(tree: &ResultTree) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for rules in tree.0.values() {
        for (name, result) in rules {
            let Some(outcome) = result.as_outcome() else {
                continue;
            };
            if outcome.rating == 0 {
                continue;
            }
            let weight = RuleId::from_name(name).map(|r| r.weight()).unwrap_or(1.0);
            weighted_sum += f64::from(outcome.rating) * weight;
            weight_total += weight;
        }
    }

    if weight_total == 0.0 {
        return 0.0;
    }
    round2(weighted_sum / weight_total)
}

/// Full recursive walk collecting every scored outcome rated below the
/// threshold, however deeply it is nested.
pub fn collect_issues(tree: &ResultTree) -> IssueSummary {
    let mut issues = Vec::new();
    for rules in tree.0.values() {
        for (name, result) in rules {
            collect_from(name, result, &mut issues);
        }
    }
    IssueSummary {
        count: issues.len(),
        issues,
    }
}

fn collect_from(key: &str, result: &RuleResult, issues: &mut Vec<Issue>) {
    match result {
        RuleResult::Outcome(outcome) => {
            if outcome.rating > 0 && outcome.rating < ISSUE_THRESHOLD {
                issues.push(issue_from(key, outcome));
            }
        }
        RuleResult::Nested(children) => {
            for (child_key, child) in children {
                collect_from(child_key, child, issues);
            }
        }
    }
}

fn issue_from(key: &str, outcome: &Outcome) -> Issue {
    Issue {
        key: key.to_string(),
        value: outcome.value.clone(),
        status: outcome.status,
        rating: outcome.rating,
        reason: outcome.reason.clone(),
        category: outcome.category,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Priority, Status};
    use crate::domain::rules::Section;
    use indexmap::IndexMap;

    fn outcome(rating: u8, status: Status) -> RuleResult {
        RuleResult::Outcome(
            Outcome::new(true, status, rating, "test reason")
                .with_category(Priority::AveragePriority),
        )
    }

    fn sample_tree() -> ResultTree {
        let mut tree = ResultTree::default();
        tree.insert(Section::MetaTags, "title_tag", outcome(10, Status::Good));
        tree.insert(Section::MetaTags, "meta_description", outcome(5, Status::NeedsImprovement));
        // not scored: excluded from the average
        tree.insert(
            Section::Content,
            "duplicate_content",
            outcome(0, Status::NotApplicable),
        );
        tree.insert(Section::Links, "broken_internal_links", outcome(2, Status::Poor));

        let mut nested = IndexMap::new();
        nested.insert("summary".to_string(), outcome(9, Status::Good));
        nested.insert("missing_h1".to_string(), outcome(2, Status::Poor));
        tree.insert(Section::Headings, "heading_structure", RuleResult::Nested(nested));
        tree
    }

    #[test]
    fn average_skips_zero_ratings_and_nested_rules() {
        let tree = sample_tree();
        // (10 + 5 + 2) / 3
        assert_eq!(final_rating(&tree), 5.67);
    }

    #[test]
    fn empty_tree_scores_zero() {
        assert_eq!(final_rating(&ResultTree::default()), 0.0);
    }

    #[test]
    fn issues_walk_recurses_into_nested_rules() {
        let summary = collect_issues(&sample_tree());
        let keys: Vec<&str> = summary.issues.iter().map(|i| i.key.as_str()).collect();
        // sections are walked in first-touch insertion order
        assert_eq!(keys, vec!["broken_internal_links", "missing_h1"]);
        assert_eq!(summary.count, 2);
    }

    #[test]
    fn not_scored_outcomes_are_never_issues() {
        let mut tree = ResultTree::default();
        tree.insert(
            Section::Content,
            "duplicate_content",
            outcome(0, Status::NotApplicable),
        );
        assert_eq!(collect_issues(&tree).count, 0);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let tree = sample_tree();
        assert_eq!(final_rating(&tree), final_rating(&tree));
        assert_eq!(collect_issues(&tree), collect_issues(&tree));
    }
}
