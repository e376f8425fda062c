//! Route rule: every navigation link must resolve to a known route.

use crate::models::site::{strip_query, SiteMap};
use crate::models::{IssueType, Severity, Stakeholder, ValidationIssue};

/// Check each nav link against the route table.
///
/// Query string and fragment are stripped before an exact match; `/` is
/// always valid.
pub fn validate_routes(site: &SiteMap) -> Vec<ValidationIssue> {
    site.links()
        .filter(|(_, link)| !site.is_known(&link.href))
        .map(|(section, link)| {
            ValidationIssue::new(
                IssueType::Route,
                Severity::High,
                format!(
                    "Navigation link \"{}\" in {} points to unknown route {}",
                    link.title,
                    section,
                    strip_query(&link.href)
                ),
                format!("nav:{} > {}", section, link.href),
            )
            .with_suggestion(format!(
                "Register a route for {} or point \"{}\" at an existing page",
                strip_query(&link.href),
                link.title
            ))
            .with_stakeholders(&[Stakeholder::General])
        })
        .collect()
}

/// Flag the page currently shown when it is not a registered route.
pub fn validate_current_route(site: &SiteMap, pathname: &str) -> Option<ValidationIssue> {
    if site.is_known(pathname) {
        return None;
    }
    Some(
        ValidationIssue::new(
            IssueType::Navigation,
            Severity::Medium,
            format!(
                "Current page {} is not in the route table",
                strip_query(pathname)
            ),
            pathname.to_string(),
        )
        .with_suggestion("Add the page to the route table or redirect to a known route"),
    )
}
