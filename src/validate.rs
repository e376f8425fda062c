//! Aggregator: runs a selection of rules against one rendered page,
//! merges and deduplicates their output, and derives the audit report.
//!
//! Nothing escapes this boundary as a panic. A failure inside a rule is
//! converted into one synthetic `ui`/`high` issue describing the failure.

use crate::dom::RenderContext;
use crate::models::site::SiteMap;
use crate::models::{
    IssueType, Severity, Stakeholder, UxAuditReport, ValidationIssue, ValidationOutcome,
};
use crate::rules::{self, RuleInput, RuleKind};
use chrono::Utc;
use log::{debug, warn};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

#[derive(Debug, Clone)]
/// Which rules run and for which audience.
pub struct RunOptions {
    /// Empty means every rule.
    pub rules: Vec<RuleKind>,
    pub stakeholder: Stakeholder,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            rules: Vec::new(),
            stakeholder: Stakeholder::General,
        }
    }
}

/// Run the selected rules and return their merged, deduplicated issues.
///
/// The outcome always reports `is_validating: false`; the pass is complete
/// when this returns.
pub fn validate_all(
    ctx: &dyn RenderContext,
    site: &SiteMap,
    pathname: &str,
    opts: &RunOptions,
) -> ValidationOutcome {
    let issues = match run_guarded(ctx, site, pathname, opts) {
        Ok(per_rule) => dedupe(per_rule.into_iter().flat_map(|(_, v)| v).collect()),
        Err(message) => vec![failure_issue(pathname, &message)],
    };
    ValidationOutcome {
        issues,
        is_validating: false,
    }
}

/// Report section an issue lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Route,
    Accessibility,
    Responsive,
    Stakeholder,
    General,
}

impl Bucket {
    /// Rules without a report section of their own land in `General`.
    pub fn for_rule(kind: RuleKind) -> Bucket {
        match kind {
            RuleKind::Route => Bucket::Route,
            RuleKind::Accessibility => Bucket::Accessibility,
            RuleKind::Responsive => Bucket::Responsive,
            RuleKind::Stakeholder => Bucket::Stakeholder,
            RuleKind::Performance | RuleKind::Consistency | RuleKind::Interactive => {
                Bucket::General
            }
        }
    }
}

/// Run every rule and bucket the deduplicated issues into a report.
pub fn generate_ux_audit_report(
    ctx: &dyn RenderContext,
    site: &SiteMap,
    pathname: &str,
    stakeholder: Stakeholder,
) -> UxAuditReport {
    let opts = RunOptions {
        rules: Vec::new(),
        stakeholder,
    };
    let bucketed: Vec<(Bucket, ValidationIssue)> = match run_guarded(ctx, site, pathname, &opts) {
        Ok(per_rule) => per_rule
            .into_iter()
            .flat_map(|(kind, v)| v.into_iter().map(move |is| (Bucket::for_rule(kind), is)))
            .collect(),
        // a failed run is not attributable to any rule
        Err(message) => vec![(Bucket::General, failure_issue(pathname, &message))],
    };
    build_report(bucketed)
}

/// Deduplicate bucketed issues and derive counts and suggested fixes.
pub fn build_report(issues: Vec<(Bucket, ValidationIssue)>) -> UxAuditReport {
    let mut report = UxAuditReport {
        timestamp: Utc::now(),
        total_issues: 0,
        high_severity_count: 0,
        medium_severity_count: 0,
        low_severity_count: 0,
        route_issues: Vec::new(),
        accessibility_issues: Vec::new(),
        responsive_issues: Vec::new(),
        stakeholder_issues: Vec::new(),
        general_issues: Vec::new(),
        suggested_fixes: Vec::new(),
    };
    let mut seen: HashSet<(String, String)> = HashSet::new();
    for (bucket, is) in issues {
        if !seen.insert((is.description.clone(), is.location.clone())) {
            continue;
        }
        let target = match bucket {
            Bucket::Route => &mut report.route_issues,
            Bucket::Accessibility => &mut report.accessibility_issues,
            Bucket::Responsive => &mut report.responsive_issues,
            Bucket::Stakeholder => &mut report.stakeholder_issues,
            Bucket::General => &mut report.general_issues,
        };
        target.push(is);
    }
    let (total, high, medium, low, fixes) = {
        let all: Vec<&ValidationIssue> = report.all_issues().collect();
        let count = |sev: Severity| all.iter().filter(|i| i.severity == sev).count();
        (
            all.len(),
            count(Severity::High),
            count(Severity::Medium),
            count(Severity::Low),
            suggested_fixes(all.iter().copied()),
        )
    };
    report.total_issues = total;
    report.high_severity_count = high;
    report.medium_severity_count = medium;
    report.low_severity_count = low;
    report.suggested_fixes = fixes;
    report
}

/// Run rules inside a panic boundary, keeping per-rule output.
fn run_guarded(
    ctx: &dyn RenderContext,
    site: &SiteMap,
    pathname: &str,
    opts: &RunOptions,
) -> Result<Vec<(RuleKind, Vec<ValidationIssue>)>, String> {
    let input = RuleInput {
        ctx,
        site,
        pathname,
        stakeholder: opts.stakeholder,
    };
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        rules::select(&opts.rules)
            .iter()
            .map(|rule| {
                let found = rule.check(&input);
                debug!("rule {} found {} issue(s) on {}", rule.kind(), found.len(), pathname);
                (rule.kind(), found)
            })
            .collect::<Vec<_>>()
    }));
    result.map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown error".to_string());
        warn!("validation failed on {}: {}", pathname, message);
        message
    })
}

fn failure_issue(pathname: &str, message: &str) -> ValidationIssue {
    ValidationIssue::new(
        IssueType::Ui,
        Severity::High,
        format!("Validation system failure: {}", message),
        pathname.to_string(),
    )
    .with_suggestion("Check the captured page and rerun the validator")
    .with_stakeholders(&[Stakeholder::Developer])
}

/// Drop later issues whose (description, location) was already seen.
pub fn dedupe(issues: Vec<ValidationIssue>) -> Vec<ValidationIssue> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    issues
        .into_iter()
        .filter(|i| seen.insert((i.description.clone(), i.location.clone())))
        .collect()
}

/// Keep issues whose severity is in `severities` (empty = all) and which
/// concern `stakeholder` (when given).
pub fn filter_issues(
    issues: &[ValidationIssue],
    severities: &[Severity],
    stakeholder: Option<Stakeholder>,
) -> Vec<ValidationIssue> {
    issues
        .iter()
        .filter(|i| severities.is_empty() || severities.contains(&i.severity))
        .filter(|i| stakeholder.map_or(true, |s| i.concerns(s)))
        .cloned()
        .collect()
}

/// Order by severity (high first), then type; stable within ties.
pub fn sort_issues(issues: &mut [ValidationIssue]) {
    issues.sort_by(|a, b| a.severity.cmp(&b.severity).then(a.issue_type.cmp(&b.issue_type)));
}

/// `"<suggestion> (<location>)"` for each issue with a suggestion, exact
/// duplicates removed.
pub fn suggested_fixes<'a>(issues: impl Iterator<Item = &'a ValidationIssue>) -> Vec<String> {
    let mut seen = HashSet::new();
    issues
        .filter_map(|i| {
            let s = i.suggestion.as_deref()?.trim();
            (!s.is_empty()).then(|| format!("{} ({})", s, i.location))
        })
        .filter(|f| seen.insert(f.clone()))
        .collect()
}
