//! Rule validators.
//!
//! Each rule is a stateless inspection of one [`RuleInput`] returning the
//! issues it found. Rules never mutate the document and never depend on
//! one another; failures reading the document are handled inside the rule.

pub mod accessibility;
pub mod color;
pub mod consistency;
pub mod interactive;
pub mod performance;
pub mod responsive;
pub mod route;
pub mod stakeholder;

use crate::dom::RenderContext;
use crate::models::site::SiteMap;
use crate::models::{Stakeholder, ValidationIssue};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
/// Identifies a rule. Declaration order is execution order.
pub enum RuleKind {
    Route,
    Responsive,
    Accessibility,
    Performance,
    Consistency,
    Interactive,
    Stakeholder,
}

impl RuleKind {
    pub const ALL: [RuleKind; 7] = [
        RuleKind::Route,
        RuleKind::Responsive,
        RuleKind::Accessibility,
        RuleKind::Performance,
        RuleKind::Consistency,
        RuleKind::Interactive,
        RuleKind::Stakeholder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Route => "route",
            RuleKind::Responsive => "responsive",
            RuleKind::Accessibility => "accessibility",
            RuleKind::Performance => "performance",
            RuleKind::Consistency => "consistency",
            RuleKind::Interactive => "interactive",
            RuleKind::Stakeholder => "stakeholder",
        }
    }

    pub fn parse(s: &str) -> Option<RuleKind> {
        let s = s.trim();
        RuleKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a rule may read.
pub struct RuleInput<'a> {
    pub ctx: &'a dyn RenderContext,
    pub site: &'a SiteMap,
    pub pathname: &'a str,
    pub stakeholder: Stakeholder,
}

/// A pluggable validation rule.
pub trait Rule: Send + Sync {
    fn kind(&self) -> RuleKind;
    fn check(&self, input: &RuleInput<'_>) -> Vec<ValidationIssue>;
}

struct RouteRule;
struct ResponsiveRule;
struct AccessibilityRule;
struct PerformanceRule;
struct ConsistencyRule;
struct InteractiveRule;
struct StakeholderRule;

impl Rule for RouteRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Route
    }
    fn check(&self, input: &RuleInput<'_>) -> Vec<ValidationIssue> {
        let mut out = route::validate_routes(input.site);
        out.extend(route::validate_current_route(input.site, input.pathname));
        out
    }
}

impl Rule for ResponsiveRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Responsive
    }
    fn check(&self, input: &RuleInput<'_>) -> Vec<ValidationIssue> {
        responsive::validate_responsive(input.ctx)
    }
}

impl Rule for AccessibilityRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Accessibility
    }
    fn check(&self, input: &RuleInput<'_>) -> Vec<ValidationIssue> {
        accessibility::validate_accessibility(input.ctx)
    }
}

impl Rule for PerformanceRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Performance
    }
    fn check(&self, input: &RuleInput<'_>) -> Vec<ValidationIssue> {
        performance::validate_performance(input.ctx)
    }
}

impl Rule for ConsistencyRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Consistency
    }
    fn check(&self, input: &RuleInput<'_>) -> Vec<ValidationIssue> {
        consistency::validate_consistency(input.ctx)
    }
}

impl Rule for InteractiveRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Interactive
    }
    fn check(&self, input: &RuleInput<'_>) -> Vec<ValidationIssue> {
        interactive::validate_interactive(input.ctx)
    }
}

impl Rule for StakeholderRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Stakeholder
    }
    fn check(&self, input: &RuleInput<'_>) -> Vec<ValidationIssue> {
        stakeholder::validate_stakeholder(input.ctx, input.stakeholder)
    }
}

/// Built-in rule for `kind`.
pub fn rule_for(kind: RuleKind) -> Box<dyn Rule> {
    match kind {
        RuleKind::Route => Box::new(RouteRule),
        RuleKind::Responsive => Box::new(ResponsiveRule),
        RuleKind::Accessibility => Box::new(AccessibilityRule),
        RuleKind::Performance => Box::new(PerformanceRule),
        RuleKind::Consistency => Box::new(ConsistencyRule),
        RuleKind::Interactive => Box::new(InteractiveRule),
        RuleKind::Stakeholder => Box::new(StakeholderRule),
    }
}

/// Built-in rules for the selection in execution order. An empty selection
/// means every rule.
pub fn select(kinds: &[RuleKind]) -> Vec<Box<dyn Rule>> {
    RuleKind::ALL
        .into_iter()
        .filter(|k| kinds.is_empty() || kinds.contains(k))
        .map(rule_for)
        .collect()
}

/// Parse a CSS pixel length such as `"120px"` or `"12.5"`.
pub(crate) fn parse_px(v: &str) -> Option<f64> {
    let v = v.trim();
    let num = v.strip_suffix("px").unwrap_or(v).trim();
    num.parse::<f64>().ok()
}

/// Named through `aria-label` or `aria-labelledby`.
pub(crate) fn has_aria_name(el: &crate::models::snapshot::Element) -> bool {
    el.has_value("aria-label") || el.has_value("aria-labelledby")
}
