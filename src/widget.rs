//! Terminal widget over a session's issues.
//!
//! The widget only consumes `WidgetView`; all of its state (filters, folded
//! groups, open/closed) is presentation state and never feeds back into
//! validation.

use crate::models::{IssueType, Severity, ValidationIssue};
use crate::output::{severity_icon, severity_tag};
use crate::session::ValidatorSession;
use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

/// Read-only data the widget renders.
#[derive(Debug, Clone, Copy)]
pub struct WidgetView<'a> {
    pub pathname: &'a str,
    pub issues: &'a [ValidationIssue],
    pub is_validating: bool,
    pub last_validated: Option<DateTime<Utc>>,
}

impl<'a> WidgetView<'a> {
    pub fn of(session: &'a ValidatorSession) -> Self {
        WidgetView {
            pathname: session.pathname(),
            issues: session.issues(),
            is_validating: session.is_validating(),
            last_validated: session.last_validated(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidatorWidget {
    open: bool,
    severities: BTreeSet<Severity>,
    /// `None` until the first non-empty issue list is seen.
    types: Option<BTreeSet<IssueType>>,
    show_suggestions: bool,
    collapsed: BTreeSet<IssueType>,
}

impl Default for ValidatorWidget {
    fn default() -> Self {
        ValidatorWidget {
            open: true,
            severities: Severity::ALL.into_iter().collect(),
            types: None,
            show_suggestions: false,
            collapsed: BTreeSet::new(),
        }
    }
}

impl ValidatorWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the type filter with every observed type on first data.
    pub fn observe(&mut self, issues: &[ValidationIssue]) {
        if self.types.is_none() && !issues.is_empty() {
            self.types = Some(issues.iter().map(|i| i.issue_type).collect());
        }
    }

    pub fn toggle_severity(&mut self, sev: Severity) {
        if !self.severities.remove(&sev) {
            self.severities.insert(sev);
        }
    }

    pub fn toggle_type(&mut self, t: IssueType) {
        let types = self
            .types
            .get_or_insert_with(|| IssueType::ALL.into_iter().collect());
        if !types.remove(&t) {
            types.insert(t);
        }
    }

    pub fn toggle_suggestions(&mut self) {
        self.show_suggestions = !self.show_suggestions;
    }

    /// Expand or collapse one type group.
    pub fn toggle_group(&mut self, t: IssueType) {
        if !self.collapsed.remove(&t) {
            self.collapsed.insert(t);
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn shows_suggestions(&self) -> bool {
        self.show_suggestions
    }

    pub fn is_collapsed(&self, t: IssueType) -> bool {
        self.collapsed.contains(&t)
    }

    fn shows(&self, is: &ValidationIssue) -> bool {
        self.severities.contains(&is.severity)
            && self.types.as_ref().map_or(true, |t| t.contains(&is.issue_type))
    }

    /// Issues passing the current filters, in input order.
    pub fn visible<'a>(&self, issues: &'a [ValidationIssue]) -> Vec<&'a ValidationIssue> {
        issues.iter().filter(|i| self.shows(i)).collect()
    }

    /// Visible issues grouped by type, groups in type order.
    pub fn groups<'a>(
        &self,
        issues: &'a [ValidationIssue],
    ) -> BTreeMap<IssueType, Vec<&'a ValidationIssue>> {
        let mut groups: BTreeMap<IssueType, Vec<&ValidationIssue>> = BTreeMap::new();
        for is in self.visible(issues) {
            groups.entry(is.issue_type).or_default().push(is);
        }
        groups
    }

    /// Render the widget as terminal text. Empty when closed.
    pub fn render(&mut self, view: &WidgetView<'_>, color: bool) -> String {
        if !self.open {
            return String::new();
        }
        self.observe(view.issues);
        let mut out = String::new();
        let title = format!("UX validator · {}", view.pathname);
        let _ = writeln!(out, "{}", if color { title.bold().to_string() } else { title });

        if view.is_validating {
            let _ = writeln!(out, "  ⟳ validating…");
            return out;
        }
        let Some(at) = view.last_validated else {
            let _ = writeln!(out, "  not yet run (type `scan`)");
            return out;
        };
        let stamp = at.format("%H:%M:%S");
        if view.issues.is_empty() {
            let ok = "  ✔ no issues found";
            let ok = if color {
                ok.green().to_string()
            } else {
                ok.to_string()
            };
            let _ = writeln!(out, "{} (checked {})", ok, stamp);
            return out;
        }

        let groups = self.groups(view.issues);
        let shown: usize = groups.values().map(Vec::len).sum();
        let _ = writeln!(
            out,
            "  {} of {} issue(s) shown, checked {}",
            shown,
            view.issues.len(),
            stamp
        );
        if shown == 0 {
            let _ = writeln!(out, "  all issues hidden by filters");
            return out;
        }
        for (t, items) in &groups {
            let folded = self.collapsed.contains(t);
            let marker = if folded { "▸" } else { "▾" };
            let _ = writeln!(out, "  {} {} ({})", marker, t, items.len());
            if folded {
                continue;
            }
            for is in items {
                let _ = writeln!(
                    out,
                    "    {} {} {} @ {}",
                    severity_icon(is.severity, color),
                    severity_tag(is.severity, color),
                    is.description,
                    is.location
                );
                if self.show_suggestions {
                    if let Some(s) = &is.suggestion {
                        let _ = writeln!(out, "        ↳ {}", s);
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn issues() -> Vec<ValidationIssue> {
        vec![
            ValidationIssue::new(IssueType::Route, Severity::High, "bad route", "nav:Main > /x")
                .with_suggestion("Fix the link"),
            ValidationIssue::new(IssueType::Accessibility, Severity::Medium, "no alt", "img"),
            ValidationIssue::new(IssueType::Accessibility, Severity::Low, "gap", "h3"),
        ]
    }

    fn view(issues: &[ValidationIssue]) -> WidgetView<'_> {
        WidgetView {
            pathname: "/audits",
            issues,
            is_validating: false,
            last_validated: Some(Utc::now()),
        }
    }

    #[test]
    fn test_distinct_states() {
        let mut w = ValidatorWidget::new();
        let empty: Vec<ValidationIssue> = Vec::new();
        let never = WidgetView {
            last_validated: None,
            ..view(&empty)
        };
        assert!(w.render(&never, false).contains("not yet run"));
        let running = WidgetView {
            is_validating: true,
            ..view(&empty)
        };
        assert!(w.render(&running, false).contains("validating"));
        assert!(w.render(&view(&empty), false).contains("no issues found"));
    }

    #[test]
    fn test_type_filter_defaults_to_observed() {
        let data = issues();
        let mut w = ValidatorWidget::new();
        w.observe(&[]);
        w.observe(&data);
        let expected: BTreeSet<IssueType> = [IssueType::Route, IssueType::Accessibility].into();
        assert_eq!(w.types, Some(expected));
        // a later type not seen initially is hidden until toggled on
        let mut more = data.clone();
        more.push(ValidationIssue::new(IssueType::Link, Severity::Medium, "dead", "a"));
        assert_eq!(w.visible(&more).len(), 3);
        w.toggle_type(IssueType::Link);
        assert_eq!(w.visible(&more).len(), 4);
    }

    #[test]
    fn test_severity_toggle_and_grouping() {
        let data = issues();
        let mut w = ValidatorWidget::new();
        w.toggle_severity(Severity::Low);
        let groups = w.groups(&data);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&IssueType::Accessibility].len(), 1);
        w.toggle_severity(Severity::Low);
        assert_eq!(w.groups(&data)[&IssueType::Accessibility].len(), 2);
    }

    #[test]
    fn test_render_folding_and_suggestions() {
        let data = issues();
        let mut w = ValidatorWidget::new();
        let text = w.render(&view(&data), false);
        assert!(text.contains("▾ route (1)"));
        assert!(text.contains("bad route @ nav:Main > /x"));
        assert!(!text.contains("↳ Fix the link"));

        w.toggle_suggestions();
        w.toggle_group(IssueType::Accessibility);
        let text = w.render(&view(&data), false);
        assert!(text.contains("↳ Fix the link"));
        assert!(text.contains("▸ accessibility (2)"));
        assert!(!text.contains("no alt"));
    }

    #[test]
    fn test_hidden_by_filters_and_close() {
        let data = issues();
        let mut w = ValidatorWidget::new();
        for s in Severity::ALL {
            w.toggle_severity(s);
        }
        assert!(w.render(&view(&data), false).contains("all issues hidden"));
        w.close();
        assert_eq!(w.render(&view(&data), false), "");
        w.open();
        assert!(w.is_open());
    }
}
