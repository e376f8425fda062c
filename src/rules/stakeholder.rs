//! Stakeholder rule.
//!
//! Common checks run for every audience: nav typography, focus
//! indicators, and heading jumps in reading order. Audience checks add:
//! - auditor: untagged code blocks, tables without header cells,
//! - project-owner: unnamed charts, dashboards not laid out with grid/flex,
//! - admin: unnamed bulk-action controls and status indicators.

use super::consistency::heading_level;
use super::has_aria_name;
use crate::dom::{DomIndex, RenderContext};
use crate::models::snapshot::Element;
use crate::models::{IssueType, Severity, Stakeholder, ValidationIssue};
use std::collections::BTreeSet;

pub fn validate_stakeholder(
    ctx: &dyn RenderContext,
    stakeholder: Stakeholder,
) -> Vec<ValidationIssue> {
    let ix = DomIndex::build(ctx.document());
    let mut issues = Vec::new();
    check_nav_typography(ctx, &ix, &mut issues);
    check_focus_indicators(ctx, &ix, &mut issues);
    check_heading_jumps(&ix, &mut issues);
    match stakeholder {
        Stakeholder::Auditor => check_auditor(&ix, &mut issues),
        Stakeholder::ProjectOwner => check_project_owner(ctx, &ix, &mut issues),
        Stakeholder::Admin => check_admin(&ix, &mut issues),
        _ => {}
    }
    issues
}

fn check_nav_typography(ctx: &dyn RenderContext, ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    let mut sizes = BTreeSet::new();
    let mut weights = BTreeSet::new();
    for idx in ix.positions("a") {
        if !ix.has_ancestor(idx, "nav") {
            continue;
        }
        let Ok(style) = ctx.computed_style(ix.nodes()[idx].el) else {
            continue;
        };
        // f64 is not Ord; compare at 0.01px
        sizes.insert((style.font_size * 100.0).round() as i64);
        weights.insert(style.font_weight.clone());
    }
    if sizes.len() > 1 || weights.len() > 1 {
        out.push(
            ValidationIssue::new(
                IssueType::Styling,
                Severity::Low,
                format!(
                    "Navigation links use {} font sizes and {} font weights",
                    sizes.len(),
                    weights.len()
                ),
                "nav a",
            )
            .with_suggestion("Give all navigation links the same typography")
            .with_stakeholders(&[Stakeholder::General]),
        );
    }
}

fn is_focusable(el: &Element) -> bool {
    if el.has("disabled") {
        return false;
    }
    match el.tag.as_str() {
        "a" => el.has("href"),
        "button" | "select" | "textarea" => true,
        "input" => el.get("type") != Some("hidden"),
        _ => el
            .get("tabindex")
            .and_then(|t| t.trim().parse::<i32>().ok())
            .is_some_and(|t| t >= 0),
    }
}

fn check_focus_indicators(ctx: &dyn RenderContext, ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    for el in ix.elements().filter(|e| is_focusable(e)) {
        let Ok(style) = ctx.computed_style(el) else {
            continue;
        };
        if !style.is_visible() {
            continue;
        }
        let no_outline = style.outline_style == "none" || style.outline_width <= 0.0;
        let no_shadow = style.box_shadow.trim().is_empty() || style.box_shadow == "none";
        if no_outline && no_shadow {
            out.push(
                ValidationIssue::new(
                    IssueType::Accessibility,
                    Severity::Medium,
                    "Focusable element has no visible focus indicator",
                    el.describe(),
                )
                .with_suggestion("Keep an outline or add a focus ring via :focus-visible")
                .with_stakeholders(&[Stakeholder::General, Stakeholder::EndUsers])
                .with_wcag("2.4.7 Focus Visible"),
            );
        }
    }
}

fn check_heading_jumps(ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    let mut prev: Option<u8> = None;
    for el in ix.elements() {
        let Some(level) = heading_level(el) else {
            continue;
        };
        if let Some(p) = prev {
            if level > p + 1 {
                out.push(
                    ValidationIssue::new(
                        IssueType::Accessibility,
                        Severity::Medium,
                        format!("Heading level skips from h{} to h{}", p, level),
                        el.describe(),
                    )
                    .with_suggestion("Do not skip heading levels in reading order")
                    .with_stakeholders(&[Stakeholder::General])
                    .with_wcag("1.3.1 Info and Relationships"),
                );
            }
        }
        prev = Some(level);
    }
}

fn check_auditor(ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    for code in ix.by_tag("code") {
        if code.has_value("lang") || code.classes().iter().any(|c| c.starts_with("language-")) {
            continue;
        }
        out.push(
            ValidationIssue::new(
                IssueType::Content,
                Severity::Low,
                "Code block does not declare its language",
                code.describe(),
            )
            .with_suggestion("Add a lang attribute or language-* class for highlighting")
            .with_stakeholders(&[Stakeholder::Auditor]),
        );
    }
    for table in ix.by_tag("table") {
        if has_descendant(table, "th") {
            continue;
        }
        out.push(
            ValidationIssue::new(
                IssueType::Accessibility,
                Severity::Medium,
                "Data table has no header cells",
                table.describe(),
            )
            .with_suggestion("Use <th> cells with scope for column and row headers")
            .with_stakeholders(&[Stakeholder::Auditor])
            .with_wcag("1.3.1 Info and Relationships"),
        );
    }
}

fn has_descendant(el: &Element, tag: &str) -> bool {
    el.children.iter().any(|c| c.is(tag) || has_descendant(c, tag))
}

fn is_chart(el: &Element) -> bool {
    el.is("canvas") || el.is("svg") || el.has_class_containing("chart")
}

fn check_project_owner(ctx: &dyn RenderContext, ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    for (idx, node) in ix.nodes().iter().enumerate() {
        let el = node.el;
        if !is_chart(el) || has_aria_name(el) || el.has_value("title") {
            continue;
        }
        // svg icons inside an already-flagged chart container are covered by it
        if el.is("svg") && ix.ancestors(idx).any(is_chart) {
            continue;
        }
        out.push(
            ValidationIssue::new(
                IssueType::Accessibility,
                Severity::Medium,
                "Chart has no accessible name",
                el.describe(),
            )
            .with_suggestion("Add aria-label or a text summary describing the chart")
            .with_stakeholders(&[Stakeholder::ProjectOwner])
            .with_wcag("1.1.1 Non-text Content"),
        );
    }
    for el in ix.elements().filter(|e| e.has_class_containing("dashboard")) {
        let Ok(style) = ctx.computed_style(el) else {
            continue;
        };
        let display = style.display.as_str();
        if matches!(display, "grid" | "inline-grid" | "flex" | "inline-flex" | "none") {
            continue;
        }
        out.push(
            ValidationIssue::new(
                IssueType::Ui,
                Severity::Low,
                format!("Dashboard container uses display: {}", display),
                el.describe(),
            )
            .with_suggestion("Lay out dashboard panels with CSS grid or flexbox")
            .with_stakeholders(&[Stakeholder::ProjectOwner]),
        );
    }
}

fn has_name(el: &Element) -> bool {
    has_aria_name(el) || el.has_value("title") || !el.text_content().trim().is_empty()
}

fn check_admin(ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    for el in ix.elements() {
        let bulk = el.has("data-bulk-action") || el.has_class_containing("bulk");
        let status = el.get("role") == Some("status") || el.has_class_containing("status");
        if !(bulk || status) || has_name(el) {
            continue;
        }
        let what = if bulk {
            "Bulk-action control"
        } else {
            "Status indicator"
        };
        out.push(
            ValidationIssue::new(
                IssueType::Accessibility,
                Severity::Medium,
                format!("{} has no accessible name", what),
                el.describe(),
            )
            .with_suggestion("Add aria-label or visible text describing the control or status")
            .with_stakeholders(&[Stakeholder::Admin])
            .with_wcag("4.1.2 Name, Role, Value"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::snapshot::{ComputedStyle, DomSnapshot};

    fn page(body: Vec<Element>) -> DomSnapshot {
        DomSnapshot::new(Element::new("body").children(body))
    }

    fn descs(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.description.as_str()).collect()
    }

    #[test]
    fn test_nav_typography() {
        let link = |size: f64, weight: &str| {
            Element::new("a").attr("href", "/x").styled(ComputedStyle {
                font_size: size,
                font_weight: weight.into(),
                ..Default::default()
            })
        };
        let mixed = page(vec![Element::new("nav").children(vec![
            link(16.0, "400"),
            link(14.0, "400"),
        ])]);
        assert_eq!(
            descs(&validate_stakeholder(&mixed, Stakeholder::General)),
            vec!["Navigation links use 2 font sizes and 1 font weights"]
        );
        // links outside nav are not compared
        let outside = page(vec![
            Element::new("nav").child(link(16.0, "400")),
            link(12.0, "700"),
        ]);
        assert!(validate_stakeholder(&outside, Stakeholder::General).is_empty());
    }

    #[test]
    fn test_focus_indicator() {
        let snap = page(vec![
            Element::new("button").text("bare").styled(ComputedStyle {
                outline_style: "none".into(),
                ..Default::default()
            }),
            Element::new("button").text("ring").styled(ComputedStyle {
                outline_style: "none".into(),
                box_shadow: "0 0 0 2px blue".into(),
                ..Default::default()
            }),
            Element::new("div").text("static").styled(ComputedStyle {
                outline_style: "none".into(),
                ..Default::default()
            }),
        ]);
        let issues = validate_stakeholder(&snap, Stakeholder::General);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location, "button");
        assert_eq!(issues[0].wcag_criterion.as_deref(), Some("2.4.7 Focus Visible"));
    }

    #[test]
    fn test_heading_jump_in_reading_order() {
        let snap = page(vec![
            Element::new("h1"),
            Element::new("h2"),
            Element::new("h4"),
            Element::new("h2"),
        ]);
        assert_eq!(
            descs(&validate_stakeholder(&snap, Stakeholder::General)),
            vec!["Heading level skips from h2 to h4"]
        );
    }

    #[test]
    fn test_auditor_checks_only_for_auditors() {
        let snap = page(vec![
            Element::new("pre").child(Element::new("code").text("fn main() {}")),
            Element::new("pre").child(Element::new("code").attr("class", "language-rust")),
            Element::new("table").child(
                Element::new("tr").child(Element::new("td").text("1")),
            ),
            Element::new("table").child(
                Element::new("thead").child(Element::new("tr").child(Element::new("th"))),
            ),
        ]);
        assert!(validate_stakeholder(&snap, Stakeholder::General).is_empty());
        let issues = validate_stakeholder(&snap, Stakeholder::Auditor);
        assert_eq!(
            descs(&issues),
            vec![
                "Code block does not declare its language",
                "Data table has no header cells"
            ]
        );
        assert!(issues
            .iter()
            .all(|i| i.affected_stakeholders.as_deref() == Some(&[Stakeholder::Auditor][..])));
    }

    #[test]
    fn test_project_owner_checks() {
        let block = ComputedStyle {
            display: "block".into(),
            ..Default::default()
        };
        let snap = page(vec![
            Element::new("div")
                .attr("class", "dashboard")
                .styled(block.clone())
                .child(Element::new("canvas").attr("id", "tvl"))
                .child(Element::new("canvas").attr("aria-label", "Audit volume")),
            Element::new("div")
                .attr("class", "recharts-wrapper")
                .child(Element::new("svg")),
            Element::new("div")
                .attr("class", "dashboard-grid")
                .styled(ComputedStyle {
                    display: "grid".into(),
                    ..Default::default()
                }),
        ]);
        let issues = validate_stakeholder(&snap, Stakeholder::ProjectOwner);
        let locs: Vec<_> = issues.iter().map(|i| i.location.as_str()).collect();
        assert_eq!(locs, vec!["canvas#tvl", "div.recharts-wrapper", "div.dashboard"]);
    }

    #[test]
    fn test_admin_checks() {
        let snap = page(vec![
            Element::new("button").attr("data-bulk-action", "approve"),
            Element::new("button").attr("class", "bulk-delete").text("Delete selected"),
            Element::new("span").attr("role", "status"),
            Element::new("span").attr("class", "status-dot").attr("aria-label", "Online"),
        ]);
        let issues = validate_stakeholder(&snap, Stakeholder::Admin);
        assert_eq!(
            descs(&issues),
            vec![
                "Bulk-action control has no accessible name",
                "Status indicator has no accessible name"
            ]
        );
    }
}
