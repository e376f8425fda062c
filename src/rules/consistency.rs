//! Consistency rule: heading hierarchy and styling drift across primary
//! buttons and paragraphs.

use crate::dom::{DomIndex, RenderContext};
use crate::models::snapshot::Element;
use crate::models::{IssueType, Severity, Stakeholder, ValidationIssue};
use std::collections::BTreeSet;

const MAX_PRIMARY_BUTTON_STYLES: usize = 3;
const MAX_PARAGRAPH_STYLES: usize = 5;

pub fn validate_consistency(ctx: &dyn RenderContext) -> Vec<ValidationIssue> {
    let ix = DomIndex::build(ctx.document());
    let mut issues = Vec::new();
    check_heading_gaps(&ix, &mut issues);
    check_primary_buttons(&ix, &mut issues);
    check_paragraphs(&ix, &mut issues);
    issues
}

/// Heading level of `h1`..`h6`.
pub(crate) fn heading_level(el: &Element) -> Option<u8> {
    let rest = el.tag.strip_prefix('h')?;
    match rest.parse::<u8>() {
        Ok(n @ 1..=6) => Some(n),
        _ => None,
    }
}

fn check_heading_gaps(ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    let present: BTreeSet<u8> = ix.elements().filter_map(heading_level).collect();
    for &level in present.iter().filter(|l| **l > 1) {
        if present.contains(&(level - 1)) {
            continue;
        }
        out.push(
            ValidationIssue::new(
                IssueType::Accessibility,
                Severity::Medium,
                format!("Heading hierarchy gap: h{} used without h{}", level, level - 1),
                format!("h{}", level),
            )
            .with_suggestion("Use heading levels in sequence without skipping")
            .with_stakeholders(&[Stakeholder::EndUsers, Stakeholder::Compliance])
            .with_wcag("1.3.1 Info and Relationships"),
        );
    }
}

fn is_primary_button(el: &Element) -> bool {
    (el.is("button") || el.get("role") == Some("button")) && el.has_class_containing("primary")
}

fn check_primary_buttons(ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    let styles: BTreeSet<String> = ix
        .elements()
        .filter(|e| is_primary_button(e))
        .map(Element::class_signature)
        .collect();
    if styles.len() > MAX_PRIMARY_BUTTON_STYLES {
        out.push(
            ValidationIssue::new(
                IssueType::Styling,
                Severity::Low,
                format!("{} different primary button styles found", styles.len()),
                "button[class*=primary]",
            )
            .with_suggestion("Consolidate primary buttons onto one shared component")
            .with_stakeholders(&[Stakeholder::Developer]),
        );
    }
}

fn check_paragraphs(ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    let styles: BTreeSet<String> = ix.by_tag("p").map(Element::class_signature).collect();
    if styles.len() > MAX_PARAGRAPH_STYLES {
        out.push(
            ValidationIssue::new(
                IssueType::Styling,
                Severity::Low,
                format!("{} different paragraph styles found", styles.len()),
                "p",
            )
            .with_suggestion("Use a small set of typography classes for body text")
            .with_stakeholders(&[Stakeholder::Developer]),
        );
    }
}
