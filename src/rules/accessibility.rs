//! Accessibility rule: alt text, form labels, button names, text
//! contrast, and keyboard reachability.

use super::color::{contrast_ratio, is_large_text, parse_color, Rgba};
use super::has_aria_name;
use crate::dom::{DomIndex, RenderContext};
use crate::models::snapshot::Element;
use crate::models::{IssueType, Severity, Stakeholder, ValidationIssue};
use log::debug;

const MIN_CONTRAST: f64 = 4.5;
const MIN_CONTRAST_LARGE: f64 = 3.0;

pub fn validate_accessibility(ctx: &dyn RenderContext) -> Vec<ValidationIssue> {
    let ix = DomIndex::build(ctx.document());
    let mut issues = Vec::new();
    check_image_alt(&ix, &mut issues);
    check_form_labels(&ix, &mut issues);
    check_button_names(&ix, &mut issues);
    check_contrast(ctx, &ix, &mut issues);
    check_negative_tabindex(&ix, &mut issues);
    issues
}

fn check_image_alt(ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    for img in ix.by_tag("img") {
        if img.has("alt") || img.get("role") == Some("presentation") {
            continue;
        }
        let loc = match img.get("src") {
            Some(src) => format!("img[src=\"{}\"]", src),
            None => img.describe(),
        };
        out.push(
            ValidationIssue::new(
                IssueType::Accessibility,
                Severity::Medium,
                "Image is missing alt text",
                loc,
            )
            .with_suggestion("Add an alt attribute describing the image, or alt=\"\" if decorative")
            .with_stakeholders(&[Stakeholder::EndUsers, Stakeholder::Compliance])
            .with_wcag("1.1.1 Non-text Content"),
        );
    }
}

fn is_labelable(el: &Element) -> bool {
    match el.tag.as_str() {
        "select" | "textarea" => true,
        "input" => !matches!(
            el.get("type").map(|t| t.to_ascii_lowercase()).as_deref(),
            Some("hidden" | "submit" | "button" | "reset" | "image")
        ),
        _ => false,
    }
}

fn check_form_labels(ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    let label_targets: Vec<&str> = ix.by_tag("label").filter_map(|l| l.get("for")).collect();
    for (idx, node) in ix.nodes().iter().enumerate() {
        let el = node.el;
        if !is_labelable(el) || has_aria_name(el) {
            continue;
        }
        if el
            .get("id")
            .is_some_and(|id| !id.is_empty() && label_targets.contains(&id))
        {
            continue;
        }
        if ix.has_ancestor(idx, "label") {
            continue;
        }
        out.push(
            ValidationIssue::new(
                IssueType::Accessibility,
                Severity::Medium,
                format!("Form control <{}> has no associated label", el.tag),
                el.describe(),
            )
            .with_suggestion("Add a <label for> pointing at the control, or aria-label/aria-labelledby")
            .with_stakeholders(&[Stakeholder::EndUsers, Stakeholder::Compliance])
            .with_wcag("1.3.1 Info and Relationships"),
        );
    }
}

fn check_button_names(ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    for btn in ix.by_tag("button") {
        if !btn.text_content().trim().is_empty() || has_aria_name(btn) {
            continue;
        }
        out.push(
            ValidationIssue::new(
                IssueType::Accessibility,
                Severity::Medium,
                "Button has no accessible name",
                btn.describe(),
            )
            .with_suggestion("Give the button visible text or an aria-label")
            .with_stakeholders(&[Stakeholder::EndUsers, Stakeholder::Compliance])
            .with_wcag("4.1.2 Name, Role, Value"),
        );
    }
}

/// Effective background of node `idx`: its own background composited over
/// the nearest ancestors, with white as the canvas.
fn effective_background(ctx: &dyn RenderContext, ix: &DomIndex<'_>, idx: usize) -> Option<Rgba> {
    let mut layers = Vec::new();
    let chain = std::iter::once(ix.nodes()[idx].el).chain(ix.ancestors(idx));
    for el in chain {
        let Ok(style) = ctx.computed_style(el) else {
            continue;
        };
        let bg = parse_color(&style.background_color)?;
        if bg.is_transparent() {
            continue;
        }
        layers.push(bg);
        if bg.a >= 1.0 {
            break;
        }
    }
    Some(
        layers
            .into_iter()
            .rev()
            .fold(Rgba::WHITE, |acc, layer| layer.over(acc)),
    )
}

fn check_contrast(ctx: &dyn RenderContext, ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    for (idx, node) in ix.nodes().iter().enumerate() {
        let el = node.el;
        if el.text.trim().is_empty() {
            continue;
        }
        let style = match ctx.computed_style(el) {
            Ok(s) => s,
            Err(e) => {
                debug!("accessibility: {}", e);
                continue;
            }
        };
        if !style.is_visible() {
            continue;
        }
        let Some(bg) = effective_background(ctx, ix, idx) else {
            continue;
        };
        let Some(fg) = parse_color(&style.color) else {
            continue;
        };
        let ratio = contrast_ratio(fg.over(bg), bg);
        let required = if is_large_text(style.font_size, &style.font_weight) {
            MIN_CONTRAST_LARGE
        } else {
            MIN_CONTRAST
        };
        if ratio < required {
            out.push(
                ValidationIssue::new(
                    IssueType::Accessibility,
                    Severity::Medium,
                    format!(
                        "Insufficient text contrast {:.2}:1 (needs {}:1)",
                        ratio, required
                    ),
                    el.describe(),
                )
                .with_suggestion("Darken the text or lighten the background")
                .with_stakeholders(&[Stakeholder::EndUsers, Stakeholder::Compliance])
                .with_wcag("1.4.3 Contrast (Minimum)"),
            );
        }
    }
}

fn check_negative_tabindex(ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    for el in ix.elements() {
        if el.get("tabindex").map(str::trim) != Some("-1") {
            continue;
        }
        if el.get("aria-hidden") == Some("true") {
            continue;
        }
        out.push(
            ValidationIssue::new(
                IssueType::Accessibility,
                Severity::High,
                "Element is removed from keyboard navigation (tabindex=\"-1\")",
                el.describe(),
            )
            .with_suggestion("Remove tabindex=\"-1\" or hide the element with aria-hidden")
            .with_stakeholders(&[Stakeholder::EndUsers, Stakeholder::Compliance])
            .with_wcag("2.1.1 Keyboard"),
        );
    }
}
