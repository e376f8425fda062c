//! Page/interactive rule: placeholder links and buttons that do nothing.
//!
//! Click handlers are only visible through the host: the snapshot's
//! `hasClickHandler` flag, an inline `onclick`, or an explicit
//! `data-has-handler` marker. Handlers attached by event delegation are
//! invisible here and the host should set the marker for them.

use crate::dom::{DomIndex, RenderContext};
use crate::models::snapshot::Element;
use crate::models::{IssueType, Severity, Stakeholder, ValidationIssue};

pub const HANDLER_MARKER: &str = "data-has-handler";

pub fn validate_interactive(ctx: &dyn RenderContext) -> Vec<ValidationIssue> {
    let ix = DomIndex::build(ctx.document());
    let mut issues = Vec::new();
    for a in ix.by_tag("a") {
        let href = a.get("href").map(str::trim).unwrap_or_default();
        if href.is_empty() || href == "#" {
            issues.push(
                ValidationIssue::new(
                    IssueType::Link,
                    Severity::Medium,
                    "Link has an empty or placeholder href",
                    labelled_location(a),
                )
                .with_suggestion("Point the link at a real destination or render a button instead")
                .with_stakeholders(&[Stakeholder::EndUsers]),
            );
        }
    }
    for btn in ix.by_tag("button") {
        if !needs_handler(btn) || has_handler(btn) {
            continue;
        }
        issues.push(
            ValidationIssue::new(
                IssueType::Interactive,
                Severity::Medium,
                "Button has no click handler",
                labelled_location(btn),
            )
            .with_suggestion("Attach a click handler or mark the button with data-has-handler")
            .with_stakeholders(&[Stakeholder::EndUsers, Stakeholder::Developer]),
        );
    }
    issues
}

/// Only `type="button"` and `type="reset"` rely on script. A missing or
/// unrecognised type is a submit button, which acts through its form.
fn needs_handler(btn: &Element) -> bool {
    btn.get("type")
        .map(str::trim)
        .is_some_and(|t| t.eq_ignore_ascii_case("button") || t.eq_ignore_ascii_case("reset"))
}

fn has_handler(el: &Element) -> bool {
    el.has_click_handler || el.has("onclick") || el.has(HANDLER_MARKER)
}

fn labelled_location(a: &Element) -> String {
    let text = a.text_content();
    let text = text.trim();
    if text.is_empty() {
        a.describe()
    } else {
        format!("{} \"{}\"", a.describe(), text)
    }
}
