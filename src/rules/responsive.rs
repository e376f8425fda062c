//! Responsive-design rule.
//!
//! Checks, in order:
//! - elements wider than the viewport with a fixed inline width,
//! - touch targets smaller than 44x44px,
//! - text under 14px on narrow viewports (<= 768px),
//! - presence of media queries, and of width-based ones,
//! - the viewport meta tag,
//! - horizontal document overflow (5px tolerance).

use crate::dom::{DomIndex, RenderContext};
use crate::models::snapshot::Element;
use crate::models::{IssueType, Severity, Stakeholder, ValidationIssue};
use log::debug;
use regex::Regex;
use std::sync::OnceLock;

const MIN_TOUCH_TARGET: f64 = 44.0;
const MIN_MOBILE_FONT: f64 = 14.0;
const MOBILE_BREAKPOINT: f64 = 768.0;
const OVERFLOW_TOLERANCE: f64 = 5.0;

pub fn validate_responsive(ctx: &dyn RenderContext) -> Vec<ValidationIssue> {
    let ix = DomIndex::build(ctx.document());
    let mut issues = Vec::new();
    check_fixed_width_overflow(ctx, &ix, &mut issues);
    check_touch_targets(ctx, &ix, &mut issues);
    check_mobile_font_size(ctx, &ix, &mut issues);
    check_media_queries(ctx, &mut issues);
    check_viewport_meta(&ix, &mut issues);
    check_document_overflow(ctx, &mut issues);
    issues
}

fn inline_width_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:^|;)\s*width\s*:\s*([^;]+)").expect("static regex")
    })
}

/// Inline `width` declaration from the element's `style` attribute.
fn inline_width(el: &Element) -> Option<String> {
    let style = el.get("style")?;
    inline_width_re()
        .captures(style)
        .map(|c| c[1].trim().to_ascii_lowercase())
}

fn is_relative_width(w: &str) -> bool {
    w.ends_with('%') || w.ends_with("vw") || w.starts_with("calc")
}

fn check_fixed_width_overflow(ctx: &dyn RenderContext, ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    let vw = ctx.viewport().width;
    for el in ix.elements() {
        let style = match ctx.computed_style(el) {
            Ok(s) => s,
            Err(e) => {
                debug!("responsive: {}", e);
                continue;
            }
        };
        if style.width <= vw {
            continue;
        }
        if inline_width(el).is_some_and(|w| is_relative_width(&w)) {
            continue;
        }
        out.push(
            ValidationIssue::new(
                IssueType::Responsive,
                Severity::High,
                format!(
                    "Element is {}px wide, exceeding the {}px viewport",
                    style.width.round(),
                    vw.round()
                ),
                el.describe(),
            )
            .with_suggestion("Use max-width: 100% or a relative width (%, vw, calc)")
            .with_stakeholders(&[Stakeholder::EndUsers, Stakeholder::Developer]),
        );
    }
}

fn is_interactive(el: &Element) -> bool {
    el.is("button")
        || el.is("a")
        || el.has("onclick")
        || el.has_click_handler
        || el.get("role") == Some("button")
}

fn check_touch_targets(ctx: &dyn RenderContext, ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    for el in ix.elements().filter(|e| is_interactive(e)) {
        let Ok(style) = ctx.computed_style(el) else {
            continue;
        };
        if !style.is_rendered() {
            continue;
        }
        if style.width < MIN_TOUCH_TARGET || style.height < MIN_TOUCH_TARGET {
            out.push(
                ValidationIssue::new(
                    IssueType::Accessibility,
                    Severity::Medium,
                    format!(
                        "Touch target is {}x{}px, smaller than {}x{}px",
                        style.width.round(),
                        style.height.round(),
                        MIN_TOUCH_TARGET,
                        MIN_TOUCH_TARGET
                    ),
                    el.describe(),
                )
                .with_suggestion("Give interactive elements at least 44px of height and width")
                .with_stakeholders(&[Stakeholder::EndUsers])
                .with_wcag("2.5.5 Target Size"),
            );
        }
    }
}

fn check_mobile_font_size(ctx: &dyn RenderContext, ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    if ctx.viewport().width > MOBILE_BREAKPOINT {
        return;
    }
    for el in ix.elements().filter(|e| !e.text.trim().is_empty()) {
        if matches!(el.tag.as_str(), "script" | "style" | "title" | "noscript") {
            continue;
        }
        let Ok(style) = ctx.computed_style(el) else {
            continue;
        };
        if style.is_visible() && style.font_size < MIN_MOBILE_FONT {
            out.push(
                ValidationIssue::new(
                    IssueType::Accessibility,
                    Severity::Medium,
                    format!(
                        "Text is {}px on a mobile viewport (minimum {}px)",
                        style.font_size, MIN_MOBILE_FONT
                    ),
                    el.describe(),
                )
                .with_suggestion("Raise the font size to at least 14px on small screens")
                .with_stakeholders(&[Stakeholder::EndUsers])
                .with_wcag("1.4.4 Resize Text"),
            );
        }
    }
}

fn width_query_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\(\s*(?:min|max)-width\s*:").expect("static regex"))
}

fn check_media_queries(ctx: &dyn RenderContext, out: &mut Vec<ValidationIssue>) {
    let mut readable = 0usize;
    let mut media = 0usize;
    let mut width_media = 0usize;
    for sheet in ctx.style_sheets() {
        let rules = match sheet {
            Ok(r) => r,
            Err(e) => {
                debug!("responsive: skipping stylesheet: {}", e);
                continue;
            }
        };
        readable += 1;
        for rule in rules {
            let rule = rule.trim_start();
            if rule.get(..6).is_some_and(|p| p.eq_ignore_ascii_case("@media")) {
                media += 1;
                if width_query_re().is_match(rule) {
                    width_media += 1;
                }
            }
        }
    }
    if readable == 0 && !ctx.style_sheets().is_empty() {
        // nothing readable to judge
        return;
    }
    if media == 0 {
        out.push(
            ValidationIssue::new(
                IssueType::Responsive,
                Severity::High,
                "No CSS media queries found in loaded stylesheets",
                "document.styleSheets",
            )
            .with_suggestion("Add media queries so the layout adapts to different screen sizes")
            .with_stakeholders(&[Stakeholder::Developer, Stakeholder::EndUsers]),
        );
    } else if width_media == 0 {
        out.push(
            ValidationIssue::new(
                IssueType::Responsive,
                Severity::Medium,
                "No min-width or max-width media queries found",
                "document.styleSheets",
            )
            .with_suggestion("Define width breakpoints for mobile, tablet, and desktop layouts")
            .with_stakeholders(&[Stakeholder::Developer]),
        );
    }
}

fn check_viewport_meta(ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    let meta = ix
        .by_tag("meta")
        .find(|m| m.get("name").is_some_and(|n| n.eq_ignore_ascii_case("viewport")));
    let Some(meta) = meta else {
        out.push(
            ValidationIssue::new(
                IssueType::Responsive,
                Severity::High,
                "Missing viewport meta tag",
                "head",
            )
            .with_suggestion(
                "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
            )
            .with_stakeholders(&[Stakeholder::EndUsers]),
        );
        return;
    };
    let content: String = meta
        .get("content")
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    if !content.contains("width=device-width") || !content.contains("initial-scale=1") {
        out.push(
            ValidationIssue::new(
                IssueType::Responsive,
                Severity::High,
                "Viewport meta tag is misconfigured",
                format!("meta[name=viewport][content=\"{}\"]", meta.get("content").unwrap_or_default()),
            )
            .with_suggestion("Use content=\"width=device-width, initial-scale=1\"")
            .with_stakeholders(&[Stakeholder::EndUsers]),
        );
    }
}

fn check_document_overflow(ctx: &dyn RenderContext, out: &mut Vec<ValidationIssue>) {
    let vw = ctx.viewport().width;
    let sw = ctx.scroll_width();
    if sw > vw + OVERFLOW_TOLERANCE {
        out.push(
            ValidationIssue::new(
                IssueType::Responsive,
                Severity::High,
                format!(
                    "Page scrolls horizontally: document is {}px wide in a {}px viewport",
                    sw.round(),
                    vw.round()
                ),
                "document",
            )
            .with_suggestion("Find the overflowing element and constrain its width")
            .with_stakeholders(&[Stakeholder::EndUsers]),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::snapshot::{ComputedStyle, DomSnapshot};

    const MEDIA_SHEET: &str = "@media (max-width: 768px) { .x { display: none } }";

    fn base(body: Vec<Element>) -> DomSnapshot {
        DomSnapshot::new(
            Element::new("html")
                .child(Element::new("head").child(
                    Element::new("meta")
                        .attr("name", "viewport")
                        .attr("content", "width=device-width, initial-scale=1"),
                ))
                .child(Element::new("body").children(body)),
        )
        .with_viewport(1024.0, 768.0)
        .with_sheet(None, Some(vec![MEDIA_SHEET]))
    }

    fn wide(width: f64) -> ComputedStyle {
        ComputedStyle {
            width,
            ..Default::default()
        }
    }

    #[test]
    fn test_fixed_pixel_width_overflow_is_high() {
        let snap = base(vec![Element::new("div")
            .attr("style", "width: 1124px")
            .styled(wide(1124.0))]);
        let issues = validate_responsive(&snap);
        let hits: Vec<_> = issues
            .iter()
            .filter(|i| i.description.contains("exceeding"))
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].issue_type, IssueType::Responsive);
        assert_eq!(hits[0].severity, Severity::High);
        assert_eq!(hits[0].location, "div");
    }

    #[test]
    fn test_relative_width_is_not_flagged() {
        for w in ["120%", "110vw", "calc(100% + 200px)"] {
            let snap = base(vec![Element::new("div")
                .attr("style", &format!("color: red; width: {}", w))
                .styled(wide(1200.0))]);
            assert!(
                !validate_responsive(&snap)
                    .iter()
                    .any(|i| i.description.contains("exceeding")),
                "{}",
                w
            );
        }
    }

    #[test]
    fn test_max_width_declaration_is_not_mistaken_for_width() {
        let el = Element::new("div").attr("style", "max-width: 50%; width: 2000px");
        assert_eq!(inline_width(&el).as_deref(), Some("2000px"));
        assert_eq!(inline_width(&Element::new("div").attr("style", "max-width: 50%")), None);
    }

    #[test]
    fn test_viewport_meta_missing_and_valid() {
        let missing = DomSnapshot::new(Element::new("html").child(Element::new("body")))
            .with_sheet(None, Some(vec![MEDIA_SHEET]));
        let issues = validate_responsive(&missing);
        let meta: Vec<_> = issues
            .iter()
            .filter(|i| i.description == "Missing viewport meta tag")
            .collect();
        assert_eq!(meta.len(), 1);
        assert_eq!(meta[0].severity, Severity::High);

        let ok = base(vec![]);
        assert!(!validate_responsive(&ok)
            .iter()
            .any(|i| i.description.contains("viewport meta")));
    }

    #[test]
    fn test_misconfigured_viewport_meta() {
        let snap = DomSnapshot::new(
            Element::new("html").child(
                Element::new("meta")
                    .attr("name", "viewport")
                    .attr("content", "width=1024"),
            ),
        )
        .with_sheet(None, Some(vec![MEDIA_SHEET]));
        let issues = validate_responsive(&snap);
        assert!(issues
            .iter()
            .any(|i| i.description == "Viewport meta tag is misconfigured"));
    }

    #[test]
    fn test_small_touch_target() {
        let snap = base(vec![
            Element::new("button").text("x").styled(ComputedStyle {
                width: 30.0,
                height: 30.0,
                ..Default::default()
            }),
            Element::new("button").text("ok").styled(ComputedStyle {
                width: 44.0,
                height: 44.0,
                ..Default::default()
            }),
            // hidden elements are ignored
            Element::new("a").styled(ComputedStyle {
                width: 10.0,
                height: 10.0,
                display: "none".into(),
                ..Default::default()
            }),
        ]);
        let hits: Vec<_> = validate_responsive(&snap)
            .into_iter()
            .filter(|i| i.description.starts_with("Touch target"))
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].severity, Severity::Medium);
        assert_eq!(hits[0].issue_type, IssueType::Accessibility);
    }

    #[test]
    fn test_small_text_only_on_mobile() {
        let small = || {
            Element::new("p").text("fine print").styled(ComputedStyle {
                font_size: 12.0,
                ..Default::default()
            })
        };
        let desktop = base(vec![small()]);
        assert!(!validate_responsive(&desktop)
            .iter()
            .any(|i| i.description.starts_with("Text is")));
        let mobile = base(vec![small()]).with_viewport(375.0, 667.0);
        assert!(validate_responsive(&mobile)
            .iter()
            .any(|i| i.description.starts_with("Text is 12px")));
    }

    #[test]
    fn test_media_query_checks_tolerate_cross_origin_sheets() {
        let mut none = base(vec![]);
        none.style_sheets.clear();
        let none = none
            .with_sheet(Some("https://cdn.example/a.css"), None)
            .with_sheet(None, Some(vec!["body { margin: 0 }"]));
        let issues = validate_responsive(&none);
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::High && i.description.starts_with("No CSS media")));

        let print_only = base(vec![])
            .with_sheet(None, Some(vec!["@media print { body { color: black } }"]));
        // the base sheet already has a width query
        assert!(!validate_responsive(&print_only)
            .iter()
            .any(|i| i.description.starts_with("No min-width")));

        let mut only_print = base(vec![]);
        only_print.style_sheets.clear();
        let only_print =
            only_print.with_sheet(None, Some(vec!["@media print { body { color: black } }"]));
        let issues = validate_responsive(&only_print);
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::Medium && i.description.starts_with("No min-width")));
    }

    #[test]
    fn test_horizontal_overflow_tolerance() {
        let within = base(vec![]).with_scroll_width(1029.0);
        assert!(!validate_responsive(&within)
            .iter()
            .any(|i| i.description.starts_with("Page scrolls")));
        let beyond = base(vec![]).with_scroll_width(1030.0);
        assert!(validate_responsive(&beyond)
            .iter()
            .any(|i| i.description.starts_with("Page scrolls")));
    }
}
