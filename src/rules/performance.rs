//! Performance rule: oversized or unsized images, render-blocking scripts,
//! DOM size, and web-font count.

use super::parse_px;
use crate::dom::{DomIndex, RenderContext};
use crate::models::snapshot::Element;
use crate::models::{IssueType, Severity, Stakeholder, ValidationIssue};
use regex::Regex;
use std::sync::OnceLock;

const OVERSIZE_FACTOR: f64 = 4.0;
const MAX_SYNC_SCRIPTS: usize = 3;
const MAX_DOM_NODES: usize = 1500;
const MAX_FONT_FACES: usize = 4;

pub fn validate_performance(ctx: &dyn RenderContext) -> Vec<ValidationIssue> {
    let ix = DomIndex::build(ctx.document());
    let mut issues = Vec::new();
    check_images(ctx, &ix, &mut issues);
    check_sync_scripts(&ix, &mut issues);
    check_dom_size(&ix, &mut issues);
    check_font_faces(&ix, &mut issues);
    issues
}

fn image_location(img: &Element) -> String {
    match img.get("src") {
        Some(src) => format!("img[src=\"{}\"]", src),
        None => img.describe(),
    }
}

/// Displayed size from computed style, falling back to the width/height
/// attributes.
fn displayed_size(ctx: &dyn RenderContext, img: &Element) -> Option<(f64, f64)> {
    if let Ok(style) = ctx.computed_style(img) {
        return Some((style.width, style.height));
    }
    let w = img.get("width").and_then(parse_px)?;
    let h = img.get("height").and_then(parse_px)?;
    Some((w, h))
}

fn check_images(ctx: &dyn RenderContext, ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    for img in ix.by_tag("img") {
        if let (Some(natural), Some((w, h))) = (img.natural_size, displayed_size(ctx, img)) {
            let shown = w * h;
            let source = natural.width * natural.height;
            if shown > 0.0 && source > shown * OVERSIZE_FACTOR {
                out.push(
                    ValidationIssue::new(
                        IssueType::Performance,
                        Severity::Medium,
                        format!(
                            "Image source is {}x{}px but displayed at {}x{}px",
                            natural.width.round(),
                            natural.height.round(),
                            w.round(),
                            h.round()
                        ),
                        image_location(img),
                    )
                    .with_suggestion("Serve a resized image or use srcset for responsive sources")
                    .with_stakeholders(&[Stakeholder::EndUsers, Stakeholder::Developer]),
                );
            }
        }
        if !img.has("width") || !img.has("height") {
            out.push(
                ValidationIssue::new(
                    IssueType::Performance,
                    Severity::Low,
                    "Image lacks explicit width and height attributes",
                    image_location(img),
                )
                .with_suggestion("Set width and height to reserve space and avoid layout shift")
                .with_stakeholders(&[Stakeholder::Developer]),
            );
        }
    }
}

fn check_sync_scripts(ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    let sync = ix
        .by_tag("script")
        .filter(|s| s.has("src") && !s.has("defer") && !s.has("async"))
        .count();
    if sync > MAX_SYNC_SCRIPTS {
        out.push(
            ValidationIssue::new(
                IssueType::Performance,
                Severity::Medium,
                format!("{} render-blocking scripts found", sync),
                "script[src]",
            )
            .with_suggestion("Load scripts with defer or async")
            .with_stakeholders(&[Stakeholder::Developer]),
        );
    }
}

fn check_dom_size(ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    let size = ix.content_size();
    if size > MAX_DOM_NODES {
        out.push(
            ValidationIssue::new(
                IssueType::Performance,
                Severity::Medium,
                format!(
                    "Large DOM size: {} elements (recommended maximum {})",
                    size, MAX_DOM_NODES
                ),
                "body",
            )
            .with_suggestion("Virtualize long lists and remove unused wrapper elements")
            .with_stakeholders(&[Stakeholder::Developer, Stakeholder::EndUsers]),
        );
    }
}

fn font_face_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)@font-face").expect("static regex"))
}

fn check_font_faces(ix: &DomIndex<'_>, out: &mut Vec<ValidationIssue>) {
    let faces: usize = ix
        .by_tag("style")
        .map(|s| font_face_re().find_iter(&s.text).count())
        .sum();
    if faces > MAX_FONT_FACES {
        out.push(
            ValidationIssue::new(
                IssueType::Performance,
                Severity::Low,
                format!("{} @font-face declarations found", faces),
                "style",
            )
            .with_suggestion("Limit web font families and weights")
            .with_stakeholders(&[Stakeholder::Developer]),
        );
    }
}
