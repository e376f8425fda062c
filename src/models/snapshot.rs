//! Snapshot schema: a rendered page captured by a browser host.
//!
//! The snapshot carries what the rules need from a live page:
//! - `document`: the element tree with attributes, direct text, computed
//!   style, and (for images) natural pixel size.
//! - `viewport` and `scrollWidth`: window and document dimensions.
//! - `styleSheets`: rule text per loaded sheet; `rules: null` marks a sheet
//!   the host could not read (cross-origin).
//!
//! Elements without `style` are treated as "computed style unavailable".

use crate::error::LoadError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Root of a captured page.
pub struct DomSnapshot {
    #[serde(default = "default_pathname")]
    pub pathname: String,
    #[serde(default)]
    pub viewport: Viewport,
    /// Document scroll width; defaults to the viewport width.
    #[serde(default)]
    pub scroll_width: Option<f64>,
    #[serde(default)]
    pub style_sheets: Vec<StyleSheet>,
    pub document: Element,
}

fn default_pathname() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            width: 1280.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StyleSheet {
    #[serde(default)]
    pub href: Option<String>,
    /// `None` when the host could not read the sheet's rules.
    #[serde(default)]
    pub rules: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One element of the captured tree.
pub struct Element {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Text from the element's own text nodes (children excluded).
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub style: Option<ComputedStyle>,
    #[serde(default)]
    pub natural_size: Option<Size>,
    /// Set by the host when it detected a click listener on the element.
    #[serde(default)]
    pub has_click_handler: bool,
    #[serde(default)]
    pub children: Vec<Element>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// Subset of `getComputedStyle` plus the rendered box size.
pub struct ComputedStyle {
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub font_weight: String,
    pub color: String,
    pub background_color: String,
    pub display: String,
    pub visibility: String,
    pub outline_style: String,
    pub outline_width: f64,
    pub box_shadow: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        ComputedStyle {
            width: 100.0,
            height: 48.0,
            font_size: 16.0,
            font_weight: "400".into(),
            color: "rgb(0, 0, 0)".into(),
            background_color: "rgba(0, 0, 0, 0)".into(),
            display: "block".into(),
            visibility: "visible".into(),
            outline_style: "auto".into(),
            outline_width: 1.0,
            box_shadow: "none".into(),
        }
    }
}

impl ComputedStyle {
    pub fn is_visible(&self) -> bool {
        self.display != "none" && self.visibility != "hidden"
    }

    pub fn is_rendered(&self) -> bool {
        self.is_visible() && (self.width > 0.0 || self.height > 0.0)
    }
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Element {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn styled(mut self, style: ComputedStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn natural(mut self, width: f64, height: f64) -> Self {
        self.natural_size = Some(Size { width, height });
        self
    }

    pub fn clickable(mut self) -> Self {
        self.has_click_handler = true;
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Attribute present with a non-blank value.
    pub fn has_value(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.trim().is_empty())
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn classes(&self) -> Vec<&str> {
        self.get("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Sorted, space-joined class tokens.
    pub fn class_signature(&self) -> String {
        let mut c = self.classes();
        c.sort_unstable();
        c.dedup();
        c.join(" ")
    }

    pub fn has_class_containing(&self, needle: &str) -> bool {
        self.classes().iter().any(|c| c.contains(needle))
    }

    /// Concatenated text of this element and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for c in &self.children {
            let t = c.text_content();
            if !t.is_empty() {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(&t);
            }
        }
        out
    }

    /// Short selector-like descriptor: `tag#id.class1.class2`.
    pub fn describe(&self) -> String {
        let mut s = self.tag.clone();
        if let Some(id) = self.get("id").filter(|v| !v.is_empty()) {
            s.push('#');
            s.push_str(id);
        }
        for c in self.classes().into_iter().take(2) {
            s.push('.');
            s.push_str(c);
        }
        s
    }
}

impl DomSnapshot {
    pub fn load(path: &Path) -> Result<DomSnapshot, LoadError> {
        let s = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&s).map_err(|source| LoadError::Snapshot {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse snapshot JSON of any nesting depth. Captured pages routinely
    /// nest deeper than serde_json's default limit of 128.
    pub fn from_json(s: &str) -> Result<DomSnapshot, serde_json::Error> {
        let mut de = serde_json::Deserializer::from_str(s);
        de.disable_recursion_limit();
        let snap = DomSnapshot::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Ok(snap)
    }

    pub fn new(document: Element) -> Self {
        DomSnapshot {
            pathname: default_pathname(),
            viewport: Viewport::default(),
            scroll_width: None,
            style_sheets: Vec::new(),
            document,
        }
    }

    pub fn at(mut self, pathname: &str) -> Self {
        self.pathname = pathname.to_string();
        self
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = Viewport { width, height };
        self
    }

    pub fn with_scroll_width(mut self, width: f64) -> Self {
        self.scroll_width = Some(width);
        self
    }

    pub fn with_sheet(mut self, href: Option<&str>, rules: Option<Vec<&str>>) -> Self {
        self.style_sheets.push(StyleSheet {
            href: href.map(str::to_string),
            rules: rules.map(|r| r.into_iter().map(str::to_string).collect()),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot_json_with_defaults() {
        let snap: DomSnapshot = serde_json::from_str(
            r#"{
  "pathname": "/audits",
  "viewport": {"width": 375, "height": 667},
  "styleSheets": [{"href": "https://cdn.example/x.css", "rules": null}, {"rules": ["@media (max-width: 600px) {}"]}],
  "document": {
    "tag": "html",
    "children": [
      {"tag": "body", "children": [
        {"tag": "img", "attrs": {"src": "a.png"}, "naturalSize": {"width": 800, "height": 600},
         "style": {"width": 100, "height": 75}}
      ]}
    ]
  }
}"#,
        )
        .unwrap();
        assert_eq!(snap.pathname, "/audits");
        assert_eq!(snap.viewport.width, 375.0);
        assert!(snap.style_sheets[0].rules.is_none());
        let img = &snap.document.children[0].children[0];
        let style = img.style.as_ref().unwrap();
        assert_eq!(style.width, 100.0);
        // unspecified fields fall back to defaults
        assert_eq!(style.font_size, 16.0);
        assert_eq!(img.natural_size.unwrap().width, 800.0);
    }

    #[test]
    fn test_describe_and_class_signature() {
        let el = Element::new("BUTTON")
            .attr("id", "save")
            .attr("class", "btn-primary  btn lg");
        assert_eq!(el.describe(), "button#save.btn-primary.btn");
        assert_eq!(el.class_signature(), "btn btn-primary lg");
        assert!(el.has_class_containing("primary"));
    }

    #[test]
    fn test_text_content_joins_descendants() {
        let el = Element::new("button")
            .text("Save")
            .child(Element::new("span").text("draft"));
        assert_eq!(el.text_content(), "Save draft");
        assert_eq!(Element::new("button").text_content(), "");
    }

    #[test]
    fn test_load_deeply_nested_snapshot() {
        let depth = 300;
        let mut json = String::from(r#"{"pathname": "/deep", "document": "#);
        for _ in 0..depth {
            json.push_str(r#"{"tag": "div", "children": ["#);
        }
        json.push_str(r#"{"tag": "span", "text": "leaf"}"#);
        for _ in 0..depth {
            json.push_str("]}");
        }
        json.push('}');

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.json");
        fs::write(&path, &json).unwrap();
        let snap = DomSnapshot::load(&path).unwrap();
        assert_eq!(snap.pathname, "/deep");
        let ix = crate::dom::DomIndex::build(&snap.document);
        assert_eq!(ix.len(), depth + 1);
        assert_eq!(ix.nodes()[depth].depth, depth);
        assert!(ix.nodes()[depth].el.is("span"));
    }

    #[test]
    fn test_trailing_garbage_is_rejected() {
        assert!(DomSnapshot::from_json(r#"{"document": {"tag": "html"}} extra"#).is_err());
        assert!(DomSnapshot::from_json(r#"{"document": {"tag": "html"}}"#).is_ok());
    }
}
