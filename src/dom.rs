//! Render context: the read-only view of a rendered page that rules inspect.
//!
//! Rules never touch a concrete host. A browser host, a captured
//! [`DomSnapshot`], or a hand-built test document all implement
//! [`RenderContext`].

use crate::error::ContextError;
use crate::models::snapshot::{ComputedStyle, DomSnapshot, Element, Viewport};

/// Capability interface over a rendered document.
pub trait RenderContext {
    /// Document root element.
    fn document(&self) -> &Element;

    fn viewport(&self) -> Viewport;

    /// Full scrollable document width.
    fn scroll_width(&self) -> f64;

    /// Computed style for an element of this document.
    fn computed_style<'a>(&'a self, el: &'a Element) -> Result<&'a ComputedStyle, ContextError> {
        el.style
            .as_ref()
            .ok_or_else(|| ContextError::StyleUnavailable(el.describe()))
    }

    /// Rule text for each loaded stylesheet, in load order.
    fn style_sheets(&self) -> Vec<Result<&[String], ContextError>>;
}

impl RenderContext for DomSnapshot {
    fn document(&self) -> &Element {
        &self.document
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scroll_width(&self) -> f64 {
        self.scroll_width.unwrap_or(self.viewport.width)
    }

    fn style_sheets(&self) -> Vec<Result<&[String], ContextError>> {
        self.style_sheets
            .iter()
            .map(|s| match s.rules.as_deref() {
                Some(rules) => Ok(rules),
                None => Err(ContextError::CrossOrigin(
                    s.href.clone().unwrap_or_else(|| "<inline>".to_string()),
                )),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
/// An element in document order with a link to its parent.
pub struct Node<'a> {
    pub el: &'a Element,
    pub parent: Option<usize>,
    pub depth: usize,
}

/// Flattened, document-ordered view over an element tree.
pub struct DomIndex<'a> {
    nodes: Vec<Node<'a>>,
}

impl<'a> DomIndex<'a> {
    pub fn build(root: &'a Element) -> Self {
        let mut nodes = Vec::new();
        // explicit stack keeps deep trees off the call stack
        let mut stack: Vec<(&'a Element, Option<usize>, usize)> = vec![(root, None, 0)];
        while let Some((el, parent, depth)) = stack.pop() {
            let idx = nodes.len();
            nodes.push(Node { el, parent, depth });
            for c in el.children.iter().rev() {
                stack.push((c, Some(idx), depth + 1));
            }
        }
        DomIndex { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node<'a>] {
        &self.nodes
    }

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &'a Element> + '_ {
        self.nodes.iter().map(|n| n.el)
    }

    /// Elements with the given tag name, in document order.
    pub fn by_tag<'s>(&'s self, tag: &'s str) -> impl Iterator<Item = &'a Element> + 's {
        self.elements().filter(move |e| e.is(tag))
    }

    /// Index positions of every element with `tag`.
    pub fn positions<'s>(&'s self, tag: &'s str) -> impl Iterator<Item = usize> + 's {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.el.is(tag))
            .map(|(i, _)| i)
    }

    /// Ancestors of node `idx`, nearest first.
    pub fn ancestors(&self, idx: usize) -> impl Iterator<Item = &'a Element> + '_ {
        let mut cur = self.nodes.get(idx).and_then(|n| n.parent);
        std::iter::from_fn(move || {
            let i = cur?;
            cur = self.nodes[i].parent;
            Some(self.nodes[i].el)
        })
    }

    pub fn has_ancestor(&self, idx: usize, tag: &str) -> bool {
        self.ancestors(idx).any(|a| a.is(tag))
    }

    /// Number of elements strictly inside the first `<body>`, or inside
    /// the root when there is no body.
    pub fn content_size(&self) -> usize {
        let start = self.positions("body").next().unwrap_or(0);
        let depth = self.nodes.get(start).map(|n| n.depth).unwrap_or(0);
        self.nodes[start.min(self.nodes.len())..]
            .iter()
            .skip(1)
            .take_while(|n| n.depth > depth)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Element {
        Element::new("html")
            .child(Element::new("head").child(Element::new("title").text("t")))
            .child(
                Element::new("body")
                    .child(
                        Element::new("nav")
                            .child(Element::new("a").attr("href", "/a").attr("id", "first")),
                    )
                    .child(Element::new("p").text("hi")),
            )
    }

    #[test]
    fn test_index_is_document_ordered() {
        let root = page();
        let ix = DomIndex::build(&root);
        let tags: Vec<_> = ix.elements().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["html", "head", "title", "body", "nav", "a", "p"]);
    }

    #[test]
    fn test_ancestors_and_lookup() {
        let root = page();
        let ix = DomIndex::build(&root);
        let a = ix.positions("a").next().unwrap();
        let chain: Vec<_> = ix.ancestors(a).map(|e| e.tag.as_str()).collect();
        assert_eq!(chain, vec!["nav", "body", "html"]);
        assert!(ix.has_ancestor(a, "nav"));
        assert!(!ix.has_ancestor(a, "p"));
    }

    #[test]
    fn test_content_size_counts_body_descendants() {
        let root = page();
        let ix = DomIndex::build(&root);
        assert_eq!(ix.content_size(), 3);
        let bare = Element::new("div").child(Element::new("span"));
        assert_eq!(DomIndex::build(&bare).content_size(), 1);
    }

    #[test]
    fn test_snapshot_reports_cross_origin_sheets() {
        let snap = DomSnapshot::new(Element::new("html"))
            .with_sheet(Some("https://cdn.example/a.css"), None)
            .with_sheet(None, Some(vec!["p { color: red }"]));
        let sheets = snap.style_sheets();
        assert!(matches!(&sheets[0], Err(ContextError::CrossOrigin(h)) if h.contains("cdn")));
        assert_eq!(sheets[1].as_ref().map(|r| r.len()), Ok(1));
        assert_eq!(snap.scroll_width(), 1280.0);
        assert!(snap.computed_style(&snap.document).is_err());
    }
}
