//! The document: a tree of block elements over text leaves, plus the
//! session state that travels with it — current selection, tracked point
//! references and the undo stack.
//!
//! All structural mutation goes through the primitives in `transforms`;
//! this module provides construction, lookup, traversal and selection.

use serde::{Deserialize, Serialize};

use crate::error::DocError;
use crate::history::History;
use crate::node::{Element, Node, TextSpan};
use crate::path::{leaf_index, parent, Path, Point, Range};
use crate::point_ref::{PointRef, PointRegistry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub(crate) children: Vec<Node>,
    #[serde(default)]
    pub(crate) selection: Option<Range>,
    #[serde(skip)]
    pub(crate) refs: PointRegistry,
    #[serde(skip)]
    pub(crate) history: History,
    #[serde(skip)]
    pub(crate) suppress_depth: usize,
    #[serde(skip)]
    pub(crate) tx_depth: usize,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        let mut doc = Self {
            children,
            selection: None,
            refs: PointRegistry::default(),
            history: History::default(),
            suppress_depth: 0,
            tx_depth: 0,
        };
        doc.normalize();
        doc
    }

    /// A single paragraph holding `text`.
    pub fn from_text(text: &str) -> Self {
        Self::new(vec![Node::Element(Element::paragraph(vec![Node::text(
            text,
        )]))])
    }

    /// Best-effort persistence hook: the document content as a JSON value.
    pub fn to_json(&self) -> Result<serde_json::Value, DocError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, DocError> {
        let doc: Self = serde_json::from_value(value)?;
        Ok(Self::new(doc.children))
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        let (&first, rest) = path.split_first()?;
        let mut node = self.children.get(first)?;
        for &step in rest {
            node = node.as_element()?.children.get(step)?;
        }
        Some(node)
    }

    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let (&first, rest) = path.split_first()?;
        let mut node = self.children.get_mut(first)?;
        for &step in rest {
            node = node.as_element_mut()?.children.get_mut(step)?;
        }
        Some(node)
    }

    pub fn leaf_at(&self, path: &[usize]) -> Option<&TextSpan> {
        self.node_at(path).and_then(Node::as_text)
    }

    pub fn leaf_at_mut(&mut self, path: &[usize]) -> Option<&mut TextSpan> {
        self.node_at_mut(path).and_then(Node::as_text_mut)
    }

    pub(crate) fn leaf_mut(&mut self, path: &[usize]) -> Result<&mut TextSpan, DocError> {
        match self.node_at_mut(path) {
            Some(Node::Text(span)) => Ok(span),
            Some(Node::Element(_)) => Err(DocError::NotAText),
            None => Err(DocError::PathNotFound),
        }
    }

    /// Child vector of the element at `path` (the document root when `path`
    /// is empty).
    pub(crate) fn children_mut(&mut self, path: &[usize]) -> Result<&mut Vec<Node>, DocError> {
        if path.is_empty() {
            return Ok(&mut self.children);
        }
        match self.node_at_mut(path) {
            Some(Node::Element(el)) => Ok(&mut el.children),
            Some(Node::Text(_)) => Err(DocError::NotAnElement),
            None => Err(DocError::PathNotFound),
        }
    }

    // ── Traversal ─────────────────────────────────────────────────────────

    /// All text leaves in document order, with their paths.
    pub fn leaves(&self) -> Vec<(Path, &TextSpan)> {
        let mut out = Vec::new();
        let mut path = Path::new();
        collect_leaves(&self.children, &mut path, &mut out);
        out
    }

    /// Text leaves under `root` in document order.
    pub fn leaves_under(&self, root: &[usize]) -> Vec<(Path, &TextSpan)> {
        if root.is_empty() {
            return self.leaves();
        }
        match self.node_at(root) {
            Some(Node::Text(span)) => vec![(root.to_vec(), span)],
            Some(Node::Element(el)) => {
                let mut out = Vec::new();
                let mut path = root.to_vec();
                collect_leaves(&el.children, &mut path, &mut out);
                out
            }
            None => Vec::new(),
        }
    }

    /// Concatenated text of every leaf, suggestion spans included.
    pub fn text(&self) -> String {
        self.leaves()
            .into_iter()
            .map(|(_, span)| span.text.as_str())
            .collect()
    }

    /// Path of the block element holding the leaf `point` addresses.
    pub fn block_path_of(&self, point: &Point) -> Path {
        parent(&point.path).to_vec()
    }

    // ── Selection ─────────────────────────────────────────────────────────

    /// Set the selection.  Endpoints are clamped into the tree, so a caller
    /// holding a slightly stale range cannot select outside the document.
    pub fn select(&mut self, range: Range) {
        let anchor = self.clamp_point(&range.anchor);
        let focus = self.clamp_point(&range.focus);
        self.selection = Some(Range::new(anchor, focus));
    }

    pub fn deselect(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<&Range> {
        self.selection.as_ref()
    }

    // ── Tracked positions ─────────────────────────────────────────────────

    pub fn track_point(&mut self, point: Point) -> PointRef {
        self.refs.track(point)
    }

    /// Current position of a tracked ref, clamped into the tree.
    pub fn resolve_ref(&self, r: PointRef) -> Option<Point> {
        let point = self.refs.get(r)?.clone();
        Some(self.clamp_point(&point))
    }

    pub fn untrack_point(&mut self, r: PointRef) -> Option<Point> {
        let point = self.refs.untrack(r)?;
        Some(self.clamp_point(&point))
    }

    /// Nearest valid position for a possibly stale point: each path step is
    /// clamped to the available children and the offset to the leaf length.
    pub fn clamp_point(&self, point: &Point) -> Point {
        let mut path = Path::new();
        let mut nodes = &self.children;
        let mut steps = point.path.iter().copied();
        loop {
            if nodes.is_empty() {
                return Point::new(path, 0);
            }
            let step = steps.next().unwrap_or(0).min(nodes.len() - 1);
            path.push(step);
            match &nodes[step] {
                Node::Text(span) => {
                    return Point::new(path, point.offset.min(span.char_len()))
                }
                Node::Element(el) => nodes = &el.children,
            }
        }
    }

    // ── Navigation ────────────────────────────────────────────────────────

    /// Position of the character before `point`, staying within the block.
    pub fn point_before(&self, point: &Point) -> Option<Point> {
        if point.offset > 0 {
            return Some(Point::new(point.path.clone(), point.offset - 1));
        }
        let parent_path = parent(&point.path);
        let mut idx = leaf_index(&point.path)?;
        while idx > 0 {
            idx -= 1;
            let mut sibling = parent_path.to_vec();
            sibling.push(idx);
            if let Some(span) = self.leaf_at(&sibling) {
                let len = span.char_len();
                if len > 0 {
                    return Some(Point::new(sibling, len - 1));
                }
            }
        }
        None
    }

    /// Position of the character after `point`, staying within the block.
    pub fn point_after(&self, point: &Point) -> Option<Point> {
        let span = self.leaf_at(&point.path)?;
        if point.offset < span.char_len() {
            return Some(point.clone());
        }
        let parent_path = parent(&point.path);
        let mut idx = leaf_index(&point.path)? + 1;
        loop {
            let mut sibling = parent_path.to_vec();
            sibling.push(idx);
            match self.leaf_at(&sibling) {
                Some(span) if span.char_len() > 0 => {
                    return Some(Point::new(sibling, 0))
                }
                Some(_) => idx += 1,
                None => return None,
            }
        }
    }

    // ── Rebase plumbing ───────────────────────────────────────────────────

    /// Apply a position adjustment to the selection and every tracked ref.
    pub(crate) fn rebase(&mut self, f: impl Fn(&mut Point)) {
        if let Some(sel) = self.selection.as_mut() {
            f(&mut sel.anchor);
            f(&mut sel.focus);
        }
        self.refs.for_each_mut(f);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::from_text("")
    }
}

fn collect_leaves<'a>(
    nodes: &'a [Node],
    path: &mut Path,
    out: &mut Vec<(Path, &'a TextSpan)>,
) {
    for (i, node) in nodes.iter().enumerate() {
        path.push(i);
        match node {
            Node::Text(span) => out.push((path.clone(), span)),
            Node::Element(el) => collect_leaves(&el.children, path, out),
        }
        path.pop();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BlockKind, HeadingLevel};

    fn setup() -> Document {
        Document::new(vec![
            Node::Element(Element::paragraph(vec![Node::text("Hello world")])),
            Node::Element(Element::heading(
                HeadingLevel::H2,
                vec![Node::text("Title")],
            )),
        ])
    }

    #[test]
    fn node_lookup_walks_the_tree() {
        let doc = setup();
        assert!(matches!(doc.node_at(&[0]), Some(Node::Element(_))));
        assert_eq!(doc.leaf_at(&[0, 0]).map(|s| s.text.as_str()), Some("Hello world"));
        assert!(doc.leaf_at(&[0, 5]).is_none());
        assert!(doc.node_at(&[7]).is_none());
    }

    #[test]
    fn leaves_are_in_document_order() {
        let doc = setup();
        let leaves = doc.leaves();
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].0, vec![0, 0]);
        assert_eq!(leaves[1].0, vec![1, 0]);
        assert_eq!(doc.text(), "Hello worldTitle");
    }

    #[test]
    fn leaves_under_scopes_to_a_block() {
        let doc = setup();
        let leaves = doc.leaves_under(&[1]);
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].1.text, "Title");
    }

    #[test]
    fn table_cells_hold_leaves() {
        let doc = Document::new(vec![Node::Element(Element::table(vec![
            Element::table_row(vec![
                Element::table_cell(vec![Node::text("a")]),
                Element::table_cell(vec![Node::text("b")]),
            ]),
        ]))]);
        let leaves = doc.leaves();
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].0, vec![0, 0, 0, 0]);
        assert_eq!(doc.text(), "ab");
        assert_eq!(
            doc.node_at(&[0]).and_then(Node::as_element).map(|e| &e.kind),
            Some(&BlockKind::Table)
        );
    }

    #[test]
    fn select_clamps_stale_points() {
        let mut doc = setup();
        doc.select(Range::collapsed(Point::new(vec![0, 9], 99)));
        let sel = doc.selection().unwrap();
        assert_eq!(sel.anchor, Point::new(vec![0, 0], 11));
    }

    #[test]
    fn clamp_point_descends_into_elements() {
        let doc = setup();
        let clamped = doc.clamp_point(&Point::new(vec![5], 3));
        assert_eq!(clamped, Point::new(vec![1, 0], 3));
    }

    #[test]
    fn point_before_crosses_leaf_but_not_block() {
        let doc = Document::new(vec![Node::Element(Element::paragraph(vec![
            Node::text("ab"),
            Node::text("cd"),
        ]))]);
        assert_eq!(
            doc.point_before(&Point::new(vec![0, 1], 0)),
            Some(Point::new(vec![0, 0], 1))
        );
        assert_eq!(doc.point_before(&Point::new(vec![0, 0], 0)), None);
    }

    #[test]
    fn point_after_crosses_leaf_but_not_block() {
        let doc = Document::new(vec![Node::Element(Element::paragraph(vec![
            Node::text("ab"),
            Node::text("cd"),
        ]))]);
        assert_eq!(
            doc.point_after(&Point::new(vec![0, 0], 2)),
            Some(Point::new(vec![0, 1], 0))
        );
        assert_eq!(doc.point_after(&Point::new(vec![0, 1], 2)), None);
    }

    #[test]
    fn json_round_trip_keeps_content() {
        let doc = setup();
        let value = doc.to_json().unwrap();
        let back = Document::from_json(value).unwrap();
        assert_eq!(back.text(), doc.text());
    }
}
