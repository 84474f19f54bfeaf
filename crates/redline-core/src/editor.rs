//! The host editing surface.
//!
//! [`EditOps`] is the operation interface shared by the default editor and
//! any wrapper composed in front of it; a wrapper intercepts the calls it
//! cares about and forwards the rest.  [`Editor`] is the default,
//! destructive implementation: it really removes and splices characters.
//!
//! Formatting commands live here too.  They are orthogonal to review
//! state: toggling bold over a suggested span changes its marks, not its
//! review metadata.

use crate::document::Document;
use crate::node::{BlockKind, Node, TextSpan};
use crate::path::{parent, Range};

/// The three fundamental text-mutating operations.
pub trait EditOps {
    fn insert_text(&mut self, text: &str);
    fn delete_backward(&mut self);
    fn delete_forward(&mut self);
    fn delete_fragment(&mut self);
}

/// Which boolean mark a toggle command flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    Bold,
    Italic,
    Underline,
}

/// Default editor: owns the document and applies edits destructively.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    doc: Document,
}

impl Editor {
    pub fn new(doc: Document) -> Self {
        Self { doc }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    // ── Formatting commands ───────────────────────────────────────────────

    /// Flip a boolean mark over the selection: set it everywhere unless
    /// every covered leaf already has it, in which case clear it.
    pub fn toggle_mark(&mut self, mark: MarkKind) {
        let Some(sel) = self.doc.selection().cloned() else { return };
        if sel.is_collapsed() {
            return;
        }
        self.doc.transact(|doc| {
            let Ok(paths) = doc.covered_leaf_paths(&sel) else { return };
            let get = |span: &TextSpan| match mark {
                MarkKind::Bold => span.marks.bold,
                MarkKind::Italic => span.marks.italic,
                MarkKind::Underline => span.marks.underline,
            };
            let all_set = !paths.is_empty()
                && paths.iter().all(|p| doc.leaf_at(p).is_some_and(|s| get(s)));
            let value = !all_set;
            for path in &paths {
                if let Some(span) = doc.leaf_at_mut(path) {
                    match mark {
                        MarkKind::Bold => span.marks.bold = value,
                        MarkKind::Italic => span.marks.italic = value,
                        MarkKind::Underline => span.marks.underline = value,
                    }
                }
            }
        });
    }

    pub fn set_font_size(&mut self, size: Option<String>) {
        self.update_selected_leaves(|span| span.marks.font_size = size.clone());
    }

    pub fn set_text_color(&mut self, color: Option<String>) {
        self.update_selected_leaves(|span| span.marks.color = color.clone());
    }

    pub fn set_highlight(&mut self, color: Option<String>) {
        self.update_selected_leaves(|span| span.marks.highlight = color.clone());
    }

    /// Switch the block under the selection start between the text-holding
    /// kinds (paragraph and headings).  Other kinds are left alone.
    pub fn set_block_kind(&mut self, kind: BlockKind) {
        if !kind.holds_text() {
            return;
        }
        let Some(sel) = self.doc.selection().cloned() else { return };
        let block = parent(&sel.start().path).to_vec();
        self.doc.transact(|doc| {
            if let Some(el) = doc.node_at_mut(&block).and_then(Node::as_element_mut) {
                if el.kind.holds_text() {
                    el.kind = kind;
                }
            }
        });
    }

    fn update_selected_leaves(&mut self, f: impl Fn(&mut TextSpan)) {
        let Some(sel) = self.doc.selection().cloned() else { return };
        if sel.is_collapsed() {
            return;
        }
        self.doc.transact(|doc| {
            let Ok(paths) = doc.covered_leaf_paths(&sel) else { return };
            for path in &paths {
                if let Some(span) = doc.leaf_at_mut(path) {
                    f(span);
                }
            }
        });
    }
}

impl EditOps for Editor {
    fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let Some(sel) = self.doc.selection().cloned() else { return };
        self.doc.transact(|doc| {
            if !sel.is_collapsed() {
                let _ = doc.delete_range(&sel);
            }
            let Some(caret) = doc.selection().map(|r| r.start().clone()) else {
                return;
            };
            doc.select(Range::collapsed(caret.clone()));
            let _ = doc.insert_text_at(&caret, text);
        });
    }

    fn delete_backward(&mut self) {
        let Some(sel) = self.doc.selection().cloned() else { return };
        if !sel.is_collapsed() {
            self.delete_fragment();
            return;
        }
        let Some(at) = self.doc.point_before(&sel.anchor) else { return };
        self.doc.transact(|doc| {
            if doc.remove_text_at(&at.path, at.offset, 1).is_ok() {
                doc.select(Range::collapsed(at));
            }
        });
    }

    fn delete_forward(&mut self) {
        let Some(sel) = self.doc.selection().cloned() else { return };
        if !sel.is_collapsed() {
            self.delete_fragment();
            return;
        }
        let Some(at) = self.doc.point_after(&sel.anchor) else { return };
        self.doc.transact(|doc| {
            let _ = doc.remove_text_at(&at.path, at.offset, 1);
        });
    }

    fn delete_fragment(&mut self) {
        let Some(sel) = self.doc.selection().cloned() else { return };
        if sel.is_collapsed() {
            return;
        }
        self.doc.transact(|doc| {
            let _ = doc.delete_range(&sel);
            if let Some(caret) = doc.selection().map(|r| r.start().clone()) {
                doc.select(Range::collapsed(caret));
            }
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
