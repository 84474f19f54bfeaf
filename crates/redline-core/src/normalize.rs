//! Leaf normalization — merging mergeable neighbours and dropping empty
//! leaves after every outermost transaction.
//!
//! Spans whose review metadata differs never merge, so two suggestions
//! stay distinct spans even when everything else about them is identical.
//! The pass is suppressed while a [`Document::without_normalizing`] scope
//! (or a transaction) is open, so a multi-step operation is never observed
//! half-normalized.

use crate::document::Document;
use crate::node::Node;
use crate::path::Path;

impl Document {
    /// Run `f` with normalization suppressed; the pass runs once when the
    /// outermost scope ends.
    pub fn without_normalizing<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.suppress_depth += 1;
        let out = f(self);
        self.suppress_depth -= 1;
        if self.suppress_depth == 0 {
            self.normalize();
        }
        out
    }

    pub(crate) fn normalize(&mut self) {
        if self.suppress_depth > 0 {
            return;
        }
        for block in self.text_block_paths() {
            self.ensure_leaf(&block);
            self.drop_empty_leaves(&block);
            self.merge_adjacent_leaves(&block);
        }
    }

    /// Paths of every element whose children are text leaves.
    fn text_block_paths(&self) -> Vec<Path> {
        fn walk(nodes: &[Node], path: &mut Path, out: &mut Vec<Path>) {
            for (i, node) in nodes.iter().enumerate() {
                if let Node::Element(el) = node {
                    path.push(i);
                    if el.kind.holds_text() {
                        out.push(path.clone());
                    } else {
                        walk(&el.children, path, out);
                    }
                    path.pop();
                }
            }
        }
        let mut out = Vec::new();
        let mut path = Path::new();
        walk(&self.children, &mut path, &mut out);
        out
    }

    /// A text block always keeps at least one leaf.
    fn ensure_leaf(&mut self, block: &Path) {
        if let Ok(children) = self.children_mut(block) {
            if children.is_empty() {
                children.push(Node::text(""));
            }
        }
    }

    fn drop_empty_leaves(&mut self, block: &Path) {
        loop {
            let Some(el) = self.node_at(block).and_then(Node::as_element) else {
                return;
            };
            if el.children.len() <= 1 {
                return;
            }
            let empty = el
                .children
                .iter()
                .position(|n| n.as_text().is_some_and(|s| s.is_empty()));
            let Some(idx) = empty else { return };
            let mut path = block.clone();
            path.push(idx);
            if self.remove_node(&path).is_err() {
                return;
            }
        }
    }

    fn merge_adjacent_leaves(&mut self, block: &Path) {
        loop {
            let Some(el) = self.node_at(block).and_then(Node::as_element) else {
                return;
            };
            let mut target = None;
            for i in 1..el.children.len() {
                if let (Some(a), Some(b)) =
                    (el.children[i - 1].as_text(), el.children[i].as_text())
                {
                    if a.can_merge_with(b) {
                        target = Some(i);
                        break;
                    }
                }
            }
            let Some(idx) = target else { return };
            self.merge_leaf_into_prev(block, idx);
        }
    }

    /// Fold the leaf at child index `idx` into its left neighbour, rebasing
    /// positions on the absorbed leaf into the merged one.
    fn merge_leaf_into_prev(&mut self, block: &Path, idx: usize) {
        let prev_len;
        {
            let Ok(children) = self.children_mut(block) else { return };
            let Node::Text(right) = children.remove(idx) else { return };
            let Some(left) = children[idx - 1].as_text_mut() else { return };
            prev_len = left.char_len();
            left.text.push_str(&right.text);
        }
        let block = block.clone();
        let plen = block.len();
        self.rebase(move |p| {
            if p.path.len() == plen + 1 && p.path[..plen] == block[..] {
                let step = p.path[plen];
                if step == idx {
                    p.path[plen] = idx - 1;
                    p.offset += prev_len;
                } else if step > idx {
                    p.path[plen] -= 1;
                }
            }
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
