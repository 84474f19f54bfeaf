//! Primitive tree mutations.
//!
//! Five primitives cover every structural change: text splice in/out of a
//! leaf, sibling insertion, node removal and leaf splitting.  Each one
//! rebases the selection and every tracked point reference before it
//! returns, so positions held across a multi-step operation stay valid.
//! The compound operations at the bottom are built from the primitives and
//! inherit that guarantee.

use crate::document::Document;
use crate::error::DocError;
use crate::node::{Node, ReviewMark, TextSpan};
use crate::path::{leaf_index, parent, Path, Point, Range};

/// Byte index of the `chars`-th character of `text`.
fn byte_offset(text: &str, chars: usize) -> Option<usize> {
    if chars == 0 {
        return Some(0);
    }
    match text.char_indices().nth(chars) {
        Some((byte, _)) => Some(byte),
        None if text.chars().count() == chars => Some(text.len()),
        None => None,
    }
}

impl Document {
    // ── Primitives ────────────────────────────────────────────────────────

    /// Splice `text` into the leaf at `at`.  The spliced characters take on
    /// the leaf's marks and review metadata.
    pub fn insert_text_at(&mut self, at: &Point, text: &str) -> Result<(), DocError> {
        if text.is_empty() {
            return Ok(());
        }
        let span = self.leaf_mut(&at.path)?;
        let len = span.char_len();
        let byte = byte_offset(&span.text, at.offset)
            .ok_or(DocError::OffsetOutOfBounds { offset: at.offset, len })?;
        span.text.insert_str(byte, text);
        let added = text.chars().count();
        let path = at.path.clone();
        let offset = at.offset;
        self.rebase(move |p| {
            if p.path == path && p.offset >= offset {
                p.offset += added;
            }
        });
        Ok(())
    }

    /// Remove `len` characters starting at `offset` from the leaf at `path`.
    pub fn remove_text_at(
        &mut self,
        path: &[usize],
        offset: usize,
        len: usize,
    ) -> Result<(), DocError> {
        if len == 0 {
            return Ok(());
        }
        let span = self.leaf_mut(path)?;
        let total = span.char_len();
        if offset + len > total {
            return Err(DocError::OffsetOutOfBounds { offset: offset + len, len: total });
        }
        let from = byte_offset(&span.text, offset)
            .ok_or(DocError::OffsetOutOfBounds { offset, len: total })?;
        let to = byte_offset(&span.text, offset + len)
            .ok_or(DocError::OffsetOutOfBounds { offset: offset + len, len: total })?;
        span.text.replace_range(from..to, "");
        let path = path.to_vec();
        self.rebase(move |p| {
            if p.path == path {
                if p.offset >= offset + len {
                    p.offset -= len;
                } else if p.offset > offset {
                    p.offset = offset;
                }
            }
        });
        Ok(())
    }

    /// Insert `spans` as sibling leaves at `at`, splitting the target leaf
    /// when the point falls mid-span.  Returns the path of the first
    /// inserted leaf.
    pub fn insert_nodes_at(
        &mut self,
        at: &Point,
        spans: Vec<TextSpan>,
    ) -> Result<Path, DocError> {
        if spans.is_empty() {
            return Ok(at.path.clone());
        }
        let len = self
            .leaf_at(&at.path)
            .ok_or(DocError::NotAText)?
            .char_len();
        if at.offset > len {
            return Err(DocError::OffsetOutOfBounds { offset: at.offset, len });
        }
        if at.offset > 0 && at.offset < len {
            self.split_leaf(&at.path, at.offset)?;
        }
        let base = leaf_index(&at.path).ok_or(DocError::PathNotFound)?;
        let idx = if at.offset == 0 { base } else { base + 1 };
        let parent_path = parent(&at.path).to_vec();
        let count = spans.len();
        {
            let children = self.children_mut(&parent_path)?;
            if idx > children.len() {
                return Err(DocError::PathNotFound);
            }
            for (k, span) in spans.into_iter().enumerate() {
                children.insert(idx + k, Node::Text(span));
            }
        }
        let plen = parent_path.len();
        let mut first = parent_path.clone();
        first.push(idx);
        self.rebase(move |p| {
            if p.path.len() > plen && p.path[..plen] == parent_path[..] && p.path[plen] >= idx {
                p.path[plen] += count;
            }
        });
        Ok(first)
    }

    /// Remove the node at `path`.  Positions inside the removed subtree
    /// clamp to the removal site; later siblings shift left.
    pub fn remove_node(&mut self, path: &[usize]) -> Result<(), DocError> {
        let idx = leaf_index(path).ok_or(DocError::PathNotFound)?;
        let parent_path = parent(path).to_vec();
        {
            let children = self.children_mut(&parent_path)?;
            if idx >= children.len() {
                return Err(DocError::PathNotFound);
            }
            children.remove(idx);
        }
        let removed = path.to_vec();
        let plen = parent_path.len();
        self.rebase(move |p| {
            if p.path.len() > plen && p.path[..plen] == parent_path[..] {
                if p.path.len() >= removed.len() && p.path[..removed.len()] == removed[..] {
                    p.path = removed.clone();
                    p.offset = 0;
                } else if p.path[plen] > idx {
                    p.path[plen] -= 1;
                }
            }
        });
        Ok(())
    }

    /// Split the leaf at `path` into two at `offset`.  A no-op when the
    /// offset sits on the leaf boundary.
    pub fn split_leaf(&mut self, path: &[usize], offset: usize) -> Result<(), DocError> {
        let idx = leaf_index(path).ok_or(DocError::PathNotFound)?;
        let parent_path = parent(path).to_vec();
        let span = self.leaf_mut(path)?;
        let len = span.char_len();
        if offset > len {
            return Err(DocError::OffsetOutOfBounds { offset, len });
        }
        if offset == 0 || offset == len {
            return Ok(());
        }
        let byte = byte_offset(&span.text, offset)
            .ok_or(DocError::OffsetOutOfBounds { offset, len })?;
        let tail = span.text.split_off(byte);
        let second = TextSpan {
            text: tail,
            marks: span.marks.clone(),
            review: span.review.clone(),
            accept_flash_until: span.accept_flash_until,
        };
        self.children_mut(&parent_path)?
            .insert(idx + 1, Node::Text(second));
        let plen = parent_path.len();
        self.rebase(move |p| {
            if p.path.len() == plen + 1 && p.path[..plen] == parent_path[..] {
                let step = p.path[plen];
                if step == idx {
                    if p.offset > offset {
                        p.path[plen] = idx + 1;
                        p.offset -= offset;
                    }
                } else if step > idx {
                    p.path[plen] += 1;
                }
            }
        });
        Ok(())
    }

    // ── Compound operations ───────────────────────────────────────────────

    /// Remove every character covered by `range`, in reverse document order.
    /// Block structure is untouched; emptied leaves are left for the
    /// normalization pass.
    pub fn delete_range(&mut self, range: &Range) -> Result<(), DocError> {
        if range.is_collapsed() {
            return Ok(());
        }
        let start = range.start().clone();
        let end = range.end().clone();
        let mut slices: Vec<(Path, usize, usize)> = Vec::new();
        for (path, span) in self.leaves() {
            if path < start.path || path > end.path {
                continue;
            }
            let len = span.char_len();
            let s = if path == start.path { start.offset } else { 0 };
            let e = if path == end.path { end.offset.min(len) } else { len };
            if s >= e {
                continue;
            }
            slices.push((path, s, e));
        }
        for (path, s, e) in slices.into_iter().rev() {
            self.remove_text_at(&path, s, e - s)?;
        }
        Ok(())
    }

    /// Split the boundary leaves of `range` and return the paths of every
    /// non-empty leaf that ends up fully covered, in document order.
    ///
    /// Call inside a transaction or suppress scope; the splits must not be
    /// re-merged before the caller is done with the paths.
    pub fn covered_leaf_paths(&mut self, range: &Range) -> Result<Vec<Path>, DocError> {
        if range.is_collapsed() {
            return Ok(Vec::new());
        }
        let sref = self.refs.track(range.start().clone());
        let eref = self.refs.track(range.end().clone());
        let split_end = self.split_leaf(&range.end().path, range.end().offset);
        let split_start = self.split_leaf(&range.start().path, range.start().offset);
        let start = self.refs.untrack(sref);
        let end = self.refs.untrack(eref);
        split_end?;
        split_start?;
        let (Some(start), Some(end)) = (start, end) else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for (path, span) in self.leaves() {
            if span.is_empty() {
                continue;
            }
            let leaf_start = Point::new(path.clone(), 0);
            let leaf_end = Point::new(path.clone(), span.char_len());
            if start <= leaf_start && leaf_end <= end {
                out.push(path);
            }
        }
        Ok(out)
    }

    /// Attach `review` to every plain leaf fully covered by `range`,
    /// splitting partially covered leaves at the boundaries.  Leaves that
    /// already carry review metadata are left untouched.
    pub fn set_review_on_range(
        &mut self,
        range: &Range,
        review: &ReviewMark,
    ) -> Result<(), DocError> {
        if range.is_collapsed() {
            return Ok(());
        }
        let covered = self.covered_leaf_paths(range)?;
        for path in &covered {
            if let Some(span) = self.leaf_at_mut(path) {
                if span.is_plain() {
                    span.review = Some(review.clone());
                }
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
