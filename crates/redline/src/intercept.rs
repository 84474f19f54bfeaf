//! The mutation interceptor.
//!
//! [`ReviewEditor`] implements [`EditOps`] in front of the base editor.
//! With review mode off every operation passes straight through; with it
//! on, the three text-mutating operations are rewritten into tagged
//! suggestion spans.  Each rewritten operation runs inside one document
//! transaction, so it is a single undo unit and no normalization pass can
//! observe it half-applied.

use tracing::trace;

use redline_core::{
    leaf_index, parent, Author, Document, EditOps, Editor, Marks, Path, Point, Range,
    ReviewKind, ReviewMark, ReviewStage, SuggestionId, TextSpan,
};

use crate::id::new_suggestion_id;
use crate::lifecycle;
use crate::query::{self, SuggestionInfo};
use crate::session::ReviewContext;
use crate::tag::{build_deletion_clone, tag_as_insertion};

#[derive(Debug, Clone, Copy)]
enum DeleteOp {
    Backward,
    Forward,
    Fragment,
}

/// What a to-be-deleted range currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeContent {
    /// Only Deletion spans: the range is already marked for removal.
    AllDeletion,
    /// Only Insertion spans: unconfirmed content the author may retract.
    AllInsertion,
    /// Plain text, possibly mixed with suggestion spans.
    Mixed,
}

/// Review-mode wrapper over the base editor.
#[derive(Debug, Clone)]
pub struct ReviewEditor {
    base: Editor,
    ctx: ReviewContext,
}

impl ReviewEditor {
    pub fn new(base: Editor, ctx: ReviewContext) -> Self {
        Self { base, ctx }
    }

    pub fn doc(&self) -> &Document {
        self.base.doc()
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        self.base.doc_mut()
    }

    /// The underlying editor, for operations the review layer does not
    /// intercept (formatting, block commands).
    pub fn base(&self) -> &Editor {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut Editor {
        &mut self.base
    }

    pub fn context(&self) -> &ReviewContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ReviewContext {
        &mut self.ctx
    }

    pub fn set_reviewing(&mut self, on: bool) {
        self.ctx.set_reviewing(on);
    }

    // ── Lifecycle and query surface ───────────────────────────────────────

    pub fn suggestions(&self) -> Vec<SuggestionInfo> {
        query::list_suggestions(self.doc())
    }

    pub fn accept_suggestion(&mut self, id: &SuggestionId) -> bool {
        lifecycle::accept_suggestion(self.doc_mut(), id)
    }

    pub fn reject_suggestion(&mut self, id: &SuggestionId) -> bool {
        lifecycle::reject_suggestion(self.doc_mut(), id)
    }

    /// Call on every selection change.
    pub fn commit_active_suggestions(&mut self) {
        lifecycle::commit_active_suggestions(self.doc_mut());
    }

    pub fn clear_expired_accept_flash(&mut self, now: std::time::Instant) -> usize {
        lifecycle::clear_expired_accept_flash(self.doc_mut(), now)
    }

    // ── insert_text routes ────────────────────────────────────────────────

    /// Caret in plain text: open a new suggestion with a single Insertion
    /// span and park the caret after it, so further keystrokes continue
    /// the same suggestion.
    fn insert_suggestion_at_caret(&mut self, sel: &Range, text: &str) {
        let id = new_suggestion_id();
        let author = self.ctx.author.clone();
        trace!(suggestion = %id, "starting insertion suggestion at caret");
        self.base.doc_mut().transact(|doc| {
            if let Ok(after) = tag_as_insertion(doc, &sel.anchor, text, &id, &author) {
                doc.select(Range::collapsed(after));
            }
        });
    }

    /// Selection over plain or mixed content: other suggestions' Insertion
    /// spans inside the range are really deleted, plain runs are tagged as
    /// this suggestion's Deletion, already-marked Deletion spans are left
    /// alone, and the typed text lands as an Insertion span at the start
    /// of the range.
    fn replace_selection(&mut self, sel: &Range, text: &str) {
        let id = new_suggestion_id();
        let author = self.ctx.author.clone();
        trace!(suggestion = %id, "replacing selection with a suggestion");
        self.base.doc_mut().transact(|doc| {
            let sref = doc.track_point(sel.start().clone());
            let eref = doc.track_point(sel.end().clone());
            let covered = doc.covered_leaf_paths(sel).unwrap_or_default();
            let insertions: Vec<Path> = covered
                .into_iter()
                .filter(|p| {
                    matches!(
                        doc.leaf_at(p).and_then(|s| s.review_kind()),
                        Some(ReviewKind::Insertion)
                    )
                })
                .collect();
            for path in insertions.iter().rev() {
                let _ = doc.remove_node(path);
            }
            let start = doc.untrack_point(sref);
            let end = doc.untrack_point(eref);
            let (Some(start), Some(end)) = (start, end) else { return };
            let _ = doc.set_review_on_range(
                &Range::new(start.clone(), end),
                &ReviewMark::deletion(id.clone(), author.clone()),
            );
            if let Ok(after) = tag_as_insertion(doc, &start, text, &id, &author) {
                doc.select(Range::collapsed(after));
            }
        });
    }

    /// Selection entirely inside one suggestion's Deletion run: the
    /// replaced sub-range moves out of the parent suggestion into a fresh
    /// one (Insertion plus a cloned Deletion), positioned immediately
    /// after the parent's run so the two never interleave.
    fn replace_inside_deletion(&mut self, sel: &Range, parent_id: SuggestionId, text: &str) {
        let id = new_suggestion_id();
        let author = self.ctx.author.clone();
        trace!(suggestion = %id, parent = %parent_id, "replacing inside a deletion run");
        self.base.doc_mut().transact(|doc| {
            let block = doc.block_path_of(sel.start());
            let Ok(covered) = doc.covered_leaf_paths(sel) else { return };
            let sources: Vec<TextSpan> = covered
                .iter()
                .filter_map(|p| doc.leaf_at(p))
                .cloned()
                .collect();
            let clones = build_deletion_clone(&sources, &id, &author);
            for path in covered.iter().rev() {
                let _ = doc.remove_node(path);
            }
            let at = point_after_suggestion_run(doc, &parent_id, &block)
                .unwrap_or_else(|| {
                    let mut path = block.clone();
                    path.push(0);
                    Point::new(path, 0)
                });
            let mut spans = Vec::with_capacity(clones.len() + 1);
            spans.push(TextSpan::reviewed(
                text,
                Marks::default(),
                ReviewMark::insertion(id.clone(), author.clone()),
            ));
            spans.extend(clones);
            if let Ok(first) = doc.insert_nodes_at(&at, spans) {
                doc.select(Range::collapsed(Point::new(first, text.chars().count())));
            }
        });
    }

    // ── delete routes ─────────────────────────────────────────────────────

    fn route_delete(&mut self, range: Range, op: DeleteOp) {
        match classify_range(self.base.doc(), &range) {
            None => {}
            Some(RangeContent::AllDeletion) => {
                trace!("delete over an already-marked range ignored");
            }
            Some(RangeContent::AllInsertion) => match op {
                DeleteOp::Backward => self.base.delete_backward(),
                DeleteOp::Forward => self.base.delete_forward(),
                DeleteOp::Fragment => self.base.delete_fragment(),
            },
            Some(RangeContent::Mixed) => self.mark_range_deleted(range),
        }
    }

    /// Mark `range` as a Deletion suggestion.  A single-character delete
    /// bordering an active Deletion run by the same author joins that
    /// suggestion, so continuous backspacing grows one suggestion instead
    /// of opening one per keypress.
    fn mark_range_deleted(&mut self, range: Range) {
        let single_char = range.start().path == range.end().path
            && range.end().offset == range.start().offset + 1;
        let id = if single_char {
            adjacent_active_deletion_id(self.base.doc(), &range, &self.ctx.author)
        } else {
            None
        }
        .unwrap_or_else(new_suggestion_id);
        let author = self.ctx.author.clone();
        trace!(suggestion = %id, "marking range as deletion");
        self.base.doc_mut().transact(|doc| {
            let sref = doc.track_point(range.start().clone());
            let eref = doc.track_point(range.end().clone());
            let covered = doc.covered_leaf_paths(&range).unwrap_or_default();
            let insertions: Vec<Path> = covered
                .into_iter()
                .filter(|p| {
                    matches!(
                        doc.leaf_at(p).and_then(|s| s.review_kind()),
                        Some(ReviewKind::Insertion)
                    )
                })
                .collect();
            for path in insertions.iter().rev() {
                let _ = doc.remove_node(path);
            }
            let start = doc.untrack_point(sref);
            let end = doc.untrack_point(eref);
            let (Some(start), Some(end)) = (start, end) else { return };
            let _ = doc.set_review_on_range(
                &Range::new(start.clone(), end),
                &ReviewMark::deletion(id.clone(), author.clone()),
            );
            doc.select(Range::collapsed(start));
        });
    }
}

impl EditOps for ReviewEditor {
    fn insert_text(&mut self, text: &str) {
        if !self.ctx.reviewing {
            self.base.insert_text(text);
            return;
        }
        let Some(sel) = self.base.doc().selection().cloned() else {
            // No selection: the base editor declines too.
            self.base.insert_text(text);
            return;
        };
        if text.is_empty() {
            return;
        }
        if sel.is_collapsed() {
            match caret_review_kind(self.base.doc(), &sel.anchor) {
                Some(ReviewKind::Insertion) => {
                    trace!("caret inside an insertion run, continuing it");
                    self.base.insert_text(text);
                }
                Some(ReviewKind::Deletion) => {
                    trace!("typing inside struck-through text ignored");
                }
                None => self.insert_suggestion_at_caret(&sel, text),
            }
        } else if let Some(parent_id) = deletion_run_id_covering(self.base.doc(), &sel) {
            self.replace_inside_deletion(&sel, parent_id, text);
        } else {
            self.replace_selection(&sel, text);
        }
    }

    fn delete_backward(&mut self) {
        if !self.ctx.reviewing {
            self.base.delete_backward();
            return;
        }
        let Some(sel) = self.base.doc().selection().cloned() else { return };
        if !sel.is_collapsed() {
            self.route_delete(sel, DeleteOp::Fragment);
            return;
        }
        let Some(at) = self.base.doc().point_before(&sel.anchor) else { return };
        let range = Range::new(at.clone(), Point::new(at.path.clone(), at.offset + 1));
        self.route_delete(range, DeleteOp::Backward);
    }

    fn delete_forward(&mut self) {
        if !self.ctx.reviewing {
            self.base.delete_forward();
            return;
        }
        let Some(sel) = self.base.doc().selection().cloned() else { return };
        if !sel.is_collapsed() {
            self.route_delete(sel, DeleteOp::Fragment);
            return;
        }
        let Some(at) = self.base.doc().point_after(&sel.anchor) else { return };
        let range = Range::new(at.clone(), Point::new(at.path.clone(), at.offset + 1));
        self.route_delete(range, DeleteOp::Forward);
    }

    fn delete_fragment(&mut self) {
        if !self.ctx.reviewing {
            self.base.delete_fragment();
            return;
        }
        let Some(sel) = self.base.doc().selection().cloned() else { return };
        if sel.is_collapsed() {
            return;
        }
        self.route_delete(sel, DeleteOp::Fragment);
    }
}

// ── Selection classification ──────────────────────────────────────────────

fn caret_review_kind(doc: &Document, caret: &Point) -> Option<ReviewKind> {
    doc.leaf_at(&caret.path).and_then(|span| span.review_kind())
}

/// The single suggestion whose Deletion spans cover the whole of `range`,
/// if there is one.
fn deletion_run_id_covering(doc: &Document, range: &Range) -> Option<SuggestionId> {
    let start = range.start();
    let end = range.end();
    let mut found: Option<SuggestionId> = None;
    for (path, span) in doc.leaves() {
        if path < start.path || path > end.path {
            continue;
        }
        let len = span.char_len();
        let s = if path == start.path { start.offset } else { 0 };
        let e = if path == end.path { end.offset.min(len) } else { len };
        if s >= e {
            continue;
        }
        match &span.review {
            Some(mark) if mark.kind == ReviewKind::Deletion => match &found {
                None => found = Some(mark.suggestion.clone()),
                Some(id) if *id == mark.suggestion => {}
                Some(_) => return None,
            },
            _ => return None,
        }
    }
    found
}

/// Uniform content classification of the leaves overlapping `range`.
fn classify_range(doc: &Document, range: &Range) -> Option<RangeContent> {
    let start = range.start();
    let end = range.end();
    let mut seen = false;
    let mut all_deletion = true;
    let mut all_insertion = true;
    for (path, span) in doc.leaves() {
        if path < start.path || path > end.path {
            continue;
        }
        let len = span.char_len();
        let s = if path == start.path { start.offset } else { 0 };
        let e = if path == end.path { end.offset.min(len) } else { len };
        if s >= e {
            continue;
        }
        seen = true;
        match span.review_kind() {
            Some(ReviewKind::Deletion) => all_insertion = false,
            Some(ReviewKind::Insertion) => all_deletion = false,
            None => {
                all_deletion = false;
                all_insertion = false;
            }
        }
    }
    if !seen {
        return None;
    }
    Some(if all_deletion {
        RangeContent::AllDeletion
    } else if all_insertion {
        RangeContent::AllInsertion
    } else {
        RangeContent::Mixed
    })
}

/// Position just past the last span of suggestion `id` within `block`.
fn point_after_suggestion_run(
    doc: &Document,
    id: &SuggestionId,
    block: &[usize],
) -> Option<Point> {
    doc.leaves_under(block)
        .into_iter()
        .filter(|(_, span)| span.belongs_to(id))
        .last()
        .map(|(path, span)| Point::new(path, span.char_len()))
}

/// Id of an active same-author Deletion run bordering `range`, if any.
fn adjacent_active_deletion_id(
    doc: &Document,
    range: &Range,
    author: &Author,
) -> Option<SuggestionId> {
    let end = range.end();
    if let Some(span) = doc.leaf_at(&end.path) {
        if end.offset == span.char_len() {
            if let Some(id) = sibling_active_deletion(doc, &end.path, 1, author) {
                return Some(id);
            }
        }
    }
    let start = range.start();
    if start.offset == 0 {
        if let Some(id) = sibling_active_deletion(doc, &start.path, -1, author) {
            return Some(id);
        }
    }
    None
}

fn sibling_active_deletion(
    doc: &Document,
    path: &[usize],
    step: isize,
    author: &Author,
) -> Option<SuggestionId> {
    let idx = leaf_index(path)?;
    let sibling_idx = if step < 0 { idx.checked_sub(1)? } else { idx + 1 };
    let mut sibling = parent(path).to_vec();
    sibling.push(sibling_idx);
    let mark = doc.leaf_at(&sibling)?.review.as_ref()?.clone();
    (mark.kind == ReviewKind::Deletion
        && mark.stage == ReviewStage::Active
        && mark.author == *author)
        .then_some(mark.suggestion)
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> Author {
        Author::new("user-1", "hsl(210, 65%, 50%)")
    }

    fn setup(text: &str) -> ReviewEditor {
        ReviewEditor::new(
            Editor::new(Document::from_text(text)),
            ReviewContext::reviewing(author()),
        )
    }

    fn caret(editor: &mut ReviewEditor, path: Vec<usize>, offset: usize) {
        editor.doc_mut().select(Range::collapsed(Point::new(path, offset)));
    }

    fn select(editor: &mut ReviewEditor, from: usize, to: usize) {
        editor.doc_mut().select(Range::new(
            Point::new(vec![0, 0], from),
            Point::new(vec![0, 0], to),
        ));
    }

    #[test]
    fn review_off_passes_straight_through() {
        let mut editor = setup("Hello world");
        editor.set_reviewing(false);
        select(&mut editor, 6, 11);
        editor.insert_text("there");
        assert_eq!(editor.doc().text(), "Hello there");
        assert!(editor.suggestions().is_empty());
    }

    #[test]
    fn caret_typing_opens_one_suggestion() {
        let mut editor = setup("Hello");
        caret(&mut editor, vec![0, 0], 5);
        editor.insert_text(" ");
        editor.insert_text("t");
        editor.insert_text("here");
        let suggestions = editor.suggestions();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].insertion_text, " there");
        assert_eq!(suggestions[0].deletion_text, "");
        assert_eq!(editor.doc().text(), "Hello there");
    }

    #[test]
    fn typing_inside_struck_text_is_ignored() {
        let mut editor = setup("Hello world");
        select(&mut editor, 6, 11);
        editor.delete_fragment();
        // Caret collapsed at the start of the marked range; move it into
        // the struck-through leaf.
        caret(&mut editor, vec![0, 1], 2);
        editor.insert_text("x");
        assert_eq!(editor.doc().text(), "Hello world");
        assert_eq!(editor.suggestions().len(), 1);
    }

    #[test]
    fn selection_replace_tags_deletion_and_insertion() {
        let mut editor = setup("Hello world");
        select(&mut editor, 6, 11);
        editor.insert_text("there");
        let suggestions = editor.suggestions();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].deletion_text, "world");
        assert_eq!(suggestions[0].insertion_text, "there");
        // Insertion precedes the struck-through original.
        assert_eq!(editor.doc().text(), "Hello thereworld");
    }

    #[test]
    fn backspace_run_grows_a_single_suggestion() {
        let mut editor = setup("Hello");
        caret(&mut editor, vec![0, 0], 5);
        editor.delete_backward();
        editor.delete_backward();
        let suggestions = editor.suggestions();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].deletion_text, "lo");
        assert_eq!(editor.doc().text(), "Hello");
    }

    #[test]
    fn backspace_inside_own_insertion_really_deletes() {
        let mut editor = setup("Hello");
        caret(&mut editor, vec![0, 0], 5);
        editor.insert_text(" there");
        editor.delete_backward();
        let suggestions = editor.suggestions();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].insertion_text, " ther");
        assert_eq!(editor.doc().text(), "Hello ther");
    }

    #[test]
    fn deleting_the_whole_insertion_dissolves_the_suggestion() {
        let mut editor = setup("Hello");
        caret(&mut editor, vec![0, 0], 5);
        editor.insert_text("!");
        editor.delete_backward();
        assert!(editor.suggestions().is_empty());
        assert_eq!(editor.doc().text(), "Hello");
    }

    #[test]
    fn delete_over_marked_text_is_a_no_op() {
        let mut editor = setup("Hello world");
        select(&mut editor, 6, 11);
        editor.delete_fragment();
        // Select the struck-through run again and delete: already marked.
        editor.doc_mut().select(Range::new(
            Point::new(vec![0, 1], 0),
            Point::new(vec![0, 1], 5),
        ));
        editor.delete_fragment();
        assert_eq!(editor.suggestions().len(), 1);
        assert_eq!(editor.doc().text(), "Hello world");
    }

    #[test]
    fn replace_inside_deletion_spawns_a_sibling_suggestion() {
        let mut editor = setup("Hello world");
        select(&mut editor, 6, 11);
        editor.insert_text("there");
        let first = editor.suggestions()[0].id.clone();
        // Select "orl" inside the struck-through "world" and type over it.
        let world_path = editor
            .doc()
            .leaves()
            .into_iter()
            .find(|(_, span)| span.text == "world")
            .map(|(path, _)| path)
            .unwrap();
        editor.doc_mut().select(Range::new(
            Point::new(world_path.clone(), 1),
            Point::new(world_path, 4),
        ));
        editor.insert_text("X");
        let suggestions = editor.suggestions();
        assert_eq!(suggestions.len(), 2);
        let parent = suggestions.iter().find(|s| s.id == first).unwrap();
        let child = suggestions.iter().find(|s| s.id != first).unwrap();
        assert_eq!(parent.deletion_text, "wd");
        assert_eq!(child.insertion_text, "X");
        assert_eq!(child.deletion_text, "orl");
        // The new suggestion sits after the parent's run.
        assert_eq!(editor.doc().text(), "Hello therewdXorl");
    }

    #[test]
    fn mixed_delete_keeps_marked_spans_and_tags_plain() {
        let mut editor = setup("Hello world");
        select(&mut editor, 6, 11);
        editor.delete_fragment();
        // Now delete a range covering plain "Hello " and the marked run.
        editor.doc_mut().select(Range::new(
            Point::new(vec![0, 0], 0),
            Point::new(vec![0, 1], 5),
        ));
        editor.delete_fragment();
        let suggestions = editor.suggestions();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(editor.doc().text(), "Hello world");
        let total_deleted: String = suggestions
            .iter()
            .map(|s| s.deletion_text.as_str())
            .collect();
        assert_eq!(total_deleted.len(), 11);
    }

    #[test]
    fn author_switch_changes_provenance_of_new_suggestions() {
        let mut editor = setup("Hello world");
        select(&mut editor, 0, 5);
        editor.insert_text("Howdy");
        editor
            .context_mut()
            .set_author(Author::new("user-2", "hsl(20, 60%, 48%)"));
        select_range_of_text(&mut editor, "world", "there");
        let suggestions = editor.suggestions();
        assert_eq!(suggestions.len(), 2);
        let authors: std::collections::HashSet<&str> =
            suggestions.iter().map(|s| s.author_id.as_str()).collect();
        assert!(authors.contains("user-1"));
        assert!(authors.contains("user-2"));
    }

    fn select_range_of_text(editor: &mut ReviewEditor, needle: &str, replacement: &str) {
        let path = editor
            .doc()
            .leaves()
            .into_iter()
            .find(|(_, span)| span.is_plain() && span.text.contains(needle))
            .map(|(path, _)| path)
            .unwrap();
        let span = editor.doc().leaf_at(&path).unwrap();
        let from = span.text.find(needle).unwrap();
        let from_chars = span.text[..from].chars().count();
        let to_chars = from_chars + needle.chars().count();
        editor.doc_mut().select(Range::new(
            Point::new(path.clone(), from_chars),
            Point::new(path, to_chars),
        ));
        editor.insert_text(replacement);
    }
}
