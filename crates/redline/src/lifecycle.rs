//! Suggestion lifecycle: commit on leaving, accept, reject.
//!
//! Accept keeps the insertion and removes the struck-through original;
//! reject keeps the original (its metadata is stripped, the text is never
//! re-inserted, so independent formatting survives) and removes the
//! insertion.  Both pre-scan every span of the suggestion before mutating,
//! so an id whose spans are gone is a clean `false` no-op, never a partial
//! failure.

use std::time::Instant;

use tracing::debug;

use redline_core::{
    Document, Path, Point, Range, ReviewKind, ReviewStage, SuggestionId,
};

use crate::constants::ACCEPT_FLASH;

/// Freeze every suggestion the caret is not sitting in: relabel its spans
/// from actively-edited to committed.  The stage only affects rendering,
/// never accept/reject semantics, and committing twice is a no-op.
pub fn commit_active_suggestions(doc: &mut Document) {
    if selection_touches_suggestion(doc) {
        return;
    }
    let targets: Vec<Path> = doc
        .leaves()
        .into_iter()
        .filter(|(_, span)| {
            span.review
                .as_ref()
                .is_some_and(|mark| mark.stage == ReviewStage::Active)
        })
        .map(|(path, _)| path)
        .collect();
    if targets.is_empty() {
        return;
    }
    doc.without_normalizing(|doc| {
        for path in &targets {
            if let Some(span) = doc.leaf_at_mut(path) {
                if let Some(mark) = span.review.as_mut() {
                    mark.stage = ReviewStage::Committed;
                }
            }
        }
    });
    debug!(spans = targets.len(), "committed active suggestions");
}

/// Resolve a suggestion by keeping its insertion and deleting its
/// struck-through original.  Returns `false` when no spans carry the id.
pub fn accept_suggestion(doc: &mut Document, id: &SuggestionId) -> bool {
    let entries = scan(doc, id);
    if entries.is_empty() {
        debug!(suggestion = %id, "accept: no spans with this id");
        return false;
    }
    let flash_until = Instant::now() + ACCEPT_FLASH;
    doc.transact(|doc| {
        for (path, kind) in &entries {
            if *kind == ReviewKind::Insertion {
                if let Some(span) = doc.leaf_at_mut(path) {
                    span.review = None;
                    span.accept_flash_until = Some(flash_until);
                }
            }
        }
        // Reverse document order, so earlier paths stay valid.
        for (path, kind) in entries.iter().rev() {
            if *kind == ReviewKind::Deletion {
                let _ = doc.remove_node(path);
            }
        }
    });
    debug!(suggestion = %id, spans = entries.len(), "accepted suggestion");
    true
}

/// Resolve a suggestion by restoring its original text and deleting the
/// proposed insertion.  Returns `false` when no spans carry the id.
pub fn reject_suggestion(doc: &mut Document, id: &SuggestionId) -> bool {
    let entries = scan(doc, id);
    if entries.is_empty() {
        debug!(suggestion = %id, "reject: no spans with this id");
        return false;
    }
    doc.transact(|doc| {
        for (path, kind) in &entries {
            if *kind == ReviewKind::Deletion {
                if let Some(span) = doc.leaf_at_mut(path) {
                    span.review = None;
                }
            }
        }
        // Each insertion is re-resolved through a tracked ref at removal
        // time; a raw path captured before the loop could go stale.
        let refs: Vec<_> = entries
            .iter()
            .filter(|(_, kind)| *kind == ReviewKind::Insertion)
            .map(|(path, _)| doc.track_point(Point::new(path.clone(), 0)))
            .collect();
        for r in refs.into_iter().rev() {
            let Some(at) = doc.untrack_point(r) else { continue };
            if doc.leaf_at(&at.path).is_some_and(|span| span.belongs_to(id)) {
                let _ = doc.remove_node(&at.path);
            }
        }
    });
    debug!(suggestion = %id, spans = entries.len(), "rejected suggestion");
    true
}

/// Drop accept-flash marks whose deadline has passed.  Spans that were
/// edited away in the meantime are simply not found; nothing to clear.
pub fn clear_expired_accept_flash(doc: &mut Document, now: Instant) -> usize {
    let targets: Vec<Path> = doc
        .leaves()
        .into_iter()
        .filter(|(_, span)| span.accept_flash_until.is_some_and(|t| t <= now))
        .map(|(path, _)| path)
        .collect();
    if targets.is_empty() {
        return 0;
    }
    doc.without_normalizing(|doc| {
        for path in &targets {
            if let Some(span) = doc.leaf_at_mut(path) {
                span.accept_flash_until = None;
            }
        }
    });
    targets.len()
}

fn scan(doc: &Document, id: &SuggestionId) -> Vec<(Path, ReviewKind)> {
    doc.leaves()
        .into_iter()
        .filter(|(_, span)| span.belongs_to(id))
        .filter_map(|(path, span)| span.review_kind().map(|kind| (path, kind)))
        .collect()
}

fn selection_touches_suggestion(doc: &Document) -> bool {
    let Some(sel) = doc.selection() else { return false };
    let anchor = sel.anchor.clone();
    for (path, span) in doc.leaves() {
        if span.is_plain() {
            continue;
        }
        let leaf = Range::new(
            Point::new(path.clone(), 0),
            Point::new(path, span.char_len()),
        );
        if leaf.includes(&anchor) {
            return true;
        }
    }
    false
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use redline_core::{Author, EditOps, Editor, Range};

    use crate::intercept::ReviewEditor;
    use crate::session::ReviewContext;

    fn author() -> Author {
        Author::new("user-1", "hsl(210, 65%, 50%)")
    }

    /// "Hello world" with "world" → "there" suggested.
    fn setup() -> (ReviewEditor, SuggestionId) {
        let mut editor = ReviewEditor::new(
            Editor::new(Document::from_text("Hello world")),
            ReviewContext::reviewing(author()),
        );
        editor.doc_mut().select(Range::new(
            Point::new(vec![0, 0], 6),
            Point::new(vec![0, 0], 11),
        ));
        editor.insert_text("there");
        let id = editor.suggestions()[0].id.clone();
        (editor, id)
    }

    #[test]
    fn accept_keeps_insertion_and_drops_deletion() {
        let (mut editor, id) = setup();
        assert!(editor.accept_suggestion(&id));
        assert_eq!(editor.doc().text(), "Hello there");
        assert!(editor.suggestions().is_empty());
    }

    #[test]
    fn reject_restores_the_original_text() {
        let (mut editor, id) = setup();
        assert!(editor.reject_suggestion(&id));
        assert_eq!(editor.doc().text(), "Hello world");
        assert!(editor.suggestions().is_empty());
        // Restored text merges back into one plain leaf.
        assert_eq!(editor.doc().leaves().len(), 1);
    }

    #[test]
    fn resolved_ids_become_no_ops() {
        let (mut editor, id) = setup();
        assert!(editor.accept_suggestion(&id));
        assert!(!editor.accept_suggestion(&id));
        assert!(!editor.reject_suggestion(&id));
        assert_eq!(editor.doc().text(), "Hello there");
    }

    #[test]
    fn unknown_id_is_a_no_op() {
        let (mut editor, _) = setup();
        let before = editor.doc().text();
        assert!(!editor.accept_suggestion(&SuggestionId::new("s-0-zzzzzzz")));
        assert!(!editor.reject_suggestion(&SuggestionId::new("s-0-zzzzzzz")));
        assert_eq!(editor.doc().text(), before);
        assert_eq!(editor.suggestions().len(), 1);
    }

    #[test]
    fn commit_freezes_untouched_suggestions() {
        let (mut editor, id) = setup();
        // Caret still inside the suggestion: nothing commits.
        editor.commit_active_suggestions();
        assert!(stages(editor.doc(), &id).iter().all(|s| *s == ReviewStage::Active));
        // Move the caret away and commit.
        editor
            .doc_mut()
            .select(Range::collapsed(Point::new(vec![0, 0], 0)));
        editor.commit_active_suggestions();
        assert!(stages(editor.doc(), &id).iter().all(|s| *s == ReviewStage::Committed));
    }

    #[test]
    fn commit_is_idempotent() {
        let (mut editor, _) = setup();
        editor
            .doc_mut()
            .select(Range::collapsed(Point::new(vec![0, 0], 0)));
        editor.commit_active_suggestions();
        let once = editor.doc().to_json().unwrap();
        editor.commit_active_suggestions();
        assert_eq!(editor.doc().to_json().unwrap(), once);
    }

    #[test]
    fn accept_flash_expires_and_leaves_merge() {
        let (mut editor, id) = setup();
        editor.accept_suggestion(&id);
        // The accepted insertion still carries its flash, so it stays a
        // separate leaf.
        assert_eq!(editor.doc().leaves().len(), 2);
        let later = Instant::now() + ACCEPT_FLASH + Duration::from_millis(50);
        assert_eq!(editor.clear_expired_accept_flash(later), 1);
        assert_eq!(editor.doc().leaves().len(), 1);
        assert_eq!(editor.clear_expired_accept_flash(later), 0);
    }

    fn stages(doc: &Document, id: &SuggestionId) -> Vec<ReviewStage> {
        doc.leaves()
            .into_iter()
            .filter(|(_, span)| span.belongs_to(id))
            .filter_map(|(_, span)| span.review.as_ref().map(|m| m.stage))
            .collect()
    }
}
