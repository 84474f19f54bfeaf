//! The suggestion query layer.
//!
//! Everything here is derived on demand from the document: suggestions are
//! not stored anywhere, they are the grouping of review-marked leaves by
//! id.

use std::collections::BTreeMap;

use serde::Serialize;

use redline_core::{Document, ReviewKind, ReviewStage, SuggestionId};

/// One suggestion as the surrounding application sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionInfo {
    pub id: SuggestionId,
    pub author_id: String,
    pub author_color: String,
    /// Struck-through original text, concatenated in document order.
    pub deletion_text: String,
    /// Proposed replacement text, concatenated in document order.
    pub insertion_text: String,
}

/// Every suggestion in the document, ordered by the lexical value of the
/// id.  Ids embed a creation timestamp, so this approximates chronological
/// order without promising it.  Author metadata is taken from the first
/// span seen for each id.
pub fn list_suggestions(doc: &Document) -> Vec<SuggestionInfo> {
    let mut groups: BTreeMap<SuggestionId, SuggestionInfo> = BTreeMap::new();
    for (_, span) in doc.leaves() {
        let Some(mark) = &span.review else { continue };
        let entry = groups
            .entry(mark.suggestion.clone())
            .or_insert_with(|| SuggestionInfo {
                id: mark.suggestion.clone(),
                author_id: mark.author.id.clone(),
                author_color: mark.author.color.clone(),
                deletion_text: String::new(),
                insertion_text: String::new(),
            });
        match mark.kind {
            ReviewKind::Deletion => entry.deletion_text.push_str(&span.text),
            ReviewKind::Insertion => entry.insertion_text.push_str(&span.text),
        }
    }
    groups.into_values().collect()
}

/// Review state of the leaf at `path`, for the rendering layer: which
/// suggestion it belongs to, which side, and whether it is still being
/// typed.  `None` for plain leaves and unresolvable paths.
pub fn leaf_review_state<'a>(
    doc: &'a Document,
    path: &[usize],
) -> Option<(&'a SuggestionId, ReviewKind, ReviewStage)> {
    let mark = doc.leaf_at(path)?.review.as_ref()?;
    Some((&mark.suggestion, mark.kind, mark.stage))
}

// ── Tests ─────────────────────────────────────────────────────────────────
