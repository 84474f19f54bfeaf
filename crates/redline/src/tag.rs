//! The tagging model: building suggestion spans instead of editing.
//!
//! Tagging never destroys surrounding content.  An insertion is one new
//! span dropped at a point (splitting the host leaf only at the boundary);
//! a deletion relabels the covered plain leaves in place, keeping their
//! characters for the rendering layer to strike through.

use redline_core::{
    Author, DocError, Document, Marks, Point, Range, ReviewMark, SuggestionId, TextSpan,
};

/// Insert `text` as an Insertion span of `id` at `at`.  Returns the caret
/// position after the inserted text.
pub fn tag_as_insertion(
    doc: &mut Document,
    at: &Point,
    text: &str,
    id: &SuggestionId,
    author: &Author,
) -> Result<Point, DocError> {
    let span = TextSpan::reviewed(
        text,
        Marks::default(),
        ReviewMark::insertion(id.clone(), author.clone()),
    );
    let path = doc.insert_nodes_at(at, vec![span])?;
    Ok(Point::new(path, text.chars().count()))
}

/// Relabel every plain leaf covered by `range` as a Deletion span of `id`,
/// splitting partially covered leaves at the boundaries.  The characters
/// stay in the document.  Returns `false` for a collapsed range.
pub fn tag_as_deletion(
    doc: &mut Document,
    range: &Range,
    id: &SuggestionId,
    author: &Author,
) -> bool {
    if range.is_collapsed() {
        return false;
    }
    doc.set_review_on_range(range, &ReviewMark::deletion(id.clone(), author.clone()))
        .is_ok()
}

/// Clones of `sources` carrying Deletion metadata under `id`, preserving
/// each source span's text and formatting marks.  Used when a sub-range of
/// another suggestion's run is being replaced: the replaced content
/// reappears as this suggestion's deletion side.
pub fn build_deletion_clone(
    sources: &[TextSpan],
    id: &SuggestionId,
    author: &Author,
) -> Vec<TextSpan> {
    sources
        .iter()
        .filter(|span| !span.is_empty())
        .map(|span| {
            TextSpan::reviewed(
                span.text.clone(),
                span.marks.clone(),
                ReviewMark::deletion(id.clone(), author.clone()),
            )
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use redline_core::ReviewKind;

    fn author() -> Author {
        Author::new("user-1", "hsl(210, 65%, 50%)")
    }

    #[test]
    fn insertion_lands_at_the_point_and_returns_the_caret() {
        let mut doc = Document::from_text("Hello world");
        let id = SuggestionId::new("s-1-a");
        let caret = doc.transact(|doc| {
            tag_as_insertion(doc, &Point::new(vec![0, 0], 6), "brave ", &id, &author())
                .unwrap()
        });
        assert_eq!(doc.text(), "Hello brave world");
        assert_eq!(caret, Point::new(vec![0, 1], 6));
        let span = doc.leaf_at(&caret.path).unwrap();
        assert_eq!(span.review_kind(), Some(ReviewKind::Insertion));
        assert!(span.belongs_to(&id));
    }

    #[test]
    fn deletion_keeps_the_characters() {
        let mut doc = Document::from_text("Hello world");
        let id = SuggestionId::new("s-1-a");
        let range = Range::new(Point::new(vec![0, 0], 6), Point::new(vec![0, 0], 11));
        assert!(doc.transact(|doc| tag_as_deletion(doc, &range, &id, &author())));
        assert_eq!(doc.text(), "Hello world");
        let marked = doc.leaf_at(&[0, 1]).unwrap();
        assert_eq!(marked.text, "world");
        assert_eq!(marked.review_kind(), Some(ReviewKind::Deletion));
    }

    #[test]
    fn collapsed_deletion_range_declines() {
        let mut doc = Document::from_text("Hello");
        let range = Range::collapsed(Point::new(vec![0, 0], 2));
        assert!(!tag_as_deletion(&mut doc, &range, &SuggestionId::new("s"), &author()));
        assert_eq!(doc.text(), "Hello");
    }

    #[test]
    fn deletion_clone_preserves_marks_and_forces_kind() {
        let bold = TextSpan::with_marks("keep", Marks { bold: true, ..Marks::default() });
        let reviewed = TextSpan::reviewed(
            "old",
            Marks::default(),
            ReviewMark::insertion(SuggestionId::new("s-1-a"), author()),
        );
        let id = SuggestionId::new("s-2-b");
        let clones = build_deletion_clone(&[bold, reviewed], &id, &author());
        assert_eq!(clones.len(), 2);
        assert!(clones[0].marks.bold);
        for clone in &clones {
            assert_eq!(clone.review_kind(), Some(ReviewKind::Deletion));
            assert!(clone.belongs_to(&id));
        }
    }
}
