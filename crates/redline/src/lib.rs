//! redline — a suggestion-tracking ("track changes") layer for a
//! rich-text document tree.
//!
//! With review mode on, every text-mutating operation is rewritten into
//! tagged insertion/deletion spans instead of a destructive edit: typed
//! text lands as an Insertion span, deleted text stays in place as a
//! struck-through Deletion span, and both sides share a suggestion id and
//! author.  Suggestions are later resolved one by one — accept keeps the
//! proposal, reject restores the original — or frozen for review when the
//! caret leaves them.
//!
//! ```
//! use redline::{EditOps, Editor, ReviewContext, ReviewEditor};
//! use redline::core::{Author, Document, Point, Range};
//!
//! let doc = Document::from_text("Hello world");
//! let ctx = ReviewContext::reviewing(Author::new("user-1", "hsl(210, 65%, 50%)"));
//! let mut editor = ReviewEditor::new(Editor::new(doc), ctx);
//!
//! // Select "world" and type over it: tagged, not destroyed.
//! editor.doc_mut().select(Range::new(
//!     Point::new(vec![0, 0], 6),
//!     Point::new(vec![0, 0], 11),
//! ));
//! editor.insert_text("there");
//!
//! let suggestions = editor.suggestions();
//! assert_eq!(suggestions[0].deletion_text, "world");
//! assert_eq!(suggestions[0].insertion_text, "there");
//!
//! let id = suggestions[0].id.clone();
//! assert!(editor.accept_suggestion(&id));
//! assert_eq!(editor.doc().text(), "Hello there");
//! ```

pub mod constants;
mod id;
mod intercept;
mod lifecycle;
mod query;
mod session;
mod tag;
mod users;

pub use id::new_suggestion_id;
pub use intercept::ReviewEditor;
pub use lifecycle::{
    accept_suggestion, clear_expired_accept_flash, commit_active_suggestions,
    reject_suggestion,
};
pub use query::{leaf_review_state, list_suggestions, SuggestionInfo};
pub use session::ReviewContext;
pub use tag::{build_deletion_clone, tag_as_deletion, tag_as_insertion};
pub use users::{initials, random_color, User, UserRegistry};

/// The underlying document engine, re-exported for consumers.
pub use redline_core as core;

pub use redline_core::{EditOps, Editor};
