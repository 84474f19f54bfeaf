//! Session context for the review layer.
//!
//! The context is an explicit value held by the wrapping editor, injected
//! at construction and mutable through it — never ambient state.  Tests
//! simulate multiple sessions by building several editors with different
//! contexts over copies of one document.

use redline_core::Author;

/// Whether review mode is on and who the current author is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewContext {
    pub reviewing: bool,
    pub author: Author,
}

impl ReviewContext {
    /// A context with review mode off.
    pub fn new(author: Author) -> Self {
        Self { reviewing: false, author }
    }

    /// A context with review mode already on.
    pub fn reviewing(author: Author) -> Self {
        Self { reviewing: true, author }
    }

    pub fn set_reviewing(&mut self, on: bool) {
        self.reviewing = on;
    }

    /// Switch the session author; suggestions made from here on carry the
    /// new provenance, existing spans keep theirs.
    pub fn set_author(&mut self, author: Author) {
        self.author = author;
    }
}
