//! redline-core — the document tree engine under the review layer.
//!
//! A document is a tree of block [`Element`]s over [`TextSpan`] leaves,
//! addressed by index [`Path`]s and character [`Point`]s.  The engine
//! provides the capabilities a suggestion-tracking layer needs from its
//! host: primitive transforms that rebase the selection and all tracked
//! point references, a normalization pass that treats differing review
//! metadata as a hard merge boundary, transaction-grouped undo, and the
//! [`EditOps`] operation interface that wrappers compose in front of.

pub mod constants;
mod document;
mod editor;
mod error;
mod history;
mod node;
mod normalize;
mod path;
mod point_ref;
mod transforms;

pub use document::Document;
pub use editor::{EditOps, Editor, MarkKind};
pub use error::DocError;
pub use node::{
    Author, BlockKind, Element, HeadingLevel, Marks, Node, ReviewKind, ReviewMark,
    ReviewStage, SuggestionId, TextSpan,
};
pub use path::{leaf_index, parent, Path, Point, Range};
pub use point_ref::{PointRef, PointRegistry};
