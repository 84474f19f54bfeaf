//! Document node model — block elements and formatted text leaves.
//!
//! The tree is a closed union: block [`Element`]s contain child nodes, and
//! [`TextSpan`] leaves carry the characters together with formatting
//! [`Marks`] and the optional [`ReviewMark`] that the suggestion layer
//! attaches.  Every consumer matches these enums exhaustively; there is no
//! string-tag dispatch.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

// ── Block elements ────────────────────────────────────────────────────────

/// Heading depth, `h1`–`h6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

/// Block element taxonomy.
///
/// `Image` is a void block: it renders replaced content and holds no text
/// leaves.  `Table` contains `TableRow`s, which contain `TableCell`s; only
/// paragraphs, headings and table cells hold text directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Paragraph,
    Heading(HeadingLevel),
    Image {
        url: String,
        alt: String,
        width: Option<u32>,
    },
    Table,
    TableRow,
    TableCell,
}

impl BlockKind {
    /// Void blocks hold no editable children.
    pub fn is_void(&self) -> bool {
        matches!(self, BlockKind::Image { .. })
    }

    /// `true` for blocks whose children are text leaves.
    pub fn holds_text(&self) -> bool {
        matches!(
            self,
            BlockKind::Paragraph | BlockKind::Heading(_) | BlockKind::TableCell
        )
    }
}

/// A block element: a kind plus child nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub kind: BlockKind,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(kind: BlockKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::new(BlockKind::Paragraph, children)
    }

    pub fn heading(level: HeadingLevel, children: Vec<Node>) -> Self {
        Self::new(BlockKind::Heading(level), children)
    }

    pub fn table_cell(children: Vec<Node>) -> Self {
        Self::new(BlockKind::TableCell, children)
    }

    pub fn table_row(cells: Vec<Element>) -> Self {
        Self::new(
            BlockKind::TableRow,
            cells.into_iter().map(Node::Element).collect(),
        )
    }

    pub fn table(rows: Vec<Element>) -> Self {
        Self::new(
            BlockKind::Table,
            rows.into_iter().map(Node::Element).collect(),
        )
    }

    pub fn image(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self::new(
            BlockKind::Image {
                url: url.into(),
                alt: alt.into(),
                width: None,
            },
            Vec::new(),
        )
    }
}

/// A tree node: either a block element or a text leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Element(Element),
    Text(TextSpan),
}

impl Node {
    /// Convenience constructor for a plain text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextSpan::plain(text))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn as_text(&self) -> Option<&TextSpan> {
        match self {
            Node::Text(span) => Some(span),
            Node::Element(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextSpan> {
        match self {
            Node::Text(span) => Some(span),
            Node::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }
}

// ── Formatting marks ──────────────────────────────────────────────────────

/// Character-level formatting, orthogonal to review state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marks {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub font_size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub highlight: Option<String>,
}

// ── Review metadata ───────────────────────────────────────────────────────

/// Opaque suggestion identifier.
///
/// Identifiers are unique for the lifetime of a session; lexical ordering
/// of the inner string approximates creation order because the generator
/// embeds a millisecond timestamp.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SuggestionId(String);

impl SuggestionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SuggestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which side of a suggestion a span belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewKind {
    /// Newly proposed text that did not exist before the suggestion.
    Insertion,
    /// Pre-existing text proposed for removal; kept in the tree, struck
    /// through by the rendering layer, until the suggestion is resolved.
    Deletion,
}

/// Rendering sub-state of a suggestion span.
///
/// `Committed` spans are no longer "being typed"; the distinction affects
/// presentation only, never accept/reject semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStage {
    Active,
    Committed,
}

/// Provenance of a suggestion's author, copied onto each of its spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub color: String,
}

impl Author {
    pub fn new(id: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            color: color.into(),
        }
    }
}

/// Review metadata carried by a suggested span.
///
/// Plain spans have no `ReviewMark` at all, so they can never carry author
/// provenance, and a marked span has exactly one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewMark {
    pub suggestion: SuggestionId,
    pub kind: ReviewKind,
    pub stage: ReviewStage,
    pub author: Author,
}

impl ReviewMark {
    pub fn insertion(suggestion: SuggestionId, author: Author) -> Self {
        Self {
            suggestion,
            kind: ReviewKind::Insertion,
            stage: ReviewStage::Active,
            author,
        }
    }

    pub fn deletion(suggestion: SuggestionId, author: Author) -> Self {
        Self {
            suggestion,
            kind: ReviewKind::Deletion,
            stage: ReviewStage::Active,
            author,
        }
    }
}

// ── Text spans ────────────────────────────────────────────────────────────

/// A leaf text node with uniform formatting and review metadata.
///
/// Offsets into a span are always counted in characters, never bytes.
/// `accept_flash_until` is a transient rendering pulse set when an
/// insertion is accepted; it is never serialized and may be dropped at any
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    #[serde(default)]
    pub marks: Marks,
    #[serde(default)]
    pub review: Option<ReviewMark>,
    #[serde(skip)]
    pub accept_flash_until: Option<Instant>,
}

impl TextSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
            review: None,
            accept_flash_until: None,
        }
    }

    pub fn with_marks(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
            review: None,
            accept_flash_until: None,
        }
    }

    pub fn reviewed(text: impl Into<String>, marks: Marks, review: ReviewMark) -> Self {
        Self {
            text: text.into(),
            marks,
            review: Some(review),
            accept_flash_until: None,
        }
    }

    /// Number of characters in the span.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// `true` when the span carries no review metadata.
    pub fn is_plain(&self) -> bool {
        self.review.is_none()
    }

    pub fn review_kind(&self) -> Option<ReviewKind> {
        self.review.as_ref().map(|r| r.kind)
    }

    pub fn belongs_to(&self, id: &SuggestionId) -> bool {
        self.review
            .as_ref()
            .is_some_and(|r| &r.suggestion == id)
    }

    /// Whether the normalization pass may merge `other` into this span.
    ///
    /// Review metadata must match exactly, so two different suggestions are
    /// a hard merge boundary even when all formatting is identical.
    pub fn can_merge_with(&self, other: &Self) -> bool {
        self.marks == other.marks
            && self.review == other.review
            && self.accept_flash_until == other.accept_flash_until
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
