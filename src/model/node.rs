//! Outline node types and body blocks.

use std::collections::BTreeMap;

/// Unique identifier for a node within a [`Document`](super::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root node ID (always 0).
    pub const ROOT: NodeId = NodeId(0);
}

/// Identifies one code block: the owning node plus its index in the
/// node's body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId {
    pub node: NodeId,
    pub index: usize,
}

impl BlockId {
    pub fn new(node: NodeId, index: usize) -> Self {
        Self { node, index }
    }
}

/// An atomic body block under a heading.
///
/// The document provider supplies these already parsed; the engine never
/// interprets raw markup. The one engine-mutable field is `visible` on
/// [`Block::Code`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(tag = "type", rename_all = "snake_case"))]
pub enum Block {
    Text {
        text: String,
    },
    Code {
        #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
        language: Option<String>,
        source: String,
        visible: bool,
    },
    Drawer {
        name: String,
        lines: Vec<String>,
    },
    /// A raw `#+` comment or directive line, marker prefix included.
    Comment {
        text: String,
    },
    List {
        items: Vec<String>,
    },
}

/// A node in the outline tree.
///
/// Uses the parent-pointer / first-child / next-sibling representation
/// for cheap traversal without per-node child vectors.
#[derive(Debug, Clone)]
pub struct Node {
    /// Heading text, verbatim. May carry a leading `TODO `/`DONE `
    /// keyword and trailing `:tag:` groups.
    pub title: String,
    /// Heading depth, 1-based. 0 only for the root.
    pub depth: u8,
    /// Per-node properties (case-sensitive keys).
    pub properties: BTreeMap<String, String>,
    /// Body blocks before any child heading.
    pub body: Vec<Block>,
    /// Parent node (None for root).
    pub parent: Option<NodeId>,
    /// First child node.
    pub first_child: Option<NodeId>,
    /// Next sibling node.
    pub next_sibling: Option<NodeId>,
}

impl Node {
    /// Create a heading node with the given title and depth.
    pub fn new(title: impl Into<String>, depth: u8) -> Self {
        Self {
            title: title.into(),
            depth,
            properties: BTreeMap::new(),
            body: Vec::new(),
            parent: None,
            first_child: None,
            next_sibling: None,
        }
    }

    pub(crate) fn root() -> Self {
        Self::new("", 0)
    }

    /// Look up a property by exact key.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Whether a property is present with a truthy value (anything but
    /// `nil` or the empty string).
    pub fn property_flag(&self, key: &str) -> bool {
        matches!(self.property(key), Some(v) if !v.is_empty() && v != "nil")
    }
}

/// Per-node property keys the engine consumes.
pub mod keys {
    /// Document keyword declaring page granularity.
    pub const FRAME_LEVEL: &str = "EPRESENT_FRAME_LEVEL";
    /// Auxiliary file to display next to the page.
    pub const SHOW_FILE: &str = "SHOW_FILE";
    /// Video to play next to the page.
    pub const SHOW_VIDEO: &str = "SHOW_VIDEO";
    /// Split below instead of to the right.
    pub const SHOW_BELOW: &str = "SHOW_BELOW";
    /// Split size in rows/columns.
    pub const SHOW_SIZE: &str = "SHOW_SIZE";
    /// Open the auxiliary window on page entry.
    pub const SHOW_AUTO: &str = "SHOW_AUTO";
    /// Mute video playback.
    pub const MUTE: &str = "MUTE";
    /// Hide this subtree's text on its page.
    pub const HIDE: &str = "HIDE";
    /// Reveal children one by one with a delay on page entry.
    pub const SLIDE_IN: &str = "SLIDE_IN";
    /// Reveal one child per `next` before advancing pages.
    pub const STEPWISE: &str = "STEPWISE";
    /// Child starts expanded instead of collapsed to its heading line.
    pub const UNFOLD: &str = "UNFOLD";
}

/// Split a heading title into its optional todo keyword, bare text, and
/// trailing tag group.
///
/// `"TODO Write intro :talk:demo:"` splits into
/// `(Some("TODO"), "Write intro", Some(":talk:demo:"))`.
pub fn split_title(title: &str) -> (Option<&str>, &str, Option<&str>) {
    let mut rest = title;
    let mut todo = None;

    for keyword in ["TODO", "DONE"] {
        if let Some(after) = rest.strip_prefix(keyword) {
            if let Some(after) = after.strip_prefix(' ') {
                todo = Some(keyword);
                rest = after;
                break;
            }
        }
    }

    let mut tags = None;
    let trimmed = rest.trim_end();
    if trimmed.ends_with(':') {
        if let Some(start) = trimmed.rfind([' ', '\t']) {
            let candidate = &trimmed[start + 1..];
            if candidate.len() > 2
                && candidate.starts_with(':')
                && candidate[1..candidate.len() - 1]
                    .chars()
                    .all(|c| c.is_alphanumeric() || matches!(c, ':' | '_' | '@' | '#' | '%'))
            {
                tags = Some(candidate);
                rest = trimmed[..start].trim_end();
            }
        }
    }

    (todo, rest, tags)
}
