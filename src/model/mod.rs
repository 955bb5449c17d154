//! Core data model for presentation documents.
//!
//! This module contains:
//! - The arena-backed outline [`Document`] and its traversal iterators
//! - Node types, body blocks, and the property keys the engine consumes
//! - [`PageLayout`]: span-tracked rendering of a page to display text

mod document;
mod layout;
mod node;

pub use document::{ChildIter, DfsIter, Document};
pub use layout::{DirectiveKind, ElementKind, LayoutElement, PageLayout};
pub use node::{keys, split_title, Block, BlockId, Node, NodeId};
