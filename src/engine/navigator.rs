//! Page navigation state machine.
//!
//! The navigator precomputes the ordered display list of page roots: all
//! nodes at or above the frame level in pre-order, minus "title page"
//! headings (those exist only to host introductory notes and are never
//! displayed, regardless of entry direction). Navigation is then pure
//! index arithmetic over that list, which makes `next` and `previous`
//! exact inverses and keeps the page number derived rather than counted.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::model::{keys, Document, NodeId};

/// Heading reserved for introductory speaker notes; never shown.
const TITLE_PAGE: &str = "title page";

/// What the current page displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageView {
    /// The page root is shallower than the frame level: the whole tree
    /// collapses to an outline-only table of contents.
    Outline,
    /// A regular page showing one subtree.
    Subtree { root: NodeId },
}

/// Tracks the current page over a fixed document.
#[derive(Debug, Clone)]
pub struct Navigator {
    frame_level: u8,
    pages: Vec<NodeId>,
    index: usize,
}

impl Navigator {
    /// Build the display list for a document.
    ///
    /// Fails with [`Error::InvalidDocument`] when the document has no
    /// displayable page.
    pub fn new(doc: &Document, frame_level: u8) -> Result<Self> {
        let pages: Vec<NodeId> = doc
            .iter_dfs()
            .filter(|&id| {
                let Some(node) = doc.node(id) else {
                    return false;
                };
                node.depth >= 1
                    && node.depth <= frame_level
                    && !is_title_page(&node.title)
            })
            .collect();

        if pages.is_empty() {
            return Err(Error::InvalidDocument(
                "document has no displayable pages".into(),
            ));
        }

        Ok(Self {
            frame_level,
            pages,
            index: 0,
        })
    }

    pub fn frame_level(&self) -> u8 {
        self.frame_level
    }

    /// The current page root.
    pub fn current(&self) -> NodeId {
        self.pages[self.index]
    }

    /// 1-based page number. Always >= 1.
    pub fn page_number(&self) -> usize {
        self.index + 1
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Reset to the first page.
    pub fn top(&mut self) {
        self.index = 0;
    }

    /// Advance one page. Returns false (and changes nothing) at the last
    /// page; the boundary is a no-op, not an error.
    pub fn next(&mut self) -> bool {
        if self.index + 1 < self.pages.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Retreat one page. No-op at the first page.
    pub fn previous(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to page `n` (1-based), clamping past the last page.
    pub fn jump_to(&mut self, n: usize) {
        self.top();
        for _ in 1..n {
            if !self.next() {
                break;
            }
        }
    }

    /// What the current page displays.
    pub fn view(&self, doc: &Document) -> PageView {
        let root = self.current();
        match doc.node(root) {
            Some(node) if node.depth < self.frame_level => PageView::Outline,
            _ => PageView::Subtree { root },
        }
    }

    /// Initial fold state on page entry: every direct child collapses to
    /// its heading line except children marked visible-by-default.
    pub fn default_folds(&self, doc: &Document) -> BTreeSet<NodeId> {
        doc.children(self.current())
            .filter(|&child| {
                doc.node(child)
                    .map(|n| !n.property_flag(keys::UNFOLD))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Headings within the current page's subtree, in pre-order,
    /// excluding the page root itself. Used for subheading stepping.
    pub fn subheadings(&self, doc: &Document) -> Vec<NodeId> {
        let root = self.current();
        doc.iter_subtree(root).filter(|&id| id != root).collect()
    }
}

fn is_title_page(title: &str) -> bool {
    title.trim().eq_ignore_ascii_case(TITLE_PAGE)
}
