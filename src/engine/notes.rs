//! Speaker notes: extraction, synchronization, timing.
//!
//! Notes live in subtrees titled "Speaker notes" (case-insensitive)
//! anywhere under a top-level heading. The index groups their text by
//! top-level section so a secondary notes view can stay in lock-step
//! with the main presentation.

use crate::model::{Block, Document, NodeId};
use crate::util::count_words;

/// Name of the subtrees collected into the notes view.
const NOTES_TITLE: &str = "speaker notes";

/// Accumulated notes for one top-level section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSection {
    /// The top-level heading's title, verbatim.
    pub title: String,
    /// Concatenated text of every "Speaker notes" subtree below it.
    pub text: String,
}

/// Notes grouped by top-level section, in document order.
///
/// Built once per session with a single pre-order traversal; rebuilt on
/// demand by an explicit refresh.
#[derive(Debug, Clone, Default)]
pub struct NotesIndex {
    sections: Vec<NoteSection>,
}

impl NotesIndex {
    /// Build the index from a full tree traversal.
    pub fn build(doc: &Document) -> Self {
        let mut sections = Vec::new();
        for top in doc.children(doc.root()) {
            let Some(node) = doc.node(top) else { continue };
            let mut text = String::new();
            for id in doc.iter_subtree(top) {
                if is_notes_node(doc, id) {
                    append_subtree_text(doc, id, &mut text);
                }
            }
            sections.push(NoteSection {
                title: node.title.clone(),
                text,
            });
        }
        Self { sections }
    }

    pub fn sections(&self) -> &[NoteSection] {
        &self.sections
    }

    /// Locate the section matching a top-level heading title.
    pub fn section(&self, title: &str) -> Option<&NoteSection> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// The section index the notes view should scroll to for the given
    /// page root: its nearest top-level ancestor's section.
    pub fn sync(&self, doc: &Document, page_root: NodeId) -> Option<usize> {
        let top = doc.top_level_ancestor(page_root)?;
        let title = &doc.node(top)?.title;
        self.sections.iter().position(|s| &s.title == title)
    }
}

/// Speaking-time estimate over the whole document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeakingTime {
    /// Estimated minutes, rounded up to the nearest half minute.
    pub minutes: f64,
    /// Total words across every "Speaker notes" subtree.
    pub words: usize,
}

/// Sum the words of every notes subtree and convert at `words_per_minute`.
pub fn estimate_speaking_time(doc: &Document, words_per_minute: usize) -> SpeakingTime {
    let mut text = String::new();
    for id in doc.iter_dfs() {
        if is_notes_node(doc, id) {
            append_subtree_text(doc, id, &mut text);
        }
    }
    let words = count_words(&text);
    let wpm = words_per_minute.max(1);
    let half_minutes = (2 * words).div_ceil(wpm);
    SpeakingTime {
        minutes: half_minutes as f64 / 2.0,
        words,
    }
}

fn is_notes_node(doc: &Document, id: NodeId) -> bool {
    doc.node(id)
        .is_some_and(|n| n.depth >= 1 && n.title.trim().eq_ignore_ascii_case(NOTES_TITLE))
}

/// Append the readable text of a subtree: nested heading titles, plain
/// text, and list items. Drawers, comments, and code are not spoken.
fn append_subtree_text(doc: &Document, root: NodeId, out: &mut String) {
    for id in doc.iter_subtree(root) {
        let Some(node) = doc.node(id) else { continue };
        if id != root && !node.title.is_empty() {
            push_line(out, &node.title);
        }
        for block in &node.body {
            match block {
                Block::Text { text } => push_line(out, text),
                Block::List { items } => {
                    for item in items {
                        push_line(out, item);
                    }
                }
                Block::Code { .. } | Block::Drawer { .. } | Block::Comment { .. } => {}
            }
        }
    }
}

fn push_line(out: &mut String, line: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(line);
}
