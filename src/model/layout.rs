//! Page layout: rendering a page view to display text.
//!
//! The engine never re-parses rendered text. The layout builder emits the
//! display text for a page and records the span of every element while
//! writing it, so the masking engine works purely on spans. Layouts are
//! rebuilt from scratch on every page settle or refresh; two builds over
//! an unchanged document yield byte-identical results.

use std::collections::BTreeSet;
use std::ops::Range;

use memchr::memchr_iter;

use super::document::Document;
use super::node::{split_title, Block, BlockId, NodeId};

/// Directives that keep their value visible while their marker is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Title,
    Author,
    Date,
}

impl DirectiveKind {
    fn match_comment(line: &str) -> Option<(DirectiveKind, usize)> {
        for (kind, marker) in [
            (DirectiveKind::Title, "#+TITLE:"),
            (DirectiveKind::Author, "#+AUTHOR:"),
            (DirectiveKind::Date, "#+DATE:"),
        ] {
            if line.len() >= marker.len()
                && line.as_bytes()[..marker.len()].eq_ignore_ascii_case(marker.as_bytes())
            {
                return Some((kind, marker.len()));
            }
        }
        None
    }
}

/// What a span of the display text is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Heading marker glyphs plus the following space.
    HeadingStars { page_title: bool },
    /// `TODO `/`DONE ` keyword inside a heading line.
    TodoKeyword,
    /// Bare heading text.
    HeadingTitle { page_title: bool },
    /// Trailing `:tag:tag:` group on a heading line.
    TagGroup,
    /// A whole property/metadata drawer.
    Drawer,
    /// A raw comment line that is not a recognized directive.
    CommentLine,
    /// The `#+KEY:` prefix of a title/author/date directive.
    DirectiveMarker(DirectiveKind),
    /// The value of a title/author/date directive.
    DirectiveText(DirectiveKind),
    /// List bullet glyph plus the following space.
    Bullet,
    /// List item text.
    ListText,
    /// A `#+BEGIN_SRC`/`#+END_SRC` fence line.
    CodeFence,
    /// The source text of one code block.
    CodeSource(BlockId),
    /// Plain body text line.
    Text,
}

/// One classified span of the display text.
#[derive(Debug, Clone)]
pub struct LayoutElement {
    pub range: Range<usize>,
    pub kind: ElementKind,
    /// The node this span was rendered from.
    pub node: NodeId,
}

/// Display text for one page plus the spans of everything in it.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub text: String,
    pub elements: Vec<LayoutElement>,
    /// Full rendered span of each node, in render order.
    pub node_spans: Vec<(NodeId, Range<usize>)>,
}

impl PageLayout {
    /// Render a page subtree. Nodes in `folds` render their heading line
    /// only; their bodies and descendants are omitted.
    pub fn subtree(doc: &Document, root: NodeId, folds: &BTreeSet<NodeId>) -> Self {
        let mut builder = Builder::new(doc);
        builder.render_node(root, root, folds);
        builder.layout
    }

    /// Render the whole tree as an outline: heading lines only.
    pub fn outline(doc: &Document) -> Self {
        let mut builder = Builder::new(doc);
        for id in doc.iter_dfs() {
            let Some(node) = doc.node(id) else { continue };
            if node.depth == 0 {
                continue;
            }
            let start = builder.layout.text.len();
            builder.heading_line(id, node.depth == 1);
            let end = builder.layout.text.len();
            builder.layout.node_spans.push((id, start..end));
        }
        builder.layout
    }

    /// Code blocks present in this layout, in text order.
    pub fn code_blocks(&self) -> impl Iterator<Item = (BlockId, Range<usize>)> + '_ {
        self.elements.iter().filter_map(|el| match el.kind {
            ElementKind::CodeSource(id) => Some((id, el.range.clone())),
            _ => None,
        })
    }

    /// The rendered span of a node, if it appears in this layout.
    pub fn node_span(&self, id: NodeId) -> Option<Range<usize>> {
        self.node_spans
            .iter()
            .find(|(n, _)| *n == id)
            .map(|(_, r)| r.clone())
    }
}

struct Builder<'a> {
    doc: &'a Document,
    layout: PageLayout,
}

impl<'a> Builder<'a> {
    fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            layout: PageLayout::default(),
        }
    }

    fn push(&mut self, text: &str, kind: ElementKind, node: NodeId) {
        let start = self.layout.text.len();
        self.layout.text.push_str(text);
        self.layout.elements.push(LayoutElement {
            range: start..self.layout.text.len(),
            kind,
            node,
        });
    }

    fn newline(&mut self) {
        self.layout.text.push('\n');
    }

    fn render_node(&mut self, id: NodeId, page_root: NodeId, folds: &BTreeSet<NodeId>) {
        let Some(node) = self.doc.node(id) else { return };
        let start = self.layout.text.len();

        if node.depth > 0 {
            self.heading_line(id, id == page_root);
        }

        if !folds.contains(&id) {
            for (index, block) in node.body.iter().enumerate() {
                self.render_block(id, BlockId::new(id, index), block);
            }
            for child in self.doc.children(id).collect::<Vec<_>>() {
                self.render_node(child, page_root, folds);
            }
        }

        let end = self.layout.text.len();
        self.layout.node_spans.push((id, start..end));
    }

    fn heading_line(&mut self, id: NodeId, page_title: bool) {
        let Some(node) = self.doc.node(id) else { return };
        let stars = "*".repeat(node.depth as usize);
        self.push(
            &format!("{stars} "),
            ElementKind::HeadingStars { page_title },
            id,
        );

        let (todo, text, tags) = split_title(&node.title);
        if let Some(keyword) = todo {
            self.push(&format!("{keyword} "), ElementKind::TodoKeyword, id);
        }
        self.push(text, ElementKind::HeadingTitle { page_title }, id);
        if let Some(tags) = tags {
            self.push(&format!(" {tags}"), ElementKind::TagGroup, id);
        }
        self.newline();
    }

    fn render_block(&mut self, node: NodeId, block_id: BlockId, block: &Block) {
        match block {
            Block::Text { text } => {
                for line in split_lines(text) {
                    self.push(line, ElementKind::Text, node);
                    self.newline();
                }
            }

            Block::Code {
                language, source, ..
            } => {
                let fence = match language {
                    Some(lang) => format!("#+BEGIN_SRC {lang}"),
                    None => "#+BEGIN_SRC".to_string(),
                };
                self.push(&fence, ElementKind::CodeFence, node);
                self.newline();

                let mut source = source.clone();
                if !source.ends_with('\n') {
                    source.push('\n');
                }
                self.push(&source, ElementKind::CodeSource(block_id), node);

                self.push("#+END_SRC", ElementKind::CodeFence, node);
                self.newline();
            }

            Block::Drawer { name, lines } => {
                let mut drawer = format!(":{name}:\n");
                for line in lines {
                    drawer.push_str(line);
                    drawer.push('\n');
                }
                drawer.push_str(":END:");
                self.push(&drawer, ElementKind::Drawer, node);
                self.newline();
            }

            Block::Comment { text } => {
                match DirectiveKind::match_comment(text) {
                    Some((kind, marker_len)) => {
                        self.push(&text[..marker_len], ElementKind::DirectiveMarker(kind), node);
                        self.push(&text[marker_len..], ElementKind::DirectiveText(kind), node);
                    }
                    None => self.push(text, ElementKind::CommentLine, node),
                }
                self.newline();
            }

            Block::List { items } => {
                for item in items {
                    self.push("- ", ElementKind::Bullet, node);
                    self.push(item, ElementKind::ListText, node);
                    self.newline();
                }
            }
        }
    }
}

/// Split body text into lines without the trailing newline of each.
fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    for nl in memchr_iter(b'\n', bytes) {
        lines.push(&text[start..nl]);
        start = nl + 1;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;

    fn sample_doc() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let page = doc.alloc_node(Node::new("TODO Demo :live:", 1));
        doc.append_child(NodeId::ROOT, page);
        doc.node_mut(page).unwrap().body = vec![
            Block::Text {
                text: "First line\nSecond line".into(),
            },
            Block::Code {
                language: Some("rust".into()),
                source: "fn main() {}".into(),
                visible: true,
            },
            Block::Comment {
                text: "#+TITLE: The Talk".into(),
            },
        ];
        let child = doc.alloc_node(Node::new("Child", 2));
        doc.append_child(page, child);
        doc.node_mut(child).unwrap().body = vec![Block::List {
            items: vec!["one".into(), "two".into()],
        }];
        (doc, page, child)
    }

    #[test]
    fn spans_match_text() {
        let (doc, page, _) = sample_doc();
        let layout = PageLayout::subtree(&doc, page, &BTreeSet::new());
        for el in &layout.elements {
            assert!(el.range.end <= layout.text.len());
            assert!(layout.text.get(el.range.clone()).is_some());
        }
    }

    #[test]
    fn heading_line_splits_into_parts() {
        let (doc, page, _) = sample_doc();
        let layout = PageLayout::subtree(&doc, page, &BTreeSet::new());
        let kinds: Vec<_> = layout.elements.iter().take(4).map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ElementKind::HeadingStars { page_title: true },
                ElementKind::TodoKeyword,
                ElementKind::HeadingTitle { page_title: true },
                ElementKind::TagGroup,
            ]
        );
        assert!(layout.text.starts_with("* TODO Demo :live:\n"));
    }

    #[test]
    fn folded_child_renders_heading_only() {
        let (doc, page, child) = sample_doc();
        let folds = BTreeSet::from([child]);
        let layout = PageLayout::subtree(&doc, page, &folds);
        assert!(layout.text.contains("** Child\n"));
        assert!(!layout.text.contains("- one"));
    }

    #[test]
    fn directive_marker_split() {
        let (doc, page, _) = sample_doc();
        let layout = PageLayout::subtree(&doc, page, &BTreeSet::new());
        let marker = layout
            .elements
            .iter()
            .find(|e| matches!(e.kind, ElementKind::DirectiveMarker(DirectiveKind::Title)))
            .unwrap();
        assert_eq!(&layout.text[marker.range.clone()], "#+TITLE:");
        let value = layout
            .elements
            .iter()
            .find(|e| matches!(e.kind, ElementKind::DirectiveText(DirectiveKind::Title)))
            .unwrap();
        assert_eq!(&layout.text[value.range.clone()], " The Talk");
    }

    #[test]
    fn code_block_span_is_source_only() {
        let (doc, page, _) = sample_doc();
        let layout = PageLayout::subtree(&doc, page, &BTreeSet::new());
        let blocks: Vec<_> = layout.code_blocks().collect();
        assert_eq!(blocks.len(), 1);
        assert_eq!(&layout.text[blocks[0].1.clone()], "fn main() {}\n");
    }

    #[test]
    fn rebuild_is_identical() {
        let (doc, page, _) = sample_doc();
        let a = PageLayout::subtree(&doc, page, &BTreeSet::new());
        let b = PageLayout::subtree(&doc, page, &BTreeSet::new());
        assert_eq!(a.text, b.text);
        assert_eq!(a.elements.len(), b.elements.len());
    }

    #[test]
    fn outline_lists_every_heading() {
        let (doc, _, _) = sample_doc();
        let layout = PageLayout::outline(&doc);
        assert_eq!(layout.text, "* TODO Demo :live:\n** Child\n");
    }
}
