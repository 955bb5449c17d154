//! Visibility masking engine.
//!
//! Masks are a pure function of the current page layout and the mask
//! configuration: every recompute throws away the previous regions for
//! the page and rebuilds from scratch, so recomputing twice over an
//! unchanged document yields an identical set. Code-block visibility is
//! tracked separately, keyed by [`BlockId`], with tri-state toggle
//! semantics.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::error::{Error, Result};
use crate::model::{keys, Block, BlockId, Document, ElementKind, PageLayout};

/// Text styles assigned to visible regions. The renderer decides what
/// each style looks like on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// The page root's heading text.
    PageTitle,
    /// Any nested heading's text.
    Subheading,
    /// The value of a title/author/date directive.
    Directive,
    /// List bullet glyphs.
    Bullet,
}

/// How a masked region is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskKind {
    Hidden,
    Styled(Style),
}

/// One masked span of the page's display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskRegion {
    pub range: Range<usize>,
    pub kind: MaskKind,
}

/// Configuration flags for structural masking. All default to on.
#[derive(Debug, Clone)]
pub struct MaskConfig {
    /// Hide `TODO`/`DONE` keywords on heading lines.
    pub hide_todo: bool,
    /// Hide trailing `:tag:` groups on heading lines.
    pub hide_tags: bool,
    /// Hide property/metadata drawers.
    pub hide_properties: bool,
    /// Hide raw comment lines and code fences. Title/author/date
    /// directives lose only their marker prefix; the value is styled.
    pub hide_comments: bool,
    /// Hide heading marker glyphs and style the remaining heading text.
    pub style_headings: bool,
    /// Style list bullets.
    pub style_bullets: bool,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            hide_todo: true,
            hide_tags: true,
            hide_properties: true,
            hide_comments: true,
            style_headings: true,
            style_bullets: true,
        }
    }
}

/// Which code blocks a toggle applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrcTarget {
    /// Every code block in the current page.
    All,
    /// Exactly one block.
    Block(BlockId),
}

/// Forced state for a code-block toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrcAction {
    Show,
    Hide,
    Toggle,
}

/// The tri-state toggle decision: given the current hidden state and the
/// requested action, the next hidden state. `Show` on a visible block and
/// `Hide` on a hidden block are no-ops.
pub fn apply(hidden: bool, action: SrcAction) -> bool {
    match action {
        SrcAction::Show => false,
        SrcAction::Hide => true,
        SrcAction::Toggle => !hidden,
    }
}

/// The complete mask state for one page: structural regions plus the
/// per-block source masks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskSet {
    structural: Vec<MaskRegion>,
    src_hidden: BTreeMap<BlockId, Range<usize>>,
}

impl MaskSet {
    /// All regions, ordered by start offset.
    pub fn regions(&self) -> Vec<MaskRegion> {
        let mut regions = self.structural.clone();
        regions.extend(self.src_hidden.values().map(|range| MaskRegion {
            range: range.clone(),
            kind: MaskKind::Hidden,
        }));
        regions.sort_by_key(|r| (r.range.start, r.range.end));
        regions
    }

    /// Whether a code block is currently masked hidden.
    pub fn is_src_hidden(&self, id: BlockId) -> bool {
        self.src_hidden.contains_key(&id)
    }

    /// Toggle code-block visibility within `layout`.
    ///
    /// Updates both the mask set and the block's `visible` flag in the
    /// document, so a later recompute reproduces the same state. Fails
    /// with [`Error::NotFound`] when the page has no code block matching
    /// the target; state is untouched in that case.
    pub fn toggle_src_blocks(
        &mut self,
        doc: &mut Document,
        layout: &PageLayout,
        target: SrcTarget,
        action: SrcAction,
    ) -> Result<()> {
        let affected: Vec<(BlockId, Range<usize>)> = match target {
            SrcTarget::All => layout.code_blocks().collect(),
            SrcTarget::Block(id) => layout
                .code_blocks()
                .filter(|(block, _)| *block == id)
                .collect(),
        };

        if affected.is_empty() {
            return Err(Error::NotFound("no code block on this page".into()));
        }

        for (id, range) in affected {
            let hidden = self.src_hidden.contains_key(&id);
            if apply(hidden, action) {
                self.src_hidden.insert(id, range);
            } else {
                self.src_hidden.remove(&id);
            }
            let visible = !self.src_hidden.contains_key(&id);
            doc.set_code_visible(id, visible);
        }
        Ok(())
    }
}

/// Rebuild the full mask set for a page.
///
/// Structural regions come from the layout's classified spans; source
/// masks come from each block's `visible` flag in the document. Subtrees
/// whose node carries the `HIDE` property mask their whole rendered span;
/// styled regions inside a hidden span are not emitted.
pub fn recompute_masks(doc: &Document, layout: &PageLayout, config: &MaskConfig) -> MaskSet {
    // Whole-subtree hides first, so styled regions inside them can be
    // suppressed.
    let mut hidden_spans: Vec<Range<usize>> = Vec::new();
    for (id, span) in &layout.node_spans {
        if span.is_empty() {
            continue;
        }
        let Some(node) = doc.node(*id) else { continue };
        if node.property_flag(keys::HIDE) {
            hidden_spans.push(span.clone());
        }
    }

    let swallowed =
        |range: &Range<usize>| hidden_spans.iter().any(|h| h.start <= range.start && range.end <= h.end);

    let mut structural: Vec<MaskRegion> = hidden_spans
        .iter()
        .map(|range| MaskRegion {
            range: range.clone(),
            kind: MaskKind::Hidden,
        })
        .collect();

    for el in &layout.elements {
        if swallowed(&el.range) {
            continue;
        }
        let kind = match el.kind {
            ElementKind::HeadingStars { .. } if config.style_headings => Some(MaskKind::Hidden),
            ElementKind::HeadingTitle { page_title } if config.style_headings => {
                Some(MaskKind::Styled(if page_title {
                    Style::PageTitle
                } else {
                    Style::Subheading
                }))
            }
            ElementKind::TodoKeyword if config.hide_todo => Some(MaskKind::Hidden),
            ElementKind::TagGroup if config.hide_tags => Some(MaskKind::Hidden),
            ElementKind::Drawer if config.hide_properties => Some(MaskKind::Hidden),
            ElementKind::CommentLine if config.hide_comments => Some(MaskKind::Hidden),
            ElementKind::CodeFence if config.hide_comments => Some(MaskKind::Hidden),
            ElementKind::DirectiveMarker(_) if config.hide_comments => Some(MaskKind::Hidden),
            ElementKind::DirectiveText(_) if config.hide_comments => {
                Some(MaskKind::Styled(Style::Directive))
            }
            ElementKind::Bullet if config.style_bullets => Some(MaskKind::Styled(Style::Bullet)),
            _ => None,
        };
        if let Some(kind) = kind {
            structural.push(MaskRegion {
                range: el.range.clone(),
                kind,
            });
        }
    }

    structural.sort_by_key(|r| (r.range.start, r.range.end));

    let mut src_hidden = BTreeMap::new();
    for (id, range) in layout.code_blocks() {
        if let Some(Block::Code { visible: false, .. }) = doc.code_block(id) {
            src_hidden.insert(id, range);
        }
    }

    MaskSet {
        structural,
        src_hidden,
    }
}
