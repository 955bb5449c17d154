//! Presentation session: command dispatch and the settle pipeline.
//!
//! A session ties the fixed document to one navigator, one mask state,
//! one auxiliary window, and one notes index. Every user command runs to
//! completion on the calling thread; a settled page flows through the
//! same pipeline each time: navigate, recompute masks, react to the
//! page's auxiliary declarations, sync notes, render.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::model::{keys, Block, BlockId, Document, NodeId, PageLayout};

use super::aux::{AuxWindowManager, ExternalViewer, Indicator, ShowArgs};
use super::frame::resolve_frame_level;
use super::mask::{recompute_masks, MaskConfig, MaskSet, SrcAction, SrcTarget};
use super::navigator::{Navigator, PageView};
use super::notes::{estimate_speaking_time, NoteSection, NotesIndex};
use super::reveal::{RevealPlan, STEP_DELAY};

/// Abstract session commands, unbound to any particular keys.
#[derive(Debug, Clone)]
pub enum Command {
    Top,
    Next,
    Previous,
    JumpTo(usize),
    NextSubheading,
    PreviousSubheading,
    ToggleAllSrcBlocks,
    ToggleSrcBlock(BlockId),
    ShowFile(ShowArgs),
    AdvanceOrShowFile(ShowArgs),
    ShowVideo,
    Refresh,
    EstimateTime,
    Quit,
}

/// Snapshot of the per-session mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationState {
    pub frame_level: u8,
    pub current: NodeId,
    pub page_number: usize,
    pub aux_window_open: bool,
    pub src_blocks_visible: bool,
}

/// Everything the renderer needs to draw the settled page.
#[derive(Debug)]
pub struct Slide<'a> {
    pub view: PageView,
    pub layout: &'a PageLayout,
    pub masks: &'a MaskSet,
    pub page_number: usize,
    pub page_count: usize,
    pub indicators: &'a [Indicator],
    /// The notes section matching this page's top-level ancestor.
    pub notes: Option<&'a NoteSection>,
}

/// Receives settled slides and user-facing messages. Implemented by the
/// embedding application; the engine computes what to show, never how.
pub trait Renderer {
    fn render(&mut self, slide: &Slide<'_>);
    /// A one-line status or result message.
    fn message(&mut self, _text: &str) {}
}

/// Session construction options.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub mask: MaskConfig,
    /// Compute edge indicators for pages with side content.
    pub indicators: bool,
    /// Initial code-block visibility applied on every page entry.
    pub src_blocks_visible: bool,
    /// Delay between slide-in reveal steps.
    pub slide_in_delay: Duration,
    /// Speaking rate for time estimates.
    pub words_per_minute: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            mask: MaskConfig::default(),
            indicators: true,
            src_blocks_visible: true,
            slide_in_delay: STEP_DELAY,
            words_per_minute: 150,
        }
    }
}

/// One presentation run over one document.
pub struct Session<R: Renderer, V: ExternalViewer> {
    doc: Document,
    options: SessionOptions,
    nav: Navigator,
    aux: AuxWindowManager,
    notes: NotesIndex,
    renderer: R,
    viewer: V,

    view: PageView,
    folds: BTreeSet<NodeId>,
    /// Stepwise reveals on the current page, in reveal order.
    revealed: Vec<NodeId>,
    /// Subheading cursor: index into the current page's subheadings.
    subheading: Option<usize>,
    layout: PageLayout,
    masks: MaskSet,
    src_blocks_visible: bool,
    quit: bool,
}

impl<R: Renderer, V: ExternalViewer> Session<R, V> {
    /// Start a session. Fails with [`Error::InvalidDocument`] when the
    /// document holds nothing presentable.
    pub fn new(doc: Document, renderer: R, viewer: V, options: SessionOptions) -> Result<Self> {
        let frame_level = resolve_frame_level(&doc);
        let nav = Navigator::new(&doc, frame_level)?;
        let notes = NotesIndex::build(&doc);
        let src_blocks_visible = options.src_blocks_visible;
        let aux = AuxWindowManager::new(options.indicators);

        let mut session = Self {
            doc,
            options,
            nav,
            aux,
            notes,
            renderer,
            viewer,
            view: PageView::Outline,
            folds: BTreeSet::new(),
            revealed: Vec::new(),
            subheading: None,
            layout: PageLayout::default(),
            masks: MaskSet::default(),
            src_blocks_visible,
            quit: false,
        };
        session.settle()?;
        Ok(session)
    }

    pub fn state(&self) -> PresentationState {
        PresentationState {
            frame_level: self.nav.frame_level(),
            current: self.nav.current(),
            page_number: self.nav.page_number(),
            aux_window_open: self.aux.is_open(),
            src_blocks_visible: self.src_blocks_visible,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable document access for hosts that edit live; follow edits
    /// with [`refresh`](Self::refresh).
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    /// The settled page's layout.
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// The settled page's mask state.
    pub fn masks(&self) -> &MaskSet {
        &self.masks
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Dispatch one command. Failed commands surface their error and
    /// leave the session state unchanged.
    pub fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Top => self.top(),
            Command::Next => self.next(),
            Command::Previous => self.previous(),
            Command::JumpTo(n) => self.jump_to(n),
            Command::NextSubheading => self.next_subheading(),
            Command::PreviousSubheading => self.previous_subheading(),
            Command::ToggleAllSrcBlocks => self.toggle_all_src_blocks(),
            Command::ToggleSrcBlock(id) => self.toggle_src_block(id),
            Command::ShowFile(args) => self.show_file(args),
            Command::AdvanceOrShowFile(args) => self.advance_or_show_file(args),
            Command::ShowVideo => self.show_video(),
            Command::Refresh => self.refresh(),
            Command::EstimateTime => {
                self.estimate_time();
                Ok(())
            }
            Command::Quit => {
                self.quit = true;
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn top(&mut self) -> Result<()> {
        self.nav.top();
        self.settle()
    }

    /// Advance. On a `STEPWISE` page with folded children left, reveals
    /// the next child instead of changing pages. The last page is a
    /// silent no-op.
    pub fn next(&mut self) -> Result<()> {
        if self.step_forward() {
            return Ok(());
        }
        if self.nav.next() {
            self.settle()?;
        }
        Ok(())
    }

    /// Retreat, re-folding stepwise reveals first. The first page is a
    /// silent no-op.
    pub fn previous(&mut self) -> Result<()> {
        if self.step_backward() {
            return Ok(());
        }
        if self.nav.previous() {
            self.settle()?;
        }
        Ok(())
    }

    /// Jump to page `n` (1-based): top, then `n - 1` nexts, clamping at
    /// the last page.
    pub fn jump_to(&mut self, n: usize) -> Result<()> {
        self.nav.jump_to(n.max(1));
        self.settle()
    }

    /// Move the subheading cursor forward within the current page,
    /// unfolding the target.
    pub fn next_subheading(&mut self) -> Result<()> {
        let subs = self.nav.subheadings(&self.doc);
        if subs.is_empty() {
            return Err(Error::NotFound("no subheading on this page".into()));
        }
        let index = match self.subheading {
            None => 0,
            Some(i) => (i + 1).min(subs.len() - 1),
        };
        self.subheading = Some(index);
        self.focus_subheading(subs[index]);
        Ok(())
    }

    /// Move the subheading cursor backward within the current page.
    pub fn previous_subheading(&mut self) -> Result<()> {
        let subs = self.nav.subheadings(&self.doc);
        if subs.is_empty() {
            return Err(Error::NotFound("no subheading on this page".into()));
        }
        let index = match self.subheading {
            None | Some(0) => 0,
            Some(i) => i - 1,
        };
        self.subheading = Some(index);
        self.focus_subheading(subs[index]);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Code blocks
    // ------------------------------------------------------------------

    /// Toggle every code block on the current page and flip the default
    /// applied on future page entries.
    pub fn toggle_all_src_blocks(&mut self) -> Result<()> {
        self.masks
            .toggle_src_blocks(&mut self.doc, &self.layout, SrcTarget::All, SrcAction::Toggle)?;
        self.src_blocks_visible = !self.src_blocks_visible;
        self.render();
        Ok(())
    }

    /// Toggle a single code block on the current page.
    pub fn toggle_src_block(&mut self, id: BlockId) -> Result<()> {
        self.masks.toggle_src_blocks(
            &mut self.doc,
            &self.layout,
            SrcTarget::Block(id),
            SrcAction::Toggle,
        )?;
        self.render();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Auxiliary window
    // ------------------------------------------------------------------

    pub fn show_file(&mut self, args: ShowArgs) -> Result<()> {
        let page = self
            .doc
            .node(self.nav.current())
            .ok_or_else(|| Error::NotFound("current page".into()))?;
        self.aux.show_file(&mut self.viewer, page, args)?;
        self.render();
        Ok(())
    }

    pub fn advance_or_show_file(&mut self, args: ShowArgs) -> Result<()> {
        let page = self
            .doc
            .node(self.nav.current())
            .ok_or_else(|| Error::NotFound("current page".into()))?;
        self.aux.advance_or_show_file(&mut self.viewer, page, args)?;
        self.render();
        Ok(())
    }

    pub fn show_video(&mut self) -> Result<()> {
        let page = self
            .doc
            .node(self.nav.current())
            .ok_or_else(|| Error::NotFound("current page".into()))?;
        self.aux.show_video(&mut self.viewer, page)?;
        self.render();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Misc commands
    // ------------------------------------------------------------------

    /// Rebuild the notes index and recompute the current page's layout
    /// and masks from scratch.
    pub fn refresh(&mut self) -> Result<()> {
        self.notes = NotesIndex::build(&self.doc);
        self.rebuild();
        self.render();
        Ok(())
    }

    /// Report the whole-document speaking-time estimate.
    pub fn estimate_time(&mut self) {
        let estimate = estimate_speaking_time(&self.doc, self.options.words_per_minute);
        self.renderer.message(&format!(
            "{:.1} minutes ({} words at {} wpm)",
            estimate.minutes, estimate.words, self.options.words_per_minute
        ));
    }

    // ------------------------------------------------------------------
    // Settle pipeline
    // ------------------------------------------------------------------

    fn settle(&mut self) -> Result<()> {
        self.view = self.nav.view(&self.doc);
        self.revealed.clear();
        self.subheading = None;
        self.folds = match self.view {
            PageView::Subtree { .. } => self.nav.default_folds(&self.doc),
            PageView::Outline => BTreeSet::new(),
        };

        if let PageView::Subtree { root } = self.view {
            self.reset_code_visibility(root);
        }
        self.rebuild();

        // Aux reaction. An auto-show failure (e.g. a vanished file) is
        // reported, not propagated: the page itself has settled.
        let page = self.nav.current();
        if let Some(node) = self.doc.node(page) {
            if let Err(e) = self.aux.on_page_settle(&mut self.viewer, node) {
                self.renderer.message(&e.to_string());
            }
        }

        match self.view {
            PageView::Subtree { root }
                if self
                    .doc
                    .node(root)
                    .is_some_and(|n| n.property_flag(keys::SLIDE_IN)) =>
            {
                self.play_slide_in(root);
            }
            _ => self.render(),
        }
        Ok(())
    }

    /// Apply the session-wide default visibility to every code block in
    /// the page subtree.
    fn reset_code_visibility(&mut self, root: NodeId) {
        let visible = self.src_blocks_visible;
        let blocks: Vec<BlockId> = self
            .doc
            .iter_subtree(root)
            .flat_map(|id| {
                self.doc
                    .node(id)
                    .map(|node| {
                        node.body
                            .iter()
                            .enumerate()
                            .filter(|(_, b)| matches!(b, Block::Code { .. }))
                            .map(|(i, _)| BlockId::new(id, i))
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default()
            })
            .collect();
        for id in blocks {
            self.doc.set_code_visible(id, visible);
        }
    }

    fn play_slide_in(&mut self, root: NodeId) {
        let plan = RevealPlan::for_page(&self.doc, root, &self.folds);
        let delay = self.options.slide_in_delay;
        for index in 0..plan.len() {
            if index > 0 {
                std::thread::sleep(delay);
            }
            if let Some(folds) = plan.step(index) {
                self.folds = folds.clone();
                self.rebuild();
                self.render();
            }
        }
    }

    /// Expose a subheading: unfold everything on the path down to it,
    /// then collapse its own children so disclosure stays one level at a
    /// time.
    fn focus_subheading(&mut self, target: NodeId) {
        let mut current = Some(target);
        while let Some(id) = current {
            self.folds.remove(&id);
            current = self.doc.node(id).and_then(|n| n.parent);
        }
        let children: Vec<NodeId> = self.doc.children(target).collect();
        self.folds.extend(children);
        self.rebuild();
        self.render();
    }

    fn rebuild(&mut self) {
        self.layout = match self.view {
            PageView::Outline => PageLayout::outline(&self.doc),
            PageView::Subtree { root } => PageLayout::subtree(&self.doc, root, &self.folds),
        };
        self.masks = recompute_masks(&self.doc, &self.layout, &self.options.mask);
    }

    fn render(&mut self) {
        let notes = self
            .notes
            .sync(&self.doc, self.nav.current())
            .and_then(|i| self.notes.sections().get(i));
        let slide = Slide {
            view: self.view,
            layout: &self.layout,
            masks: &self.masks,
            page_number: self.nav.page_number(),
            page_count: self.nav.page_count(),
            indicators: self.aux.indicators(),
            notes,
        };
        self.renderer.render(&slide);
    }

    fn step_forward(&mut self) -> bool {
        let page = self.nav.current();
        let stepwise = self
            .doc
            .node(page)
            .is_some_and(|n| n.property_flag(keys::STEPWISE));
        if !stepwise {
            return false;
        }
        let next = self.doc.children(page).find(|c| self.folds.contains(c));
        match next {
            Some(child) => {
                self.folds.remove(&child);
                self.revealed.push(child);
                self.rebuild();
                self.render();
                true
            }
            None => false,
        }
    }

    fn step_backward(&mut self) -> bool {
        match self.revealed.pop() {
            Some(child) => {
                self.folds.insert(child);
                self.rebuild();
                self.render();
                true
            }
            None => false,
        }
    }
}
