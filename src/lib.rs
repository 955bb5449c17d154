//! # orgdeck
//!
//! A presentation engine for outline-structured documents: one page per
//! heading, controlled reveal of structure, side content, and speaker
//! notes kept in lock-step with navigation.
//!
//! The engine operates on an already-parsed [`Document`] tree supplied by
//! the host (a parser, a loader, a test builder) and hands settled pages
//! to a host-supplied [`Renderer`]; it decides *what* is visible, hidden,
//! or styled at every moment, never how anything is drawn.
//!
//! ## Quick Start
//!
//! ```
//! use orgdeck::{Document, Node, NodeId};
//! use orgdeck::{Renderer, Session, SessionOptions, Slide};
//! use orgdeck::ExternalViewer;
//!
//! // Build a document (normally the job of a parser).
//! let mut doc = Document::new();
//! let page = doc.alloc_node(Node::new("Welcome", 1));
//! doc.append_child(NodeId::ROOT, page);
//!
//! struct Printer;
//! impl Renderer for Printer {
//!     fn render(&mut self, slide: &Slide<'_>) {
//!         println!("page {}/{}", slide.page_number, slide.page_count);
//!     }
//! }
//!
//! struct NoViewer;
//! impl ExternalViewer for NoViewer {
//!     fn open(&mut self, _: &std::path::Path) -> orgdeck::Result<()> { Ok(()) }
//!     fn fit_to_width(&mut self) {}
//!     fn fit_to_height(&mut self) {}
//!     fn go_to_page(&mut self, _: usize) {}
//!     fn advance(&mut self) {}
//!     fn current_page(&self) -> usize { 1 }
//!     fn total_pages(&self) -> usize { 1 }
//! }
//!
//! let mut session = Session::new(doc, Printer, NoViewer, SessionOptions::default()).unwrap();
//! session.next().unwrap();
//! assert_eq!(session.state().page_number, 1); // single page: a no-op
//! ```

pub mod engine;
pub mod error;
pub mod model;
pub(crate) mod util;

#[cfg(feature = "cli")]
pub mod load;

pub use engine::{
    estimate_speaking_time, resolve_frame_level, AuxWindowManager, Command, ExternalViewer,
    Indicator, MaskConfig, MaskKind, MaskRegion, MaskSet, Navigator, NotesIndex, PageView,
    PresentationState, Renderer, Session, SessionOptions, ShowArgs, Slide, SpeakingTime, Style,
};
pub use error::{Error, Result};
pub use model::{keys, Block, BlockId, Document, Node, NodeId, PageLayout};
