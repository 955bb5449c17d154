//! The presentation engine.
//!
//! This module contains:
//! - Frame-level resolution (what heading depth makes a page)
//! - The page navigator state machine
//! - The visibility masking engine and code-block toggling
//! - The auxiliary window manager and external viewer seam
//! - Speaker-notes indexing, sync, and speaking-time estimates
//! - Timed slide-in reveals
//! - The session that wires it all together

mod aux;
mod frame;
mod mask;
mod navigator;
mod notes;
mod reveal;
mod session;

pub use aux::{
    AuxKind, AuxWindow, AuxWindowManager, ExternalViewer, Indicator, ShowArgs, SplitPosition,
};
pub use frame::{resolve_frame_level, DEFAULT_FRAME_LEVEL};
pub use mask::{
    apply, recompute_masks, MaskConfig, MaskKind, MaskRegion, MaskSet, SrcAction, SrcTarget, Style,
};
pub use navigator::{Navigator, PageView};
pub use notes::{estimate_speaking_time, NoteSection, NotesIndex, SpeakingTime};
pub use reveal::{RevealPlan, STEP_DELAY};
pub use session::{Command, PresentationState, Renderer, Session, SessionOptions, Slide};
