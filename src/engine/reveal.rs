//! Timed slide-in reveal.
//!
//! Pages carrying the `SLIDE_IN` property reveal their children one per
//! step on entry. Playback is a bounded loop of render-then-sleep on the
//! single session thread: the sleep blocks, so the animation cannot be
//! interrupted short of quitting the whole session, and a quit issued
//! during playback is processed once playback completes.

use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

use crate::model::{Document, NodeId};

/// Delay between reveal steps.
pub const STEP_DELAY: Duration = Duration::from_millis(500);

/// The successive fold states of a slide-in reveal, first step fully
/// collapsed, last step fully revealed.
#[derive(Debug, Clone)]
pub struct RevealPlan {
    steps: Vec<BTreeSet<NodeId>>,
}

impl RevealPlan {
    /// Plan the reveal for a page: starting from the given fold state,
    /// unfold one still-folded direct child per step, in order.
    pub fn for_page(doc: &Document, page_root: NodeId, initial: &BTreeSet<NodeId>) -> Self {
        let mut steps = vec![initial.clone()];
        let mut folds = initial.clone();
        for child in doc.children(page_root) {
            if folds.remove(&child) {
                steps.push(folds.clone());
            }
        }
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The fold state at one step of the reveal.
    pub fn step(&self, index: usize) -> Option<&BTreeSet<NodeId>> {
        self.steps.get(index)
    }

    /// The final fold state once playback completes.
    pub fn final_folds(&self) -> &BTreeSet<NodeId> {
        self.steps.last().expect("plan has at least one step")
    }

    /// Play the plan: invoke `render` for every step, sleeping between
    /// steps. Blocks the calling thread for the whole animation.
    pub fn play<F>(&self, delay: Duration, mut render: F)
    where
        F: FnMut(&BTreeSet<NodeId>),
    {
        for (i, folds) in self.steps.iter().enumerate() {
            if i > 0 {
                thread::sleep(delay);
            }
            render(folds);
        }
    }
}
