//! Auxiliary window management.
//!
//! Pages can carry side content (a PDF, an image, a video) declared in
//! their properties. The manager owns the open/closed state of the one
//! auxiliary viewport, resolves show arguments from page properties, and
//! computes the edge indicators for pages that have side content but do
//! not auto-show it. The actual viewer is an external component behind
//! the [`ExternalViewer`] trait.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::{keys, Node};
use crate::util::strip_link_decoration;

/// Where the auxiliary viewport splits off the presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitPosition {
    #[default]
    Right,
    Below,
}

/// What the auxiliary window currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxKind {
    File,
    Video,
}

/// Edge markers for pages with side content that is not auto-shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    HasFile,
    HasVideo,
}

/// The file viewer hosted in the auxiliary viewport. Implemented by the
/// embedding application; the engine never draws.
pub trait ExternalViewer {
    /// Load a target into the viewport.
    fn open(&mut self, path: &Path) -> Result<()>;
    fn fit_to_width(&mut self);
    fn fit_to_height(&mut self);
    fn go_to_page(&mut self, n: usize);
    /// Advance one unit (page, frame) in multi-page media.
    fn advance(&mut self);
    fn current_page(&self) -> usize;
    fn total_pages(&self) -> usize;
}

/// Explicit arguments to a show command; unset fields resolve from the
/// current page's properties.
#[derive(Debug, Clone, Default)]
pub struct ShowArgs {
    pub file: Option<String>,
    pub position: Option<SplitPosition>,
    pub size: Option<u32>,
}

/// State of the open auxiliary window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxWindow {
    pub target: PathBuf,
    pub kind: AuxKind,
    pub position: SplitPosition,
    /// Split size in rows/columns; None means half the available space.
    pub size: Option<u32>,
    pub muted: bool,
}

/// Owns the auxiliary viewport state for one session.
#[derive(Debug, Clone, Default)]
pub struct AuxWindowManager {
    window: Option<AuxWindow>,
    indicators_enabled: bool,
    indicators: Vec<Indicator>,
}

impl AuxWindowManager {
    pub fn new(indicators_enabled: bool) -> Self {
        Self {
            window: None,
            indicators_enabled,
            indicators: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.window.is_some()
    }

    pub fn window(&self) -> Option<&AuxWindow> {
        self.window.as_ref()
    }

    /// Current page's edge markers.
    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    /// Close the auxiliary window. Idempotent; called on every page
    /// change.
    pub fn close(&mut self) {
        self.window = None;
    }

    /// React to a newly settled page: close the previous window, clear
    /// and recompute indicators, and auto-show when the page asks for it.
    pub fn on_page_settle<V: ExternalViewer>(&mut self, viewer: &mut V, page: &Node) -> Result<()> {
        self.close();
        self.indicators.clear();

        if page.property_flag(keys::SHOW_AUTO) {
            if page.property(keys::SHOW_FILE).is_some() {
                return self.show_file(viewer, page, ShowArgs::default());
            }
            if page.property(keys::SHOW_VIDEO).is_some() {
                return self.show_video(viewer, page);
            }
        }

        if self.indicators_enabled {
            if page.property(keys::SHOW_FILE).is_some() {
                self.indicators.push(Indicator::HasFile);
            }
            if page.property(keys::SHOW_VIDEO).is_some() {
                self.indicators.push(Indicator::HasVideo);
            }
        }
        Ok(())
    }

    /// Open the auxiliary window on a file, resolving missing arguments
    /// from the page's `SHOW_FILE`/`SHOW_BELOW`/`SHOW_SIZE` properties.
    ///
    /// Fails with [`Error::NotFound`] when neither the arguments nor the
    /// page name a file, and [`Error::FileNotFound`] when the target does
    /// not exist; the window state is untouched on failure.
    pub fn show_file<V: ExternalViewer>(
        &mut self,
        viewer: &mut V,
        page: &Node,
        args: ShowArgs,
    ) -> Result<()> {
        let target = self.resolve_target(page, args.file.as_deref(), keys::SHOW_FILE)?;
        let window = AuxWindow {
            target,
            kind: AuxKind::File,
            position: args.position.unwrap_or_else(|| split_position(page)),
            size: args.size.or_else(|| split_size(page)),
            muted: false,
        };
        viewer.open(&window.target)?;
        fit_viewer(viewer, window.position);
        self.window = Some(window);
        Ok(())
    }

    /// Repeat invocation on an already-open multi-page target advances it
    /// one unit instead of re-splitting, wrapping back to the first page
    /// at the end; otherwise behaves like [`show_file`](Self::show_file).
    pub fn advance_or_show_file<V: ExternalViewer>(
        &mut self,
        viewer: &mut V,
        page: &Node,
        args: ShowArgs,
    ) -> Result<()> {
        if let Some(window) = &self.window {
            let same_target = match args.file.as_deref() {
                Some(name) => window.target == Path::new(strip_link_decoration(name)),
                None => page
                    .property(keys::SHOW_FILE)
                    .map(strip_link_decoration)
                    .is_some_and(|name| window.target == Path::new(name)),
            };
            if same_target && viewer.total_pages() > 1 {
                if viewer.current_page() >= viewer.total_pages() {
                    viewer.go_to_page(1);
                } else {
                    viewer.advance();
                }
                return Ok(());
            }
        }
        self.show_file(viewer, page, args)
    }

    /// Open the page's `SHOW_VIDEO` target, honoring `MUTE`.
    pub fn show_video<V: ExternalViewer>(&mut self, viewer: &mut V, page: &Node) -> Result<()> {
        let target = self.resolve_target(page, None, keys::SHOW_VIDEO)?;
        let window = AuxWindow {
            target,
            kind: AuxKind::Video,
            position: split_position(page),
            size: split_size(page),
            muted: page.property_flag(keys::MUTE),
        };
        viewer.open(&window.target)?;
        fit_viewer(viewer, window.position);
        self.window = Some(window);
        Ok(())
    }

    fn resolve_target(&self, page: &Node, explicit: Option<&str>, key: &str) -> Result<PathBuf> {
        let name = match explicit {
            Some(name) => name,
            None => page
                .property(key)
                .ok_or_else(|| Error::NotFound(format!("page declares no {key}")))?,
        };
        let path = PathBuf::from(strip_link_decoration(name));
        if !path.exists() {
            return Err(Error::FileNotFound(path));
        }
        Ok(path)
    }
}

/// Fill the viewport along its constrained axis: a right split is a
/// narrow column, a below split a short row.
fn fit_viewer<V: ExternalViewer>(viewer: &mut V, position: SplitPosition) {
    match position {
        SplitPosition::Right => viewer.fit_to_width(),
        SplitPosition::Below => viewer.fit_to_height(),
    }
}

fn split_position(page: &Node) -> SplitPosition {
    if page.property_flag(keys::SHOW_BELOW) {
        SplitPosition::Below
    } else {
        SplitPosition::Right
    }
}

fn split_size(page: &Node) -> Option<u32> {
    page.property(keys::SHOW_SIZE)
        .and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Viewer stub recording calls.
    #[derive(Default)]
    struct StubViewer {
        opened: Vec<PathBuf>,
        page: usize,
        pages: usize,
    }

    impl ExternalViewer for StubViewer {
        fn open(&mut self, path: &Path) -> Result<()> {
            self.opened.push(path.to_path_buf());
            self.page = 1;
            Ok(())
        }
        fn fit_to_width(&mut self) {}
        fn fit_to_height(&mut self) {}
        fn go_to_page(&mut self, n: usize) {
            self.page = n;
        }
        fn advance(&mut self) {
            self.page += 1;
        }
        fn current_page(&self) -> usize {
            self.page
        }
        fn total_pages(&self) -> usize {
            self.pages
        }
    }

    fn page_showing(key: &str, value: &str) -> Node {
        let mut node = Node::new("Page", 1);
        node.properties.insert(key.into(), value.into());
        node
    }

    #[test]
    fn missing_file_leaves_window_closed() {
        let mut manager = AuxWindowManager::new(true);
        let mut viewer = StubViewer::default();
        let page = Node::new("Page", 1);
        let args = ShowArgs {
            file: Some("definitely-not-here.pdf".into()),
            position: Some(SplitPosition::Below),
            size: Some(10),
        };
        let err = manager.show_file(&mut viewer, &page, args).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
        assert!(!manager.is_open());
        assert!(viewer.opened.is_empty());
    }

    #[test]
    fn show_file_resolves_page_properties() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("fig.pdf");
        std::fs::write(&target, b"%PDF").unwrap();

        let mut page = page_showing(keys::SHOW_FILE, &format!("[[{}]]", target.display()));
        page.properties.insert(keys::SHOW_BELOW.into(), "t".into());
        page.properties.insert(keys::SHOW_SIZE.into(), "12".into());

        let mut manager = AuxWindowManager::new(true);
        let mut viewer = StubViewer::default();
        manager
            .show_file(&mut viewer, &page, ShowArgs::default())
            .unwrap();

        let window = manager.window().unwrap();
        assert_eq!(window.target, target);
        assert_eq!(window.position, SplitPosition::Below);
        assert_eq!(window.size, Some(12));
        assert_eq!(viewer.opened, vec![target]);
    }

    #[test]
    fn repeat_show_advances_multipage_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("deck.pdf");
        std::fs::write(&target, b"%PDF").unwrap();

        let page = page_showing(keys::SHOW_FILE, target.to_str().unwrap());
        let mut manager = AuxWindowManager::new(true);
        let mut viewer = StubViewer {
            pages: 3,
            ..Default::default()
        };

        manager
            .advance_or_show_file(&mut viewer, &page, ShowArgs::default())
            .unwrap();
        assert_eq!(viewer.opened.len(), 1);
        assert_eq!(viewer.page, 1);

        manager
            .advance_or_show_file(&mut viewer, &page, ShowArgs::default())
            .unwrap();
        assert_eq!(viewer.page, 2);
        assert_eq!(viewer.opened.len(), 1, "no re-split on advance");

        // Past the last page, advancing wraps to the front.
        viewer.page = 3;
        manager
            .advance_or_show_file(&mut viewer, &page, ShowArgs::default())
            .unwrap();
        assert_eq!(viewer.page, 1);
    }

    #[test]
    fn settle_clears_indicators_then_recomputes() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("clip.mp4");
        std::fs::write(&target, b"").unwrap();

        let mut manager = AuxWindowManager::new(true);
        let mut viewer = StubViewer::default();

        let page = page_showing(keys::SHOW_VIDEO, target.to_str().unwrap());
        manager.on_page_settle(&mut viewer, &page).unwrap();
        assert_eq!(manager.indicators(), &[Indicator::HasVideo]);

        let plain = Node::new("Plain", 1);
        manager.on_page_settle(&mut viewer, &plain).unwrap();
        assert!(manager.indicators().is_empty());
    }

    #[test]
    fn auto_show_opens_and_suppresses_indicators() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("fig.png");
        std::fs::write(&target, b"").unwrap();

        let mut page = page_showing(keys::SHOW_FILE, target.to_str().unwrap());
        page.properties.insert(keys::SHOW_AUTO.into(), "t".into());

        let mut manager = AuxWindowManager::new(true);
        let mut viewer = StubViewer::default();
        manager.on_page_settle(&mut viewer, &page).unwrap();

        assert!(manager.is_open());
        assert!(manager.indicators().is_empty());
    }

    #[test]
    fn video_honors_mute() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("clip.mp4");
        std::fs::write(&target, b"").unwrap();

        let mut page = page_showing(keys::SHOW_VIDEO, target.to_str().unwrap());
        page.properties.insert(keys::MUTE.into(), "t".into());

        let mut manager = AuxWindowManager::new(false);
        let mut viewer = StubViewer::default();
        manager.show_video(&mut viewer, &page).unwrap();
        let window = manager.window().unwrap();
        assert_eq!(window.kind, AuxKind::Video);
        assert!(window.muted);
    }

    #[test]
    fn close_is_idempotent() {
        let mut manager = AuxWindowManager::new(true);
        manager.close();
        manager.close();
        assert!(!manager.is_open());
    }
}
