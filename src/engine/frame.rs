//! Frame-level resolution.
//!
//! The frame level is the heading depth that defines a page boundary:
//! nodes at that depth are page roots, deeper nodes belong to their
//! nearest page-root ancestor, shallower nodes are page roots themselves.

use crate::model::{keys, Document};

/// Default page granularity when the document declares none.
pub const DEFAULT_FRAME_LEVEL: u8 = 1;

/// Read the document's declared page granularity.
///
/// A missing or malformed `EPRESENT_FRAME_LEVEL` keyword falls back to
/// the default; a bad value is never surfaced as an error.
pub fn resolve_frame_level(doc: &Document) -> u8 {
    doc.keyword(keys::FRAME_LEVEL)
        .and_then(|v| v.trim().parse::<u8>().ok())
        .filter(|&level| level >= 1)
        .unwrap_or(DEFAULT_FRAME_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_when_absent() {
        let doc = Document::new();
        assert_eq!(resolve_frame_level(&doc), 1);
    }

    #[test]
    fn reads_declared_level() {
        let mut doc = Document::new();
        doc.keywords.insert(keys::FRAME_LEVEL.into(), "2".into());
        assert_eq!(resolve_frame_level(&doc), 2);
    }

    #[test]
    fn malformed_falls_back() {
        let mut doc = Document::new();
        doc.keywords.insert(keys::FRAME_LEVEL.into(), "two".into());
        assert_eq!(resolve_frame_level(&doc), 1);

        doc.keywords.insert(keys::FRAME_LEVEL.into(), "0".into());
        assert_eq!(resolve_frame_level(&doc), 1);
    }

    #[test]
    fn tolerates_whitespace() {
        let mut doc = Document::new();
        doc.keywords.insert(keys::FRAME_LEVEL.into(), " 3 ".into());
        assert_eq!(resolve_frame_level(&doc), 3);
    }
}
