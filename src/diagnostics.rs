//! Reporting for anchors the controllers expected but could not find.
//!
//! Gallery and lightbox operations never fail outright. When something they
//! rely on is absent they do nothing and report it here instead.

use std::cell::RefCell;
use std::fmt;

/// Something a controller needed that was not there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingAnchor {
    /// No grid is rendered to measure or to hold the placeholder.
    GridContainer,
    /// The catalog has no items at all.
    GalleryItems,
    /// The lightbox has no images to show.
    ImageCollection,
    /// The image asked for is not part of the catalog.
    GalleryImage,
    /// The element focused before the lightbox opened is gone.
    FocusTarget,
}

impl MissingAnchor {
    pub fn describe(&self) -> &'static str {
        match self {
            MissingAnchor::GridContainer => "gallery grid",
            MissingAnchor::GalleryItems => "gallery items",
            MissingAnchor::ImageCollection => "lightbox image collection",
            MissingAnchor::GalleryImage => "gallery image",
            MissingAnchor::FocusTarget => "focus target",
        }
    }
}

impl fmt::Display for MissingAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Sink for missing-anchor reports.
pub trait Diagnostics {
    fn missing_anchor(&self, anchor: MissingAnchor, context: &str);
}

/// Logs reports as warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn missing_anchor(&self, anchor: MissingAnchor, context: &str) {
        tracing::warn!(anchor = %anchor, "{}", context);
    }
}

/// Keeps every report so callers can inspect them.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    reports: RefCell<Vec<(MissingAnchor, String)>>,
}

impl RecordingDiagnostics {
    pub fn reports(&self) -> Vec<(MissingAnchor, String)> {
        self.reports.borrow().clone()
    }

    pub fn count(&self, anchor: MissingAnchor) -> usize {
        self.reports.borrow().iter().filter(|(a, _)| *a == anchor).count()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.borrow().is_empty()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn missing_anchor(&self, anchor: MissingAnchor, context: &str) {
        self.reports.borrow_mut().push((anchor, context.to_string()));
    }
}
