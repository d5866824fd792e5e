//! The host seam. Every layout decision ultimately becomes a call into a
//! [`LayoutSurface`]: a desktop-publishing host in production, the
//! [`HeadlessSurface`] double in tests. The core never talks to a host
//! directly, and the trait stays as narrow as the layouts allow.

use std::path::Path;

use quaderno_style::RunStyle;
use quaderno_types::{Color, Rect, Size};
use thiserror::Error;

pub mod headless;

pub use headless::{HeadlessSurface, PlacedElement, PlacedKind};

/// Opaque handle to a frame owned by the host.
pub type FrameId = u64;

#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("No frame with id {0}")]
    UnknownFrame(FrameId),
    #[error("Font '{0}' is not available")]
    FontUnavailable(String),
    #[error("Failed to load image '{path}': {message}")]
    ImageLoadFailed { path: String, message: String },
    #[error("Export failed: {0}")]
    ExportFailed(String),
    #[error("Host error: {0}")]
    Host(String),
}

impl From<std::io::Error> for SurfaceError {
    fn from(err: std::io::Error) -> Self {
        SurfaceError::ExportFailed(err.to_string())
    }
}

/// How body text flows around a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextFlowMode {
    #[default]
    None,
    AroundFrame,
    AroundBoundingBox,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
}

/// What the host actually rendered into a text frame. `line_spacing` is
/// the spacing in effect, which may differ from what was requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    pub lines: usize,
    pub line_spacing: f32,
}

/// The narrow drawing interface the core drives.
///
/// Coordinates are absolute page points, y growing downward. Frames live
/// on the page that was current when they were created. `text_overflows`
/// is the only ground truth about fit; estimates come from probing it.
pub trait LayoutSurface {
    /// Append a page and make it current.
    fn new_page(&mut self) -> Result<(), SurfaceError>;
    /// Number of pages so far; the current page is the last one, 1-based.
    fn page_count(&self) -> usize;

    fn create_text_frame(&mut self, rect: Rect) -> Result<FrameId, SurfaceError>;
    fn create_image_frame(&mut self, rect: Rect, path: &str) -> Result<FrameId, SurfaceError>;
    fn create_rect(
        &mut self,
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<Color>,
        line_width: f32,
    ) -> Result<FrameId, SurfaceError>;
    fn delete_frame(&mut self, id: FrameId) -> Result<(), SurfaceError>;

    fn set_text(&mut self, id: FrameId, text: &str) -> Result<(), SurfaceError>;
    /// Fails when the family is unknown to the host; callers walk their
    /// candidate list on failure.
    fn set_font(&mut self, id: FrameId, family: &str, size: f32) -> Result<(), SurfaceError>;
    fn set_line_spacing(&mut self, id: FrameId, spacing: f32) -> Result<(), SurfaceError>;
    fn set_text_color(&mut self, id: FrameId, color: Color) -> Result<(), SurfaceError>;
    fn set_alignment(
        &mut self,
        id: FrameId,
        horizontal: HAlign,
        vertical: VAlign,
    ) -> Result<(), SurfaceError>;
    /// Apply run-level overrides to a byte range of the frame's text.
    fn style_range(
        &mut self,
        id: FrameId,
        start: usize,
        len: usize,
        style: &RunStyle,
    ) -> Result<(), SurfaceError>;
    fn set_text_flow(&mut self, id: FrameId, mode: TextFlowMode) -> Result<(), SurfaceError>;
    fn rotate(&mut self, id: FrameId, degrees: f32) -> Result<(), SurfaceError>;

    fn frame_rect(&self, id: FrameId) -> Result<Rect, SurfaceError>;
    fn resize(&mut self, id: FrameId, size: Size) -> Result<(), SurfaceError>;
    fn move_to(&mut self, id: FrameId, x: f32, y: f32) -> Result<(), SurfaceError>;

    fn text_overflows(&self, id: FrameId) -> Result<bool, SurfaceError>;
    fn line_metrics(&self, id: FrameId) -> Result<LineMetrics, SurfaceError>;

    /// Write the finished document to `path`.
    fn export(&mut self, path: &Path) -> Result<(), SurfaceError>;
}
