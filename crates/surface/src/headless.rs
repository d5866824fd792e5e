//! A deterministic in-memory surface. Text metrics are synthesized from a
//! fixed per-character advance, so every probe/expand loop in the core can
//! be exercised without a host process, and tests can assert on exactly
//! what was placed where.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::path::Path;

use quaderno_style::RunStyle;
use quaderno_types::{Color, Rect, Size};

use crate::{
    FrameId, HAlign, LayoutSurface, LineMetrics, SurfaceError, TextFlowMode, VAlign,
};

/// What kind of element a recorded frame is.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacedKind {
    Text {
        text: String,
        font_family: Option<String>,
        font_size: f32,
        color: Color,
        spans: Vec<(usize, usize, RunStyle)>,
    },
    Image {
        path: String,
    },
    Rect {
        fill: Option<Color>,
        stroke: Option<Color>,
    },
}

/// A frame as the double recorded it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedElement {
    pub id: FrameId,
    pub page: usize,
    pub rect: Rect,
    pub kind: PlacedKind,
    pub rotation: f32,
    pub flow: TextFlowMode,
}

#[derive(Debug, Clone)]
struct TextState {
    line_spacing: f32,
}

#[derive(Debug, Clone)]
struct Frame {
    element: PlacedElement,
    text: Option<TextState>,
}

/// Deterministic test double.
///
/// A character advances `char_width_factor * font_size` points; a line
/// occupies the requested line spacing (default `font_size * 1.1`). The
/// estimate is intentionally a little optimistic so the core's
/// expand-until-no-overflow loops have real work to do.
#[derive(Debug)]
pub struct HeadlessSurface {
    frames: BTreeMap<FrameId, Frame>,
    next_id: FrameId,
    pages: usize,
    fonts: HashSet<String>,
    exported_to: Option<String>,
    char_width_factor: f32,
    /// When non-zero, the next N frame creations fail. Lets tests drive
    /// the oracle's degraded estimation path.
    creates_to_fail: usize,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurface {
    pub fn new() -> Self {
        let fonts = ["Arial", "Myriad Pro Cond", "Verdana", "sans-serif"]
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            frames: BTreeMap::new(),
            next_id: 1,
            pages: 1,
            fonts,
            exported_to: None,
            char_width_factor: 0.5,
            creates_to_fail: 0,
        }
    }

    /// Replace the set of families `set_font` accepts.
    pub fn with_fonts<I, S>(mut self, fonts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fonts = fonts.into_iter().map(Into::into).collect();
        self
    }

    /// Make the next `n` frame creations fail.
    pub fn fail_creates(&mut self, n: usize) {
        self.creates_to_fail = n;
    }

    /// Every recorded element, in creation order.
    pub fn elements(&self) -> Vec<&PlacedElement> {
        self.frames.values().map(|f| &f.element).collect()
    }

    pub fn elements_on_page(&self, page: usize) -> Vec<&PlacedElement> {
        self.frames
            .values()
            .map(|f| &f.element)
            .filter(|e| e.page == page)
            .collect()
    }

    pub fn text_of(&self, id: FrameId) -> Option<&str> {
        match &self.frames.get(&id)?.element.kind {
            PlacedKind::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn exported_to(&self) -> Option<&str> {
        self.exported_to.as_deref()
    }

    fn frame(&self, id: FrameId) -> Result<&Frame, SurfaceError> {
        self.frames.get(&id).ok_or(SurfaceError::UnknownFrame(id))
    }

    fn frame_mut(&mut self, id: FrameId) -> Result<&mut Frame, SurfaceError> {
        self.frames
            .get_mut(&id)
            .ok_or(SurfaceError::UnknownFrame(id))
    }

    fn alloc(&mut self, element: PlacedElement, text: Option<TextState>) -> Result<FrameId, SurfaceError> {
        if self.creates_to_fail > 0 {
            self.creates_to_fail -= 1;
            return Err(SurfaceError::Host("frame creation refused".to_string()));
        }
        let id = element.id;
        self.frames.insert(id, Frame { element, text });
        self.next_id += 1;
        Ok(id)
    }

    /// Wrapped line count for a text at a width, by character counting.
    fn wrapped_lines(&self, text: &str, width: f32, font_size: f32) -> usize {
        let advance = (self.char_width_factor * font_size).max(0.1);
        let per_line = (width / advance).floor().max(1.0) as usize;
        text.split('\n')
            .map(|segment| {
                let chars = segment.chars().count();
                chars.div_ceil(per_line).max(1)
            })
            .sum()
    }

    fn required_height(&self, frame: &Frame) -> f32 {
        let PlacedKind::Text { text, font_size, .. } = &frame.element.kind else {
            return 0.0;
        };
        if text.is_empty() {
            return 0.0;
        }
        let spacing = frame
            .text
            .as_ref()
            .map_or(font_size * 1.1, |s| s.line_spacing);
        self.wrapped_lines(text, frame.element.rect.width, *font_size) as f32 * spacing
    }
}

impl LayoutSurface for HeadlessSurface {
    fn new_page(&mut self) -> Result<(), SurfaceError> {
        self.pages += 1;
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn create_text_frame(&mut self, rect: Rect) -> Result<FrameId, SurfaceError> {
        let element = PlacedElement {
            id: self.next_id,
            page: self.pages,
            rect,
            kind: PlacedKind::Text {
                text: String::new(),
                font_family: None,
                font_size: 10.0,
                color: Color::BLACK,
                spans: Vec::new(),
            },
            rotation: 0.0,
            flow: TextFlowMode::None,
        };
        self.alloc(element, Some(TextState { line_spacing: 11.0 }))
    }

    fn create_image_frame(&mut self, rect: Rect, path: &str) -> Result<FrameId, SurfaceError> {
        let element = PlacedElement {
            id: self.next_id,
            page: self.pages,
            rect,
            kind: PlacedKind::Image {
                path: path.to_string(),
            },
            rotation: 0.0,
            flow: TextFlowMode::None,
        };
        self.alloc(element, None)
    }

    fn create_rect(
        &mut self,
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<Color>,
        _line_width: f32,
    ) -> Result<FrameId, SurfaceError> {
        let element = PlacedElement {
            id: self.next_id,
            page: self.pages,
            rect,
            kind: PlacedKind::Rect { fill, stroke },
            rotation: 0.0,
            flow: TextFlowMode::None,
        };
        self.alloc(element, None)
    }

    fn delete_frame(&mut self, id: FrameId) -> Result<(), SurfaceError> {
        self.frames
            .remove(&id)
            .map(|_| ())
            .ok_or(SurfaceError::UnknownFrame(id))
    }

    fn set_text(&mut self, id: FrameId, new_text: &str) -> Result<(), SurfaceError> {
        match &mut self.frame_mut(id)?.element.kind {
            PlacedKind::Text { text, spans, .. } => {
                *text = new_text.to_string();
                spans.clear();
                Ok(())
            }
            _ => Err(SurfaceError::Host("not a text frame".to_string())),
        }
    }

    fn set_font(&mut self, id: FrameId, family: &str, size: f32) -> Result<(), SurfaceError> {
        if !self.fonts.contains(family) {
            return Err(SurfaceError::FontUnavailable(family.to_string()));
        }
        match &mut self.frame_mut(id)?.element.kind {
            PlacedKind::Text {
                font_family,
                font_size,
                ..
            } => {
                *font_family = Some(family.to_string());
                *font_size = size;
                Ok(())
            }
            _ => Err(SurfaceError::Host("not a text frame".to_string())),
        }
    }

    fn set_line_spacing(&mut self, id: FrameId, spacing: f32) -> Result<(), SurfaceError> {
        let frame = self.frame_mut(id)?;
        if let Some(state) = frame.text.as_mut() {
            state.line_spacing = spacing;
        }
        Ok(())
    }

    fn set_text_color(&mut self, id: FrameId, new_color: Color) -> Result<(), SurfaceError> {
        match &mut self.frame_mut(id)?.element.kind {
            PlacedKind::Text { color, .. } => {
                *color = new_color;
                Ok(())
            }
            _ => Err(SurfaceError::Host("not a text frame".to_string())),
        }
    }

    fn set_alignment(
        &mut self,
        id: FrameId,
        _horizontal: HAlign,
        _vertical: VAlign,
    ) -> Result<(), SurfaceError> {
        // Alignment does not change the double's metrics.
        self.frame(id).map(|_| ())
    }

    fn style_range(
        &mut self,
        id: FrameId,
        start: usize,
        len: usize,
        style: &RunStyle,
    ) -> Result<(), SurfaceError> {
        match &mut self.frame_mut(id)?.element.kind {
            PlacedKind::Text { spans, .. } => {
                spans.push((start, len, style.clone()));
                Ok(())
            }
            _ => Err(SurfaceError::Host("not a text frame".to_string())),
        }
    }

    fn set_text_flow(&mut self, id: FrameId, mode: TextFlowMode) -> Result<(), SurfaceError> {
        self.frame_mut(id)?.element.flow = mode;
        Ok(())
    }

    fn rotate(&mut self, id: FrameId, degrees: f32) -> Result<(), SurfaceError> {
        self.frame_mut(id)?.element.rotation = degrees;
        Ok(())
    }

    fn frame_rect(&self, id: FrameId) -> Result<Rect, SurfaceError> {
        Ok(self.frame(id)?.element.rect)
    }

    fn resize(&mut self, id: FrameId, size: Size) -> Result<(), SurfaceError> {
        let rect = &mut self.frame_mut(id)?.element.rect;
        rect.width = size.width;
        rect.height = size.height;
        Ok(())
    }

    fn move_to(&mut self, id: FrameId, x: f32, y: f32) -> Result<(), SurfaceError> {
        let rect = &mut self.frame_mut(id)?.element.rect;
        rect.x = x;
        rect.y = y;
        Ok(())
    }

    fn text_overflows(&self, id: FrameId) -> Result<bool, SurfaceError> {
        let frame = self.frame(id)?;
        Ok(self.required_height(frame) > frame.element.rect.height + 0.5)
    }

    fn line_metrics(&self, id: FrameId) -> Result<LineMetrics, SurfaceError> {
        let frame = self.frame(id)?;
        let PlacedKind::Text { text, font_size, .. } = &frame.element.kind else {
            return Err(SurfaceError::Host("not a text frame".to_string()));
        };
        let line_spacing = frame
            .text
            .as_ref()
            .map_or(font_size * 1.1, |s| s.line_spacing);
        let lines = if text.is_empty() {
            0
        } else {
            self.wrapped_lines(text, frame.element.rect.width, *font_size)
        };
        Ok(LineMetrics {
            lines,
            line_spacing,
        })
    }

    fn export(&mut self, path: &Path) -> Result<(), SurfaceError> {
        let mut listing = String::new();
        for element in self.frames.values().map(|f| &f.element) {
            let kind = match &element.kind {
                PlacedKind::Text { text, .. } => format!("text {:?}", text),
                PlacedKind::Image { path } => format!("image {}", path),
                PlacedKind::Rect { .. } => "rect".to_string(),
            };
            let _ = writeln!(
                listing,
                "page {} ({:.1},{:.1}) {:.1}x{:.1} {}",
                element.page,
                element.rect.x,
                element.rect.y,
                element.rect.width,
                element.rect.height,
                kind
            );
        }
        std::fs::write(path, listing)?;
        self.exported_to = Some(path.display().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_tracks_frame_height() {
        let mut surface = HeadlessSurface::new();
        // 100pt wide at size 10 -> 20 chars per line.
        let id = surface
            .create_text_frame(Rect::new(0.0, 0.0, 100.0, 11.0))
            .unwrap();
        surface.set_line_spacing(id, 11.0).unwrap();
        surface.set_text(id, "aaaaaaaaaaaaaaaaaaaa").unwrap();
        assert!(!surface.text_overflows(id).unwrap());

        // One char more wraps to a second line.
        surface.set_text(id, "aaaaaaaaaaaaaaaaaaaaa").unwrap();
        assert!(surface.text_overflows(id).unwrap());

        surface.resize(id, Size::new(100.0, 22.0)).unwrap();
        assert!(!surface.text_overflows(id).unwrap());
    }

    #[test]
    fn line_metrics_count_hard_newlines() {
        let mut surface = HeadlessSurface::new();
        let id = surface
            .create_text_frame(Rect::new(0.0, 0.0, 100.0, 50.0))
            .unwrap();
        surface.set_text(id, "a\nb").unwrap();
        assert_eq!(surface.line_metrics(id).unwrap().lines, 2);
    }

    #[test]
    fn unknown_fonts_are_refused() {
        let mut surface = HeadlessSurface::new();
        let id = surface
            .create_text_frame(Rect::new(0.0, 0.0, 10.0, 10.0))
            .unwrap();
        assert!(matches!(
            surface.set_font(id, "Papyrus", 10.0),
            Err(SurfaceError::FontUnavailable(_))
        ));
        surface.set_font(id, "Arial", 10.0).unwrap();
    }

    #[test]
    fn frames_remember_their_page() {
        let mut surface = HeadlessSurface::new();
        let first = surface
            .create_rect(Rect::new(0.0, 0.0, 10.0, 10.0), None, None, 0.0)
            .unwrap();
        surface.new_page().unwrap();
        let second = surface
            .create_rect(Rect::new(0.0, 0.0, 10.0, 10.0), None, None, 0.0)
            .unwrap();
        assert_eq!(surface.frame(first).unwrap().element.page, 1);
        assert_eq!(surface.frame(second).unwrap().element.page, 2);
        assert_eq!(surface.elements_on_page(2).len(), 1);
    }

    #[test]
    fn forced_creation_failures_surface_as_errors() {
        let mut surface = HeadlessSurface::new();
        surface.fail_creates(1);
        assert!(surface.create_text_frame(Rect::default()).is_err());
        assert!(surface.create_text_frame(Rect::default()).is_ok());
    }
}
