//! The mutable layout state for one document run. Nothing here is global:
//! a [`Pager`] is constructed per run and threaded through every
//! placement, so runs cannot leak state into each other and tests can
//! start from any cursor position they like.

use log::debug;

use quaderno_style::{BookletStyle, FontCatalog};
use quaderno_surface::LayoutSurface;
use quaderno_types::{Color, PageGeometry, Rect};

use crate::config::{ColumnMode, LayoutConfig};
use crate::painting;
use crate::LayoutError;

/// The active topic banner, redrawn on every new page until replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct BannerDescriptor {
    pub text: String,
    pub color: Color,
}

/// Per-document mutable state. Created once per run, mutated by every
/// placement, never serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    /// 1-based, monotonically increasing.
    pub page: usize,
    /// Current vertical offset from the page top.
    pub y: f32,
    /// Active column, 0 or 1. Meaningful only in two-column mode outside
    /// quiz mode.
    pub column: u8,
    /// Reset whenever a page is created.
    pub quiz_header_placed: bool,
    pub banner: Option<BannerDescriptor>,
}

impl Cursor {
    pub fn at_top(geometry: &PageGeometry) -> Self {
        Self {
            page: 1,
            y: geometry.content_top(),
            column: 0,
            quiz_header_placed: false,
            banner: None,
        }
    }
}

/// The result of one placement; consumed immediately to advance the
/// cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedBox {
    pub rect: Rect,
    pub overflow: bool,
}

/// Page geometry, tunables, style table and cursor in one place. Every
/// placement routine takes `&mut Pager` plus the surface it draws on.
#[derive(Debug, Clone)]
pub struct Pager {
    pub geometry: PageGeometry,
    pub config: LayoutConfig,
    pub style: BookletStyle,
    pub fonts: FontCatalog,
    pub cursor: Cursor,
    /// While set, quiz layout owns the full content width and the column
    /// index is ignored.
    pub quiz_mode: bool,
}

impl Pager {
    pub fn new(
        geometry: PageGeometry,
        config: LayoutConfig,
        style: BookletStyle,
        fonts: FontCatalog,
    ) -> Result<Self, LayoutError> {
        geometry.validate()?;
        let cursor = Cursor::at_top(&geometry);
        Ok(Self {
            geometry,
            config,
            style,
            fonts,
            cursor,
            quiz_mode: false,
        })
    }

    /// Draw the furniture of the first page. The surface starts with page
    /// one already current, so this does not create a page.
    pub fn start_document<S: LayoutSurface>(&mut self, surface: &mut S) -> Result<(), LayoutError> {
        painting::draw_page_number(surface, &self.geometry, &self.style, &self.fonts, 1)?;
        Ok(())
    }

    /// Lowest y content may reach: the bottom margin minus the footer
    /// reserve.
    pub fn safe_boundary(&self) -> f32 {
        self.geometry.content_bottom() - self.config.footer_reserve
    }

    /// Vertical space left on the current page.
    pub fn remaining(&self) -> f32 {
        (self.safe_boundary() - self.cursor.y).max(0.0)
    }

    pub fn advance(&mut self, dy: f32) {
        self.cursor.y += dy;
    }

    /// Pull the cursor back inside the safe area if a placement overshot.
    pub fn clamp_to_boundary(&mut self) {
        let boundary = self.safe_boundary();
        if self.cursor.y > boundary {
            self.cursor.y = boundary;
        }
    }

    /// Width of one column when columns apply, otherwise the full content
    /// width.
    pub fn column_width(&self) -> f32 {
        if self.quiz_mode || self.config.column_mode == ColumnMode::Single {
            self.geometry.content_width()
        } else {
            self.geometry.column_width()
        }
    }

    /// Left edge of the active column.
    pub fn column_x(&self) -> f32 {
        if self.quiz_mode || self.config.column_mode == ColumnMode::Single {
            self.geometry.content_left()
        } else {
            self.geometry.column_left(self.cursor.column)
        }
    }

    pub fn switch_column(&mut self) {
        if self.config.column_mode == ColumnMode::Double && !self.quiz_mode {
            self.cursor.column = 1 - self.cursor.column;
        }
    }

    pub fn set_quiz_mode(&mut self, enabled: bool) {
        self.quiz_mode = enabled;
    }

    /// Half a page, floored at 200pt; generous enough for any probe.
    pub fn probe_height(&self) -> f32 {
        (self.geometry.height * 0.5).max(200.0)
    }

    /// Create a page: bump the index, reset the offset and the per-page
    /// flags, then redraw the standing furniture (banner, page number).
    pub fn new_page<S: LayoutSurface>(&mut self, surface: &mut S) -> Result<(), LayoutError> {
        surface.new_page()?;
        self.cursor.page += 1;
        self.cursor.y = self.geometry.content_top();
        self.cursor.column = 0;
        self.cursor.quiz_header_placed = false;
        debug!("page break -> page {}", self.cursor.page);

        if let Some(banner) = self.cursor.banner.clone() {
            painting::draw_banner(
                surface,
                &self.geometry,
                &self.style,
                &self.fonts,
                &banner,
                self.cursor.page,
            )?;
        }
        painting::draw_page_number(
            surface,
            &self.geometry,
            &self.style,
            &self.fonts,
            self.cursor.page,
        )?;
        Ok(())
    }

    /// Break the page unless `needed` points still fit.
    pub fn ensure_space<S: LayoutSurface>(
        &mut self,
        surface: &mut S,
        needed: f32,
    ) -> Result<bool, LayoutError> {
        if needed > self.remaining() {
            self.new_page(surface)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Install (and immediately draw) the topic banner that follows the
    /// document onto every new page until replaced.
    pub fn set_banner<S: LayoutSurface>(
        &mut self,
        surface: &mut S,
        banner: BannerDescriptor,
    ) -> Result<(), LayoutError> {
        painting::draw_banner(
            surface,
            &self.geometry,
            &self.style,
            &self.fonts,
            &banner,
            self.cursor.page,
        )?;
        self.cursor.banner = Some(banner);
        Ok(())
    }
}
