//! Page furniture: the centered footer page number and the rotated
//! vertical topic banner.

use itertools::Itertools;
use quaderno_style::{BookletStyle, FontCatalog, RunStyle};
use quaderno_surface::{HAlign, LayoutSurface, VAlign};
use quaderno_types::{PageGeometry, Rect};

use crate::LayoutError;
use crate::cursor::BannerDescriptor;
use crate::fonts::apply_font;

const PAGE_NUMBER_WIDTH: f32 = 30.0;
const PAGE_NUMBER_HEIGHT: f32 = 15.0;

/// Draw the page number centered in the footer strip, just below the
/// bottom margin.
pub fn draw_page_number<S: LayoutSurface>(
    surface: &mut S,
    geometry: &PageGeometry,
    style: &BookletStyle,
    fonts: &FontCatalog,
    page: usize,
) -> Result<(), LayoutError> {
    let rect = Rect::new(
        (geometry.width - PAGE_NUMBER_WIDTH) / 2.0,
        geometry.content_bottom() + 3.0,
        PAGE_NUMBER_WIDTH,
        PAGE_NUMBER_HEIGHT,
    );
    let frame = match surface.create_text_frame(rect) {
        Ok(frame) => frame,
        // A page without its number is not worth failing the run for.
        Err(_) => return Ok(()),
    };
    surface.set_text(frame, &page.to_string())?;
    apply_font(surface, frame, fonts, None, style.page_number_font_size);
    surface.set_alignment(frame, HAlign::Center, VAlign::Top)?;
    Ok(())
}

/// Draw the vertical topic banner: a colored bar along the outer edge
/// (left on odd pages, right on even) with the topic name rotated along
/// it in spaced capitals.
pub fn draw_banner<S: LayoutSurface>(
    surface: &mut S,
    geometry: &PageGeometry,
    style: &BookletStyle,
    fonts: &FontCatalog,
    banner: &BannerDescriptor,
    page: usize,
) -> Result<(), LayoutError> {
    let banner_style = &style.banner;
    let is_odd = page % 2 == 1;
    let bar_height = geometry.height - geometry.margins.top - geometry.margins.bottom;
    let bar_x = if is_odd {
        geometry.content_left() - banner_style.left_margin_offset - banner_style.width
    } else {
        geometry.content_right() + banner_style.right_margin_offset
    };
    let bar_y = geometry.margins.top;

    surface.create_rect(
        Rect::new(bar_x, bar_y, banner_style.width, bar_height),
        Some(banner.color),
        None,
        0.0,
    )?;

    // The text frame is laid out horizontally then rotated into the bar.
    let text_height = bar_height * banner_style.text_height_percent;
    let frame = surface.create_text_frame(Rect::new(
        0.0,
        0.0,
        text_height,
        banner_style.width - 4.0,
    ))?;
    let display: String = banner.text.to_uppercase().chars().join(" ");
    surface.set_text(frame, &display)?;
    apply_font(surface, frame, fonts, None, banner_style.font_size);
    surface.set_text_color(frame, banner_style.text_color)?;
    surface.style_range(frame, 0, display.len(), &RunStyle::bold())?;
    surface.set_alignment(frame, HAlign::Center, VAlign::Middle)?;

    let center_y = bar_y + bar_height / 2.0;
    if is_odd {
        surface.rotate(frame, banner_style.left_rotation)?;
        surface.move_to(frame, bar_x + 4.0, center_y - text_height / 2.0)?;
    } else {
        surface.rotate(frame, banner_style.right_rotation)?;
        surface.move_to(
            frame,
            bar_x + banner_style.width - 4.0,
            center_y - text_height / 2.0,
        )?;
    }
    Ok(())
}
