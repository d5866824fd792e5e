//! Image placement: standalone images, illustration grids, road-sign
//! rows, and the floated template image that body text wraps around.
//!
//! Geometry is computed from intrinsic sizes only (aspect-preserving
//! scale to a target height); the host scales pixels. A file that cannot
//! be probed participates with the catalog's fallback size rather than
//! failing the page.

use log::debug;

use quaderno_content::ContentBlock;
use quaderno_resource::ImageCatalog;
use quaderno_surface::{LayoutSurface, TextFlowMode};
use quaderno_types::{Rect, Size};

use crate::LayoutError;
use crate::cursor::{Pager, PlacedBox};
use crate::fitter::place_block;

/// Near-square signs and oversized originals read as attention signs and
/// are shrunk so they do not dominate the row.
fn is_attention_sign(size: Size) -> bool {
    let aspect = size.aspect_ratio();
    (0.8..=1.2).contains(&aspect) || size.width > 200.0 || size.height > 200.0
}

/// A standalone image scaled to the standard height. When the space left
/// on the page is below the legibility floor the image defers to a new
/// page instead of shrinking.
pub fn place_single_image<S: LayoutSurface>(
    surface: &mut S,
    pager: &mut Pager,
    catalog: &ImageCatalog,
    reference: &str,
) -> Result<PlacedBox, LayoutError> {
    let target_height = pager.config.standard_image_height;
    if pager.remaining() < target_height * pager.config.image_defer_ratio {
        pager.new_page(surface)?;
    }
    let scaled = catalog
        .intrinsic_size(reference)
        .scaled_to_height(target_height.min(pager.remaining()));
    let rect = Rect::new(
        pager.column_x(),
        pager.cursor.y,
        scaled.width,
        scaled.height,
    );
    surface.create_image_frame(rect, &catalog.resolve(reference).to_string_lossy())?;
    pager.advance(scaled.height + pager.config.image_gap);
    pager.clamp_to_boundary();
    Ok(PlacedBox {
        rect,
        overflow: false,
    })
}

/// Illustration grid: up to three images on the first row of a group and
/// two on each following row, the whole group scaled uniformly so no row
/// exceeds the available width. Groups hold at most five images; larger
/// sets restart the pattern. Narrow columns drop to one or two per row.
pub fn place_image_grid<S: LayoutSurface>(
    surface: &mut S,
    pager: &mut Pager,
    catalog: &ImageCatalog,
    references: &[String],
) -> Result<(), LayoutError> {
    if references.is_empty() {
        return Ok(());
    }
    let available_width = pager.column_width();
    let wide = available_width >= 200.0;
    let group_size = if wide {
        5
    } else if available_width < 120.0 {
        3
    } else {
        6
    };

    for group in references.chunks(group_size) {
        place_grid_group(surface, pager, catalog, group, available_width, wide)?;
    }
    Ok(())
}

fn place_grid_group<S: LayoutSurface>(
    surface: &mut S,
    pager: &mut Pager,
    catalog: &ImageCatalog,
    group: &[String],
    available_width: f32,
    wide: bool,
) -> Result<(), LayoutError> {
    let target_height = pager.config.grid_image_height;
    let gap = pager.config.image_gap;

    let widths: Vec<f32> = group
        .iter()
        .map(|r| catalog.intrinsic_size(r).scaled_to_height(target_height).width)
        .collect();

    // Row pattern over the group: 3 then 2 when wide, width-adaptive
    // otherwise.
    let mut rows: Vec<&[String]> = Vec::new();
    let mut row_widths: Vec<&[f32]> = Vec::new();
    let mut index = 0;
    while index < group.len() {
        let per_row = if wide {
            if rows.is_empty() { 3 } else { 2 }
        } else if available_width < 120.0 {
            1
        } else {
            2
        };
        let end = (index + per_row).min(group.len());
        rows.push(&group[index..end]);
        row_widths.push(&widths[index..end]);
        index = end;
    }

    // One scale for the whole group keeps every image the same height.
    // Gaps do not scale, so the ratio is taken against the image widths
    // alone.
    let mut scale: f32 = 1.0;
    for row in &row_widths {
        let gaps = (row.len() - 1) as f32 * gap;
        let images_width: f32 = row.iter().sum();
        if images_width + gaps > available_width && images_width > 0.0 {
            scale = scale.min(((available_width - gaps) / images_width).max(0.05));
        }
    }
    let row_height = target_height * scale;

    for (row, row_w) in rows.iter().zip(&row_widths) {
        let scaled: Vec<f32> = row_w.iter().map(|w| w * scale).collect();
        let row_width: f32 = scaled.iter().sum::<f32>() + (scaled.len() - 1) as f32 * gap;
        let mut x = if wide {
            pager.column_x() + (available_width - row_width) / 2.0
        } else {
            pager.column_x()
        };

        for (reference, width) in row.iter().zip(&scaled) {
            let rect = Rect::new(x, pager.cursor.y, *width, row_height);
            surface.create_image_frame(rect, &catalog.resolve(reference).to_string_lossy())?;
            x += width + gap;
        }

        let next_y = pager.cursor.y + row_height + gap;
        if next_y > pager.safe_boundary() {
            pager.cursor.y = pager.safe_boundary();
        } else {
            pager.cursor.y = next_y;
        }
    }
    Ok(())
}

/// Road signs in right-aligned rows starting at `start_y`. Per-row count
/// adapts to the available width (1 below 120pt, 2 below 200pt, else 3),
/// each row is scaled uniformly to fit, attention signs are shrunk, and
/// every frame registers bounding-box text flow so body text wraps around
/// the stack. Returns the y below the last row; the caller reconciles it
/// with the text flow.
pub fn place_roadsign_row<S: LayoutSurface>(
    surface: &mut S,
    pager: &mut Pager,
    catalog: &ImageCatalog,
    references: &[String],
    start_y: f32,
    frame_x: Option<f32>,
    frame_width: Option<f32>,
) -> Result<f32, LayoutError> {
    if references.is_empty() {
        return Ok(start_y);
    }
    let target_height = pager.config.roadsign_height;
    let gap = pager.config.image_gap;
    let available_width = frame_width.unwrap_or_else(|| pager.column_width());
    let per_row = if available_width < 120.0 {
        1
    } else if available_width < 200.0 {
        2
    } else {
        3
    };
    let right_edge = frame_x.map_or_else(
        || pager.column_x() + available_width,
        |x| x + available_width,
    );

    let mut current_y = start_y;
    for row in references.chunks(per_row) {
        let sizes: Vec<Size> = row.iter().map(|r| catalog.intrinsic_size(r)).collect();
        let widths: Vec<f32> = sizes
            .iter()
            .map(|s| s.scaled_to_height(target_height).width)
            .collect();
        let gaps = (widths.len() - 1) as f32 * gap;
        let images_width: f32 = widths.iter().sum();
        let scale = if images_width + gaps > available_width && images_width > 0.0 {
            ((available_width - gaps) / images_width).max(0.05)
        } else {
            1.0
        };
        let row_height = target_height * scale;
        let row_width = images_width * scale + gaps;

        let mut x = right_edge - row_width;
        for ((reference, width), size) in row.iter().zip(&widths).zip(&sizes) {
            let height = if is_attention_sign(*size) {
                row_height * pager.config.attention_shrink
            } else {
                row_height
            };
            let rect = Rect::new(x, current_y, width * scale, height);
            let frame =
                surface.create_image_frame(rect, &catalog.resolve(reference).to_string_lossy())?;
            let _ = surface.set_text_flow(frame, TextFlowMode::AroundBoundingBox);
            x += width * scale + gap;
        }

        let next_y = current_y + row_height + gap;
        let boundary = pager.safe_boundary();
        current_y = if next_y > boundary { boundary } else { next_y };
    }
    Ok(current_y)
}

/// Template body text with its first image floated at the top-left and
/// the text wrapping around it.
///
/// The oracle cannot see float displacement, so the cursor is advanced by
/// an extra reserve proportional to the area the image steals: wrapped
/// text needs roughly a quarter to a third more height than the
/// unobstructed estimate. The bisection split is not used here; the
/// monotonicity assumption behind it does not survive wrapping.
pub fn place_wrapped_text<S: LayoutSurface>(
    surface: &mut S,
    pager: &mut Pager,
    catalog: &ImageCatalog,
    block: &ContentBlock,
    image_ref: Option<&str>,
    trailing_gap: f32,
) -> Result<PlacedBox, LayoutError> {
    let image = image_ref
        .filter(|r| catalog.exists(r))
        .map(|r| (r, catalog.intrinsic_size(r)));

    let Some((reference, intrinsic)) = image else {
        return place_block(surface, pager, block, trailing_gap);
    };

    let scaled = intrinsic.scaled_to_height(pager.config.standard_image_height);
    let placed = place_block(surface, pager, block, 0.0)?;

    // Reserve for the text the float displaces, and never end above the
    // image itself.
    let width_ratio = scaled.width / pager.geometry.content_width();
    let displacement = scaled.height * width_ratio * pager.config.float_reserve_factor;
    let occupied = (placed.rect.height + displacement).max(scaled.height);
    debug!(
        "float reserve: text {:.1}pt + displacement {:.1}pt",
        placed.rect.height, displacement
    );

    let padding = 2.0;
    let image_rect = Rect::new(
        pager.geometry.content_left() + padding,
        placed.rect.y + padding,
        scaled.width,
        scaled.height,
    );
    let container = surface.create_rect(image_rect.inflated(padding), None, None, 0.5)?;
    let _ = surface.set_text_flow(container, TextFlowMode::AroundBoundingBox);
    let frame =
        surface.create_image_frame(image_rect, &catalog.resolve(reference).to_string_lossy())?;
    let _ = surface.set_text_flow(frame, TextFlowMode::AroundFrame);

    pager.cursor.y = placed.rect.y + occupied + trailing_gap;
    pager.clamp_to_boundary();
    Ok(PlacedBox {
        rect: Rect::new(
            placed.rect.x,
            placed.rect.y,
            pager.geometry.content_width(),
            occupied,
        ),
        overflow: placed.overflow,
    })
}
