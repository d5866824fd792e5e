//! The metrics oracle: best-effort height estimation for styled text.
//!
//! No host exposes exact pre-layout metrics for styled runs, so heights
//! are estimated by rendering into a throwaway probe frame and reading
//! the line metrics back. The estimate is a starting point only; callers
//! verify with `text_overflows` after placing real content and expand
//! from there. Estimation never fails; a host that refuses the probe
//! downgrades to a character-count heuristic.

use log::debug;

use quaderno_style::FontCatalog;
use quaderno_surface::{LayoutSurface, SurfaceError};
use quaderno_types::Rect;

use crate::fonts::apply_font;

/// Line spacing used throughout the booklet: small description text packs
/// tighter than body text.
pub fn line_spacing_for(font_size: f32) -> f32 {
    if font_size <= 7.0 {
        font_size
    } else {
        font_size * 1.1
    }
}

/// Pure character-count fallback for when no probe can be created.
pub fn fallback_estimate(text: &str, font_size: f32) -> f32 {
    let lines = (text.chars().count() / 50).max(1) as f32;
    lines * font_size * 1.5
}

/// Estimate the height `text` needs at `width`. `probe_height` bounds the
/// throwaway frame; anything that still overflows it is estimated
/// aggressively instead of probed further.
pub fn measure_height<S: LayoutSurface>(
    surface: &mut S,
    fonts: &FontCatalog,
    text: &str,
    width: f32,
    font_size: f32,
    family: Option<&str>,
    probe_height: f32,
) -> f32 {
    if text.is_empty() {
        return font_size * 2.0;
    }

    match probe(surface, fonts, text, width, font_size, family, probe_height) {
        Ok(height) => height.max(font_size * 2.0),
        Err(err) => {
            debug!("measurement probe failed ({err}); using character estimate");
            fallback_estimate(text, font_size)
        }
    }
}

fn probe<S: LayoutSurface>(
    surface: &mut S,
    fonts: &FontCatalog,
    text: &str,
    width: f32,
    font_size: f32,
    family: Option<&str>,
    probe_height: f32,
) -> Result<f32, SurfaceError> {
    let frame = surface.create_text_frame(Rect::new(0.0, 0.0, width, probe_height))?;
    apply_font(surface, frame, fonts, family, font_size);
    let spacing = line_spacing_for(font_size);
    let _ = surface.set_line_spacing(frame, spacing);
    surface.set_text(frame, text)?;

    let height = if surface.text_overflows(frame)? {
        // Longer than half a page: estimate instead of probing further.
        let words = text.split_whitespace().count();
        let lines = (words / 8).max(text.chars().count() / 80).max(1);
        lines as f32 * font_size * 1.3
    } else {
        let metrics = surface.line_metrics(frame)?;
        if metrics.lines > 0 {
            metrics.lines as f32 * metrics.line_spacing
        } else {
            font_size * 3.0
        }
    };
    let _ = surface.delete_frame(frame);

    // Half a line of headroom; the expand loop trims any excess.
    Ok(height + font_size * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quaderno_surface::HeadlessSurface;

    fn measure(surface: &mut HeadlessSurface, text: &str, width: f32) -> f32 {
        measure_height(
            surface,
            &FontCatalog::default(),
            text,
            width,
            10.0,
            None,
            300.0,
        )
    }

    #[test]
    fn estimates_are_idempotent() {
        let mut surface = HeadlessSurface::new();
        let text = "some reasonably sized paragraph of text to measure";
        let first = measure(&mut surface, text, 200.0);
        let second = measure(&mut surface, text, 200.0);
        assert_eq!(first, second);
    }

    #[test]
    fn longer_text_never_measures_shorter() {
        let mut surface = HeadlessSurface::new();
        let short = measure(&mut surface, &"a".repeat(50), 100.0);
        let long = measure(&mut surface, &"a".repeat(500), 100.0);
        assert!(long > short);
    }

    #[test]
    fn probes_are_cleaned_up() {
        let mut surface = HeadlessSurface::new();
        measure(&mut surface, "text", 100.0);
        assert!(surface.elements().is_empty());
    }

    #[test]
    fn probe_failure_degrades_to_the_character_heuristic() {
        let mut surface = HeadlessSurface::new();
        surface.fail_creates(1);
        let text = "x".repeat(100);
        let estimate = measure(&mut surface, &text, 100.0);
        assert_eq!(estimate, fallback_estimate(&text, 10.0));
        assert_eq!(estimate, 2.0 * 10.0 * 1.5);
    }

    #[test]
    fn empty_text_costs_two_lines() {
        let mut surface = HeadlessSurface::new();
        assert_eq!(measure(&mut surface, "", 100.0), 20.0);
    }
}
