use log::debug;
use quaderno_style::FontCatalog;
use quaderno_surface::{FrameId, LayoutSurface};

/// Set the best available font on a frame, walking the catalog's
/// resolution order. A host that rejects every candidate keeps its own
/// default; styling failures never abort a placement.
pub fn apply_font<S: LayoutSurface>(
    surface: &mut S,
    frame: FrameId,
    catalog: &FontCatalog,
    family: Option<&str>,
    size: f32,
) {
    for candidate in catalog.resolution_order(family) {
        if surface.set_font(frame, &candidate, size).is_ok() {
            return;
        }
    }
    debug!("no configured font available; frame {frame} keeps the host default");
}

#[cfg(test)]
mod tests {
    use super::*;
    use quaderno_surface::HeadlessSurface;
    use quaderno_types::Rect;

    #[test]
    fn falls_through_to_an_available_candidate() {
        let mut surface = HeadlessSurface::new().with_fonts(["Verdana"]);
        let id = surface.create_text_frame(Rect::default()).unwrap();
        let catalog = FontCatalog::default();
        apply_font(&mut surface, id, &catalog, Some("Myriad Pro"), 9.0);
        match &surface.elements()[0].kind {
            quaderno_surface::PlacedKind::Text { font_family, .. } => {
                assert_eq!(font_family.as_deref(), Some("Verdana"));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn a_hostile_host_is_tolerated() {
        let mut surface = HeadlessSurface::new().with_fonts(Vec::<String>::new());
        let id = surface.create_text_frame(Rect::default()).unwrap();
        apply_font(&mut surface, id, &FontCatalog::default(), None, 9.0);
    }
}
