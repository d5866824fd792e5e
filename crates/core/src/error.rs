//! The unified error type for generation runs.
//!
//! Only input and geometry problems abort a run; everything downstream
//! (assets, fonts, layout impossibilities) degrades in place and never
//! reaches this type.

use thiserror::Error;

use quaderno_layout::LayoutError;
use quaderno_source::SourceError;
use quaderno_surface::SurfaceError;
use quaderno_types::PageGeometryError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Input error: {0}")]
    Source(#[from] SourceError),
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),
    #[error("Invalid page geometry: {0}")]
    Geometry(#[from] PageGeometryError),
}
