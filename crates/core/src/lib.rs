//! # quaderno-core
//!
//! Integration layer for the booklet engine: the document walker, the
//! generation pipeline and the unified error type.
//!
//! The crates below it split the work the way the layouts use it:
//! content model and run parsing in `quaderno-content`, the host seam in
//! `quaderno-surface`, the measurement/fitting/balancing core in
//! `quaderno-layout`, asset probing in `quaderno-resource` and input
//! ingestion in `quaderno-source`. Nothing in this tree touches a real
//! host directly; every drawing call goes through the `LayoutSurface`
//! trait.

// Re-export foundation crates
pub use quaderno_content as content;
pub use quaderno_resource as resource;
pub use quaderno_source as source;
pub use quaderno_style as style;
pub use quaderno_surface as surface;
pub use quaderno_types as types;

// Re-export the layout core
pub use quaderno_layout as layout;

pub mod error;
pub mod options;
pub mod pipeline;
pub mod walker;

// Re-export the common entry surface
pub use error::PipelineError;
pub use options::{GenerationOptions, GenerationReport};
pub use pipeline::BookletPipeline;
pub use walker::DocumentWalker;

pub use quaderno_content::{Course, QuizFilter, RunSyntax};
pub use quaderno_layout::{ColumnMode, FloatStyle, LayoutConfig, Pager};
pub use quaderno_resource::ImageCatalog;
pub use quaderno_style::BookletStyle;
pub use quaderno_surface::{HeadlessSurface, LayoutSurface};
pub use quaderno_types::{Color, Margins, PageGeometry, Rect, Size};
