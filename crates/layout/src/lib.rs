//! The layout core: measurement, fitting, balancing and pagination.
//!
//! Everything here drives a [`quaderno_surface::LayoutSurface`] and keeps
//! its own state in an explicit [`Pager`], so a generation run can be
//! replayed against the headless double in tests exactly as it runs
//! against a host.

use thiserror::Error;

use quaderno_surface::SurfaceError;
use quaderno_types::PageGeometryError;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),
    #[error("Invalid page geometry: {0}")]
    Geometry(#[from] PageGeometryError),
}

pub mod balance;
pub mod config;
pub mod cursor;
pub mod fitter;
pub mod fonts;
pub mod images;
pub mod oracle;
pub mod painting;
pub mod quiz;

pub use balance::{BalanceOutcome, balance_tokens};
pub use config::{ColumnMode, FloatStyle, LayoutConfig};
pub use cursor::{BannerDescriptor, Cursor, Pager, PlacedBox};
pub use fitter::{Decision, decide, place_balanced_block, place_block};
pub use images::{place_image_grid, place_roadsign_row, place_single_image, place_wrapped_text};
pub use quiz::{AnswerRow, QuestionCard, place_question_card, place_quiz_block};
