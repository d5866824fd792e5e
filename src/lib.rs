//! # quaderno
//!
//! Flowed-layout engine that turns hierarchical course content into
//! paginated study booklets: measured text blocks, balanced two-column
//! descriptions, floated images, road-sign rows and true/false quiz
//! tables, split across pages by probe-and-expand fitting.
//!
//! This crate re-exports the workspace's public surface; see
//! `quaderno-core` for the pipeline and `quaderno-layout` for the
//! fitting algorithms.

pub use quaderno_core::*;

// Shared serialization stack for embedders that build courses in code.
pub use serde;
pub use serde_json;

/// Initialize the `env_logger` backend for binaries and tests that want
/// layout decision logging (`RUST_LOG=debug` shows page breaks, splits
/// and degraded fits).
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env().try_init();
}
