//! Image asset lookup for the layout engine.
//!
//! Layout only ever needs an image's intrinsic size; pixels are the
//! host's business. Sizes are probed from file headers and memoized for
//! the lifetime of a generation run, and a missing or unreadable file
//! degrades to a fixed fallback size instead of failing the page.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::warn;
use quaderno_types::Size;
use thiserror::Error;

/// Intrinsic size substituted when a file cannot be probed.
pub const FALLBACK_SIZE: Size = Size {
    width: 300.0,
    height: 200.0,
};

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Image not found: {0}")]
    NotFound(String),
    #[error("Failed to probe '{path}': {message}")]
    ProbeFailed { path: String, message: String },
}

/// Resolves image references against a base directory and caches their
/// intrinsic sizes. Inputs are static for the duration of one run, so a
/// path probed once is never probed again.
#[derive(Debug, Default)]
pub struct ImageCatalog {
    base_dir: PathBuf,
    sizes: RwLock<HashMap<String, Size>>,
}

impl ImageCatalog {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            sizes: RwLock::new(HashMap::new()),
        }
    }

    /// Absolute path for a reference from the course data.
    pub fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn exists(&self, reference: &str) -> bool {
        self.resolve(reference).is_file()
    }

    /// Intrinsic size in pixels, memoized by reference. Never fails:
    /// unreadable files get [`FALLBACK_SIZE`] (also cached, so the warning
    /// fires once per file).
    pub fn intrinsic_size(&self, reference: &str) -> Size {
        if let Ok(cache) = self.sizes.read()
            && let Some(size) = cache.get(reference)
        {
            return *size;
        }

        let size = match self.probe(reference) {
            Ok(size) => size,
            Err(err) => {
                warn!("image size probe failed, using fallback: {}", err);
                FALLBACK_SIZE
            }
        };
        if let Ok(mut cache) = self.sizes.write() {
            cache.insert(reference.to_string(), size);
        }
        size
    }

    fn probe(&self, reference: &str) -> Result<Size, ResourceError> {
        let path = self.resolve(reference);
        if !path.is_file() {
            return Err(ResourceError::NotFound(path.display().to_string()));
        }
        let (width, height) =
            image::image_dimensions(&path).map_err(|e| ResourceError::ProbeFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Size::new(width as f32, height as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_fall_back_and_are_cached() {
        let catalog = ImageCatalog::new("/nonexistent");
        assert_eq!(catalog.intrinsic_size("ghost.png"), FALLBACK_SIZE);
        // Second lookup hits the cache; same answer.
        assert_eq!(catalog.intrinsic_size("ghost.png"), FALLBACK_SIZE);
        assert!(!catalog.exists("ghost.png"));
    }

    #[test]
    fn absolute_references_bypass_the_base_dir() {
        let catalog = ImageCatalog::new("/images");
        assert_eq!(
            catalog.resolve("/elsewhere/sign.png"),
            PathBuf::from("/elsewhere/sign.png")
        );
        assert_eq!(
            catalog.resolve("sign.png"),
            PathBuf::from("/images/sign.png")
        );
    }

    #[test]
    fn real_files_report_their_pixel_size() {
        use std::io::Write;

        // Minimal 1x1 PNG.
        const PNG: &[u8] = &[
            0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, b'I', b'H',
            b'D', b'R', 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
            0x00, 0x1f, 0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, b'I', b'D', b'A', b'T', 0x78,
            0x9c, 0x62, 0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00,
            0x00, 0x00, 0x00, b'I', b'E', b'N', b'D', 0xae, 0x42, 0x60, 0x82,
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(PNG)
            .unwrap();

        let catalog = ImageCatalog::new(dir.path());
        assert_eq!(catalog.intrinsic_size("dot.png"), Size::new(1.0, 1.0));
    }
}
