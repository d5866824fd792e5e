use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageGeometryError {
    #[error("Column width would be {0:.2}pt; page too narrow for {1} column(s)")]
    ColumnsTooNarrow(f32, u8),
    #[error("Column count must be 1 or 2, got {0}")]
    UnsupportedColumnCount(u8),
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Margins {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Margins {
    pub fn all(value: f32) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }
}

/// Immutable page description shared by every placement operation.
///
/// The content area is the page minus margins; when `columns == 2` the
/// content area is further split into equal columns separated by
/// `column_gap`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
    pub columns: u8,
    pub column_gap: f32,
    pub balance_columns: bool,
}

impl Default for PageGeometry {
    fn default() -> Self {
        // Wider-than-A5 booklet page used by the study-booklet layouts.
        Self {
            width: 480.0,
            height: 595.0,
            margins: Margins {
                left: 28.0,
                top: 28.0,
                right: 32.0,
                bottom: 28.0,
            },
            columns: 2,
            column_gap: 20.0,
            balance_columns: true,
        }
    }
}

impl PageGeometry {
    /// Validates the column invariant: every column must end up wider
    /// than zero.
    pub fn validate(&self) -> Result<(), PageGeometryError> {
        if self.columns == 0 || self.columns > 2 {
            return Err(PageGeometryError::UnsupportedColumnCount(self.columns));
        }
        let w = self.column_width();
        if w <= 0.0 {
            return Err(PageGeometryError::ColumnsTooNarrow(w, self.columns));
        }
        Ok(())
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margins.left - self.margins.right
    }

    pub fn content_left(&self) -> f32 {
        self.margins.left
    }

    pub fn content_right(&self) -> f32 {
        self.width - self.margins.right
    }

    pub fn content_top(&self) -> f32 {
        self.margins.top
    }

    pub fn content_bottom(&self) -> f32 {
        self.height - self.margins.bottom
    }

    pub fn column_width(&self) -> f32 {
        let cols = f32::from(self.columns.max(1));
        (self.content_width() - (cols - 1.0) * self.column_gap) / cols
    }

    /// Left edge of the given column (0-based).
    pub fn column_left(&self, column: u8) -> f32 {
        self.margins.left + f32::from(column) * (self.column_width() + self.column_gap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_width_splits_content_area() {
        let geom = PageGeometry::default();
        // (480 - 28 - 32 - 20) / 2 = 200
        assert!((geom.column_width() - 200.0).abs() < 1e-4);
        assert!((geom.column_left(1) - (28.0 + 200.0 + 20.0)).abs() < 1e-4);
        geom.validate().unwrap();
    }

    #[test]
    fn narrow_page_fails_validation() {
        let geom = PageGeometry {
            width: 60.0,
            margins: Margins::all(28.0),
            columns: 2,
            column_gap: 20.0,
            ..PageGeometry::default()
        };
        assert!(matches!(
            geom.validate(),
            Err(PageGeometryError::ColumnsTooNarrow(..))
        ));
    }

    #[test]
    fn zero_columns_rejected() {
        let geom = PageGeometry {
            columns: 0,
            ..PageGeometry::default()
        };
        assert!(geom.validate().is_err());
    }
}
