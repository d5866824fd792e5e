use quaderno_types::Color;
use serde::{Deserialize, Serialize};

/// Inline vertical offset for a run (superscripts and subscripts).
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VerticalAlign {
    #[default]
    Baseline,
    Superscript,
    Subscript,
}

/// Style attached to a single styled run. Absent fields inherit from the
/// block the run is placed in.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunStyle {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Point delta applied on top of the block font size.
    #[serde(default)]
    pub font_size_delta: f32,
    #[serde(default)]
    pub vertical_align: VerticalAlign,
}

impl RunStyle {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::default()
        }
    }

    pub fn colored(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    /// True when the run carries no overrides at all, i.e. plain body text.
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}
