use quaderno_types::Color;
use serde::{Deserialize, Serialize};

use crate::spacing::SpacingPolicy;

/// Per-level header text styling.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeaderStyle {
    pub font_size: f32,
    pub bold: bool,
    pub text_color: Color,
    pub background: Option<Color>,
}

impl HeaderStyle {
    fn bold_black(font_size: f32) -> Self {
        Self {
            font_size,
            bold: true,
            text_color: Color::BLACK,
            background: None,
        }
    }
}

/// Quiz table geometry and colors. The row grid is fixed; only the text
/// cell height varies with question length.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizStyle {
    pub header_text: String,
    pub header_height: f32,
    pub header_font_size: f32,
    pub header_fill: Color,
    pub header_text_color: Color,
    pub row_height: f32,
    pub question_font_size: f32,
    pub indicator_font_size: f32,
    /// Width of one V/F indicator cell.
    pub indicator_width: f32,
    pub true_text: String,
    pub false_text: String,
    pub true_fill: Color,
    pub false_fill: Color,
    /// Letter color in the correct answer's cell.
    pub correct_text_color: Color,
    pub row_alt_fill: Color,
    pub grid_color: Color,
}

impl Default for QuizStyle {
    fn default() -> Self {
        Self {
            header_text: "Quiz".to_string(),
            header_height: 24.0,
            header_font_size: 10.0,
            header_fill: Color::CYAN,
            header_text_color: Color::WHITE,
            row_height: 16.0,
            question_font_size: 9.0,
            indicator_font_size: 10.0,
            indicator_width: 18.0,
            true_text: "V".to_string(),
            false_text: "F".to_string(),
            true_fill: Color::PALE_GREEN,
            false_fill: Color::PALE_RED,
            correct_text_color: Color::CYAN,
            row_alt_fill: Color::VERY_LIGHT_CYAN,
            grid_color: Color::CYAN,
        }
    }
}

/// Vertical topic banner geometry. Odd pages carry the banner on the left
/// edge, even pages on the right, with text rotated to read upward or
/// downward respectively.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BannerStyle {
    pub width: f32,
    pub left_margin_offset: f32,
    pub right_margin_offset: f32,
    pub left_rotation: f32,
    pub right_rotation: f32,
    pub font_size: f32,
    pub text_color: Color,
    /// Fraction of the banner height given to the rotated text frame.
    pub text_height_percent: f32,
    pub default_color: Color,
}

impl Default for BannerStyle {
    fn default() -> Self {
        Self {
            width: 20.0,
            left_margin_offset: 2.0,
            right_margin_offset: 6.0,
            left_rotation: 90.0,
            right_rotation: 270.0,
            font_size: 10.0,
            text_color: Color::WHITE,
            text_height_percent: 0.75,
            default_color: Color::DARK_GREY,
        }
    }
}

/// Every style constant the booklet layouts consume, in one table.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookletStyle {
    pub area_header: HeaderStyle,
    pub chapter_header: HeaderStyle,
    pub topic_header: HeaderStyle,
    pub module_header: HeaderStyle,
    pub description_font_size: f32,
    pub template_font_size: f32,
    pub video_font_size: f32,
    pub roadsign_label_font_size: f32,
    pub page_number_font_size: f32,
    /// Accent palette cycled per template id; also the banner color pool.
    pub palette: Vec<Color>,
    /// When set, uncolored template text takes the contrast color of the
    /// template's accent instead of plain black. Off by default; the
    /// accent-background rendition needs it, plain pages do not.
    pub template_text_contrast: bool,
    pub tip_color: Color,
    pub quiz: QuizStyle,
    pub banner: BannerStyle,
    pub spacing: SpacingPolicy,
}

impl Default for BookletStyle {
    fn default() -> Self {
        Self {
            area_header: HeaderStyle::bold_black(12.0),
            chapter_header: HeaderStyle::bold_black(11.0),
            topic_header: HeaderStyle::bold_black(12.0),
            module_header: HeaderStyle::bold_black(11.0),
            description_font_size: 9.0,
            template_font_size: 9.0,
            video_font_size: 6.0,
            roadsign_label_font_size: 6.0,
            page_number_font_size: 8.0,
            palette: vec![
                Color::RED,
                Color::GREEN,
                Color::YELLOW,
                Color::BLUE,
                Color::CYAN,
                Color::MAGENTA,
            ],
            template_text_contrast: false,
            tip_color: Color::GREEN,
            quiz: QuizStyle::default(),
            banner: BannerStyle::default(),
            spacing: SpacingPolicy::default(),
        }
    }
}

impl BookletStyle {
    /// Accent color for a template id: numeric ids cycle the palette,
    /// anything else hashes into it so the same id always gets the same
    /// color.
    pub fn accent_for_id(&self, id: &str) -> Color {
        let idx = match id.parse::<u64>() {
            Ok(n) => (n as usize) % self.palette.len(),
            Err(_) => stable_hash(id) as usize % self.palette.len(),
        };
        self.palette[idx]
    }

    /// Banner color for a topic: hashed off the topic name so the same
    /// topic keeps its color across pages and runs.
    pub fn banner_color_for_topic(&self, topic_name: &str) -> Color {
        self.palette[stable_hash(topic_name) as usize % self.palette.len()]
    }
}

/// FNV-1a. Deterministic across runs, unlike `DefaultHasher`.
fn stable_hash(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in s.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_cycle_the_palette() {
        let style = BookletStyle::default();
        assert_eq!(style.accent_for_id("0"), style.palette[0]);
        assert_eq!(style.accent_for_id("7"), style.palette[1]);
    }

    #[test]
    fn topic_color_is_stable() {
        let style = BookletStyle::default();
        let a = style.banner_color_for_topic("Precedenze");
        let b = style.banner_color_for_topic("Precedenze");
        assert_eq!(a, b);
        assert!(style.palette.contains(&a));
    }

    #[test]
    fn non_numeric_ids_still_map_into_the_palette() {
        let style = BookletStyle::default();
        let color = style.accent_for_id("t-17b");
        assert!(style.palette.contains(&color));
    }
}
