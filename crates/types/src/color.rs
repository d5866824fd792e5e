use serde::{Deserialize, Deserializer, Serialize, de};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(224, 32, 32);
    pub const GREEN: Color = Color::rgb(0, 174, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 224);
    pub const CYAN: Color = Color::rgb(0, 160, 224);
    pub const MAGENTA: Color = Color::rgb(224, 0, 224);
    pub const DARK_GREY: Color = Color::rgb(90, 90, 90);
    /// Alternating quiz row tint.
    pub const VERY_LIGHT_CYAN: Color = Color::rgb(245, 252, 255);
    /// Fill behind the "V" indicator cell.
    pub const PALE_GREEN: Color = Color::rgb(240, 255, 240);
    /// Fill behind the "F" indicator cell.
    pub const PALE_RED: Color = Color::rgb(255, 240, 240);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn gray(value: u8) -> Self {
        Self {
            r: value,
            g: value,
            b: value,
        }
    }

    /// Whether text drawn on this background should be white rather than
    /// black. Uses the Rec. 601 luma weighting.
    pub fn is_dark(self) -> bool {
        let luma =
            0.299 * f32::from(self.r) + 0.587 * f32::from(self.g) + 0.114 * f32::from(self.b);
        luma < 128.0
    }

    /// Black or white, whichever contrasts with this background.
    pub fn contrast_text(self) -> Color {
        if self.is_dark() {
            Color::WHITE
        } else {
            Color::BLACK
        }
    }

    /// Parse a `#RGB` or `#RRGGBB` hex string.
    pub fn parse_hex(s: &str) -> Result<Color, String> {
        let s = s.trim();
        let Some(hex) = s.strip_prefix('#') else {
            return Err(format!("Color must start with #, got: {}", s));
        };

        let component = |part: &str| {
            u8::from_str_radix(part, 16).map_err(|e| format!("Invalid color component: {}", e))
        };

        match hex.len() {
            3 => Ok(Color {
                r: component(&hex[0..1].repeat(2))?,
                g: component(&hex[1..2].repeat(2))?,
                b: component(&hex[2..3].repeat(2))?,
            }),
            6 => Ok(Color {
                r: component(&hex[0..2])?,
                g: component(&hex[2..4])?,
                b: component(&hex[4..6])?,
            }),
            other => Err(format!(
                "Invalid hex color length: expected 3 or 6, got {}",
                other
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ColorDef {
            Str(String),
            Map { r: u8, g: u8, b: u8 },
        }

        match ColorDef::deserialize(deserializer)? {
            ColorDef::Str(s) => Self::parse_hex(&s).map_err(de::Error::custom),
            ColorDef::Map { r, g, b } => Ok(Color { r, g, b }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(Color::parse_hex("#fff").unwrap(), Color::WHITE);
        assert_eq!(Color::parse_hex("#00ae00").unwrap(), Color::GREEN);
        assert!(Color::parse_hex("00ae00").is_err());
        assert!(Color::parse_hex("#12345").is_err());
    }

    #[test]
    fn contrast_picks_readable_text() {
        assert_eq!(Color::BLUE.contrast_text(), Color::WHITE);
        assert_eq!(Color::YELLOW.contrast_text(), Color::BLACK);
        assert!(Color::DARK_GREY.is_dark());
        assert!(!Color::VERY_LIGHT_CYAN.is_dark());
    }
}
