use std::{borrow::Cow, str::FromStr};

use thiserror::Error;

/// Palette used when none (or an empty one) is configured.
pub const DEFAULT_PALETTE_HEX: [u32; 4] = [0xffffff, 0xe0f2fe, 0xbae6fd, 0xf0f9ff];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("Hex color `{0}` must have 3 or 6 digits")]
    InvalidLength(String),
    #[error("Hex color `{0}` contains a non-hex digit")]
    InvalidDigit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    /// Creates a new [Color] from the given RGBA values.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba_int(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Creates an opaque [Color] from a packed `0xRRGGBB` value.
    pub fn from_rgb_hex(hex: u32) -> Self {
        Self::from_rgba_int(
            ((hex >> 16) & 0xff) as u8,
            ((hex >> 8) & 0xff) as u8,
            (hex & 0xff) as u8,
            255,
        )
    }

    /// Parses `#rgb` or `#rrggbb`. The leading `#` is optional.
    pub fn from_hex_str(s: &str) -> Result<Self, ColorError> {
        let digits = s.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidDigit(s.to_string()));
        }

        let expanded: Cow<'_, str> = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>().into(),
            6 => digits.into(),
            _ => return Err(ColorError::InvalidLength(s.to_string())),
        };

        let packed = u32::from_str_radix(&expanded, 16)
            .map_err(|_| ColorError::InvalidDigit(s.to_string()))?;
        Ok(Self::from_rgb_hex(packed))
    }

    /// Returns the RGB values as a `#rrggbb` string.
    pub fn to_hex_string(&self) -> String {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }

    /// Returns the [Color] as a [glam::Vec3], discarding the alpha value.
    #[inline]
    pub fn vec3(&self) -> glam::Vec3 {
        glam::Vec3::new(self.r, self.g, self.b)
    }

    #[inline]
    pub fn to_wgpu(&self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex_str(s)
    }
}

/// The set of colors particles are tinted from. May be empty, in which case
/// [Palette::resolve] hands out the default colors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<String>", into = "Vec<String>")
)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    pub fn empty() -> Self {
        Self { colors: Vec::new() }
    }

    pub fn from_hex_list<S: AsRef<str>>(hex: &[S]) -> Result<Self, ColorError> {
        let colors = hex
            .iter()
            .map(|s| Color::from_hex_str(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { colors })
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The colors to sample from, substituting the default palette when empty.
    pub fn resolve(&self) -> Cow<'_, [Color]> {
        if self.colors.is_empty() {
            Cow::Owned(
                DEFAULT_PALETTE_HEX
                    .iter()
                    .map(|&hex| Color::from_rgb_hex(hex))
                    .collect(),
            )
        } else {
            Cow::Borrowed(&self.colors)
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(
            DEFAULT_PALETTE_HEX
                .iter()
                .map(|&hex| Color::from_rgb_hex(hex))
                .collect(),
        )
    }
}

impl TryFrom<Vec<String>> for Palette {
    type Error = ColorError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_hex_list(&value)
    }
}

impl From<Palette> for Vec<String> {
    fn from(value: Palette) -> Self {
        value.colors.iter().map(Color::to_hex_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_and_short_hex() -> anyhow::Result<()> {
        let long = Color::from_hex_str("#bae6fd")?;
        assert_eq!(long, Color::from_rgba_int(0xba, 0xe6, 0xfd, 0xff));

        let short = Color::from_hex_str("fff")?;
        assert_eq!(short, Color::WHITE);

        let expanded = Color::from_hex_str("#1a2")?;
        assert_eq!(expanded, Color::from_hex_str("#11aa22")?);

        Ok(())
    }

    #[test]
    fn test_reject_bad_hex() {
        assert_eq!(
            Color::from_hex_str("#abcd"),
            Err(ColorError::InvalidLength("#abcd".to_string()))
        );
        assert_eq!(
            Color::from_hex_str("#zzzzzz"),
            Err(ColorError::InvalidDigit("#zzzzzz".to_string()))
        );
        assert!(Color::from_hex_str("").is_err());
        assert!("#+12345".parse::<Color>().is_err());
    }

    #[test]
    fn test_hex_string() -> anyhow::Result<()> {
        assert_eq!(Color::from_hex_str("#E0F2FE")?.to_hex_string(), "#e0f2fe");
        Ok(())
    }

    #[test]
    fn test_empty_palette_resolves_to_default() {
        let empty = Palette::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.resolve().as_ref(), Palette::default().colors());

        let custom = Palette::new(vec![Color::BLACK]);
        assert_eq!(custom.resolve().as_ref(), &[Color::BLACK]);
    }
}
