//! Color codes as the UI hands them around, and their conversion to shading colors.

use std::fmt;

use crate::error::{CoreError, CoreResult};

/// A CSS-style color string: `#rgb`, `#rrggbb` or a basic named color.
///
/// The code is kept verbatim; it is only interpreted when a material needs
/// the actual channel values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColorCode(String);

impl ColorCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// sRGB channels in `[0, 1]`.
    pub fn to_srgb(&self) -> CoreResult<[f32; 3]> {
        let code = self.0.trim();
        if let Some(hex) = code.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| CoreError::InvalidColor(self.0.clone()));
        }
        named(code)
            .map(|[r, g, b]| [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0])
            .ok_or_else(|| CoreError::InvalidColor(self.0.clone()))
    }

    /// Linear-light channels, ready for lighting math.
    pub fn to_linear_rgb(&self) -> CoreResult<[f32; 3]> {
        self.to_srgb().map(|c| c.map(srgb_to_linear))
    }

    /// 8-bit sRGB channels, for UI painting.
    pub fn to_rgb8(&self) -> CoreResult<[u8; 3]> {
        self.to_srgb()
            .map(|c| c.map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8))
    }
}

impl fmt::Display for ColorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColorCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ColorCode {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for ColorCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ColorCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn parse_hex(hex: &str) -> Option<[f32; 3]> {
    // from_str_radix alone would accept a leading '+'.
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
    match hex.len() {
        3 => {
            let mut out = [0.0; 3];
            for (i, slot) in out.iter_mut().enumerate() {
                let digit = &hex[i..i + 1];
                *slot = channel(&format!("{digit}{digit}"))?;
            }
            Some(out)
        }
        6 => Some([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ]),
        _ => None,
    }
}

fn named(name: &str) -> Option<[u8; 3]> {
    let rgb = match name.to_ascii_lowercase().as_str() {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "lime" => [0, 255, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "orange" => [255, 165, 0],
        "purple" => [128, 0, 128],
        "violet" => [238, 130, 238],
        "gray" | "grey" => [128, 128, 128],
        _ => return None,
    };
    Some(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        let long = ColorCode::from("#1e40af").to_rgb8().unwrap();
        assert_eq!(long, [0x1e, 0x40, 0xaf]);
        let short = ColorCode::from("#fa0").to_rgb8().unwrap();
        assert_eq!(short, [0xff, 0xaa, 0x00]);
    }

    #[test]
    fn named_black_is_zero() {
        assert_eq!(ColorCode::from("black").to_linear_rgb().unwrap(), [0.0; 3]);
        assert_eq!(ColorCode::from("Black").to_rgb8().unwrap(), [0, 0, 0]);
    }

    #[test]
    fn linear_conversion_darkens_midtones() {
        let [r, g, b] = ColorCode::from("#808080").to_linear_rgb().unwrap();
        assert!((r - 0.2158605).abs() < 1e-4);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "#12", "#gggggg", "not-a-color", "#1e40af00", "#é12", "#+f+f+f", "#+ff"] {
            assert_eq!(
                ColorCode::from(bad).to_srgb(),
                Err(CoreError::InvalidColor(bad.to_string()))
            );
        }
    }
}
