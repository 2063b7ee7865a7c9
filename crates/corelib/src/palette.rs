//! The fixed set of color presets offered as swatch buttons.

use crate::color::ColorCode;

/// One swatch button: the code it selects plus the stops used to paint it.
#[derive(Clone, Debug, PartialEq)]
pub struct Swatch {
    pub name: &'static str,
    pub code: ColorCode,
    /// Left/center/right stops of the idle gradient.
    pub gradient: [ColorCode; 3],
    /// Same, while hovered.
    pub hover_gradient: [ColorCode; 3],
}

impl Swatch {
    fn new(name: &'static str, code: &str, gradient: [&str; 3], hover: [&str; 3]) -> Self {
        Self {
            name,
            code: ColorCode::from(code),
            gradient: gradient.map(ColorCode::from),
            hover_gradient: hover.map(ColorCode::from),
        }
    }

    #[inline]
    pub fn matches(&self, current: &ColorCode) -> bool {
        self.code == *current
    }
}

/// Ordered list of swatches, shown left to right.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    swatches: Vec<Swatch>,
}

impl Palette {
    pub fn new(swatches: Vec<Swatch>) -> Self {
        Self { swatches }
    }

    #[inline]
    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Swatch> {
        self.swatches.get(index)
    }

    /// Index of the swatch that should carry the highlight ring, if any.
    pub fn highlighted(&self, current: &ColorCode) -> Option<usize> {
        self.swatches.iter().position(|s| s.matches(current))
    }
}

impl Default for Palette {
    /// Red, emerald, blue, orange and violet.
    fn default() -> Self {
        Self::new(vec![
            Swatch::new(
                "red",
                "#991b1b",
                ["#991b1b", "#dc2626", "#991b1b"],
                ["#b91c1c", "#ef4444", "#b91c1c"],
            ),
            Swatch::new(
                "emerald",
                "#065f46",
                ["#065f46", "#059669", "#065f46"],
                ["#047857", "#10b981", "#047857"],
            ),
            Swatch::new(
                "blue",
                "#1e40af",
                ["#1e40af", "#2563eb", "#1e40af"],
                ["#1d4ed8", "#3b82f6", "#1d4ed8"],
            ),
            Swatch::new(
                "orange",
                "#ea580c",
                ["#9a3412", "#ea580c", "#9a3412"],
                ["#c2410c", "#f97316", "#c2410c"],
            ),
            Swatch::new(
                "violet",
                "#5b21b6",
                ["#5b21b6", "#7c3aed", "#5b21b6"],
                ["#6d28d9", "#8b5cf6", "#6d28d9"],
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_has_five_distinct_parseable_codes() {
        let palette = Palette::default();
        assert_eq!(palette.len(), 5);
        for (i, swatch) in palette.swatches().iter().enumerate() {
            assert!(swatch.code.to_srgb().is_ok(), "{}", swatch.code);
            assert!(swatch.gradient.iter().all(|c| c.to_srgb().is_ok()));
            assert!(swatch.hover_gradient.iter().all(|c| c.to_srgb().is_ok()));
            assert_eq!(palette.highlighted(&swatch.code), Some(i));
        }
    }

    #[test]
    fn default_color_highlights_nothing() {
        let palette = Palette::default();
        assert_eq!(palette.highlighted(&ColorCode::from("black")), None);
        assert_eq!(palette.highlighted(&ColorCode::from("#000000")), None);
    }
}
