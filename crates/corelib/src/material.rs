//! Per-instance material color override.

use crate::color::ColorCode;

/// Shading parameters of one drawn mesh.
///
/// `base_color` comes from the loaded asset and is never modified; an
/// override color, when set, replaces its RGB for this instance only.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialOverride {
    /// Linear RGBA from the asset.
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    code: Option<ColorCode>,
    resolved: Option<[f32; 3]>,
}

impl MaterialOverride {
    pub fn new(base_color: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            base_color,
            metallic,
            roughness,
            code: None,
            resolved: None,
        }
    }

    /// Code last handed to [`MaterialOverride::set_color`].
    pub fn color_code(&self) -> Option<&ColorCode> {
        self.code.as_ref()
    }

    /// Apply `code` as the override. Repeating the current code is a no-op.
    ///
    /// An unparseable code is stored but keeps the previously resolved color.
    pub fn set_color(&mut self, code: &ColorCode) {
        if self.code.as_ref() == Some(code) {
            return;
        }
        match code.to_linear_rgb() {
            Ok(rgb) => self.resolved = Some(rgb),
            Err(err) => log::warn!("{err}; keeping previous material color"),
        }
        self.code = Some(code.clone());
    }

    /// Linear RGBA used for shading.
    pub fn effective_color(&self) -> [f32; 4] {
        match self.resolved {
            Some([r, g, b]) => [r, g, b, self.base_color[3]],
            None => self.base_color,
        }
    }
}

impl Default for MaterialOverride {
    fn default() -> Self {
        Self::new([1.0, 1.0, 1.0, 1.0], 0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_replaces_rgb_keeps_alpha() {
        let mut m = MaterialOverride::new([0.8, 0.8, 0.8, 0.5], 0.0, 0.5);
        m.set_color(&ColorCode::from("black"));
        assert_eq!(m.effective_color(), [0.0, 0.0, 0.0, 0.5]);
        assert_eq!(m.base_color, [0.8, 0.8, 0.8, 0.5]);
    }

    #[test]
    fn swap_is_instant() {
        let mut m = MaterialOverride::default();
        m.set_color(&ColorCode::from("#ffffff"));
        m.set_color(&ColorCode::from("#000000"));
        assert_eq!(m.effective_color(), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn invalid_code_keeps_previous_color() {
        let mut m = MaterialOverride::default();
        m.set_color(&ColorCode::from("#ffffff"));
        m.set_color(&ColorCode::from("nope"));
        assert_eq!(m.effective_color(), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(m.color_code(), Some(&ColorCode::from("nope")));
    }
}
