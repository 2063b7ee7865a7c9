//! The one piece of mutable application state: which color is selected.

use crate::color::ColorCode;

/// Color the model starts with, before any swatch is clicked.
pub const DEFAULT_COLOR: &str = "black";

/// Holds the current color selection.
///
/// `select` accepts any code, palette member or not. Consumers re-read
/// [`SelectionController::color`] when they draw, so the swatch highlight and
/// the material never hold a copy that could drift.
#[derive(Clone, Debug)]
pub struct SelectionController {
    color: ColorCode,
    revision: u64,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::with_initial(ColorCode::from(DEFAULT_COLOR))
    }

    pub fn with_initial(color: ColorCode) -> Self {
        Self { color, revision: 0 }
    }

    #[inline]
    pub fn color(&self) -> &ColorCode {
        &self.color
    }

    /// Replace the selection. Last write wins.
    pub fn select(&mut self, code: impl Into<ColorCode>) {
        let code = code.into();
        log::debug!("Color selection: {} -> {}", self.color, code);
        self.color = code;
        self.revision += 1;
    }

    /// Bumped on every `select`, including re-selecting the current color.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}
