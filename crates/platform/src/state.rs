//! Everything the viewer mutates per frame, kept free of window and GPU handles.

use corelib::animation::IdleAnimation;
use corelib::camera::Camera;
use corelib::ecs::MeshId;
use corelib::material::MaterialOverride;
use corelib::orbit::OrbitController;
use corelib::palette::Palette;
use corelib::scene::{Scene, SceneBuilder};
use corelib::selection::SelectionController;
use corelib::{CoreResult, Vec3};

use crate::config::ViewerConfig;
use crate::input::CameraGesture;

pub struct ViewerState {
    pub scene: Scene,
    pub selection: SelectionController,
    pub palette: Palette,
    camera: Camera,
    orbit: OrbitController,
}

impl ViewerState {
    pub fn new(config: &ViewerConfig) -> CoreResult<Self> {
        let scene = SceneBuilder::new()
            .environment(config.environment)
            .model(config.model.clone(), IdleAnimation::default())
            .controls(config.controls)
            .build()?;
        Ok(Self::from_scene(scene))
    }

    pub fn from_scene(scene: Scene) -> Self {
        let orbit = OrbitController::new(scene.controls, Vec3::ZERO);
        Self {
            scene,
            selection: SelectionController::new(),
            palette: Palette::default(),
            camera: Camera::default(),
            orbit,
        }
    }

    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn highlighted_swatch(&self) -> Option<usize> {
        self.palette.highlighted(self.selection.color())
    }

    /// Select the swatch at `index`. Returns `false` for an index past the grid.
    pub fn click_swatch(&mut self, index: usize) -> bool {
        match self.palette.get(index) {
            Some(swatch) => {
                self.selection.select(swatch.code.clone());
                true
            }
            None => false,
        }
    }

    pub fn apply_gesture(&mut self, gesture: CameraGesture, viewport_height: f32) {
        match gesture {
            CameraGesture::Orbit { dx, dy } => self.orbit.rotate(dx, dy, viewport_height),
            CameraGesture::Pan { dx, dy } => self.orbit.pan(dx, dy, viewport_height, &self.camera),
            CameraGesture::Dolly { steps } => self.orbit.dolly_steps(steps),
            CameraGesture::Pinch { ratio } => self.orbit.pinch(ratio),
        }
    }

    /// One frame of scene update: color sync, camera controls, then frame hooks.
    pub fn frame(&mut self, elapsed: f32) {
        self.scene.sync_model_color(self.selection.color());
        self.orbit.update(&mut self.camera);
        self.scene.tick(elapsed);
    }

    pub fn attach_model(&mut self, mesh: MeshId, material: &asset::MaterialData) {
        let material =
            MaterialOverride::new(material.base_color, material.metallic, material.roughness);
        self.scene.attach_model_mesh(mesh, material);
        // Apply whatever was picked while the asset was loading.
        self.scene.sync_model_color(self.selection.color());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::color::ColorCode;

    fn loaded() -> ViewerState {
        let mut state = ViewerState::new(&ViewerConfig::default()).unwrap();
        let material = asset::MaterialData {
            name: "Material.001".into(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 0.5,
        };
        state.attach_model(MeshId(0), &material);
        state
    }

    fn model_color(state: &ViewerState) -> [f32; 4] {
        state.scene.model_material().unwrap().effective_color()
    }

    fn linear(code: &str) -> [f32; 4] {
        let [r, g, b] = ColorCode::from(code).to_linear_rgb().unwrap();
        [r, g, b, 1.0]
    }

    #[test]
    fn startup_is_black_with_no_highlight() {
        let mut state = loaded();
        state.frame(0.0);
        assert_eq!(state.selection.color(), "black");
        assert_eq!(state.highlighted_swatch(), None);
        assert_eq!(model_color(&state), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn clicking_blue_recolors_model_and_highlights_only_blue() {
        let mut state = loaded();
        assert!(state.click_swatch(2));
        state.frame(0.016);
        assert_eq!(state.selection.color(), "#1e40af");
        assert_eq!(state.highlighted_swatch(), Some(2));
        assert_eq!(model_color(&state), linear("#1e40af"));
    }

    #[test]
    fn last_click_wins() {
        let mut state = loaded();
        state.click_swatch(0);
        state.click_swatch(3);
        state.frame(0.016);
        assert_eq!(state.selection.color(), "#ea580c");
        assert_eq!(state.highlighted_swatch(), Some(3));
        assert_eq!(model_color(&state), linear("#ea580c"));
    }

    #[test]
    fn out_of_range_click_is_ignored() {
        let mut state = loaded();
        assert!(!state.click_swatch(5));
        assert_eq!(state.selection.color(), "black");
    }

    #[test]
    fn selection_before_load_applies_on_attach() {
        let mut state = ViewerState::new(&ViewerConfig::default()).unwrap();
        state.click_swatch(1);
        state.frame(0.016);
        assert!(!state.scene.is_model_ready());

        let material = asset::MaterialData {
            name: "Material.001".into(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 0.5,
        };
        state.attach_model(MeshId(0), &material);
        assert_eq!(model_color(&state), linear("#065f46"));
    }

    #[test]
    fn spin_increases_every_frame_and_bob_follows_clock() {
        let mut state = loaded();
        let mut last = state.scene.model_transform().unwrap().rotation_euler.y;
        for i in 1..=60 {
            let t = i as f32 / 60.0;
            state.frame(t);
            let tr = state.scene.model_transform().unwrap();
            assert!(tr.rotation_euler.y > last, "frame {i}");
            assert!((tr.rotation_euler.y - last - 0.005).abs() < 1e-5);
            last = tr.rotation_euler.y;
            assert!((tr.translation.y - (t / 0.5).sin() / 3.0).abs() < 1e-5);
        }
        assert!((last - 0.3).abs() < 1e-3);
    }

    #[test]
    fn selecting_colors_never_disturbs_the_spin() {
        let mut state = loaded();
        let mut last = state.scene.model_transform().unwrap().rotation_euler.y;
        for i in 0..100usize {
            assert!(state.click_swatch(i % 5));
            assert_eq!(state.highlighted_swatch(), Some(i % 5));
            if i % 3 == 0 {
                state.selection.select("not-a-color");
            }
            let t = i as f32 * 0.016;
            state.frame(t);
            let tr = state.scene.model_transform().unwrap();
            assert!((tr.rotation_euler.y - last - 0.005).abs() < 1e-5, "frame {i}");
            assert!((tr.translation.y - (t / 0.5).sin() / 3.0).abs() < 1e-5);
            last = tr.rotation_euler.y;
        }
        assert!((last - 0.5).abs() < 1e-3);
    }

    #[test]
    fn camera_gestures_leave_selection_and_spin_alone() {
        let mut state = loaded();
        state.click_swatch(4);
        state.frame(0.0);
        let eye_before = state.camera().eye;
        let count_before = state.selection.revision();

        state.apply_gesture(CameraGesture::Orbit { dx: 40.0, dy: 10.0 }, 560.0);
        state.apply_gesture(CameraGesture::Dolly { steps: 1.0 }, 560.0);
        let spin_before = state.scene.model_transform().unwrap().rotation_euler.y;
        state.frame(0.016);

        assert_ne!(state.camera().eye, eye_before);
        assert_eq!(state.selection.revision(), count_before);
        assert_eq!(state.selection.color(), "#5b21b6");
        assert_eq!(state.highlighted_swatch(), Some(4));
        let spin_after = state.scene.model_transform().unwrap().rotation_euler.y;
        assert!((spin_after - spin_before - 0.005).abs() < 1e-5);
    }

    #[test]
    fn frame_before_load_is_harmless() {
        let mut state = ViewerState::new(&ViewerConfig::default()).unwrap();
        state.frame(0.0);
        state.frame(0.5);
        assert!(state.scene.model_material().is_none());
        assert!(state.scene.model_transform().is_some());
    }
}
