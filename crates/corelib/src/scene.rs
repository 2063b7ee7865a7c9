//! Scene description: lights, environment, ground shadows, controls and the model node.
//!
//! A [`Scene`] is put together by [`SceneBuilder`] from plain settings
//! records, in the order they are drawn. The model node starts empty and gets
//! its mesh once the asset is loaded.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::animation::{FrameHook, IdleAnimation};
use crate::color::ColorCode;
use crate::ecs::{Entity, MeshId, Renderable, World};
use crate::error::{CoreError, CoreResult};
use crate::material::MaterialOverride;
use crate::orbit::OrbitSettings;
use crate::transform::Transform;
use crate::{Vec3, vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    /// Linear RGB.
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
        }
    }
}

/// Cone light aimed at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub color: [f32; 3],
    pub intensity: f32,
    /// Half-angle of the outer cone, radians.
    pub angle: f32,
    /// Fraction of the cone that fades out, 0 = hard edge, 1 = fade from the axis.
    pub penumbra: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl SpotLight {
    /// Cosines of the inner and outer cone half-angles.
    pub fn cone_cosines(&self) -> (f32, f32) {
        let outer = self.angle.clamp(0.0, std::f32::consts::FRAC_PI_2);
        let inner = outer * (1.0 - self.penumbra.clamp(0.0, 1.0));
        (inner.cos(), outer.cos())
    }

    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Y)
    }
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 0.9,
            angle: 1.0,
            penumbra: 1.0,
            position: vec3(10.0, 10.0, 10.0),
            target: Vec3::ZERO,
        }
    }
}

/// Named image-based lighting presets, approximated by a sky/ground hemisphere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvironmentPreset {
    Apartment,
    #[default]
    City,
    Dawn,
    Forest,
    Lobby,
    Night,
    Park,
    Studio,
    Sunset,
    Warehouse,
}

/// Hemisphere lighting derived from a preset (linear RGB).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hemisphere {
    pub sky: [f32; 3],
    pub ground: [f32; 3],
    pub intensity: f32,
}

impl EnvironmentPreset {
    pub const ALL: [EnvironmentPreset; 10] = [
        Self::Apartment,
        Self::City,
        Self::Dawn,
        Self::Forest,
        Self::Lobby,
        Self::Night,
        Self::Park,
        Self::Studio,
        Self::Sunset,
        Self::Warehouse,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::City => "city",
            Self::Dawn => "dawn",
            Self::Forest => "forest",
            Self::Lobby => "lobby",
            Self::Night => "night",
            Self::Park => "park",
            Self::Studio => "studio",
            Self::Sunset => "sunset",
            Self::Warehouse => "warehouse",
        }
    }

    pub fn hemisphere(self) -> Hemisphere {
        let (sky, ground, intensity) = match self {
            Self::Apartment => ([0.85, 0.75, 0.62], [0.30, 0.24, 0.18], 0.9),
            Self::City => ([0.72, 0.78, 0.86], [0.26, 0.24, 0.22], 1.0),
            Self::Dawn => ([0.95, 0.66, 0.52], [0.22, 0.18, 0.20], 0.8),
            Self::Forest => ([0.55, 0.70, 0.48], [0.16, 0.20, 0.10], 0.8),
            Self::Lobby => ([0.90, 0.82, 0.70], [0.35, 0.30, 0.25], 0.9),
            Self::Night => ([0.10, 0.12, 0.22], [0.03, 0.03, 0.05], 0.5),
            Self::Park => ([0.70, 0.82, 0.95], [0.25, 0.30, 0.15], 1.0),
            Self::Studio => ([0.95, 0.95, 0.95], [0.45, 0.45, 0.45], 1.0),
            Self::Sunset => ([0.98, 0.58, 0.34], [0.25, 0.15, 0.12], 0.85),
            Self::Warehouse => ([0.78, 0.74, 0.66], [0.28, 0.26, 0.24], 0.9),
        };
        Hemisphere {
            sky,
            ground,
            intensity,
        }
    }
}

impl fmt::Display for EnvironmentPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EnvironmentPreset {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| CoreError::UnknownEnvironment(s.to_string()))
    }
}

/// Diagonal gradient painted behind everything, bottom-right to top-left.
#[derive(Clone, Debug, PartialEq)]
pub struct Backdrop {
    pub from: ColorCode,
    pub to: ColorCode,
}

impl Default for Backdrop {
    fn default() -> Self {
        Self {
            from: ColorCode::from("#4f46e5"),
            to: ColorCode::from("#059669"),
        }
    }
}

/// Soft darkening on a ground plane under the model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactShadows {
    pub position: Vec3,
    pub opacity: f32,
    /// Side length of the square ground plane.
    pub scale: f32,
    pub blur: f32,
    /// Height above the plane at which the shadow has fully faded.
    pub far: f32,
}

impl Default for ContactShadows {
    fn default() -> Self {
        Self {
            position: vec3(0.0, -1.0, 0.0),
            opacity: 0.25,
            scale: 10.0,
            blur: 1.5,
            far: 0.8,
        }
    }
}

/// Where the model comes from and how it sits in its group.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelSettings {
    pub path: PathBuf,
    pub mesh_node: String,
    pub material: String,
    pub scale: f32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("assets/black-box.glb"),
            mesh_node: "Cube".to_string(),
            material: "Material.001".to_string(),
            scale: 1.5,
        }
    }
}

pub struct Scene {
    pub backdrop: Backdrop,
    pub ambient: AmbientLight,
    pub spot: SpotLight,
    pub environment: EnvironmentPreset,
    pub contact_shadows: ContactShadows,
    pub controls: OrbitSettings,
    model_settings: ModelSettings,
    world: World,
    model: Entity,
    hooks: Vec<FrameHook>,
}

impl Scene {
    #[inline]
    pub fn model_settings(&self) -> &ModelSettings {
        &self.model_settings
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn model_entity(&self) -> Entity {
        self.model
    }

    /// Transform of the animated model group.
    pub fn model_transform(&self) -> Option<&Transform> {
        self.world.transform(self.model)
    }

    pub fn model_material(&self) -> Option<&MaterialOverride> {
        self.world.renderable(self.model).map(|r| &r.material)
    }

    /// `true` once the model mesh has been attached.
    pub fn is_model_ready(&self) -> bool {
        self.world.renderable(self.model).is_some()
    }

    /// Register a hook that runs on the model transform every frame.
    pub fn on_frame(&mut self, hook: FrameHook) {
        self.hooks.push(hook);
    }

    /// Advance all frame hooks. `elapsed` is seconds since the clock started.
    pub fn tick(&mut self, elapsed: f32) {
        if let Some(t) = self.world.transform_mut(self.model) {
            for hook in &mut self.hooks {
                hook(elapsed, t);
            }
        }
    }

    /// Give the model node its geometry; before this nothing is drawn for it.
    pub fn attach_model_mesh(&mut self, mesh: MeshId, material: MaterialOverride) {
        let renderable = Renderable {
            mesh,
            local: Transform::from_uniform_scale(self.model_settings.scale),
            material,
        };
        self.world.set_renderable(self.model, renderable);
    }

    /// Push the selected color into the model material. No-op while loading.
    pub fn sync_model_color(&mut self, code: &ColorCode) {
        if let Some(r) = self.world.renderable_mut(self.model) {
            r.material.set_color(code);
        }
    }
}

/// Ordered scene setup. Every record has a default except the model.
#[derive(Default)]
pub struct SceneBuilder {
    backdrop: Backdrop,
    ambient: AmbientLight,
    spot: SpotLight,
    environment: EnvironmentPreset,
    model: Option<ModelSettings>,
    idle: Option<IdleAnimation>,
    contact_shadows: ContactShadows,
    controls: OrbitSettings,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backdrop(mut self, backdrop: Backdrop) -> Self {
        self.backdrop = backdrop;
        self
    }

    pub fn ambient(mut self, light: AmbientLight) -> Self {
        self.ambient = light;
        self
    }

    pub fn spot(mut self, light: SpotLight) -> Self {
        self.spot = light;
        self
    }

    pub fn environment(mut self, preset: EnvironmentPreset) -> Self {
        self.environment = preset;
        self
    }

    /// The model node, animated with `idle`.
    pub fn model(mut self, settings: ModelSettings, idle: IdleAnimation) -> Self {
        self.model = Some(settings);
        self.idle = Some(idle);
        self
    }

    pub fn contact_shadows(mut self, shadows: ContactShadows) -> Self {
        self.contact_shadows = shadows;
        self
    }

    pub fn controls(mut self, settings: OrbitSettings) -> Self {
        self.controls = settings;
        self
    }

    pub fn build(self) -> CoreResult<Scene> {
        let model_settings = self.model.ok_or(CoreError::SceneIncomplete("model"))?;

        let mut world = World::new();
        let model = world.spawn(Transform::identity(), None);

        let mut scene = Scene {
            backdrop: self.backdrop,
            ambient: self.ambient,
            spot: self.spot,
            environment: self.environment,
            contact_shadows: self.contact_shadows,
            controls: self.controls,
            model_settings,
            world,
            model,
            hooks: Vec::new(),
        };
        if let Some(idle) = self.idle {
            scene.on_frame(idle.into_hook());
        }
        log::debug!(
            "Scene built: environment={}, model={}",
            scene.environment,
            scene.model_settings.path.display()
        );
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        SceneBuilder::new()
            .model(ModelSettings::default(), IdleAnimation::default())
            .build()
            .unwrap()
    }

    #[test]
    fn build_requires_model() {
        let err = SceneBuilder::new().build().err();
        assert_eq!(err, Some(CoreError::SceneIncomplete("model")));
    }

    #[test]
    fn model_is_blank_until_mesh_attached() {
        let mut s = scene();
        assert!(!s.is_model_ready());
        assert_eq!(s.world().iter_renderables().count(), 0);

        // Color sync before load must not panic or create a renderable.
        s.sync_model_color(&ColorCode::from("#1e40af"));
        assert!(!s.is_model_ready());

        s.attach_model_mesh(MeshId(7), MaterialOverride::default());
        assert!(s.is_model_ready());
        let (_, r) = s.world().iter_renderables().next().unwrap();
        assert_eq!(r.mesh, MeshId(7));
        assert_eq!(r.local.scale, Vec3::splat(1.5));
    }

    #[test]
    fn tick_runs_idle_animation_even_while_loading() {
        let mut s = scene();
        s.tick(0.0);
        s.tick(0.1);
        let t = s.model_transform().unwrap();
        assert!((t.rotation_euler.y - 0.01).abs() < 1e-7);
        assert!((t.translation.y - (0.2f32.sin() / 3.0)).abs() < 1e-6);
    }

    #[test]
    fn extra_hooks_see_the_same_transform() {
        let mut s = scene();
        s.on_frame(Box::new(|_, t| t.translation.x = 2.0));
        s.tick(0.5);
        assert_eq!(s.model_transform().unwrap().translation.x, 2.0);
    }

    #[test]
    fn environment_names_parse_back() {
        for preset in EnvironmentPreset::ALL {
            assert_eq!(preset.name().parse::<EnvironmentPreset>(), Ok(preset));
        }
        assert_eq!(" City ".parse::<EnvironmentPreset>(), Ok(EnvironmentPreset::City));
        assert!("mars".parse::<EnvironmentPreset>().is_err());
    }

    #[test]
    fn full_penumbra_fades_from_axis() {
        let (inner, outer) = SpotLight::default().cone_cosines();
        assert!((inner - 1.0).abs() < 1e-6);
        assert!((outer - 1.0f32.cos()).abs() < 1e-6);
    }
}
