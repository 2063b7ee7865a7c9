//! CPU mirrors of the WGSL uniform blocks. Every member is a vec4 or mat4 so
//! the std140-style layout needs no manual padding.

use bytemuck::{Pod, Zeroable};
use corelib::camera::Camera;
use corelib::color::ColorCode;
use corelib::scene::Scene;
use glam::{Mat4, Vec3};

/// Binding 0 of group 0 in the model and ground shaders.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GlobalsUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    /// rgb = ambient color * intensity.
    pub ambient: [f32; 4],
    /// rgb = sky tint, w = environment intensity.
    pub sky: [f32; 4],
    pub ground: [f32; 4],
    /// xyz = position, w = intensity.
    pub spot_pos: [f32; 4],
    /// xyz = direction, w = cos(outer half-angle).
    pub spot_dir: [f32; 4],
    /// rgb = color, w = cos(inner half-angle).
    pub spot_color: [f32; 4],
}

impl GlobalsUniform {
    pub fn new(scene: &Scene, camera: &Camera) -> Self {
        let a = &scene.ambient;
        let hemi = scene.environment.hemisphere();
        let spot = &scene.spot;
        let dir = spot.direction();
        let (cos_inner, cos_outer) = spot.cone_cosines();
        // smoothstep needs distinct edges.
        let cos_inner = cos_inner.max(cos_outer + 1e-4);
        Self {
            view_proj: camera.proj_view().to_cols_array_2d(),
            camera_pos: vec4(camera.eye, 1.0),
            ambient: [
                a.color[0] * a.intensity,
                a.color[1] * a.intensity,
                a.color[2] * a.intensity,
                1.0,
            ],
            sky: [hemi.sky[0], hemi.sky[1], hemi.sky[2], hemi.intensity],
            ground: [hemi.ground[0], hemi.ground[1], hemi.ground[2], 1.0],
            spot_pos: vec4(spot.position, spot.intensity),
            spot_dir: vec4(dir, cos_outer),
            spot_color: [spot.color[0], spot.color[1], spot.color[2], cos_inner],
        }
    }
}

/// Group 1 of the model shader, one per uploaded mesh.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    /// Linear RGBA after the color override.
    pub color: [f32; 4],
    /// x = metallic, y = roughness.
    pub params: [f32; 4],
}

impl ModelUniform {
    pub fn new(model: Mat4, color: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
            color,
            params: [metallic, roughness, 0.0, 0.0],
        }
    }
}

/// Group 1 of the ground shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GroundUniform {
    /// xyz = plane center, w = half side length.
    pub plane: [f32; 4],
    /// x/y = occluder center in XZ, z = footprint radius, w = height above the plane.
    pub occluder: [f32; 4],
    /// x = opacity, y = blur, z = far.
    pub params: [f32; 4],
}

/// Group 0 of the backdrop shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BackdropUniform {
    pub start: [f32; 4],
    pub end: [f32; 4],
}

impl BackdropUniform {
    pub fn new(from: &ColorCode, to: &ColorCode) -> Self {
        Self {
            start: linear_or_black(from),
            end: linear_or_black(to),
        }
    }
}

fn linear_or_black(code: &ColorCode) -> [f32; 4] {
    match code.to_linear_rgb() {
        Ok([r, g, b]) => [r, g, b, 1.0],
        Err(err) => {
            log::warn!("Backdrop: {err}");
            [0.0, 0.0, 0.0, 1.0]
        }
    }
}

#[inline]
fn vec4(v: Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::animation::IdleAnimation;
    use corelib::scene::{ModelSettings, SceneBuilder};

    #[test]
    fn uniform_sizes_are_vec4_multiples() {
        assert_eq!(std::mem::size_of::<GlobalsUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ModelUniform>(), 160);
        assert_eq!(std::mem::size_of::<GroundUniform>(), 48);
        assert_eq!(std::mem::size_of::<BackdropUniform>(), 32);
    }

    #[test]
    fn spot_cone_edges_are_ordered() {
        let scene = SceneBuilder::new()
            .model(ModelSettings::default(), IdleAnimation::default())
            .build()
            .unwrap();
        let g = GlobalsUniform::new(&scene, &Camera::default());
        assert!(g.spot_color[3] > g.spot_dir[3]);
        assert!((g.spot_pos[3] - 0.9).abs() < 1e-6);
    }
}
