use crate::{Mat4, Vec3, vec3};

/// Simple perspective camera (right-handed).
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
}

impl Camera {
    #[allow(clippy::too_many_arguments)]
    pub fn new_perspective(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y_rad: f32,
        z_near: f32,
        z_far: f32,
        aspect: f32,
    ) -> Self {
        Self {
            eye,
            target,
            up,
            fov_y_rad,
            z_near,
            z_far,
            aspect,
        }
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// glam's `perspective_rh` already maps depth to [0,1], which is what wgpu wants.
    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_rad,
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }

    #[inline]
    pub fn proj_view(&self) -> Mat4 {
        self.proj() * self.view()
    }

    #[inline]
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    /// Unit vectors of the camera basis: (right, up, forward).
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.target - self.eye).normalize_or(Vec3::NEG_Z);
        let right = forward.cross(self.up).normalize_or(Vec3::X);
        let up = right.cross(forward);
        (right, up, forward)
    }
}

impl Default for Camera {
    /// 75° vertical fov, sitting 5 units back on +Z and looking at the origin.
    fn default() -> Self {
        Self::new_perspective(
            vec3(0.0, 0.0, 5.0),
            Vec3::ZERO,
            Vec3::Y,
            75f32.to_radians(),
            0.1,
            1000.0,
            1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_basis_is_axis_aligned() {
        let (right, up, forward) = Camera::default().basis();
        assert!((right - Vec3::X).length() < 1e-6);
        assert!((up - Vec3::Y).length() < 1e-6);
        assert!((forward - Vec3::NEG_Z).length() < 1e-6);
    }
}
