//! Orbit camera controls: drag to orbit, wheel/pinch to dolly, pan, with damping.
//!
//! Gestures only accumulate pending deltas; [`OrbitController::update`] folds
//! them into the camera once per frame. With damping enabled a fraction of
//! the pending delta is applied per update and the rest decays, which gives
//! the inertial feel after the pointer is released.

use std::f32::consts::{PI, TAU};

use crate::Vec3;
use crate::camera::Camera;

const EPS: f32 = 1e-6;
/// Closest the camera may get to the target, whatever `min_distance` says.
const MIN_RADIUS: f32 = 1e-3;

/// Which gestures are live and how strongly they act.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitSettings {
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits in radians, measured from +Y.
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            enable_rotate: true,
            enable_zoom: true,
            enable_pan: true,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
        }
    }
}

/// Spherical coordinates around +Y: `theta` is the azimuth from +Z towards +X,
/// `phi` the polar angle from +Y.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Spherical {
    radius: f32,
    theta: f32,
    phi: f32,
}

impl Spherical {
    /// `None` when `v` is too short to carry a direction.
    fn from_vec(v: Vec3) -> Option<Self> {
        let radius = v.length();
        (radius.is_finite() && radius >= EPS).then(|| Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        })
    }

    fn to_vec(self) -> Vec3 {
        let sin_phi_r = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_r * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_r * self.theta.cos(),
        )
    }
}

#[derive(Clone, Debug)]
pub struct OrbitController {
    settings: OrbitSettings,
    target: Vec3,
    delta_theta: f32,
    delta_phi: f32,
    pan_offset: Vec3,
    scale: f32,
    /// Orientation of the last update, reused if the camera sits on the target.
    last: Spherical,
}

impl OrbitController {
    pub fn new(settings: OrbitSettings, target: Vec3) -> Self {
        Self {
            settings,
            target,
            delta_theta: 0.0,
            delta_phi: 0.0,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
            last: Spherical {
                radius: MIN_RADIUS,
                theta: 0.0,
                phi: PI * 0.5,
            },
        }
    }

    /// Pointer moved by (`dx`, `dy`) pixels on a viewport `viewport_height` tall.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if !self.settings.enable_rotate {
            return;
        }
        let h = viewport_height.max(1.0);
        self.delta_theta -= TAU * dx / h * self.settings.rotate_speed;
        self.delta_phi -= TAU * dy / h * self.settings.rotate_speed;
    }

    /// Screen-space pan; moves camera and target together.
    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32, camera: &Camera) {
        if !self.settings.enable_pan {
            return;
        }
        let h = viewport_height.max(1.0);
        let distance = (camera.eye - self.target).length() * (camera.fov_y_rad * 0.5).tan();
        let (right, up, _) = camera.basis();
        let speed = self.settings.pan_speed;
        self.pan_offset -= right * (2.0 * dx * distance / h * speed);
        self.pan_offset += up * (2.0 * dy * distance / h * speed);
    }

    /// Wheel steps; positive steps move the camera closer.
    pub fn dolly_steps(&mut self, steps: f32) {
        if !self.settings.enable_zoom {
            return;
        }
        self.scale *= 0.95f32.powf(self.settings.zoom_speed * steps);
    }

    /// Two-finger pinch where finger spread changed by `ratio` (now / before).
    pub fn pinch(&mut self, ratio: f32) {
        if !self.settings.enable_zoom || !(ratio.is_finite() && ratio > 0.0) {
            return;
        }
        self.scale /= ratio.powf(self.settings.zoom_speed);
    }

    /// Fold pending gestures into `camera`. Returns `true` if the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let s = &self.settings;
        let before = camera.eye;

        let offset = camera.eye - self.target;
        let mut sph = Spherical::from_vec(offset).unwrap_or(self.last);

        let step = if s.enable_damping {
            s.damping_factor
        } else {
            1.0
        };
        sph.theta += self.delta_theta * step;
        sph.phi += self.delta_phi * step;
        sph.phi = sph
            .phi
            .clamp(s.min_polar_angle, s.max_polar_angle)
            .clamp(EPS, PI - EPS);
        let near = s.min_distance.max(MIN_RADIUS);
        let far = s.max_distance.max(near);
        sph.radius = (sph.radius * self.scale).clamp(near, far);
        self.last = sph;

        self.target += self.pan_offset * step;
        camera.target = self.target;
        camera.eye = self.target + sph.to_vec();

        if s.enable_damping {
            let keep = 1.0 - s.damping_factor;
            self.delta_theta *= keep;
            self.delta_phi *= keep;
            self.pan_offset *= keep;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        (camera.eye - before).length_squared() > EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn undamped() -> OrbitSettings {
        OrbitSettings {
            enable_damping: false,
            ..OrbitSettings::default()
        }
    }

    #[test]
    fn quarter_height_drag_orbits_a_quarter_turn() {
        let mut cam = Camera::default();
        let mut orbit = OrbitController::new(undamped(), Vec3::ZERO);
        orbit.rotate(100.0, 0.0, 400.0);
        assert!(orbit.update(&mut cam));
        assert!((cam.eye - Vec3::new(-5.0, 0.0, 0.0)).length() < 1e-4, "{:?}", cam.eye);
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn damping_spreads_rotation_over_frames() {
        let mut cam = Camera::default();
        let mut orbit = OrbitController::new(OrbitSettings::default(), Vec3::ZERO);
        orbit.rotate(100.0, 0.0, 400.0);

        orbit.update(&mut cam);
        let first = cam.eye.x.atan2(cam.eye.z);
        assert!((first + 0.05 * std::f32::consts::FRAC_PI_2).abs() < 1e-4);

        for _ in 0..400 {
            orbit.update(&mut cam);
        }
        let settled = cam.eye.x.atan2(cam.eye.z);
        assert!((settled + std::f32::consts::FRAC_PI_2).abs() < 1e-3);
        assert!(!orbit.update(&mut cam));
    }

    #[test]
    fn distance_is_preserved_while_orbiting() {
        let mut cam = Camera::default();
        let mut orbit = OrbitController::new(OrbitSettings::default(), Vec3::ZERO);
        for i in 0..50 {
            orbit.rotate(3.0, (i % 7) as f32 - 3.0, 384.0);
            orbit.update(&mut cam);
            assert!((cam.eye.length() - 5.0).abs() < 1e-3);
        }
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let mut cam = Camera::default();
        let mut orbit = OrbitController::new(undamped(), Vec3::ZERO);
        orbit.rotate(0.0, 10_000.0, 400.0);
        orbit.update(&mut cam);
        assert!(cam.eye.is_finite());
        assert!(cam.eye.y > 4.99);
    }

    #[test]
    fn wheel_step_dollies_in() {
        let mut cam = Camera::default();
        let mut orbit = OrbitController::new(undamped(), Vec3::ZERO);
        orbit.dolly_steps(1.0);
        orbit.update(&mut cam);
        assert!((cam.eye.length() - 4.75).abs() < 1e-4);

        orbit.dolly_steps(-1.0);
        orbit.update(&mut cam);
        assert!((cam.eye.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn zooming_all_the_way_in_is_recoverable() {
        let mut cam = Camera::default();
        let mut orbit = OrbitController::new(undamped(), Vec3::ZERO);
        for _ in 0..400 {
            orbit.dolly_steps(1.0);
            orbit.update(&mut cam);
        }
        let closest = cam.eye.length();
        assert!(closest >= MIN_RADIUS * 0.999, "{closest}");
        assert!(cam.view().is_finite());

        for _ in 0..200 {
            orbit.dolly_steps(-1.0);
            orbit.update(&mut cam);
        }
        assert!(cam.eye.length() > 5.0);
        assert!(cam.view().is_finite());
        // Still looking down the original +Z axis.
        assert!(cam.eye.x.abs() < 1e-3 && cam.eye.y.abs() < 1e-2 && cam.eye.z > 0.0);
    }

    #[test]
    fn camera_on_target_keeps_last_orientation() {
        let mut cam = Camera::default();
        let mut orbit = OrbitController::new(undamped(), Vec3::ZERO);
        orbit.rotate(100.0, 0.0, 400.0);
        orbit.update(&mut cam);
        cam.eye = Vec3::ZERO;
        orbit.update(&mut cam);
        assert!(cam.view().is_finite());
        let dir = cam.eye.normalize();
        assert!((dir - Vec3::NEG_X).length() < 1e-3, "{dir:?}");
    }

    #[test]
    fn pinch_apart_moves_closer() {
        let mut cam = Camera::default();
        let mut orbit = OrbitController::new(undamped(), Vec3::ZERO);
        orbit.pinch(2.0);
        orbit.update(&mut cam);
        assert!((cam.eye.length() - 2.5).abs() < 1e-4);
    }

    #[test]
    fn disabled_gestures_are_ignored() {
        let settings = OrbitSettings {
            enable_rotate: false,
            enable_zoom: false,
            enable_pan: false,
            ..undamped()
        };
        let mut cam = Camera::default();
        let mut orbit = OrbitController::new(settings, Vec3::ZERO);
        orbit.rotate(50.0, 50.0, 400.0);
        orbit.dolly_steps(3.0);
        orbit.pinch(4.0);
        let snapshot = cam;
        orbit.pan(10.0, 0.0, 400.0, &snapshot);
        assert!(!orbit.update(&mut cam));
        assert!((cam.eye - snapshot.eye).length() < 1e-5);
    }

    #[test]
    fn pan_moves_target_and_eye_together() {
        let mut cam = Camera::default();
        let mut orbit = OrbitController::new(undamped(), Vec3::ZERO);
        let snapshot = cam;
        orbit.pan(200.0, 0.0, 400.0, &snapshot);
        orbit.update(&mut cam);
        // Dragging right slides the scene right, i.e. the camera goes left.
        assert!(cam.target.x < 0.0);
        assert!((cam.eye - cam.target - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-4);
    }
}
