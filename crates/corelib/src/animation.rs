//! Per-frame transform hooks and the model's idle spin + bob.

use crate::transform::Transform;

/// Called once per rendered frame with seconds since the clock started.
pub type FrameHook = Box<dyn FnMut(f32, &mut Transform)>;

/// Constant spin around Y plus a vertical sine bob.
///
/// The spin step is per frame, so the spin speed follows the display rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdleAnimation {
    /// Radians added to the Y rotation each frame.
    pub spin_per_frame: f32,
    /// Elapsed time is divided by this before taking the sine.
    pub bob_period: f32,
    pub bob_amplitude: f32,
}

impl IdleAnimation {
    pub fn apply(&self, elapsed: f32, t: &mut Transform) {
        t.rotation_euler.y += self.spin_per_frame;
        t.translation.y = (elapsed / self.bob_period).sin() * self.bob_amplitude;
    }

    pub fn into_hook(self) -> FrameHook {
        Box::new(move |elapsed, t| self.apply(elapsed, t))
    }
}

impl Default for IdleAnimation {
    fn default() -> Self {
        Self {
            spin_per_frame: 0.005,
            bob_period: 0.5,
            bob_amplitude: 1.0 / 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_accumulates_per_call() {
        let anim = IdleAnimation::default();
        let mut t = Transform::identity();
        // Same elapsed time twice still spins twice.
        anim.apply(1.0, &mut t);
        anim.apply(1.0, &mut t);
        assert!((t.rotation_euler.y - 0.01).abs() < 1e-7);
    }

    #[test]
    fn bob_follows_sine() {
        let anim = IdleAnimation::default();
        let mut t = Transform::identity();
        anim.apply(0.0, &mut t);
        assert!(t.translation.y.abs() < 1e-7);

        // sin(t / 0.5) peaks at t = pi / 4.
        anim.apply(std::f32::consts::FRAC_PI_4, &mut t);
        assert!((t.translation.y - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn bob_stays_within_amplitude() {
        let mut hook = IdleAnimation::default().into_hook();
        let mut t = Transform::identity();
        for frame in 0..600 {
            hook(frame as f32 / 60.0, &mut t);
            assert!(t.translation.y.abs() <= 1.0 / 3.0 + 1e-6);
        }
    }
}
