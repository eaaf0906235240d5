//! Sphere orientation: user-driven rotation, damping and auto-spin.
//!
//! The sphere and the marker group always share the same orientation, the
//! sum of the damped user rotation and a time-based auto-rotation.

use crate::config::MotionConfig;
use glam::{Mat3, Vec3};

/// Euler angles in radians, applied X then Y.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
}

impl Rotation {
    pub const ZERO: Rotation = Rotation { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Object matrix for XYZ-ordered Euler angles (z is always zero here).
    pub fn matrix(&self) -> Mat3 {
        Mat3::from_rotation_x(self.x) * Mat3::from_rotation_y(self.y)
    }
}

/// Orientation that turns `p` to face the camera (+Z) once applied.
pub fn facing_rotation(p: Vec3) -> Rotation {
    let y = -p.x.atan2(p.z);
    let x = p.y.atan2((p.x * p.x + p.z * p.z).sqrt());
    Rotation { x, y }
}

#[derive(Clone, Debug)]
pub struct RotationState {
    pub current: Rotation,
    pub target: Rotation,
    cfg: MotionConfig,
}

impl RotationState {
    pub fn new(cfg: MotionConfig) -> Self {
        Self {
            current: Rotation::ZERO,
            target: Rotation::ZERO,
            cfg,
        }
    }

    /// Close a fixed fraction of the gap between current and target.
    pub fn damp(&mut self) {
        let k = self.cfg.damping;
        self.current.x += (self.target.x - self.current.x) * k;
        self.current.y += (self.target.y - self.current.y) * k;
    }

    /// Apply a pointer delta in pixels. Drags bypass damping entirely.
    pub fn apply_drag(&mut self, dx: f32, dy: f32, speed: f32) {
        self.target.y += dx * speed;
        self.target.x -= dy * speed;
        self.current = self.target;
    }

    /// Auto-spin angle in radians at `now_ms`; the same on both axes.
    pub fn auto_rotation(&self, now_ms: f64) -> f32 {
        (now_ms * self.cfg.auto_rotation_rate) as f32
    }

    /// Orientation actually applied to the sphere and marker group.
    pub fn combined(&self, now_ms: f64) -> Rotation {
        let auto = self.auto_rotation(now_ms);
        Rotation {
            x: self.current.x + auto,
            y: self.current.y + auto,
        }
    }

    /// Aim at `p` (a marker's rest position) so that once damping settles it
    /// faces the camera at `now_ms`, then nudge toward it.
    pub fn focus_on(&mut self, p: Vec3, now_ms: f64) {
        let facing = facing_rotation(p);
        let auto = self.auto_rotation(now_ms);
        self.target = Rotation {
            x: facing.x - auto,
            y: facing.y - auto,
        };
        let kick = self.cfg.focus_kick;
        self.current.x += (self.target.x - self.current.x) * kick;
        self.current.y += (self.target.y - self.current.y) * kick;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_rotation_turns_point_toward_camera() {
        for p in [
            Vec3::new(1.0, 0.3, -0.4),
            Vec3::new(-0.2, -1.1, 0.5),
            Vec3::new(0.0, 0.0, -1.6),
        ] {
            let q = facing_rotation(p).matrix() * p;
            assert!(q.x.abs() < 1e-4 && q.y.abs() < 1e-4, "{q:?}");
            assert!((q.z - p.length()).abs() < 1e-4);
        }
    }

    #[test]
    fn drag_moves_current_immediately() {
        let mut r = RotationState::new(MotionConfig::default());
        r.apply_drag(10.0, -5.0, 0.002);
        assert_eq!(r.current, r.target);
        assert!((r.current.y - 0.02).abs() < 1e-6);
        assert!((r.current.x - 0.01).abs() < 1e-6);
    }

    #[test]
    fn damping_never_overshoots() {
        let mut r = RotationState::new(MotionConfig::default());
        r.target = Rotation::new(1.0, -2.0);
        let mut prev = r.current;
        for _ in 0..2000 {
            r.damp();
            assert!(r.current.x >= prev.x && r.current.x <= 1.0);
            assert!(r.current.y <= prev.y && r.current.y >= -2.0);
            prev = r.current;
        }
        assert!((r.current.x - 1.0).abs() < 1e-3);
        assert!((r.current.y + 2.0).abs() < 1e-3);
    }

    #[test]
    fn auto_rotation_is_linear_in_time() {
        let r = RotationState::new(MotionConfig::default());
        assert_eq!(r.combined(0.0), Rotation::ZERO);
        let c = r.combined(10_000.0);
        assert!((c.x - 1.9).abs() < 1e-5);
        assert_eq!(c.x, c.y);
    }
}
