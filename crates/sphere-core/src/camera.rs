//! Camera description and picking rays.
//!
//! Platform-free: the web front-end converts client pixels to
//! normalized device coordinates and everything past that point lives here.

use crate::config::CameraConfig;
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Right-handed perspective camera looking down -Z at the origin.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(cfg: &CameraConfig, aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, cfg.z),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: aspect.max(1e-3),
            fovy_radians: cfg.fov_deg.to_radians(),
            znear: cfg.near,
            zfar: cfg.far,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray from the eye through a point in normalized device
    /// coordinates (x right, y up, both in [-1, 1]).
    pub fn ndc_ray(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection().inverse();
        let p_far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let p1: Vec3 = p_far.truncate() / p_far.w;
        Ray {
            origin: self.eye,
            dir: (p1 - self.eye).normalize(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

/// Nearest non-negative hit distance of a unit-direction ray against a sphere.
#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_ray_points_down_negative_z() {
        let cam = Camera::new(&CameraConfig::default(), 16.0 / 9.0);
        let ray = cam.ndc_ray(Vec2::ZERO);
        assert!((ray.dir - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4);
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 2.2));
    }

    #[test]
    fn ray_hits_sphere_in_front_only() {
        let center = Vec3::new(0.0, 0.0, -5.0);
        let hit = ray_sphere(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), center, 1.0);
        assert!((hit.unwrap() - 4.0).abs() < 1e-5);
        let behind = ray_sphere(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), center, 1.0);
        assert!(behind.is_none());
    }

    #[test]
    fn projected_ray_passes_through_unprojected_point() {
        let cam = Camera::new(&CameraConfig::default(), 1.5);
        let world = Vec3::new(0.3, -0.2, 1.1);
        let clip = cam.view_projection() * world.extend(1.0);
        let ndc = Vec2::new(clip.x / clip.w, clip.y / clip.w);
        let ray = cam.ndc_ray(ndc);
        let to_point = (world - ray.origin).normalize();
        assert!((to_point - ray.dir).length() < 1e-4);
    }
}
