use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::config::CameraConfig;
use crate::model::Camera;

const MIN_POLAR: f32 = 1e-4;
const ZOOM_STEP: f32 = 0.95;
const MIN_DISTANCE: f32 = 0.01;

/// Orbits the camera around a target point, with optional damping
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    // Pending spherical change, in radians
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
}

impl OrbitControls {
    pub fn new(target: Vec3, config: &CameraConfig) -> Self {
        Self {
            target,
            enable_damping: true,
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            min_distance: MIN_DISTANCE,
            max_distance: f32::INFINITY,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
        }
    }

    /// Apply a pointer drag measured in pixels on a viewport `height` pixels tall
    pub fn apply_drag(&mut self, dx: f32, dy: f32, height: u32) {
        if height == 0 {
            return;
        }
        let h = height as f32;
        self.delta_theta -= TAU * dx / h * self.rotate_speed;
        self.delta_phi -= TAU * dy / h * self.rotate_speed;
    }

    /// Dolly by `notches` wheel steps; positive moves away from the target
    pub fn apply_zoom(&mut self, notches: f32) {
        if notches == 0.0 {
            return;
        }
        self.scale *= ZOOM_STEP.powf(-self.zoom_speed * notches);
    }

    /// Recompute the camera eye from the pending deltas and keep it aimed
    /// at the target
    pub fn update(&mut self, camera: &mut Camera) {
        let offset = camera.eye - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            // No direction to orbit along; drop what is pending
            camera.target = self.target;
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.scale = 1.0;
            return;
        }

        // Spherical coordinates with Y up
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        if self.enable_damping {
            theta += self.delta_theta * self.damping_factor;
            phi += self.delta_phi * self.damping_factor;
        } else {
            theta += self.delta_theta;
            phi += self.delta_phi;
        }
        phi = phi.clamp(MIN_POLAR, PI - MIN_POLAR);
        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let sin_phi = phi.sin();
        let new_offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        camera.eye = self.target + new_offset;
        camera.target = self.target;

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.scale = 1.0;
    }

    pub fn is_settled(&self) -> bool {
        self.delta_theta.abs() < 1e-6 && self.delta_phi.abs() < 1e-6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(eye: Vec3) -> Camera {
        let mut cam = Camera::new(75.0, 800, 600);
        cam.eye = eye;
        cam
    }

    #[test]
    fn idle_update_keeps_eye_and_aims_at_target() {
        let target = Vec3::new(0.0, 0.75, 0.0);
        let mut controls = OrbitControls::new(target, &CameraConfig::default());
        let mut cam = camera_at(Vec3::new(2.0, 2.0, 2.0));
        controls.update(&mut cam);
        assert!((cam.eye - Vec3::new(2.0, 2.0, 2.0)).length() < 1e-4);
        assert_eq!(cam.target, target);
    }

    #[test]
    fn damped_drag_keeps_moving_after_release() {
        let mut controls = OrbitControls::new(Vec3::ZERO, &CameraConfig::default());
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 9.0));
        controls.apply_drag(50.0, 0.0, 600);

        controls.update(&mut cam);
        let first = cam.eye;
        controls.update(&mut cam);
        assert_ne!(cam.eye, first);
        assert!(!controls.is_settled());
        // Radius is preserved while orbiting
        assert!((cam.eye.length() - 9.0).abs() < 1e-3);
    }

    #[test]
    fn undamped_drag_applies_once() {
        let mut controls = OrbitControls::new(Vec3::ZERO, &CameraConfig::default());
        controls.enable_damping = false;
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 9.0));
        controls.apply_drag(150.0, 0.0, 600);
        controls.update(&mut cam);
        let after = cam.eye;
        controls.update(&mut cam);
        assert!((cam.eye - after).length() < 1e-5);
        assert!(controls.is_settled());
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let mut controls = OrbitControls::new(Vec3::ZERO, &CameraConfig::default());
        controls.enable_damping = false;
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 5.0));
        controls.apply_drag(0.0, 10_000.0, 600);
        controls.update(&mut cam);
        assert!(cam.eye.y > 0.0 && cam.eye.z.abs() < 0.01);
    }

    #[test]
    fn wheel_zoom_scales_distance() {
        let mut controls = OrbitControls::new(Vec3::ZERO, &CameraConfig::default());
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 10.0));
        controls.apply_zoom(-1.0);
        controls.update(&mut cam);
        assert!((cam.eye.length() - 9.5).abs() < 1e-3);
    }

    #[test]
    fn several_notches_dolly_several_steps() {
        let mut controls = OrbitControls::new(Vec3::ZERO, &CameraConfig::default());
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 10.0));
        controls.apply_zoom(-3.0);
        controls.update(&mut cam);
        assert!((cam.eye.length() - 10.0 * 0.95f32.powi(3)).abs() < 1e-3);

        controls.apply_zoom(3.0);
        controls.update(&mut cam);
        assert!((cam.eye.length() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn zooming_in_all_the_way_can_be_undone() {
        let mut controls = OrbitControls::new(Vec3::ZERO, &CameraConfig::default());
        let mut cam = camera_at(Vec3::new(0.0, 0.0, 5.0));
        for _ in 0..50 {
            controls.apply_zoom(-20.0);
            controls.update(&mut cam);
        }
        let closest = cam.eye.length();
        assert!(closest >= MIN_DISTANCE * 0.99, "collapsed to {closest}");

        for _ in 0..20 {
            controls.apply_zoom(1.0);
            controls.update(&mut cam);
        }
        assert!(cam.eye.length() > closest * 2.0);
    }

    #[test]
    fn eye_on_target_clears_pending_motion() {
        let mut controls = OrbitControls::new(Vec3::ZERO, &CameraConfig::default());
        let mut cam = camera_at(Vec3::ZERO);
        controls.apply_drag(50.0, 20.0, 600);
        controls.apply_zoom(-1.0);
        controls.update(&mut cam);
        assert!(controls.is_settled());
        assert_eq!(cam.target, Vec3::ZERO);
    }
}
