use glam::{Mat4, Vec3};

pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    /// Perspective camera with a vertical field of view given in degrees
    pub fn new(fov_y_deg: f32, width: u32, height: u32) -> Self {
        let mut cam = Self {
            eye: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: fov_y_deg.to_radians(),
            aspect: 1.0,
            z_near: 0.1,
            z_far: 100.0,
        };
        cam.set_aspect(width, height);
        cam
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        // A minimised window reports a zero height
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_height_keeps_previous_aspect() {
        let mut cam = Camera::new(45.0, 800, 600);
        cam.set_aspect(800, 0);
        assert!((cam.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let mut cam = Camera::new(75.0, 800, 600);
        cam.eye = Vec3::new(2.0, 2.0, 2.0);
        cam.target = Vec3::new(0.0, 0.75, 0.0);
        let clip = cam.view_proj() * cam.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
    }
}
