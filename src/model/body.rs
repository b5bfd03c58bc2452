use glam::{Quat, Vec3};

/// Position and orientation shared by physics bodies and render proxies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self { position, rotation: Quat::IDENTITY }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn to_matrix(&self, scale: Vec3) -> glam::Mat4 {
        glam::Mat4::from_scale_rotation_translation(scale, self.rotation, self.position)
    }
}

/// Collision shape of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Sphere { radius: f32 },
    /// Infinite half-space whose surface normal is the body's local +Z
    Plane,
    Box { half_extents: Vec3 },
    /// Upright along local Y
    Cylinder { radius: f32, half_height: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Static,
    Dynamic,
}

/// Everything needed to add a body to the physics world.
#[derive(Debug, Clone, Copy)]
pub struct BodyDesc {
    pub kind: BodyKind,
    /// Ignored for static bodies
    pub mass: f32,
    pub shape: BodyShape,
    pub transform: Transform,
}

impl BodyDesc {
    pub fn dynamic(mass: f32, shape: BodyShape) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            mass,
            shape,
            transform: Transform::IDENTITY,
        }
    }

    pub fn fixed(shape: BodyShape) -> Self {
        Self {
            kind: BodyKind::Static,
            mass: 0.0,
            shape,
            transform: Transform::IDENTITY,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }
}
