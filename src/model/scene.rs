use glam::Vec3;

use crate::model::Transform;
use crate::view::mesh::Mesh;

/// Index of a render proxy inside its [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyId(usize);

/// Procedural geometry, sized the same way the scenes describe their bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Sphere { radius: f32 },
    /// Full extents along each axis
    Box { size: Vec3 },
    /// Lies in local XY and faces +Z
    Plane { width: f32, height: f32 },
    Cylinder { radius_top: f32, radius_bottom: f32, height: f32, segments: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Flat colour, ignores lights
    Basic { color: [f32; 3] },
    /// Colour taken from the surface normal
    Normal,
    /// Lit by the ambient and directional light
    Standard { color: [f32; 3] },
}

impl Material {
    pub fn basic_hex(hex: u32) -> Self {
        Material::Basic { color: hex_to_rgb(hex) }
    }

    pub fn standard_hex(hex: u32) -> Self {
        Material::Standard { color: hex_to_rgb(hex) }
    }
}

pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// A loaded model parented under a group proxy.
#[derive(Debug, Clone)]
pub struct ModelAttachment {
    pub local: Transform,
    pub scale: Vec3,
    pub material: Material,
    pub meshes: Vec<Mesh>,
}

#[derive(Debug, Clone)]
pub enum ProxyKind {
    Mesh { geometry: Geometry, material: Material },
    /// Attachments are append-only so the renderer can upload them lazily
    Group { attachments: Vec<ModelAttachment> },
}

/// Visual stand-in for a body. Its transform is only ever a copy.
#[derive(Debug, Clone)]
pub struct RenderProxy {
    pub name: String,
    pub transform: Transform,
    pub scale: Vec3,
    pub kind: ProxyKind,
}

impl RenderProxy {
    pub fn world_matrix(&self) -> glam::Mat4 {
        self.transform.to_matrix(self.scale)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Lights {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub directional_color: [f32; 3],
    pub directional_intensity: f32,
    /// The light shines from here toward the origin
    pub directional_position: Vec3,
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 1.0,
            directional_color: [1.0, 1.0, 1.0],
            directional_intensity: 0.0,
            directional_position: Vec3::Y,
        }
    }
}

pub struct Scene {
    proxies: Vec<RenderProxy>,
    pub lights: Lights,
    pub background: [f64; 3],
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            proxies: Vec::new(),
            lights: Lights::default(),
            background: [0.0, 0.0, 0.0],
        }
    }

    pub fn add_mesh(&mut self, name: &str, geometry: Geometry, material: Material) -> ProxyId {
        self.push(RenderProxy {
            name: name.to_string(),
            transform: Transform::IDENTITY,
            scale: Vec3::ONE,
            kind: ProxyKind::Mesh { geometry, material },
        })
    }

    pub fn add_group(&mut self, name: &str) -> ProxyId {
        self.push(RenderProxy {
            name: name.to_string(),
            transform: Transform::IDENTITY,
            scale: Vec3::ONE,
            kind: ProxyKind::Group { attachments: Vec::new() },
        })
    }

    fn push(&mut self, proxy: RenderProxy) -> ProxyId {
        let id = ProxyId(self.proxies.len());
        tracing::debug!(name = %proxy.name, ?id, "added render proxy");
        self.proxies.push(proxy);
        id
    }

    pub fn get(&self, id: ProxyId) -> Option<&RenderProxy> {
        self.proxies.get(id.0)
    }

    pub fn get_mut(&mut self, id: ProxyId) -> Option<&mut RenderProxy> {
        self.proxies.get_mut(id.0)
    }

    pub fn set_transform(&mut self, id: ProxyId, transform: Transform) {
        if let Some(proxy) = self.proxies.get_mut(id.0) {
            proxy.transform = transform;
        }
    }

    /// Parent a model under a group. Returns false if `id` is not a group.
    pub fn attach(&mut self, id: ProxyId, attachment: ModelAttachment) -> bool {
        match self.proxies.get_mut(id.0).map(|p| &mut p.kind) {
            Some(ProxyKind::Group { attachments }) => {
                attachments.push(attachment);
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProxyId, &RenderProxy)> {
        self.proxies.iter().enumerate().map(|(i, p)| (ProxyId(i), p))
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_only_works_on_groups() {
        let mut scene = Scene::new();
        let ball = scene.add_mesh("ball", Geometry::Sphere { radius: 1.0 }, Material::Normal);
        let group = scene.add_group("player");
        let attachment = ModelAttachment {
            local: Transform::IDENTITY,
            scale: Vec3::splat(0.025),
            material: Material::standard_hex(0xffffff),
            meshes: vec![Mesh::empty()],
        };

        assert!(!scene.attach(ball, attachment.clone()));
        assert!(scene.attach(group, attachment));
        match &scene.get(group).unwrap().kind {
            ProxyKind::Group { attachments } => assert_eq!(attachments.len(), 1),
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn hex_colour_channels() {
        assert_eq!(hex_to_rgb(0x00ff00), [0.0, 1.0, 0.0]);
        let grey = hex_to_rgb(0x333333);
        assert!((grey[0] - 0.2).abs() < 1e-6);
    }
}
