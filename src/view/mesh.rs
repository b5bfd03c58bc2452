use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::model::Geometry;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }

    pub fn from_geometry(geometry: &Geometry) -> Self {
        match *geometry {
            Geometry::Sphere { radius } => sphere(radius, 32, 16),
            Geometry::Box { size } => cuboid(size.to_array()),
            Geometry::Plane { width, height } => plane(width, height),
            Geometry::Cylinder { radius_top, radius_bottom, height, segments } => {
                cylinder(radius_top, radius_bottom, height, segments.max(3))
            }
        }
    }
}

/// UV sphere centred on the origin
fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Mesh {
    let mut mesh = Mesh::empty();
    for y in 0..=height_segments {
        let v = y as f32 / height_segments as f32;
        let phi = v * PI;
        for x in 0..=width_segments {
            let u = x as f32 / width_segments as f32;
            let theta = u * TAU;
            let normal = [-theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin()];
            mesh.vertices.push(Vertex {
                pos: normal.map(|n| n * radius),
                normal,
            });
        }
    }
    let row = width_segments + 1;
    for y in 0..height_segments {
        for x in 0..width_segments {
            let a = y * row + x + 1;
            let b = y * row + x;
            let c = (y + 1) * row + x;
            let d = (y + 1) * row + x + 1;
            if y != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if y != height_segments - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

/// Axis-aligned box with flat-shaded faces
fn cuboid(size: [f32; 3]) -> Mesh {
    let [hx, hy, hz] = size.map(|s| s * 0.5);
    // (normal, u axis, v axis) per face, u x v == normal
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];
    let half = [hx, hy, hz];
    let mut mesh = Mesh::empty();
    for (n, u, v) in faces {
        let base = mesh.vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let pos = std::array::from_fn(|i| (n[i] + u[i] * su + v[i] * sv) * half[i]);
            mesh.vertices.push(Vertex { pos, normal: n });
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

/// Quad in the XY plane facing +Z
fn plane(width: f32, height: f32) -> Mesh {
    let (hw, hh) = (width * 0.5, height * 0.5);
    let normal = [0.0, 0.0, 1.0];
    Mesh {
        vertices: vec![
            Vertex { pos: [-hw, -hh, 0.0], normal },
            Vertex { pos: [hw, -hh, 0.0], normal },
            Vertex { pos: [hw, hh, 0.0], normal },
            Vertex { pos: [-hw, hh, 0.0], normal },
        ],
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

/// Capped cylinder along Y, centred on the origin
fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Mesh {
    let half = height * 0.5;
    let slope = (radius_bottom - radius_top) / height;
    let mut mesh = Mesh::empty();

    // Side: one ring of vertices at each end
    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * TAU;
        let (s, c) = theta.sin_cos();
        let n = glam::Vec3::new(s, slope, c).normalize();
        mesh.vertices.push(Vertex { pos: [radius_top * s, half, radius_top * c], normal: n.to_array() });
        mesh.vertices.push(Vertex { pos: [radius_bottom * s, -half, radius_bottom * c], normal: n.to_array() });
    }
    for i in 0..segments {
        let top = i * 2;
        let bottom = top + 1;
        let next_top = top + 2;
        let next_bottom = top + 3;
        mesh.indices
            .extend_from_slice(&[top, bottom, next_bottom, top, next_bottom, next_top]);
    }

    // Caps as triangle fans
    for (y, radius, ny) in [(half, radius_top, 1.0f32), (-half, radius_bottom, -1.0f32)] {
        if radius <= 0.0 {
            continue;
        }
        let centre = mesh.vertices.len() as u32;
        let normal = [0.0, ny, 0.0];
        mesh.vertices.push(Vertex { pos: [0.0, y, 0.0], normal });
        for i in 0..segments {
            let theta = i as f32 / segments as f32 * TAU;
            let (s, c) = theta.sin_cos();
            mesh.vertices.push(Vertex { pos: [radius * s, y, radius * c], normal });
        }
        for i in 0..segments {
            let a = centre + 1 + i;
            let b = centre + 1 + (i + 1) % segments;
            if ny > 0.0 {
                mesh.indices.extend_from_slice(&[centre, a, b]);
            } else {
                mesh.indices.extend_from_slice(&[centre, b, a]);
            }
        }
    }
    mesh
}
