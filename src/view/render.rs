use std::collections::HashMap;

use glam::Mat4;
use wgpu::*;

use crate::model::{Camera, Material, ProxyId, ProxyKind, Scene};
use crate::view::mesh::{Mesh, MeshBuffer, Vertex};

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub ambient: [f32; 4],
    pub light_color: [f32; 4],
    pub light_dir: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub params: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self { view_proj: camera.view_proj().to_cols_array_2d() }
    }
}

impl LightingUniform {
    pub fn from_scene(scene: &Scene) -> Self {
        let l = &scene.lights;
        let ambient = srgb_to_linear(l.ambient_color).map(|c| c * l.ambient_intensity);
        let light = srgb_to_linear(l.directional_color).map(|c| c * l.directional_intensity);
        let dir = l.directional_position.normalize_or_zero();
        Self {
            ambient: [ambient[0], ambient[1], ambient[2], 0.0],
            light_color: [light[0], light[1], light[2], 0.0],
            light_dir: [dir.x, dir.y, dir.z, 0.0],
        }
    }
}

impl ObjectUniform {
    pub fn new(model: Mat4, material: &Material) -> Self {
        let (color, mode) = match *material {
            Material::Basic { color } => (srgb_to_linear(color), 0.0),
            Material::Normal => ([1.0; 3], 1.0),
            Material::Standard { color } => (srgb_to_linear(color), 2.0),
        };
        Self {
            model: model.to_cols_array_2d(),
            color: [color[0], color[1], color[2], 1.0],
            params: [mode, 0.0, 0.0, 0.0],
        }
    }
}

pub fn srgb_to_linear(c: [f32; 3]) -> [f32; 3] {
    c.map(|v| {
        if v <= 0.04045 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    })
}

/// Identifies one draw: a mesh proxy, or one mesh of a group's attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum DrawKey {
    Proxy(ProxyId),
    Attachment(ProxyId, usize, usize),
}

struct DrawObject {
    mesh: MeshBuffer,
    uniform: Buffer,
    bind_group: BindGroup,
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

fn uniform_entry(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Draws a [`Scene`] from a [`Camera`]. GPU buffers for proxies are created
/// the first time a proxy is seen and reused afterwards.
pub struct SceneRenderer {
    pub format: TextureFormat,
    pub alpha_mode: CompositeAlphaMode,
    pub width: u32,
    pub height: u32,
    pipeline: RenderPipeline,
    camera_buffer: Buffer,
    lighting_buffer: Buffer,
    frame_bind_group: BindGroup,
    object_layout: BindGroupLayout,
    depth_view: TextureView,
    objects: HashMap<DrawKey, DrawObject>,
}

impl SceneRenderer {
    pub fn new(device: &Device, config: &SurfaceConfiguration) -> Self {
        let camera_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("camera_buffer"),
            size: std::mem::size_of::<CameraUniform>() as BufferAddress,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lighting_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("lighting_buffer"),
            size: std::mem::size_of::<LightingUniform>() as BufferAddress,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[
                uniform_entry(0, ShaderStages::VERTEX),
                uniform_entry(1, ShaderStages::FRAGMENT),
            ],
        });
        let frame_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[
                BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() },
                BindGroupEntry { binding: 1, resource: lighting_buffer.as_entire_binding() },
            ],
        });
        let object_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[uniform_entry(0, ShaderStages::VERTEX | ShaderStages::FRAGMENT)],
        });

        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &object_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
                    step_mode: VertexStepMode::Vertex,
                    attributes: &[
                        VertexAttribute { offset: 0, shader_location: 0, format: VertexFormat::Float32x3 },
                        VertexAttribute { offset: 12, shader_location: 1, format: VertexFormat::Float32x3 },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: config.format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: Some(Face::Back),
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Less,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
            multiview: None,
            cache: None,
        });

        let (_, depth_view) = create_depth_texture(device, config.width, config.height);

        Self {
            format: config.format,
            alpha_mode: config.alpha_mode,
            width: config.width,
            height: config.height,
            pipeline,
            camera_buffer,
            lighting_buffer,
            frame_bind_group,
            object_layout,
            depth_view,
            objects: HashMap::new(),
        }
    }

    fn surface_config(&self) -> SurfaceConfiguration {
        SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: self.format,
            width: self.width,
            height: self.height,
            present_mode: PresentMode::Fifo,
            alpha_mode: self.alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    /// Reconfigure the surface and depth buffer. Zero sizes are ignored.
    pub fn resize(&mut self, device: &Device, surface: &Surface, width: u32, height: u32) {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        surface.configure(device, &self.surface_config());
        let (_, depth_view) = create_depth_texture(device, width, height);
        self.depth_view = depth_view;
        tracing::debug!(width, height, "resized surface");
    }

    fn new_object(&self, device: &Device, mesh: &Mesh, label: &str) -> DrawObject {
        let uniform = device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<ObjectUniform>() as BufferAddress,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some(label),
            layout: &self.object_layout,
            entries: &[BindGroupEntry { binding: 0, resource: uniform.as_entire_binding() }],
        });
        DrawObject { mesh: mesh.upload(device), uniform, bind_group }
    }

    /// Make sure every proxy has GPU buffers and write this frame's uniforms.
    /// Returns the draw order.
    fn prepare(&mut self, device: &Device, queue: &Queue, scene: &Scene) -> Vec<DrawKey> {
        let mut order = Vec::new();
        for (id, proxy) in scene.iter() {
            let world = proxy.world_matrix();
            match &proxy.kind {
                ProxyKind::Mesh { geometry, material } => {
                    let key = DrawKey::Proxy(id);
                    if !self.objects.contains_key(&key) {
                        let object = self.new_object(device, &Mesh::from_geometry(geometry), &proxy.name);
                        self.objects.insert(key, object);
                    }
                    if let Some(object) = self.objects.get(&key) {
                        let uniform = ObjectUniform::new(world, material);
                        queue.write_buffer(&object.uniform, 0, bytemuck::bytes_of(&uniform));
                    }
                    order.push(key);
                }
                ProxyKind::Group { attachments } => {
                    for (a, attachment) in attachments.iter().enumerate() {
                        let model = world * attachment.local.to_matrix(attachment.scale);
                        let uniform = ObjectUniform::new(model, &attachment.material);
                        for (m, mesh) in attachment.meshes.iter().enumerate() {
                            if mesh.is_empty() {
                                continue;
                            }
                            let key = DrawKey::Attachment(id, a, m);
                            if !self.objects.contains_key(&key) {
                                let object = self.new_object(device, mesh, &proxy.name);
                                self.objects.insert(key, object);
                            }
                            if let Some(object) = self.objects.get(&key) {
                                queue.write_buffer(&object.uniform, 0, bytemuck::bytes_of(&uniform));
                            }
                            order.push(key);
                        }
                    }
                }
            }
        }
        order
    }

    /// Render one frame. A lost or outdated surface is reconfigured and the
    /// frame skipped.
    pub fn draw_frame(
        &mut self,
        device: &Device,
        queue: &Queue,
        surface: &Surface,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<(), SurfaceError> {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&CameraUniform::from_camera(camera)));
        queue.write_buffer(&self.lighting_buffer, 0, bytemuck::bytes_of(&LightingUniform::from_scene(scene)));
        let order = self.prepare(device, queue, scene);

        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                tracing::warn!("surface lost, reconfiguring");
                surface.configure(device, &self.surface_config());
                return Ok(());
            }
            Err(SurfaceError::Timeout) => {
                tracing::debug!("surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let [r, g, b] = scene.background;
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color { r, g, b, a: 1.0 }),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.frame_bind_group, &[]);

            for key in &order {
                let Some(object) = self.objects.get(key) else { continue };
                if object.mesh.index_count == 0 {
                    continue;
                }
                rp.set_bind_group(1, &object.bind_group, &[]);
                rp.set_vertex_buffer(0, object.mesh.vertex_buffer.slice(..));
                rp.set_index_buffer(object.mesh.index_buffer.slice(..), IndexFormat::Uint32);
                rp.draw_indexed(0..object.mesh.index_count, 0, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
