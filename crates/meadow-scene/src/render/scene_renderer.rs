use std::num::NonZeroU64;
use std::rc::Rc;

use glam::Mat4;
use meadow_engine::render::{RenderCtx, RenderTarget};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::assets::{DecodedImage, Texture};
use crate::camera::PerspectiveCamera;
use crate::geometry::MeshVertex;
use crate::scene::{ElementKind, Mesh, Scene, SceneNode};
use crate::uniforms::{UniformSet, UniformValue};

use super::programs::{FRAGMENT_ENTRY, VERTEX_ENTRY};
use super::uniforms::{CameraUniform, MaterialUniform};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Draws every node of a [`Scene`] with depth testing.
///
/// GPU state for a node is created the first time the node is seen and kept for
/// the renderer's lifetime; the scene graph is append-only, so nodes are tracked
/// by index. A change of surface format drops all element state and rebuilds it.
#[derive(Default)]
pub struct SceneRenderer {
    format: Option<wgpu::TextureFormat>,
    shared: Option<SharedBindings>,
    depth: Option<DepthTarget>,
    elements: Vec<ElementGpu>,
}

/// Layouts and buffers used by every element.
struct SharedBindings {
    camera_ubo: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    camera_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    /// Bound when a material has no texture parameter.
    fallback: GpuTexture,
}

struct DepthTarget {
    size: PhysicalSize<u32>,
    view: wgpu::TextureView,
    _texture: wgpu::Texture,
}

struct GpuTexture {
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    _texture: wgpu::Texture,
}

enum DrawCall {
    Indexed {
        vbo: wgpu::Buffer,
        ibo: wgpu::Buffer,
        index_count: u32,
    },
    /// No vertex buffers; positions come from `vertex_index` / `instance_index`.
    Instanced {
        ibo: wgpu::Buffer,
        index_count: u32,
        instance_count: u32,
    },
}

struct ElementGpu {
    kind: ElementKind,
    pipeline: wgpu::RenderPipeline,
    uniforms: Rc<UniformSet>,
    params_name: Option<String>,
    transform: Mat4,
    material_ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    draw: DrawCall,
    _texture: Option<GpuTexture>,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes with GPU state.
    pub fn prepared(&self) -> usize {
        self.elements.len()
    }

    /// Renders `scene` through `camera` on top of the already cleared target.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) {
        if ctx.surface_size.width == 0 || ctx.surface_size.height == 0 {
            return;
        }

        self.ensure_format(ctx);
        self.ensure_shared(ctx);
        self.ensure_depth(ctx);
        self.prepare_new_nodes(ctx, scene);

        let Some(shared) = self.shared.as_ref() else { return };
        let Some(depth) = self.depth.as_ref() else { return };

        let camera_uniform = CameraUniform::new(camera, &scene.key_light());
        ctx.queue.write_buffer(&shared.camera_ubo, 0, bytemuck::bytes_of(&camera_uniform));

        for element in &self.elements {
            let material = MaterialUniform::from_set(
                &element.uniforms,
                element.params_name.as_deref(),
                element.transform,
            );
            ctx.queue.write_buffer(&element.material_ubo, 0, bytemuck::bytes_of(&material));
        }

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("meadow scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_bind_group(0, &shared.camera_bind_group, &[]);

        for element in &self.elements {
            rpass.set_pipeline(&element.pipeline);
            rpass.set_bind_group(1, &element.bind_group, &[]);

            match &element.draw {
                DrawCall::Indexed { vbo, ibo, index_count } => {
                    rpass.set_vertex_buffer(0, vbo.slice(..));
                    rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..*index_count, 0, 0..1);
                }
                DrawCall::Instanced { ibo, index_count, instance_count } => {
                    rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..*index_count, 0, 0..*instance_count);
                }
            }
        }
    }

    fn ensure_format(&mut self, ctx: &RenderCtx<'_>) {
        if self.format == Some(ctx.surface_format) {
            return;
        }
        if self.format.is_some() {
            log::debug!(
                "surface format changed to {:?}, rebuilding {} element(s)",
                ctx.surface_format,
                self.elements.len()
            );
        }
        self.format = Some(ctx.surface_format);
        self.elements.clear();
    }

    fn ensure_shared(&mut self, ctx: &RenderCtx<'_>) {
        if self.shared.is_some() {
            return;
        }

        let camera_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("meadow camera bgl"),
            entries: &[uniform_entry::<CameraUniform>(0)],
        });

        let material_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("meadow material bgl"),
            entries: &[
                uniform_entry::<MaterialUniform>(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let camera_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("meadow camera ubo"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("meadow camera bind group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_ubo.as_entire_binding(),
            }],
        });

        let white = Texture::new("meadow fallback", DecodedImage::solid(1, 1, [255; 4]));
        let fallback = upload_texture(ctx, &white);

        self.shared = Some(SharedBindings {
            camera_ubo,
            camera_bind_group,
            camera_layout,
            material_layout,
            fallback,
        });
    }

    fn ensure_depth(&mut self, ctx: &RenderCtx<'_>) {
        if self.depth.as_ref().is_some_and(|d| d.size == ctx.surface_size) {
            return;
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("meadow depth"),
            size: wgpu::Extent3d {
                width: ctx.surface_size.width,
                height: ctx.surface_size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        self.depth = Some(DepthTarget {
            size: ctx.surface_size,
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            _texture: texture,
        });
    }

    fn prepare_new_nodes(&mut self, ctx: &RenderCtx<'_>, scene: &Scene) {
        let Some(shared) = self.shared.as_ref() else { return };
        let Some(format) = self.format else { return };

        for node in scene.nodes().iter().skip(self.elements.len()) {
            let element = prepare_element(ctx, shared, format, node);
            log::debug!("prepared {} for rendering", element.kind);
            self.elements.push(element);
        }
    }
}

fn uniform_entry<T>(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}

fn upload_texture(ctx: &RenderCtx<'_>, texture: &Texture) -> GpuTexture {
    let image = &texture.image;
    let size = wgpu::Extent3d {
        width: image.width.max(1),
        height: image.height.max(1),
        depth_or_array_layers: 1,
    };

    let gpu_texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(&texture.label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: texture.format(),
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &gpu_texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(image.stride()),
            rows_per_image: Some(image.height),
        },
        size,
    );

    let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(&texture.label),
        address_mode_u: texture.wrap_u.address_mode(),
        address_mode_v: texture.wrap_v.address_mode(),
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    });

    GpuTexture {
        view: gpu_texture.create_view(&wgpu::TextureViewDescriptor::default()),
        sampler,
        _texture: gpu_texture,
    }
}

/// First parameter of the set holding a value of the given shape.
fn first_param(set: &UniformSet, pred: impl Fn(&UniformValue) -> bool) -> Option<String> {
    set.names()
        .find(|name| set.param(name).is_some_and(|v| pred(&v)))
        .map(str::to_owned)
}

fn prepare_element(
    ctx: &RenderCtx<'_>,
    shared: &SharedBindings,
    format: wgpu::TextureFormat,
    node: &SceneNode,
) -> ElementGpu {
    let material = &node.material;
    let uniforms = material.uniforms().clone();
    let program = material.program();

    let texture = first_param(&uniforms, |v| matches!(v, UniformValue::Texture(_)))
        .and_then(|name| uniforms.texture(&name))
        .map(|t| upload_texture(ctx, &t));
    let params_name = first_param(&uniforms, |v| matches!(v, UniformValue::Vec4(_)));

    let material_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(&format!("meadow {} material ubo", node.kind)),
        size: std::mem::size_of::<MaterialUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bound = texture.as_ref().unwrap_or(&shared.fallback);
    let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("meadow {} bind group", node.kind)),
        layout: &shared.material_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: material_ubo.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&bound.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&bound.sampler),
            },
        ],
    });

    let vertex_module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("meadow {} vertex", program.label)),
        source: wgpu::ShaderSource::Wgsl(program.vertex.into()),
    });
    let fragment_module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("meadow {} fragment", program.label)),
        source: wgpu::ShaderSource::Wgsl(program.fragment.into()),
    });

    let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("meadow {} pipeline layout", program.label)),
        bind_group_layouts: &[&shared.camera_layout, &shared.material_layout],
        immediate_size: 0,
    });

    let vertex_layouts = match node.mesh {
        Mesh::Indexed(_) => vec![MeshVertex::layout()],
        Mesh::Instanced(_) => Vec::new(),
    };

    let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("meadow {} pipeline", program.label)),
        layout: Some(&pipeline_layout),

        vertex: wgpu::VertexState {
            module: &vertex_module,
            entry_point: Some(VERTEX_ENTRY),
            compilation_options: Default::default(),
            buffers: &vertex_layouts,
        },

        fragment: Some(wgpu::FragmentState {
            module: &fragment_module,
            entry_point: Some(FRAGMENT_ENTRY),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: material.side().cull_mode(),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    let draw = match &node.mesh {
        Mesh::Indexed(mesh) => DrawCall::Indexed {
            vbo: ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("meadow {} vbo", node.kind)),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            ibo: ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("meadow {} ibo", node.kind)),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: mesh.indices.len() as u32,
        },
        Mesh::Instanced(geometry) => DrawCall::Instanced {
            ibo: ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("meadow {} ibo", node.kind)),
                contents: bytemuck::cast_slice(geometry.indices()),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: geometry.index_count(),
            instance_count: geometry.instance_count(),
        },
    };

    ElementGpu {
        kind: node.kind,
        pipeline,
        uniforms,
        params_name,
        transform: node.transform,
        material_ubo,
        bind_group,
        draw,
        _texture: texture,
    }
}
