//! Forward WebGPU pipeline for the stadium scene
//!
//! Two pipelines share one shader: opaque geometry (stadium, ball, screens)
//! and alpha-blended highlight borders drawn afterwards without depth writes.
//! Both render into a 4x multisampled target resolved onto the surface.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};
use wgpu::util::DeviceExt;

use super::placement;
use super::shapes::{self, MeshGeometry};
use super::vertex::{Vertex, colors};
use crate::assets::ModelData;
use crate::consts::*;
use crate::screen_face_size;
use crate::sim::{SceneState, border_size};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const IMAGE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Samples per pixel of the colour and depth targets
pub const MSAA_SAMPLES: u32 = 4;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    sun: [f32; 4],
    ambient: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ObjectUniform {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4],
}

// ============================================================================
// SIZING
// ============================================================================

/// Scale `size` down, keeping its aspect, until both sides fit in `max`
pub fn clamp_extent(size: (u32, u32), max: u32) -> (u32, u32) {
    let (w, h) = (size.0.max(1), size.1.max(1));
    let longest = w.max(h);
    if longest <= max {
        return (w, h);
    }
    let max = max.max(1);
    let fit = |v: u32| (v as u64 * max as u64 / longest as u64).clamp(1, max as u64) as u32;
    (fit(w), fit(h))
}

/// Descriptor for a multisampled render target of the given format
fn render_target_desc(
    label: &'static str,
    size: (u32, u32),
    format: wgpu::TextureFormat,
) -> wgpu::TextureDescriptor<'static> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size.0.max(1),
            height: size.1.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: MSAA_SAMPLES,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    }
}

/// Descriptor for a texture filled from a browser image or video frame
fn image_texture_desc(label: &'static str, size: (u32, u32)) -> wgpu::TextureDescriptor<'static> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size.0,
            height: size.1,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: IMAGE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST
            | wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    }
}

// ============================================================================
// SCENE OBJECTS
// ============================================================================

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, geometry: &MeshGeometry, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
        }
    }
}

/// A mesh instance with its own uniform and texture binding
struct DrawObject {
    mesh: GpuMesh,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Transform applied before the per-frame placement
    local: Mat4,
    color: [f32; 4],
    lit: bool,
}

/// A screen's video texture, sized to the video once it is known
struct VideoTexture {
    texture: wgpu::Texture,
    size: (u32, u32),
}

struct ScreenDraw {
    face: DrawObject,
    border: DrawObject,
    placement: Mat4,
    video: Option<VideoTexture>,
    /// Video larger than the device allows; reported once
    oversized: bool,
}

// ============================================================================
// SCENE RENDERER
// ============================================================================

pub struct SceneRenderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    opaque_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    /// Clamped sampler for video frames
    screen_sampler: wgpu::Sampler,
    /// Repeating sampler for model textures
    model_sampler: wgpu::Sampler,
    blank_view: wgpu::TextureView,
    msaa_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,

    screens: Vec<ScreenDraw>,
    stadium: Vec<DrawObject>,
    ball: Vec<DrawObject>,
    ball_scale: f32,

    /// Largest texture side the device accepts
    max_dimension: u32,
    pub size: (u32, u32),
}

impl SceneRenderer {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("scene-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let max_dimension = device.limits().max_texture_dimension_2d;
        let (width, height) = clamp_extent((width, height), max_dimension);
        log::info!("Max texture size: {max_dimension}, surface {width}x{height}");

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                sun: sun_uniform(),
                ambient: [AMBIENT_INTENSITY, AMBIENT_INTENSITY, AMBIENT_INTENSITY, 0.0],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &object_layout],
            immediate_size: 0,
        });

        let make_pipeline = |label: &str, blend: Option<wgpu::BlendState>, depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::desc()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: config.format,
                        blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: MSAA_SAMPLES,
                    ..Default::default()
                },
                multiview_mask: None,
                cache: None,
            })
        };

        let opaque_pipeline = make_pipeline("opaque_pipeline", None, true);
        let overlay_pipeline =
            make_pipeline("overlay_pipeline", Some(wgpu::BlendState::ALPHA_BLENDING), false);

        let screen_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("screen_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let model_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("model_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let blank = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("blank_texture"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: IMAGE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &blank,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &[255, 255, 255, 255],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        let blank_view = blank.create_view(&wgpu::TextureViewDescriptor::default());

        let (msaa_view, depth_view) = create_targets(&device, config.format, (width, height));

        Ok(Self {
            surface,
            device,
            queue,
            config,
            opaque_pipeline,
            overlay_pipeline,
            globals_buffer,
            globals_bind_group,
            object_layout,
            screen_sampler,
            model_sampler,
            blank_view,
            msaa_view,
            depth_view,
            screens: Vec::new(),
            stadium: Vec::new(),
            ball: Vec::new(),
            ball_scale: FOOTBALL_SCALE,
            max_dimension,
            size: (width, height),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            let (width, height) = clamp_extent((new_width, new_height), self.max_dimension);
            self.size = (width, height);
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            let (msaa_view, depth_view) = create_targets(&self.device, self.config.format, self.size);
            self.msaa_view = msaa_view;
            self.depth_view = depth_view;
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn create_object(
        &self,
        geometry: &MeshGeometry,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        local: Mat4,
        color: [f32; 4],
        lit: bool,
        label: &str,
    ) -> DrawObject {
        let uniform = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<ObjectUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.object_bind_group(&uniform, view, sampler, label);
        DrawObject {
            mesh: GpuMesh::upload(&self.device, geometry, label),
            uniform,
            bind_group,
            local,
            color,
            lit,
        }
    }

    fn object_bind_group(
        &self,
        uniform: &wgpu::Buffer,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        label: &str,
    ) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.object_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Create face and border geometry for every screen on the wall
    pub fn add_screens(&mut self, scene: &SceneState) {
        let (w, h) = screen_face_size();
        let face_geometry = shapes::cuboid(Vec3::new(w, h, SCREEN_HALF_THICKNESS * 2.0));
        let border_geometry = shapes::cuboid(border_size());
        let [r, g, b] = BORDER_COLOR;

        let screens: Vec<ScreenDraw> = scene
            .wall
            .screens()
            .iter()
            .map(|screen| ScreenDraw {
                face: self.create_object(
                    &face_geometry,
                    &self.blank_view,
                    &self.screen_sampler,
                    Mat4::IDENTITY,
                    [0.0, 0.0, 0.0, 1.0],
                    false,
                    "screen_face",
                ),
                border: self.create_object(
                    &border_geometry,
                    &self.blank_view,
                    &self.screen_sampler,
                    Mat4::IDENTITY,
                    [r, g, b, 0.0],
                    false,
                    "screen_border",
                ),
                placement: Mat4::from_translation(screen.position),
                video: None,
                oversized: false,
            })
            .collect();
        self.screens = screens;
    }

    pub fn has_video_texture(&self, index: usize) -> bool {
        self.screens.get(index).is_some_and(|s| s.video.is_some())
    }

    /// Texture that receives frames for screen `index`, (re)created at `size`
    ///
    /// Videos larger than the device's texture limit get no texture.
    pub fn video_texture(&mut self, index: usize, size: (u32, u32)) -> Option<wgpu::Texture> {
        if size.0 == 0 || size.1 == 0 || index >= self.screens.len() {
            return None;
        }
        if size.0 > self.max_dimension || size.1 > self.max_dimension {
            let screen = &mut self.screens[index];
            if !screen.oversized {
                screen.oversized = true;
                log::warn!(
                    "Screen {index} video is {}x{}, over the {} texture limit",
                    size.0,
                    size.1,
                    self.max_dimension
                );
            }
            return None;
        }

        let needs_new = self.screens[index]
            .video
            .as_ref()
            .is_none_or(|v| v.size != size);

        if needs_new {
            let texture = self
                .device
                .create_texture(&image_texture_desc("video_texture", size));
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let bind_group = self.object_bind_group(
                &self.screens[index].face.uniform,
                &view,
                &self.screen_sampler,
                "screen_face",
            );
            let screen = &mut self.screens[index];
            screen.face.bind_group = bind_group;
            screen.face.color = colors::WHITE;
            screen.video = Some(VideoTexture { texture, size });
            log::debug!("Screen {index} video texture {}x{}", size.0, size.1);
        }

        self.screens[index].video.as_ref().map(|v| v.texture.clone())
    }

    /// Upload a decoded model image; `None` when it exceeds the texture limit
    #[cfg(target_arch = "wasm32")]
    pub fn upload_image(&self, image: &web_sys::ImageBitmap) -> Option<wgpu::TextureView> {
        let size = (image.width(), image.height());
        if size.0 == 0 || size.1 == 0 {
            return None;
        }
        if size.0 > self.max_dimension || size.1 > self.max_dimension {
            log::warn!(
                "Model texture is {}x{}, over the {} texture limit",
                size.0,
                size.1,
                self.max_dimension
            );
            return None;
        }

        let texture = self
            .device
            .create_texture(&image_texture_desc("model_texture", size));
        self.queue.copy_external_image_to_texture(
            &wgpu::CopyExternalImageSourceInfo {
                source: wgpu::ExternalImageSource::ImageBitmap(image.clone()),
                origin: wgpu::Origin2d::ZERO,
                flip_y: false,
            },
            wgpu::CopyExternalImageDestInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
                color_space: wgpu::PredefinedColorSpace::Srgb,
                premultiplied_alpha: false,
            },
            wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
        );
        Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
    }

    /// Replace the stadium; `textures` is indexed like the model's images
    pub fn set_stadium(&mut self, model: &ModelData, textures: &[Option<wgpu::TextureView>]) {
        self.stadium = self.model_objects(model, textures, "stadium");
    }

    pub fn set_ball_model(&mut self, model: &ModelData, textures: &[Option<wgpu::TextureView>]) {
        self.ball = self.model_objects(model, textures, "football");
        self.ball_scale = FOOTBALL_SCALE;
    }

    /// Plain sphere of the physics radius, used when the ball model is unavailable
    pub fn set_ball_fallback(&mut self, radius: f32) {
        let sphere = shapes::uv_sphere(radius, 24, 16);
        self.ball = vec![self.create_object(
            &sphere,
            &self.blank_view,
            &self.model_sampler,
            Mat4::IDENTITY,
            colors::BALL_FALLBACK,
            true,
            "ball_fallback",
        )];
        self.ball_scale = 1.0;
    }

    fn model_objects(
        &self,
        model: &ModelData,
        textures: &[Option<wgpu::TextureView>],
        label: &str,
    ) -> Vec<DrawObject> {
        model
            .meshes
            .iter()
            .map(|mesh| {
                let view = mesh
                    .base_color_image
                    .and_then(|i| textures.get(i))
                    .and_then(Option::as_ref)
                    .unwrap_or(&self.blank_view);
                self.create_object(
                    &shapes::from_mesh_data(mesh),
                    view,
                    &self.model_sampler,
                    mesh.transform,
                    mesh.base_color,
                    true,
                    label,
                )
            })
            .collect()
    }

    fn write_object(&self, object: &DrawObject, placement: Mat4, alpha: Option<f32>) {
        let mut color = object.color;
        if let Some(a) = alpha {
            color[3] = a;
        }
        let uniform = ObjectUniform {
            model: (placement * object.local).to_cols_array_2d(),
            color,
            params: [if object.lit { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        };
        self.queue
            .write_buffer(&object.uniform, 0, bytemuck::bytes_of(&uniform));
    }

    /// Update GPU buffers from scene state and render
    pub fn render(
        &mut self,
        scene: &SceneState,
        ball_position: Vec3,
        ball_rotation: Quat,
    ) -> Result<(), wgpu::SurfaceError> {
        let globals = Globals {
            view_proj: scene.camera.view_projection().to_cols_array_2d(),
            sun: sun_uniform(),
            ambient: [AMBIENT_INTENSITY, AMBIENT_INTENSITY, AMBIENT_INTENSITY, 0.0],
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let stadium_placement = placement::stadium();
        for object in &self.stadium {
            self.write_object(object, stadium_placement, None);
        }

        let ball_placement = placement::ball(ball_position, ball_rotation, self.ball_scale);
        for object in &self.ball {
            self.write_object(object, ball_placement, None);
        }

        let wall = scene.wall.screens();
        for (i, screen) in self.screens.iter().enumerate() {
            let opacity = wall.get(i).map(|s| s.opacity).unwrap_or(0.0);
            self.write_object(&screen.face, screen.placement, None);
            self.write_object(&screen.border, screen.placement, Some(opacity));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.msaa_view,
                    resolve_target: Some(&view),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(colors::SKY),
                        store: wgpu::StoreOp::Discard,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
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

            render_pass.set_pipeline(&self.opaque_pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);

            let opaque = self
                .stadium
                .iter()
                .chain(self.ball.iter())
                .chain(self.screens.iter().map(|s| &s.face));
            for object in opaque {
                draw(&mut render_pass, object);
            }

            render_pass.set_pipeline(&self.overlay_pipeline);
            for (i, screen) in self.screens.iter().enumerate() {
                let visible = wall.get(i).is_some_and(|s| s.opacity > 0.0);
                if visible {
                    draw(&mut render_pass, &screen.border);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn draw(render_pass: &mut wgpu::RenderPass<'_>, object: &DrawObject) {
    if object.mesh.index_count == 0 {
        return;
    }
    render_pass.set_bind_group(1, &object.bind_group, &[]);
    render_pass.set_vertex_buffer(0, object.mesh.vertex_buffer.slice(..));
    render_pass.set_index_buffer(object.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    render_pass.draw_indexed(0..object.mesh.index_count, 0, 0..1);
}

fn sun_uniform() -> [f32; 4] {
    // Directional light aimed at the origin
    let dir = SUN_POSITION.normalize_or_zero();
    [dir.x, dir.y, dir.z, SUN_INTENSITY]
}

/// Multisampled colour and depth views at `size`
fn create_targets(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    size: (u32, u32),
) -> (wgpu::TextureView, wgpu::TextureView) {
    let msaa = device.create_texture(&render_target_desc("msaa_color", size, format));
    let depth = device.create_texture(&render_target_desc("depth_texture", size, DEPTH_FORMAT));
    (
        msaa.create_view(&wgpu::TextureViewDescriptor::default()),
        depth.create_view(&wgpu::TextureViewDescriptor::default()),
    )
}
