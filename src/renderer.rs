use std::sync::Arc;
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use winit::window::Window;
use crate::animation::SceneRenderer;
use crate::capability::GpuTarget;
use crate::config::Settings;
use crate::core::Viewport;
use crate::geometry::MeshData;
use crate::math::{hex_to_rgb, srgb_to_linear};
use crate::scene::{Geometry, Material, MaterialKind, Mesh, PointLight, SceneState, Side};
use crate::stats::FpsReading;
use crate::types::{GlobalsUniform, ObjectUniform, Vertex};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const MSAA_SAMPLES: u32 = 4;
/// Field of view of the shadow camera, wide enough to cover the cubes
/// from anywhere on the light's path
const SHADOW_FOV: f32 = std::f32::consts::FRAC_PI_2;
const LIGHT_HELPER_SIZE: f32 = 0.5;

/// GPU buffers for one mesh
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    edge_buffer: wgpu::Buffer,
    edge_count: u32,
    object_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuMesh {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, geometry: &Geometry, label: &str) -> Self {
        let data = MeshData::from_geometry(geometry);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let edge_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.edges),
            usage: wgpu::BufferUsages::INDEX,
        });
        let object_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<ObjectUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: object_buffer.as_entire_binding(),
            }],
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            edge_buffer,
            edge_count: data.edges.len() as u32,
            object_buffer,
            bind_group,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>, wireframe: bool) {
        let (buffer, count) = if wireframe {
            (&self.edge_buffer, self.edge_count)
        } else {
            (&self.index_buffer, self.index_count)
        };
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..count, 0, 0..1);
    }
}

struct Pipelines {
    front: wgpu::RenderPipeline,
    double_sided: wgpu::RenderPipeline,
    wireframe: wgpu::RenderPipeline,
    shadow: wgpu::RenderPipeline,
    shadow_wireframe: wgpu::RenderPipeline,
}

impl Pipelines {
    fn for_material(&self, material: &Material) -> &wgpu::RenderPipeline {
        if material.wireframe {
            &self.wireframe
        } else if material.side == Side::Double {
            &self.double_sided
        } else {
            &self.front
        }
    }
}

struct ShadowMap {
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
    size: u32,
}

/// Frame-rate overlay drawn with egui on top of the scene
struct Overlay {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

/// Forward renderer for the demo scene
pub struct Renderer {
    window: Arc<Window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    sample_count: u32,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    shadow_map: ShadowMap,
    pipelines: Pipelines,
    meshes: Vec<GpuMesh>,
    light_helper: GpuMesh,
    overlay: Option<Overlay>,
    reading: FpsReading,
}

impl Renderer {
    pub fn new(window: Arc<Window>, target: GpuTarget, scene: &SceneState, settings: &Settings) -> Result<Self> {
        let GpuTarget { instance: _instance, surface, adapter } = target;
        let (device, queue) = pollster::block_on(Self::request_device(&adapter))?;

        let size = window.inner_size();
        let surface_config = Self::create_surface_config(&surface, &adapter, Viewport::from(size));
        surface.configure(&device, &surface_config);

        let msaa_supported = adapter
            .get_texture_format_features(surface_config.format)
            .flags
            .sample_count_supported(MSAA_SAMPLES);
        let sample_count = if settings.antialias && msaa_supported { MSAA_SAMPLES } else { 1 };
        if settings.antialias && !msaa_supported {
            log::warn!("{}x MSAA not supported for {:?}, rendering without antialiasing", MSAA_SAMPLES, surface_config.format);
        }

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Layout"),
            entries: &[Self::uniform_entry(wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Layout"),
            entries: &[Self::uniform_entry(wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });
        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Map Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals Buffer"),
            size: std::mem::size_of::<GlobalsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let shadow_size = scene
            .point_light
            .shadow
            .map_size
            .min(device.limits().max_texture_dimension_2d);
        if shadow_size != scene.point_light.shadow.map_size {
            log::warn!("Shadow map clamped to {}px by device limits", shadow_size);
        }
        let shadow_map = Self::create_shadow_map(&device, &shadow_layout, shadow_size);

        let pipelines = Self::create_pipelines(
            &device,
            &globals_layout,
            &object_layout,
            &shadow_layout,
            surface_config.format,
            sample_count,
        );

        let meshes = scene
            .meshes
            .iter()
            .map(|mesh| GpuMesh::new(&device, &object_layout, &mesh.geometry, mesh.name))
            .collect();
        let light_helper = GpuMesh::new(
            &device,
            &object_layout,
            &Geometry::Box {
                width: LIGHT_HELPER_SIZE,
                height: LIGHT_HELPER_SIZE,
                depth: LIGHT_HELPER_SIZE,
            },
            "light helper",
        );

        let viewport = Viewport::new(surface_config.width, surface_config.height);
        let depth_view = Self::create_depth_view(&device, viewport, sample_count);
        let msaa_view = Self::create_msaa_view(&device, viewport, surface_config.format, sample_count);

        let overlay = settings.show_stats.then(|| {
            let ctx = egui::Context::default();
            let state = egui_winit::State::new(
                ctx.clone(),
                egui::ViewportId::ROOT,
                &*window,
                Some(window.scale_factor() as f32),
                None,
                None,
            );
            let renderer = egui_wgpu::Renderer::new(
                &device,
                surface_config.format,
                egui_wgpu::RendererOptions::default(),
            );
            Overlay { ctx, state, renderer }
        });

        log::info!(
            "Renderer initialized: {}x{}, {:?}, {}x MSAA, shadow map {}px",
            surface_config.width,
            surface_config.height,
            surface_config.format,
            sample_count,
            shadow_size
        );

        Ok(Self {
            window,
            device,
            queue,
            surface,
            surface_config,
            sample_count,
            depth_view,
            msaa_view,
            globals_buffer,
            globals_bind_group,
            shadow_map,
            pipelines,
            meshes,
            light_helper,
            overlay,
            reading: FpsReading::default(),
        })
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Scene Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| format!("Failed to create device: {:?}", e).into())
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        viewport: Viewport,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            // Fifo paces frames to the display refresh
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn uniform_entry(visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }
    }

    fn create_shadow_map(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, size: u32) -> ShadowMap {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Map Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        ShadowMap { view, bind_group, size }
    }

    fn create_depth_view(device: &wgpu::Device, viewport: Viewport, sample_count: u32) -> wgpu::TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("Depth Texture"),
                size: wgpu::Extent3d {
                    width: viewport.width.max(1),
                    height: viewport.height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_msaa_view(
        device: &wgpu::Device,
        viewport: Viewport,
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Option<wgpu::TextureView> {
        if sample_count == 1 {
            return None;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("MSAA Color Texture"),
            size: wgpu::Extent3d {
                width: viewport.width.max(1),
                height: viewport.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
    }

    fn create_pipelines(
        device: &wgpu::Device,
        globals_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
        shadow_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Pipelines {
        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shadow.wgsl").into()),
        });

        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[globals_layout, object_layout, shadow_layout],
            push_constant_ranges: &[],
        });
        let shadow_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[globals_layout, object_layout],
            push_constant_ranges: &[],
        });

        let scene_pipeline = |label: &str, topology: wgpu::PrimitiveTopology, cull_mode: Option<wgpu::Face>| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&scene_layout),
                vertex: wgpu::VertexState {
                    module: &scene_shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &scene_shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: sample_count,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
        };

        let shadow_pipeline = |label: &str, topology: wgpu::PrimitiveTopology| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&shadow_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shadow_shader,
                    entry_point: Some("vs_shadow"),
                    buffers: &[Vertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: None,
                primitive: wgpu::PrimitiveState {
                    topology,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    // Slope bias is only valid for triangle topologies
                    bias: if topology == wgpu::PrimitiveTopology::TriangleList {
                        wgpu::DepthBiasState {
                            constant: 2,
                            slope_scale: 2.0,
                            clamp: 0.0,
                        }
                    } else {
                        wgpu::DepthBiasState::default()
                    },
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        Pipelines {
            front: scene_pipeline("Scene Pipeline", wgpu::PrimitiveTopology::TriangleList, Some(wgpu::Face::Back)),
            double_sided: scene_pipeline("Double-Sided Pipeline", wgpu::PrimitiveTopology::TriangleList, None),
            wireframe: scene_pipeline("Wireframe Pipeline", wgpu::PrimitiveTopology::LineList, None),
            shadow: shadow_pipeline("Shadow Pipeline", wgpu::PrimitiveTopology::TriangleList),
            shadow_wireframe: shadow_pipeline("Shadow Wireframe Pipeline", wgpu::PrimitiveTopology::LineList),
        }
    }

    /// Match the drawable size. Empty viewports are ignored.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }
        self.surface_config.width = viewport.width;
        self.surface_config.height = viewport.height;
        self.surface.configure(&self.device, &self.surface_config);

        self.depth_view = Self::create_depth_view(&self.device, viewport, self.sample_count);
        self.msaa_view =
            Self::create_msaa_view(&self.device, viewport, self.surface_config.format, self.sample_count);
        log::debug!("Surface resized to {}x{}", viewport.width, viewport.height);
    }

    /// Reapply the current configuration after the surface was lost or outdated
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Give egui first look at a window event. Returns true if it consumed it.
    pub fn handle_event(&mut self, event: &winit::event::WindowEvent) -> bool {
        match &mut self.overlay {
            Some(overlay) => overlay.state.on_window_event(&self.window, event).consumed,
            None => false,
        }
    }

    /// Frame-rate numbers shown by the overlay on the next draw
    pub fn set_reading(&mut self, reading: FpsReading) {
        self.reading = reading;
    }

    pub fn render(&mut self, scene: &SceneState) -> std::result::Result<(), wgpu::SurfaceError> {
        let texel = 1.0 / self.shadow_map.size as f32;
        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::cast_slice(&[globals_uniform(scene, texel)]),
        );
        for (gpu, mesh) in self.meshes.iter().zip(&scene.meshes) {
            self.queue
                .write_buffer(&gpu.object_buffer, 0, bytemuck::cast_slice(&[object_uniform(mesh)]));
        }
        self.queue.write_buffer(
            &self.light_helper.object_buffer,
            0,
            bytemuck::cast_slice(&[light_helper_uniform(&scene.point_light)]),
        );

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        if scene.point_light.cast_shadow {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            shadow_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for (gpu, mesh) in self.meshes.iter().zip(&scene.meshes) {
                if !mesh.cast_shadow {
                    continue;
                }
                let pipeline = if mesh.material.wireframe {
                    &self.pipelines.shadow_wireframe
                } else {
                    &self.pipelines.shadow
                };
                shadow_pass.set_pipeline(pipeline);
                gpu.draw(&mut shadow_pass, mesh.material.wireframe);
            }
        }

        {
            let (attachment_view, resolve_target) = match &self.msaa_view {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };
            let mut scene_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
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
            });
            scene_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            scene_pass.set_bind_group(2, &self.shadow_map.bind_group, &[]);

            for (gpu, mesh) in self.meshes.iter().zip(&scene.meshes) {
                scene_pass.set_pipeline(self.pipelines.for_material(&mesh.material));
                gpu.draw(&mut scene_pass, mesh.material.wireframe);
            }

            scene_pass.set_pipeline(&self.pipelines.wireframe);
            self.light_helper.draw(&mut scene_pass, true);
        }

        self.draw_overlay(&mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn draw_overlay(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let Some(overlay) = &mut self.overlay else {
            return;
        };

        let raw_input = overlay.state.take_egui_input(&self.window);
        let reading = self.reading;

        let full_output = overlay.ctx.run(raw_input, |ctx| {
            egui::Window::new("Stats")
                .title_bar(false)
                .resizable(false)
                .fixed_pos(egui::pos2(10.0, 10.0))
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(format!("{:.0} FPS", reading.fps))
                            .size(20.0)
                            .color(egui::Color32::from_rgb(74, 158, 255)),
                    );
                    ui.label(
                        egui::RichText::new(format!("{:.2} ms", reading.frame_ms))
                            .size(12.0)
                            .color(egui::Color32::GRAY),
                    );
                    ui.separator();
                    ui.label(
                        egui::RichText::new("Drag: orbit · Right-drag: pan · Scroll: zoom")
                            .size(11.0)
                            .color(egui::Color32::from_rgb(100, 200, 100)),
                    );
                });
        });

        overlay
            .state
            .handle_platform_output(&self.window, full_output.platform_output);

        let tris = overlay
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            overlay
                .renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.surface_config.width, self.surface_config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        overlay.renderer.update_buffers(
            &self.device,
            &self.queue,
            encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            overlay
                .renderer
                .render(&mut render_pass.forget_lifetime(), &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            overlay.renderer.free_texture(id);
        }
    }
}

impl SceneRenderer for Renderer {
    type Error = wgpu::SurfaceError;

    fn draw(&mut self, scene: &SceneState) -> std::result::Result<(), wgpu::SurfaceError> {
        self.render(scene)
    }
}

fn linear_color(hex: u32) -> [f32; 3] {
    srgb_to_linear(hex_to_rgb(hex))
}

/// Perspective view from the light toward the scene origin
pub fn light_view_projection(light: &PointLight) -> Mat4 {
    let eye = light.position;
    let direction = (Vec3::ZERO - eye).normalize_or_zero();
    // look_at degenerates when looking straight along the up axis
    let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let projection = Mat4::perspective_rh(SHADOW_FOV, 1.0, light.shadow.near, light.shadow.far);
    projection * Mat4::look_at_rh(eye, Vec3::ZERO, up)
}

pub fn globals_uniform(scene: &SceneState, shadow_texel: f32) -> GlobalsUniform {
    let light = &scene.point_light;
    let camera = &scene.camera;
    let ambient = linear_color(scene.ambient.color).map(|c| c * scene.ambient.intensity);
    let light_color = linear_color(light.color);

    GlobalsUniform {
        view_proj: camera.view_projection().to_cols_array_2d(),
        light_view_proj: light_view_projection(light).to_cols_array_2d(),
        camera_position: camera.position.extend(1.0).to_array(),
        light_position: light.position.extend(light.intensity).to_array(),
        light_color: [light_color[0], light_color[1], light_color[2], light.shadow.bias],
        ambient: [ambient[0], ambient[1], ambient[2], shadow_texel],
        clip: [camera.near, camera.far, 0.0, 0.0],
    }
}

pub fn object_uniform(mesh: &Mesh) -> ObjectUniform {
    let material = &mesh.material;
    ObjectUniform::new(
        mesh.model_matrix(),
        linear_color(material.color),
        material.shininess,
        material.kind.shader_id(),
        mesh.receive_shadow,
    )
}

fn light_helper_uniform(light: &PointLight) -> ObjectUniform {
    ObjectUniform::new(
        Mat4::from_translation(light.position),
        linear_color(light.color),
        0.0,
        MaterialKind::Basic.shader_id(),
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DEFAULT_SHADOW_MAP_SIZE;

    fn scene() -> SceneState {
        SceneState::bootstrap(Viewport::new(800, 600), DEFAULT_SHADOW_MAP_SIZE)
    }

    #[test]
    fn test_light_looks_at_origin() {
        let scene = scene();
        let clip = light_view_projection(&scene.point_light) * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_light_overhead_uses_alternate_up() {
        let mut light = scene().point_light;
        light.position = Vec3::new(0.0, 10.0, 0.0);
        let matrix = light_view_projection(&light);
        assert!(matrix.is_finite());
    }

    #[test]
    fn test_globals_pack_light_and_shadow_texel() {
        let scene = scene();
        let globals = globals_uniform(&scene, 1.0 / 4096.0);
        assert_eq!(globals.light_position, [-3.0, 3.0, 10.0, 1.0]);
        assert_eq!(globals.ambient[3], 1.0 / 4096.0);
        assert!((globals.ambient[0] - 0.2).abs() < 1e-6);
        assert_eq!([globals.clip[0], globals.clip[1]], [0.1, 1000.0]);
    }

    #[test]
    fn test_object_uniform_flags() {
        let scene = scene();
        let floor = scene.meshes.iter().find(|m| m.receive_shadow).unwrap();
        let uniform = object_uniform(floor);
        assert_eq!(uniform.params[0], MaterialKind::Lambert.shader_id());
        assert_eq!(uniform.params[1], 1);
    }
}
