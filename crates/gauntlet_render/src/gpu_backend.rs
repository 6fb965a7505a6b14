//! WGPU implementation of [`RenderBackend`]
//!
//! Draws are queued during a frame and encoded in [`RenderBackend::finish`]:
//! the shadow pass into a square depth texture, then the color pass into
//! the surface. Every draw's uniform block lives in one buffer at a fixed
//! stride and is bound with a dynamic offset. Geometry is uploaded the first
//! time it is drawn and cached by [`GeometryId`] until released.

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;

use gauntlet_core::{GeometryId, TextureHandle, TextureSet, TextureSlot};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::backend::{DrawCall, Program, RenderBackend, RenderPass};
use crate::context::{RenderContext, RenderError};
use crate::pipelines::{bind_groups, Pipelines, DEPTH_FORMAT};

/// Distance between uniform blocks in the uniform buffer
pub const UNIFORM_STRIDE: u64 = 512;
const INITIAL_UNIFORM_SLOTS: u64 = 256;

struct GpuGeometry {
    positions: wgpu::Buffer,
    normals: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

struct QueuedDraw {
    geometry: GeometryId,
    program: Program,
    blend: bool,
    textures: TextureSet,
    uniform_offset: u32,
}

struct DepthTarget {
    view: wgpu::TextureView,
    size: (u32, u32),
}

struct ShadowTarget {
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
    resolution: u32,
}

/// GPU backend drawing to a window surface
pub struct WgpuBackend {
    pub context: RenderContext,
    pipelines: Pipelines,
    geometries: HashMap<GeometryId, GpuGeometry>,
    textures: Vec<wgpu::TextureView>,
    white: wgpu::TextureView,
    sampler: wgpu::Sampler,
    shadow_sampler: wgpu::Sampler,
    texture_groups: HashMap<TextureSet, wgpu::BindGroup>,
    uniform_buffer: wgpu::Buffer,
    uniform_group: wgpu::BindGroup,
    uniform_capacity: u64,
    uniform_data: Vec<u8>,
    depth: Option<DepthTarget>,
    shadow: Option<ShadowTarget>,
    shadow_resolution: u32,
    clear_color: [f32; 4],
    current_pass: RenderPass,
    shadow_draws: Vec<QueuedDraw>,
    color_draws: Vec<QueuedDraw>,
}

impl WgpuBackend {
    /// Create a backend for `window`
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self, RenderError> {
        let context = RenderContext::new(window, vsync).await?;
        Ok(Self::from_context(context))
    }

    /// Create a backend on an existing context
    pub fn from_context(context: RenderContext) -> Self {
        let device = &context.device;
        let pipelines = Pipelines::new(device, context.config.format);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Texture Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let white = upload_rgba(device, &context.queue, 1, 1, &[255, 255, 255, 255]);
        let capacity = INITIAL_UNIFORM_SLOTS * UNIFORM_STRIDE;
        let (uniform_buffer, uniform_group) = create_uniform_buffer(device, &pipelines, capacity);

        Self {
            context,
            pipelines,
            geometries: HashMap::new(),
            textures: Vec::new(),
            white,
            sampler,
            shadow_sampler,
            texture_groups: HashMap::new(),
            uniform_buffer,
            uniform_group,
            uniform_capacity: capacity,
            uniform_data: Vec::new(),
            depth: None,
            shadow: None,
            shadow_resolution: 1,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            current_pass: RenderPass::Shadow,
            shadow_draws: Vec::new(),
            color_draws: Vec::new(),
        }
    }

    /// Resize the surface
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.context.resize(size);
    }

    /// Number of geometries currently resident on the GPU
    pub fn cached_geometries(&self) -> usize {
        self.geometries.len()
    }

    fn upload_geometry(&mut self, call: &DrawCall) {
        let geometry = &call.geometry;
        if self.geometries.contains_key(&geometry.id()) {
            return;
        }

        let device = &self.context.device;
        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Geometry Positions"),
            contents: bytemuck::cast_slice(geometry.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let normals = if geometry.normals().len() == geometry.vertices().len() {
            bytemuck::cast_slice(geometry.normals()).to_vec()
        } else {
            vec![0u8; geometry.vertices().len() * 4]
        };
        let normals = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Geometry Normals"),
            contents: &normals,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Geometry Indices"),
            contents: bytemuck::cast_slice(geometry.triangles()),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::trace!("uploaded geometry {} ({} indices)", geometry.id().raw(), geometry.index_count());
        self.geometries.insert(
            geometry.id(),
            GpuGeometry {
                positions,
                normals,
                indices,
                index_count: geometry.index_count() as u32,
            },
        );
    }

    fn ensure_texture_group(&mut self, textures: TextureSet) {
        if self.texture_groups.contains_key(&textures) {
            return;
        }
        let view = |slot| {
            textures
                .get(slot)
                .and_then(|TextureHandle(i)| self.textures.get(i as usize))
                .unwrap_or(&self.white)
        };
        let group = self.context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Bind Group"),
            layout: &self.pipelines.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view(TextureSlot::Albedo)),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view(TextureSlot::NormalMap)),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(view(TextureSlot::RoughnessMap)),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.texture_groups.insert(textures, group);
    }

    fn ensure_uniform_capacity(&mut self) {
        let needed = self.uniform_data.len() as u64;
        if needed <= self.uniform_capacity {
            return;
        }
        let capacity = needed.next_power_of_two();
        log::debug!("growing uniform buffer to {} bytes", capacity);
        let (buffer, group) = create_uniform_buffer(&self.context.device, &self.pipelines, capacity);
        self.uniform_buffer = buffer;
        self.uniform_group = group;
        self.uniform_capacity = capacity;
    }

    /// Ensure depth texture exists and is the right size
    fn ensure_depth_texture(&mut self, width: u32, height: u32) {
        if self.depth.as_ref().is_some_and(|d| d.size == (width, height)) {
            return;
        }
        let texture = create_depth_texture(&self.context.device, "Depth Texture", width, height);
        self.depth = Some(DepthTarget {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            size: (width, height),
        });
    }

    fn ensure_shadow_map(&mut self, resolution: u32) {
        if self.shadow.as_ref().is_some_and(|s| s.resolution == resolution) {
            return;
        }
        let texture = create_depth_texture(&self.context.device, "Shadow Map", resolution, resolution);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Map Bind Group"),
            layout: &self.pipelines.shadow_map_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.shadow_sampler),
                },
            ],
        });
        self.shadow = Some(ShadowTarget {
            view,
            bind_group,
            resolution,
        });
    }

    fn encode_draw(&self, pass: &mut wgpu::RenderPass<'_>, draw: &QueuedDraw) {
        let Some(geometry) = self.geometries.get(&draw.geometry) else {
            return;
        };
        if geometry.index_count == 0 {
            return;
        }

        pass.set_pipeline(self.pipelines.get(draw.program, draw.blend));
        pass.set_bind_group(0, &self.uniform_group, &[draw.uniform_offset]);

        let (textured, shadowed) = bind_groups(draw.program);
        if textured {
            if let Some(group) = self.texture_groups.get(&draw.textures) {
                pass.set_bind_group(1, group, &[]);
            }
        }
        if shadowed {
            if let Some(shadow) = &self.shadow {
                pass.set_bind_group(2, &shadow.bind_group, &[]);
            }
        }

        pass.set_vertex_buffer(0, geometry.positions.slice(..));
        if draw.program == Program::Mesh {
            pass.set_vertex_buffer(1, geometry.normals.slice(..));
        }
        pass.set_index_buffer(geometry.indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..geometry.index_count, 0, 0..1);
    }
}

impl RenderBackend for WgpuBackend {
    type Error = RenderError;

    fn max_texture_size(&self) -> u32 {
        self.context.max_texture_size()
    }

    fn aspect_ratio(&self) -> f32 {
        self.context.aspect_ratio()
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureHandle {
        let view = if rgba.len() == (width as usize) * (height as usize) * 4 && width > 0 && height > 0 {
            upload_rgba(&self.context.device, &self.context.queue, width, height, rgba)
        } else {
            log::warn!("texture data does not match {}x{}, using white", width, height);
            upload_rgba(&self.context.device, &self.context.queue, 1, 1, &[255, 255, 255, 255])
        };
        self.textures.push(view);
        TextureHandle(self.textures.len() as u32 - 1)
    }

    fn release_geometry(&mut self, id: GeometryId) {
        if self.geometries.remove(&id).is_some() {
            log::trace!("released geometry {}", id.raw());
        }
    }

    fn begin_pass(&mut self, pass: RenderPass, resolution: u32, clear_color: [f32; 4]) {
        if pass == RenderPass::Shadow {
            self.shadow_resolution = resolution.max(1);
            self.shadow_draws.clear();
            self.color_draws.clear();
            self.uniform_data.clear();
        } else {
            self.clear_color = clear_color;
        }
        self.current_pass = pass;
    }

    fn draw(&mut self, call: DrawCall) {
        self.upload_geometry(&call);
        let (textured, _) = bind_groups(call.program());
        if textured {
            self.ensure_texture_group(call.textures);
        }

        let uniform_offset = self.uniform_data.len() as u32;
        let bytes = call.uniforms.as_bytes();
        self.uniform_data.extend_from_slice(bytes);
        self.uniform_data.resize(uniform_offset as usize + UNIFORM_STRIDE as usize, 0);

        let queued = QueuedDraw {
            geometry: call.geometry.id(),
            program: call.program(),
            blend: call.blend,
            textures: call.textures,
            uniform_offset,
        };
        match self.current_pass {
            RenderPass::Shadow => self.shadow_draws.push(queued),
            RenderPass::Color => self.color_draws.push(queued),
        }
    }

    fn finish(&mut self) -> Result<(), RenderError> {
        let output = match self.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.context.reconfigure();
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };
        let target = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.ensure_uniform_capacity();
        self.context.queue.write_buffer(&self.uniform_buffer, 0, &self.uniform_data);
        self.ensure_depth_texture(self.context.config.width, self.context.config.height);
        self.ensure_shadow_map(self.shadow_resolution);

        let (Some(depth), Some(shadow)) = (&self.depth, &self.shadow) else {
            return Ok(());
        };

        let mut encoder = self.context.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &shadow.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            for draw in &self.shadow_draws {
                self.encode_draw(&mut pass, draw);
            }
        }

        {
            let [r, g, b, a] = self.clear_color;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Color Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            for draw in &self.color_draws {
                self.encode_draw(&mut pass, draw);
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn create_uniform_buffer(device: &wgpu::Device, pipelines: &Pipelines, size: u64) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Uniform Buffer"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Uniform Bind Group"),
        layout: &pipelines.uniform_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(UNIFORM_STRIDE),
            }),
        }],
    });
    (buffer, group)
}

fn create_depth_texture(device: &wgpu::Device, label: &str, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    })
}

fn upload_rgba(device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32, rgba: &[u8]) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MeshUniforms;
    use std::mem::size_of;

    #[test]
    fn test_uniform_stride_fits_every_block() {
        assert!(size_of::<MeshUniforms>() as u64 <= UNIFORM_STRIDE);
        // default min_uniform_buffer_offset_alignment
        assert_eq!(UNIFORM_STRIDE % 256, 0);
    }
}
