//! WGPU render pipelines, one per program
//!
//! Bind groups are shared across programs:
//!
//! - group 0: the per-draw uniform block (dynamic offset)
//! - group 1: albedo, normal and roughness textures plus a filtering sampler
//! - group 2: the shadow depth map plus a comparison sampler
//!
//! Vertex positions come from buffer slot 0 and normals from slot 1.

use crate::backend::Program;

/// Depth format of the color pass and the shadow map
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const POSITIONS: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: 12,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    }],
};

const NORMALS: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: 12,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 1,
    }],
};

/// All pipelines and their bind group layouts
pub struct Pipelines {
    pub uniform_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    pub shadow_map_layout: wgpu::BindGroupLayout,
    mesh: wgpu::RenderPipeline,
    shadow: wgpu::RenderPipeline,
    sprite: wgpu::RenderPipeline,
    skybox: wgpu::RenderPipeline,
    lava: wgpu::RenderPipeline,
    lava_blend: wgpu::RenderPipeline,
}

/// Fixed-function state that differs between programs
struct PipelineDesc<'a> {
    label: &'a str,
    source: &'a str,
    layouts: &'a [&'a wgpu::BindGroupLayout],
    buffers: &'a [wgpu::VertexBufferLayout<'static>],
    /// `None` for depth-only pipelines
    color_format: Option<wgpu::TextureFormat>,
    blend: Option<wgpu::BlendState>,
    depth_write: bool,
    depth_bias: wgpu::DepthBiasState,
}

impl Pipelines {
    /// Build every pipeline for a color target of `surface_format`
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let shadow_map_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Map Bind Group Layout"),
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

        let lit = [&uniform_layout, &texture_layout, &shadow_map_layout];
        let textured = [&uniform_layout, &texture_layout];
        let plain = [&uniform_layout];

        let mesh = create_pipeline(
            device,
            &opaque("Mesh", include_str!("../shaders/mesh.wgsl"), &lit, &[POSITIONS, NORMALS], surface_format),
        );

        let shadow = create_pipeline(
            device,
            &PipelineDesc {
                color_format: None,
                depth_bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
                ..opaque("Shadow", include_str!("../shaders/shadow.wgsl"), &plain, &[POSITIONS], surface_format)
            },
        );

        let sprite = create_pipeline(
            device,
            &PipelineDesc {
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                ..opaque("Sprite", include_str!("../shaders/sprite.wgsl"), &textured, &[POSITIONS], surface_format)
            },
        );

        let skybox = create_pipeline(
            device,
            &PipelineDesc {
                depth_write: false,
                ..opaque("Skybox", include_str!("../shaders/skybox.wgsl"), &plain, &[POSITIONS], surface_format)
            },
        );

        let lava_source = include_str!("../shaders/lava.wgsl");
        let lava = create_pipeline(device, &opaque("Lava", lava_source, &lit, &[POSITIONS], surface_format));
        let lava_blend = create_pipeline(
            device,
            &PipelineDesc {
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                ..opaque("Lava Blend", lava_source, &lit, &[POSITIONS], surface_format)
            },
        );

        Self {
            uniform_layout,
            texture_layout,
            shadow_map_layout,
            mesh,
            shadow,
            sprite,
            skybox,
            lava,
            lava_blend,
        }
    }

    /// Pipeline for a program, honoring the blend flag where it matters
    pub fn get(&self, program: Program, blend: bool) -> &wgpu::RenderPipeline {
        match program {
            Program::Mesh => &self.mesh,
            Program::Shadow => &self.shadow,
            Program::Sprite => &self.sprite,
            Program::Skybox => &self.skybox,
            Program::Lava if blend => &self.lava_blend,
            Program::Lava => &self.lava,
        }
    }
}

/// Bind groups a program reads, beyond the uniform group
pub fn bind_groups(program: Program) -> (bool, bool) {
    match program {
        Program::Mesh | Program::Lava => (true, true),
        Program::Sprite => (true, false),
        Program::Shadow | Program::Skybox => (false, false),
    }
}

/// Opaque, depth-writing pipeline description
fn opaque<'a>(
    label: &'a str,
    source: &'a str,
    layouts: &'a [&'a wgpu::BindGroupLayout],
    buffers: &'a [wgpu::VertexBufferLayout<'static>],
    surface_format: wgpu::TextureFormat,
) -> PipelineDesc<'a> {
    PipelineDesc {
        label,
        source,
        layouts,
        buffers,
        color_format: Some(surface_format),
        blend: None,
        depth_write: true,
        depth_bias: wgpu::DepthBiasState::default(),
    }
}

fn create_pipeline(device: &wgpu::Device, desc: &PipelineDesc) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: desc.layouts,
        push_constant_ranges: &[],
    });

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(desc.label),
        source: wgpu::ShaderSource::Wgsl(desc.source.into()),
    });

    let targets = desc.color_format.map(|format| {
        [Some(wgpu::ColorTargetState {
            format,
            blend: desc.blend,
            write_mask: wgpu::ColorWrites::ALL,
        })]
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: desc.buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: targets.as_ref().map(|targets| wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: desc.depth_bias,
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_groups_per_program() {
        assert_eq!(bind_groups(Program::Mesh), (true, true));
        assert_eq!(bind_groups(Program::Lava), (true, true));
        assert_eq!(bind_groups(Program::Sprite), (true, false));
        assert_eq!(bind_groups(Program::Shadow), (false, false));
    }

    #[test]
    fn test_vertex_layouts() {
        assert_eq!(POSITIONS.array_stride, 12);
        assert_eq!(NORMALS.attributes[0].shader_location, 1);
    }
}
