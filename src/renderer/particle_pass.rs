use wgpu::util::DeviceExt;

use crate::{field::ParticleField, render_loop::ParticleUniforms};

#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
struct QuadVertex {
    corner: [f32; 2],
}

impl QuadVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

// two triangles covering the sprite, centered on the particle
const QUAD: [QuadVertex; 6] = [
    QuadVertex { corner: [-0.5, -0.5] },
    QuadVertex { corner: [0.5, -0.5] },
    QuadVertex { corner: [-0.5, 0.5] },
    QuadVertex { corner: [0.5, -0.5] },
    QuadVertex { corner: [0.5, 0.5] },
    QuadVertex { corner: [-0.5, 0.5] },
];

const POSITION_ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const RANDOM_ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x4];
const COLOR_ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![3 => Float32x3];

fn instance_layout(
    stride: usize,
    attributes: &'static [wgpu::VertexAttribute],
) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (stride * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes,
    }
}

struct InstanceBuffers {
    positions: wgpu::Buffer,
    randoms: wgpu::Buffer,
    colors: wgpu::Buffer,
    count: u32,
}

/// Draws the whole field as instanced, alpha-blended sprites.
pub struct ParticleRenderPass {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    quad_buffer: wgpu::Buffer,
    instances: Option<InstanceBuffers>,
}

impl ParticleRenderPass {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Uniform Buffer"),
            size: std::mem::size_of::<ParticleUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Quad Buffer"),
            contents: bytemuck::cast_slice(&QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("particles.wgsl").into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[
                    QuadVertex::desc(),
                    instance_layout(ParticleField::POSITION_STRIDE, &POSITION_ATTRIBS),
                    instance_layout(ParticleField::RANDOM_STRIDE, &RANDOM_ATTRIBS),
                    instance_layout(ParticleField::COLOR_STRIDE, &COLOR_ATTRIBS),
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            // sprites blend in submission order, no depth test
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            bind_group,
            uniform_buffer,
            quad_buffer,
            instances: None,
        }
    }

    /// Creates the per-instance vertex buffers. An empty field uploads
    /// nothing and later draws are skipped.
    pub fn upload(&mut self, device: &wgpu::Device, field: &ParticleField) {
        if field.is_empty() {
            self.instances = None;
            return;
        }

        let buffer = |label: &str, data: &[f32]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            })
        };

        self.instances = Some(InstanceBuffers {
            positions: buffer("Particle Position Buffer", field.positions()),
            randoms: buffer("Particle Random Buffer", field.randoms()),
            colors: buffer("Particle Color Buffer", field.colors()),
            count: field.len() as u32,
        });
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.as_ref().map_or(0, |i| i.count)
    }

    pub fn render(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        color_target: &wgpu::TextureView,
        clear_color: wgpu::Color,
        uniforms: &ParticleUniforms,
    ) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Particle Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let Some(instances) = &self.instances else {
            return;
        };

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
        render_pass.set_vertex_buffer(1, instances.positions.slice(..));
        render_pass.set_vertex_buffer(2, instances.randoms.slice(..));
        render_pass.set_vertex_buffer(3, instances.colors.slice(..));
        render_pass.draw(0..QUAD.len() as u32, 0..instances.count);
    }

    /// Drops the instance buffers, destroying them first.
    pub fn release(&mut self) {
        if let Some(instances) = self.instances.take() {
            instances.positions.destroy();
            instances.randoms.destroy();
            instances.colors.destroy();
        }
        self.uniform_buffer.destroy();
        self.quad_buffer.destroy();
    }
}
