//! Mesh
//!
//! The render-side composition entry point. A mesh is declared once —
//! geometry, uniforms, textures, samplers, storage buffers, shader
//! snippets — and construction runs the whole core in order: uniform
//! layout, binding plan, shader assembly for both raster stages, then
//! pipeline lookup. A configuration error aborts construction, so no draw
//! call can ever reference a partially built mesh.

use glam::Mat4;

use crate::errors::Result;
use crate::render::binding::{BindGroup, BindGroupBuilder};
use crate::render::pipeline::key::RenderPipelineKey;
use crate::render::pipeline::{PipelineCache, RenderPipelineId};
use crate::render::shader::{ShaderInput, ShaderSnippets, ShaderStage, assemble};
use crate::render::shader_manager::ShaderModuleCache;
use crate::render::uniform_layout::{UniformBlock, UniformField, UniformType};
use crate::render::vertex::generate_vertex_layout;
use crate::resources::buffer::StorageBuffer;
use crate::resources::geometry::{Geometry, GpuGeometry};
use crate::resources::sampler::Sampler;
use crate::resources::texture::Texture;

const MAT4_BYTES: u64 = 64;

/// The fixed per-draw transform block, bound at index 0 of every mesh.
fn transform_fields() -> [UniformField; 4] {
    [
        UniformField::new("projection", UniformType::Mat4x4F32),
        UniformField::new("view", UniformType::Mat4x4F32),
        UniformField::new("model", UniformType::Mat4x4F32),
        UniformField::new("normal", UniformType::Mat4x4F32),
    ]
}

/// Per-frame matrices written into the transform block before each draw.
///
/// The normal matrix is supplied by the caller; this layer does no scene
/// math.
#[derive(Debug, Clone, Copy)]
pub struct FrameTransforms {
    pub projection: Mat4,
    pub view: Mat4,
    pub model: Mat4,
    pub normal: Mat4,
}

impl Default for FrameTransforms {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
            normal: Mat4::IDENTITY,
        }
    }
}

/// Declarative mesh description.
pub struct MeshDescriptor {
    pub geometry: Geometry,
    /// Ordered fields of the optional user uniform block (binding 1).
    pub uniforms: Vec<UniformField>,
    pub textures: Vec<Texture>,
    pub samplers: Vec<Sampler>,
    pub storages: Vec<StorageBuffer>,
    pub vertex_shader: ShaderSnippets,
    pub fragment_shader: ShaderSnippets,
    pub color_format: wgpu::TextureFormat,
    pub blend: Option<wgpu::BlendState>,
    pub depth_stencil: Option<wgpu::DepthStencilState>,
    pub multisample: wgpu::MultisampleState,
}

impl MeshDescriptor {
    /// A descriptor with the default target state: `bgra8unorm` color,
    /// depth24plus with depth writes, no blending, no multisampling.
    #[must_use]
    pub fn new(
        geometry: Geometry,
        vertex_shader: ShaderSnippets,
        fragment_shader: ShaderSnippets,
    ) -> Self {
        Self {
            geometry,
            uniforms: Vec::new(),
            textures: Vec::new(),
            samplers: Vec::new(),
            storages: Vec::new(),
            vertex_shader,
            fragment_shader,
            color_format: wgpu::TextureFormat::Bgra8Unorm,
            blend: None,
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth24Plus,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
        }
    }
}

/// A fully built mesh: uploaded geometry, bind group and a cached pipeline
/// handle.
pub struct Mesh {
    /// The declarative geometry this mesh was built from.
    pub geometry: Geometry,
    gpu_geometry: GpuGeometry,
    bind_group: BindGroup,
    user_block: UniformBlock,
    /// Binding index of the user uniform block, when one exists.
    user_ubo_binding: Option<u32>,
    pipeline_id: RenderPipelineId,
}

impl Mesh {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shader_modules: &mut ShaderModuleCache,
        pipelines: &mut PipelineCache,
        desc: MeshDescriptor,
    ) -> Result<Self> {
        let transform_block = UniformBlock::new(&transform_fields())?;
        let user_block = UniformBlock::new(&desc.uniforms)?;

        // One builder feeds the bind group, the shader declarations and the
        // pipeline key, so their binding indices cannot diverge.
        let mut builder = BindGroupBuilder::new();
        builder.add_uniform_block("transform", &transform_block);
        if !user_block.is_empty() {
            builder.add_uniform_block("inputs", &user_block);
        }
        for sampler in &desc.samplers {
            builder.add_sampler(sampler);
        }
        for texture in &desc.textures {
            builder.add_texture(texture);
        }
        for storage in &desc.storages {
            builder.add_storage(storage);
        }

        let vertex_layout = generate_vertex_layout(&desc.geometry)?;
        let slots = builder.slots();

        let vertex_source = assemble(
            ShaderStage::Vertex,
            &ShaderInput {
                bindings: &slots,
                varyings: &vertex_layout.varyings,
                workgroup_size: [1, 1, 1],
                snippets: &desc.vertex_shader,
            },
        )?;
        let fragment_source = assemble(
            ShaderStage::Fragment,
            &ShaderInput {
                bindings: &slots,
                varyings: &vertex_layout.varyings,
                workgroup_size: [1, 1, 1],
                snippets: &desc.fragment_shader,
            },
        )?;

        let vertex_hash = shader_modules.ensure(device, &vertex_source, "Weft Vertex Shader");
        let fragment_hash = shader_modules.ensure(device, &fragment_source, "Weft Fragment Shader");

        let key = RenderPipelineKey {
            vertex_shader_hash: vertex_hash,
            fragment_shader_hash: fragment_hash,
            vertex_layout: vertex_layout.to_signature(),
            bindings: builder.signature().into(),
            topology: desc.geometry.topology,
            strip_index_format: desc.geometry.strip_index_format(),
            color_target: wgpu::ColorTargetState {
                format: desc.color_format,
                blend: desc.blend,
                write_mask: wgpu::ColorWrites::ALL,
            }
            .into(),
            depth_stencil: desc.depth_stencil.clone().map(Into::into),
            multisample: desc.multisample.into(),
        };

        let bind_group = builder.build(device, queue);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Weft Mesh Pipeline Layout"),
            bind_group_layouts: &[Some(bind_group.layout())],
            immediate_size: 0,
        });

        let vertex_buffers_layout: Vec<_> =
            vertex_layout.buffers.iter().map(|b| b.as_wgpu()).collect();

        let pipeline_id = pipelines.get_or_create_render(
            device,
            &key,
            shader_modules.module(vertex_hash),
            shader_modules.module(fragment_hash),
            &pipeline_layout,
            &vertex_buffers_layout,
        );

        let user_ubo_binding = if user_block.is_empty() { None } else { Some(1) };
        let gpu_geometry = desc.geometry.realize(device);

        Ok(Self {
            geometry: desc.geometry,
            gpu_geometry,
            bind_group,
            user_block,
            user_ubo_binding,
            pipeline_id,
        })
    }

    /// Handle of the pipeline this mesh draws with.
    #[must_use]
    pub fn pipeline_id(&self) -> RenderPipelineId {
        self.pipeline_id
    }

    /// Writes a value into a declared uniform field.
    ///
    /// Referencing a name outside the declared set is a hard error: the
    /// field has no assigned byte range, so there is nothing safe to write.
    pub fn set_uniform(&mut self, queue: &wgpu::Queue, name: &str, bytes: &[u8]) -> Result<()> {
        self.user_block.set(name, bytes)?;
        if let Some(binding) = self.user_ubo_binding {
            let offset = self
                .user_block
                .layout()
                .field(name)
                .map_or(0, |f| f.byte_offset);
            self.bind_group.write_ubo(queue, binding, offset, bytes);
        }
        Ok(())
    }

    /// Reads back the staged bytes of a declared uniform field.
    pub fn uniform_bytes(&self, name: &str) -> Result<&[u8]> {
        self.user_block.field_bytes(name)
    }

    /// Uploads the frame transforms, binds everything and draws.
    pub fn render(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        queue: &wgpu::Queue,
        pipelines: &PipelineCache,
        transforms: &FrameTransforms,
    ) {
        let matrices = [
            transforms.projection,
            transforms.view,
            transforms.model,
            transforms.normal,
        ];
        for (i, matrix) in matrices.iter().enumerate() {
            self.bind_group
                .write_ubo(queue, 0, i as u64 * MAT4_BYTES, bytemuck::bytes_of(matrix));
        }

        self.bind_group.bind(pass);
        pass.set_pipeline(pipelines.get_render_pipeline(self.pipeline_id));
        self.gpu_geometry.draw(pass);
    }

    /// Destroys owned buffers and textures. Pipeline objects stay in the
    /// cache; samplers and the bind group itself have no destroy primitive.
    pub fn destroy(&self) {
        self.gpu_geometry.destroy();
        self.bind_group.destroy();
    }
}
