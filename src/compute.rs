//! Compute Job
//!
//! The compute-side composition entry point: uniforms and storage buffers
//! in, a dispatchable pipeline out. The uniform block, when any fields are
//! declared, sits at binding 0 and the storage buffers follow it.

use crate::errors::Result;
use crate::render::binding::{BindGroup, BindGroupBuilder};
use crate::render::pipeline::key::ComputePipelineKey;
use crate::render::pipeline::{ComputePipelineId, PipelineCache};
use crate::render::shader::{ShaderInput, ShaderSnippets, ShaderStage, assemble};
use crate::render::shader_manager::ShaderModuleCache;
use crate::render::uniform_layout::{UniformBlock, UniformField};
use crate::resources::buffer::StorageBuffer;

/// Declarative compute description.
pub struct ComputeDescriptor {
    pub uniforms: Vec<UniformField>,
    pub storages: Vec<StorageBuffer>,
    pub shader: ShaderSnippets,
    pub workgroup_size: [u32; 3],
}

impl ComputeDescriptor {
    #[must_use]
    pub fn new(shader: ShaderSnippets) -> Self {
        Self {
            uniforms: Vec::new(),
            storages: Vec::new(),
            shader,
            workgroup_size: [64, 1, 1],
        }
    }
}

/// A fully built compute job.
pub struct ComputeJob {
    bind_group: BindGroup,
    uniform_block: UniformBlock,
    pipeline_id: ComputePipelineId,
}

impl ComputeJob {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shader_modules: &mut ShaderModuleCache,
        pipelines: &mut PipelineCache,
        desc: ComputeDescriptor,
    ) -> Result<Self> {
        let uniform_block = UniformBlock::new(&desc.uniforms)?;

        let mut builder = BindGroupBuilder::new();
        if !uniform_block.is_empty() {
            builder.add_uniform_block("inputs", &uniform_block);
        }
        for storage in &desc.storages {
            builder.add_storage(storage);
        }

        let slots = builder.slots();
        let source = assemble(
            ShaderStage::Compute,
            &ShaderInput {
                bindings: &slots,
                varyings: &[],
                workgroup_size: desc.workgroup_size,
                snippets: &desc.shader,
            },
        )?;

        let shader_hash = shader_modules.ensure(device, &source, "Weft Compute Shader");

        let key = ComputePipelineKey {
            shader_hash,
            bindings: builder.signature().into(),
        };

        let bind_group = builder.build(device, queue);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Weft Compute Pipeline Layout"),
            bind_group_layouts: &[Some(bind_group.layout())],
            immediate_size: 0,
        });

        let pipeline_id = pipelines.get_or_create_compute(
            device,
            &key,
            shader_modules.module(shader_hash),
            &pipeline_layout,
        );

        Ok(Self {
            bind_group,
            uniform_block,
            pipeline_id,
        })
    }

    /// Handle of the pipeline this job dispatches with.
    #[must_use]
    pub fn pipeline_id(&self) -> ComputePipelineId {
        self.pipeline_id
    }

    /// Writes a value into a declared uniform field. Unknown names are a
    /// hard error.
    pub fn set_uniform(&mut self, queue: &wgpu::Queue, name: &str, bytes: &[u8]) -> Result<()> {
        self.uniform_block.set(name, bytes)?;
        let offset = self
            .uniform_block
            .layout()
            .field(name)
            .map_or(0, |f| f.byte_offset);
        self.bind_group.write_ubo(queue, 0, offset, bytes);
        Ok(())
    }

    /// Reads back the staged bytes of a declared uniform field.
    pub fn uniform_bytes(&self, name: &str) -> Result<&[u8]> {
        self.uniform_block.field_bytes(name)
    }

    pub fn dispatch(
        &self,
        pass: &mut wgpu::ComputePass<'_>,
        pipelines: &PipelineCache,
        x: u32,
        y: u32,
        z: u32,
    ) {
        self.bind_group.bind_compute(pass);
        pass.set_pipeline(pipelines.get_compute_pipeline(self.pipeline_id));
        pass.dispatch_workgroups(x, y, z);
    }

    /// Borrows the realized storage buffer at position `index` within the
    /// declared storage list, e.g. to copy results out after a dispatch.
    #[must_use]
    pub fn storage_buffer(&self, index: usize) -> Option<&wgpu::Buffer> {
        self.bind_group.storage_buffer(index)
    }

    pub fn destroy(&self) {
        self.bind_group.destroy();
    }
}
