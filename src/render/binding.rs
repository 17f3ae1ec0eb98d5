//! Resource Binding Planner
//!
//! Assigns binding indices to every declared resource and creates the
//! wgpu bind group layout and bind group from that assignment.
//!
//! Indices are assigned by walking resource kinds in a fixed order —
//! uniform blocks, samplers, textures, storage buffers — with one shared
//! counter, so the indices of a group are always the contiguous range
//! `0..n`. The layout entries, the bind group entries and the shader
//! declarations are all derived from the same ordered [`slots`] list; there
//! is no second loop that could drift out of step with the first.
//!
//! [`slots`]: BindGroupBuilder::slots

use crate::render::uniform_layout::UniformBlock;
use crate::resources::buffer::{StorageBuffer, UniformBuffer};
use crate::resources::sampler::Sampler;
use crate::resources::texture::{GpuTexture, Texture};

// Per-kind visibility. Uniform blocks feed every stage; samplers and
// textures are sampled in the raster stages; storage buffers are written by
// fragment or compute work.
const UBO_VISIBILITY: wgpu::ShaderStages = wgpu::ShaderStages::VERTEX
    .union(wgpu::ShaderStages::FRAGMENT)
    .union(wgpu::ShaderStages::COMPUTE);
const SAMPLER_VISIBILITY: wgpu::ShaderStages =
    wgpu::ShaderStages::VERTEX.union(wgpu::ShaderStages::FRAGMENT);
const TEXTURE_VISIBILITY: wgpu::ShaderStages =
    wgpu::ShaderStages::VERTEX.union(wgpu::ShaderStages::FRAGMENT);
const STORAGE_VISIBILITY: wgpu::ShaderStages =
    wgpu::ShaderStages::FRAGMENT.union(wgpu::ShaderStages::COMPUTE);

// ─── Slots ───────────────────────────────────────────────────────────────────

/// A planned binding: one resource and its assigned index.
pub struct BindingSlot<'a> {
    pub index: u32,
    pub resource: BoundResource<'a>,
}

/// The resource behind a binding slot.
pub enum BoundResource<'a> {
    UniformBlock { name: &'a str, block: &'a UniformBlock },
    Sampler(&'a Sampler),
    Texture(&'a Texture),
    Storage(&'a StorageBuffer),
}

/// Hashable identity of one slot, for pipeline keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingSlotKey {
    UniformBlock {
        byte_length: u64,
    },
    Sampler {
        binding_type: wgpu::SamplerBindingType,
    },
    Texture {
        sample_type: wgpu::TextureSampleType,
        view_dimension: wgpu::TextureViewDimension,
    },
    Storage {
        read_only: bool,
    },
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Collects the declared resources of one binding group.
///
/// Resources are recorded in declaration order within their kind; index
/// assignment happens in [`slots`](Self::slots).
#[derive(Default)]
pub struct BindGroupBuilder<'a> {
    ubos: Vec<(&'a str, &'a UniformBlock)>,
    samplers: Vec<&'a Sampler>,
    textures: Vec<&'a Texture>,
    storages: Vec<&'a StorageBuffer>,
}

impl<'a> BindGroupBuilder<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_uniform_block(&mut self, name: &'a str, block: &'a UniformBlock) -> &mut Self {
        self.ubos.push((name, block));
        self
    }

    pub fn add_sampler(&mut self, sampler: &'a Sampler) -> &mut Self {
        self.samplers.push(sampler);
        self
    }

    pub fn add_texture(&mut self, texture: &'a Texture) -> &mut Self {
        self.textures.push(texture);
        self
    }

    pub fn add_storage(&mut self, storage: &'a StorageBuffer) -> &mut Self {
        self.storages.push(storage);
        self
    }

    /// The planned slot list: kind order, contiguous indices from 0.
    ///
    /// Every consumer — layout creation, bind group creation, shader
    /// declaration emission, pipeline keying — iterates this list.
    #[must_use]
    pub fn slots(&self) -> Vec<BindingSlot<'_>> {
        let mut slots = Vec::with_capacity(
            self.ubos.len() + self.samplers.len() + self.textures.len() + self.storages.len(),
        );
        let mut index = 0;
        let mut push = |resource| {
            slots.push(BindingSlot { index, resource });
            index += 1;
        };

        for &(name, block) in &self.ubos {
            push(BoundResource::UniformBlock { name, block });
        }
        for &sampler in &self.samplers {
            push(BoundResource::Sampler(sampler));
        }
        for &texture in &self.textures {
            push(BoundResource::Texture(texture));
        }
        for &storage in &self.storages {
            push(BoundResource::Storage(storage));
        }
        slots
    }

    /// Hashable signature of the planned layout, for pipeline keys.
    #[must_use]
    pub fn signature(&self) -> Vec<BindingSlotKey> {
        self.slots()
            .iter()
            .map(|slot| match &slot.resource {
                BoundResource::UniformBlock { block, .. } => BindingSlotKey::UniformBlock {
                    byte_length: block.byte_length(),
                },
                BoundResource::Sampler(sampler) => BindingSlotKey::Sampler {
                    binding_type: sampler.binding_type,
                },
                BoundResource::Texture(texture) => BindingSlotKey::Texture {
                    sample_type: texture.sample_type,
                    view_dimension: texture.view_dimension,
                },
                BoundResource::Storage(storage) => BindingSlotKey::Storage {
                    read_only: storage.read_only(),
                },
            })
            .collect()
    }

    fn layout_entries(&self) -> Vec<wgpu::BindGroupLayoutEntry> {
        self.slots()
            .iter()
            .map(|slot| match &slot.resource {
                BoundResource::UniformBlock { .. } => wgpu::BindGroupLayoutEntry {
                    binding: slot.index,
                    visibility: UBO_VISIBILITY,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                BoundResource::Sampler(sampler) => wgpu::BindGroupLayoutEntry {
                    binding: slot.index,
                    visibility: SAMPLER_VISIBILITY,
                    ty: wgpu::BindingType::Sampler(sampler.binding_type),
                    count: None,
                },
                BoundResource::Texture(texture) => wgpu::BindGroupLayoutEntry {
                    binding: slot.index,
                    visibility: TEXTURE_VISIBILITY,
                    ty: wgpu::BindingType::Texture {
                        sample_type: texture.sample_type,
                        view_dimension: texture.view_dimension,
                        multisampled: false,
                    },
                    count: None,
                },
                BoundResource::Storage(storage) => wgpu::BindGroupLayoutEntry {
                    binding: slot.index,
                    visibility: STORAGE_VISIBILITY,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage {
                            read_only: storage.read_only(),
                        },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            })
            .collect()
    }

    /// Realizes every declared resource on the GPU and creates the layout
    /// and bind group.
    ///
    /// Uniform blocks get one uniform buffer each, filled from their
    /// staging bytes; samplers, textures and storage buffers are created
    /// from their descriptions. The returned [`BindGroup`] owns all of
    /// them.
    pub fn build(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> BindGroup {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Weft BindGroupLayout"),
            entries: &self.layout_entries(),
        });

        let mut ubo_buffers = Vec::with_capacity(self.ubos.len());
        for (name, block) in &self.ubos {
            let buffer = UniformBuffer::new(device, block.byte_length(), name);
            block.upload(queue, buffer.raw());
            ubo_buffers.push(buffer);
        }
        let gpu_samplers: Vec<wgpu::Sampler> =
            self.samplers.iter().map(|s| s.realize(device)).collect();
        let gpu_textures: Vec<GpuTexture> = self
            .textures
            .iter()
            .map(|t| t.realize(device, queue))
            .collect();
        let storage_buffers: Vec<wgpu::Buffer> =
            self.storages.iter().map(|s| s.realize(device)).collect();

        let slots = self.slots();
        let (mut ubo_cursor, mut sampler_cursor, mut texture_cursor, mut storage_cursor) =
            (0, 0, 0, 0);
        let entries: Vec<wgpu::BindGroupEntry<'_>> = slots
            .iter()
            .map(|slot| {
                let resource = match &slot.resource {
                    BoundResource::UniformBlock { .. } => {
                        let buffer = &ubo_buffers[ubo_cursor];
                        ubo_cursor += 1;
                        wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer: buffer.raw(),
                            offset: 0,
                            size: None,
                        })
                    }
                    BoundResource::Sampler(_) => {
                        let sampler = &gpu_samplers[sampler_cursor];
                        sampler_cursor += 1;
                        wgpu::BindingResource::Sampler(sampler)
                    }
                    BoundResource::Texture(_) => {
                        let texture = &gpu_textures[texture_cursor];
                        texture_cursor += 1;
                        wgpu::BindingResource::TextureView(texture.view())
                    }
                    BoundResource::Storage(_) => {
                        let buffer = &storage_buffers[storage_cursor];
                        storage_cursor += 1;
                        wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer,
                            offset: 0,
                            size: None,
                        })
                    }
                };
                wgpu::BindGroupEntry {
                    binding: slot.index,
                    resource,
                }
            })
            .collect();

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Weft BindGroup"),
            layout: &layout,
            entries: &entries,
        });

        BindGroup {
            group_index: 0,
            layout,
            bind_group,
            ubos: ubo_buffers,
            samplers: gpu_samplers,
            textures: gpu_textures,
            storage_buffers,
        }
    }
}

// ─── Bind Group ──────────────────────────────────────────────────────────────

/// A created bind group and the GPU resources realized for it.
pub struct BindGroup {
    /// The `@group` index used at bind time.
    pub group_index: u32,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    ubos: Vec<UniformBuffer>,
    samplers: Vec<wgpu::Sampler>,
    textures: Vec<GpuTexture>,
    storage_buffers: Vec<wgpu::Buffer>,
}

impl BindGroup {
    #[must_use]
    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(self.group_index, &self.bind_group, &[]);
    }

    pub fn bind_compute(&self, pass: &mut wgpu::ComputePass<'_>) {
        pass.set_bind_group(self.group_index, &self.bind_group, &[]);
    }

    /// Writes into the uniform buffer at binding `index`.
    ///
    /// Uniform blocks occupy the leading binding indices, so `index` is both
    /// the binding index and the position in the block list. Writing to an
    /// index that has no uniform buffer is recoverable misuse: it warns and
    /// does nothing, rather than tearing down an interactive loop.
    pub fn write_ubo(&self, queue: &wgpu::Queue, index: u32, offset: u64, data: &[u8]) {
        match self.ubos.get(index as usize) {
            Some(buffer) => buffer.write(queue, offset, data),
            None => log::warn!("No uniform buffer at binding {index}; write ignored"),
        }
    }

    /// Borrows the realized storage buffer at position `index` within the
    /// storage list, e.g. to copy results out after a dispatch.
    #[must_use]
    pub fn storage_buffer(&self, index: usize) -> Option<&wgpu::Buffer> {
        self.storage_buffers.get(index)
    }

    /// Borrows the realized sampler at position `index` within the sampler
    /// list.
    #[must_use]
    pub fn sampler(&self, index: usize) -> Option<&wgpu::Sampler> {
        self.samplers.get(index)
    }

    /// Destroys the owned buffers and textures.
    ///
    /// The bind group object itself (and its samplers) have no host-API
    /// destroy primitive; releasing them is left to the driver when the
    /// handles drop, and callers must not rely on prompt reclamation.
    pub fn destroy(&self) {
        for buffer in &self.ubos {
            buffer.destroy();
        }
        for texture in &self.textures {
            texture.destroy();
        }
        for buffer in &self.storage_buffers {
            buffer.destroy();
        }
    }
}
