//! The resource-layout and shader-assembly core.
//!
//! Data flow: [`uniform_layout`] packs the declared uniform fields,
//! [`binding`] assigns binding indices to every resource, [`vertex`]
//! assigns shader locations to vertex attributes, [`shader`] emits WGSL
//! from those assignments, and [`pipeline`] deduplicates the compiled
//! result.

pub mod binding;
pub mod pipeline;
pub mod shader;
pub mod shader_manager;
pub mod uniform_layout;
pub mod vertex;

pub use binding::{BindGroup, BindGroupBuilder, BindingSlot, BindingSlotKey, BoundResource};
pub use pipeline::{ComputePipelineId, PipelineCache, RenderPipelineId};
pub use shader::{ShaderSnippets, ShaderStage};
pub use shader_manager::ShaderModuleCache;
pub use uniform_layout::{
    UniformBlock, UniformField, UniformFieldLayout, UniformLayout, UniformType, compute_layout,
    compute_layout_from_tags,
};
pub use vertex::{GeneratedVertexLayout, VertexLayoutSignature, generate_vertex_layout};
