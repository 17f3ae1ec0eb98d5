#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Weft — a declarative composition layer over wgpu.
//!
//! Callers describe meshes and compute jobs as data: named uniform fields,
//! textures, samplers, storage buffers, and free-text shader snippets. The
//! crate packs the uniforms into a std140-style byte layout, assigns
//! binding indices, assembles binding-correct WGSL for each stage, and
//! deduplicates compiled pipelines by structural key.

pub mod compute;
pub mod errors;
pub mod mesh;
pub mod render;
pub mod resources;

pub use compute::{ComputeDescriptor, ComputeJob};
pub use errors::{Result, WeftError};
pub use mesh::{FrameTransforms, Mesh, MeshDescriptor};
pub use render::{
    BindGroup, BindGroupBuilder, PipelineCache, ShaderModuleCache, ShaderSnippets, ShaderStage,
    UniformBlock, UniformField, UniformLayout, UniformType, compute_layout,
    compute_layout_from_tags,
};
pub use resources::{
    Geometry, IndexBuffer, Sampler, StorageBuffer, Texture, UniformBuffer, VertexBuffer,
};
