//! CPU-side resource descriptions and their GPU realizations.

pub mod buffer;
pub mod geometry;
pub mod sampler;
pub mod texture;

pub use buffer::{IndexBuffer, StorageBuffer, UniformBuffer, VertexAttributeDesc, VertexBuffer};
pub use geometry::{Geometry, GpuGeometry};
pub use sampler::Sampler;
pub use texture::{GpuTexture, Texture};
