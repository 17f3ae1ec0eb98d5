//! Pipeline keys and the deduplicating pipeline cache.

pub mod cache;
pub mod key;

pub use cache::{ComputePipelineId, PipelineCache, RenderPipelineId};
pub use key::{ComputePipelineKey, RenderPipelineKey, fx_hash_key};
