//! Pipeline Cache
//!
//! Central owner of all `wgpu::RenderPipeline` and `wgpu::ComputePipeline`
//! instances. Pipelines are stored in contiguous `Vec`s and addressed
//! through lightweight [`RenderPipelineId`] / [`ComputePipelineId`] handles;
//! a full-state hash of the structural key maps each distinct descriptor to
//! exactly one compiled pipeline for the cache's lifetime.
//!
//! The cache is an explicitly constructed, explicitly owned object — there
//! is no process-wide singleton and no implicit first-device-wins state.
//! All access goes through `&mut self`, so the lookup and the insert of a
//! miss happen under one borrow and cannot interleave with another caller.
//!
//! There is no eviction: a long-lived process that keeps requesting novel
//! descriptors grows the cache without bound. That matches the intended
//! usage (a bounded set of material/geometry combinations); callers that
//! generate unbounded descriptor variety must `clear` explicitly.

use rustc_hash::FxHashMap;

use crate::render::pipeline::key::{
    ComputePipelineKey, DepthStencilKey, RenderPipelineKey, fx_hash_key,
};

// ─── Ids ─────────────────────────────────────────────────────────────────────

/// Handle to a cached render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderPipelineId(u32);

impl RenderPipelineId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a cached compute pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComputePipelineId(u32);

impl ComputePipelineId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ─── Dedup Pool ──────────────────────────────────────────────────────────────

/// Hash-keyed dedup storage: contiguous items plus a hash → index lookup.
///
/// The create closure runs only on a miss, which is the compile-once
/// guarantee of the cache.
pub(crate) struct PipelinePool<T> {
    items: Vec<T>,
    lookup: FxHashMap<u64, u32>,
}

impl<T> PipelinePool<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            lookup: FxHashMap::default(),
        }
    }

    pub(crate) fn get_or_insert_with(&mut self, hash: u64, create: impl FnOnce() -> T) -> u32 {
        if let Some(&index) = self.lookup.get(&hash) {
            return index;
        }
        let index = self.items.len() as u32;
        self.items.push(create());
        self.lookup.insert(hash, index);
        index
    }

    pub(crate) fn get(&self, index: u32) -> &T {
        &self.items[index as usize]
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    fn clear(&mut self) {
        self.items.clear();
        self.lookup.clear();
    }
}

// ─── Pipeline Cache ──────────────────────────────────────────────────────────

/// Pipeline storage and deduplication cache.
pub struct PipelineCache {
    render: PipelinePool<wgpu::RenderPipeline>,
    compute: PipelinePool<wgpu::ComputePipeline>,
}

impl Default for PipelineCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            render: PipelinePool::with_capacity(64),
            compute: PipelinePool::with_capacity(8),
        }
    }

    // ── Retrieval (execute-phase, O(1)) ──────────────────────────────────────

    /// Retrieve a render pipeline by handle. **Panics** if the id is invalid.
    #[inline]
    #[must_use]
    pub fn get_render_pipeline(&self, id: RenderPipelineId) -> &wgpu::RenderPipeline {
        self.render.get(id.0)
    }

    /// Retrieve a compute pipeline by handle. **Panics** if the id is invalid.
    #[inline]
    #[must_use]
    pub fn get_compute_pipeline(&self, id: ComputePipelineId) -> &wgpu::ComputePipeline {
        self.compute.get(id.0)
    }

    // ── Lookup or compile ────────────────────────────────────────────────────

    /// Looks up `key` and compiles a render pipeline only on a miss.
    pub fn get_or_create_render(
        &mut self,
        device: &wgpu::Device,
        key: &RenderPipelineKey,
        vertex_module: &wgpu::ShaderModule,
        fragment_module: &wgpu::ShaderModule,
        pipeline_layout: &wgpu::PipelineLayout,
        vertex_buffers: &[wgpu::VertexBufferLayout<'_>],
    ) -> RenderPipelineId {
        let hash = fx_hash_key(key);
        let index = self.render.get_or_insert_with(hash, || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Weft Render Pipeline"),
                layout: Some(pipeline_layout),
                vertex: wgpu::VertexState {
                    module: vertex_module,
                    entry_point: Some("vs_main"),
                    buffers: vertex_buffers,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: fragment_module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(key.color_target.as_wgpu())],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: key.topology,
                    strip_index_format: key.strip_index_format,
                    ..Default::default()
                },
                depth_stencil: key.depth_stencil.as_ref().map(DepthStencilKey::as_wgpu),
                multisample: key.multisample.as_wgpu(),
                multiview_mask: None,
                cache: None,
            })
        });
        RenderPipelineId(index)
    }

    /// Looks up `key` and compiles a compute pipeline only on a miss.
    pub fn get_or_create_compute(
        &mut self,
        device: &wgpu::Device,
        key: &ComputePipelineKey,
        shader_module: &wgpu::ShaderModule,
        pipeline_layout: &wgpu::PipelineLayout,
    ) -> ComputePipelineId {
        let hash = fx_hash_key(key);
        let index = self.compute.get_or_insert_with(hash, || {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("Weft Compute Pipeline"),
                layout: Some(pipeline_layout),
                module: shader_module,
                entry_point: Some("main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            })
        });
        ComputePipelineId(index)
    }

    // ── Stats ────────────────────────────────────────────────────────────────

    /// Number of cached render pipelines.
    #[must_use]
    pub fn render_pipeline_count(&self) -> usize {
        self.render.len()
    }

    /// Number of cached compute pipelines.
    #[must_use]
    pub fn compute_pipeline_count(&self) -> usize {
        self.compute.len()
    }

    /// Drops every cached pipeline.
    pub fn clear(&mut self) {
        self.render.clear();
        self.compute.clear();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
