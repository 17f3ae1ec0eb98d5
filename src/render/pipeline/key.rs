//! Strongly-typed pipeline cache keys.
//!
//! Several `wgpu` descriptor types (`ColorTargetState`, `DepthStencilState`)
//! do not implement `Hash` / `Eq`, so this module defines *mirror* types
//! that extract the fields relevant for pipeline identity and derive the
//! trait impls. Float fields are stored as bit patterns.
//!
//! Key identity is structural: it derives from struct fields in a fixed
//! declaration order, never from map iteration or property insertion order,
//! so two logically identical descriptors always hash identically.

use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use crate::render::binding::BindingSlotKey;
use crate::render::vertex::VertexLayoutSignature;

// ─── Hashable Mirror Types ────────────────────────────────────────────────────

/// Hashable mirror of `wgpu::BlendState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendStateKey {
    pub color: BlendComponentKey,
    pub alpha: BlendComponentKey,
}

/// Hashable mirror of `wgpu::BlendComponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponentKey {
    pub src_factor: wgpu::BlendFactor,
    pub dst_factor: wgpu::BlendFactor,
    pub operation: wgpu::BlendOperation,
}

impl From<wgpu::BlendState> for BlendStateKey {
    fn from(b: wgpu::BlendState) -> Self {
        let component = |c: wgpu::BlendComponent| BlendComponentKey {
            src_factor: c.src_factor,
            dst_factor: c.dst_factor,
            operation: c.operation,
        };
        Self {
            color: component(b.color),
            alpha: component(b.alpha),
        }
    }
}

impl BlendStateKey {
    #[must_use]
    pub fn as_wgpu(&self) -> wgpu::BlendState {
        let component = |c: BlendComponentKey| wgpu::BlendComponent {
            src_factor: c.src_factor,
            dst_factor: c.dst_factor,
            operation: c.operation,
        };
        wgpu::BlendState {
            color: component(self.color),
            alpha: component(self.alpha),
        }
    }
}

/// Hashable mirror of `wgpu::ColorTargetState`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorTargetKey {
    pub format: wgpu::TextureFormat,
    pub blend: Option<BlendStateKey>,
    pub write_mask: u32,
}

impl From<wgpu::ColorTargetState> for ColorTargetKey {
    fn from(c: wgpu::ColorTargetState) -> Self {
        Self {
            format: c.format,
            blend: c.blend.map(Into::into),
            write_mask: c.write_mask.bits(),
        }
    }
}

impl ColorTargetKey {
    #[must_use]
    pub fn as_wgpu(&self) -> wgpu::ColorTargetState {
        wgpu::ColorTargetState {
            format: self.format,
            blend: self.blend.map(|b| b.as_wgpu()),
            write_mask: wgpu::ColorWrites::from_bits_truncate(self.write_mask),
        }
    }
}

/// Hashable mirror of `wgpu::StencilFaceState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilFaceKey {
    pub compare: wgpu::CompareFunction,
    pub fail_op: wgpu::StencilOperation,
    pub depth_fail_op: wgpu::StencilOperation,
    pub pass_op: wgpu::StencilOperation,
}

impl StencilFaceKey {
    fn from_wgpu(s: wgpu::StencilFaceState) -> Self {
        Self {
            compare: s.compare,
            fail_op: s.fail_op,
            depth_fail_op: s.depth_fail_op,
            pass_op: s.pass_op,
        }
    }

    fn as_wgpu(self) -> wgpu::StencilFaceState {
        wgpu::StencilFaceState {
            compare: self.compare,
            fail_op: self.fail_op,
            depth_fail_op: self.depth_fail_op,
            pass_op: self.pass_op,
        }
    }
}

/// Hashable mirror of `wgpu::DepthStencilState`. Bias floats are stored as
/// bit patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilKey {
    pub format: wgpu::TextureFormat,
    pub depth_write_enabled: bool,
    pub depth_compare: wgpu::CompareFunction,
    pub stencil_front: StencilFaceKey,
    pub stencil_back: StencilFaceKey,
    pub stencil_read_mask: u32,
    pub stencil_write_mask: u32,
    pub bias_constant: i32,
    pub bias_slope_scale_bits: u32,
    pub bias_clamp_bits: u32,
}

impl From<wgpu::DepthStencilState> for DepthStencilKey {
    fn from(d: wgpu::DepthStencilState) -> Self {
        Self {
            format: d.format,
            depth_write_enabled: d
                .depth_write_enabled
                .expect("depth_write_enabled must be Some for a depth format"),
            depth_compare: d
                .depth_compare
                .expect("depth_compare must be Some for a depth format"),
            stencil_front: StencilFaceKey::from_wgpu(d.stencil.front),
            stencil_back: StencilFaceKey::from_wgpu(d.stencil.back),
            stencil_read_mask: d.stencil.read_mask,
            stencil_write_mask: d.stencil.write_mask,
            bias_constant: d.bias.constant,
            bias_slope_scale_bits: d.bias.slope_scale.to_bits(),
            bias_clamp_bits: d.bias.clamp.to_bits(),
        }
    }
}

impl DepthStencilKey {
    #[must_use]
    pub fn as_wgpu(&self) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: self.format,
            depth_write_enabled: Some(self.depth_write_enabled),
            depth_compare: Some(self.depth_compare),
            stencil: wgpu::StencilState {
                front: self.stencil_front.as_wgpu(),
                back: self.stencil_back.as_wgpu(),
                read_mask: self.stencil_read_mask,
                write_mask: self.stencil_write_mask,
            },
            bias: wgpu::DepthBiasState {
                constant: self.bias_constant,
                slope_scale: f32::from_bits(self.bias_slope_scale_bits),
                clamp: f32::from_bits(self.bias_clamp_bits),
            },
        }
    }
}

/// Hashable mirror of `wgpu::MultisampleState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MultisampleKey {
    pub count: u32,
    pub mask: u64,
    pub alpha_to_coverage_enabled: bool,
}

impl From<wgpu::MultisampleState> for MultisampleKey {
    fn from(m: wgpu::MultisampleState) -> Self {
        Self {
            count: m.count,
            mask: m.mask,
            alpha_to_coverage_enabled: m.alpha_to_coverage_enabled,
        }
    }
}

impl MultisampleKey {
    #[must_use]
    pub fn as_wgpu(&self) -> wgpu::MultisampleState {
        wgpu::MultisampleState {
            count: self.count,
            mask: self.mask,
            alpha_to_coverage_enabled: self.alpha_to_coverage_enabled,
        }
    }
}

// ─── Pipeline Keys ────────────────────────────────────────────────────────────

/// Cache key for a render pipeline: the full structural description of the
/// pipeline, with shader sources collapsed into xxh3-128 content hashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderPipelineKey {
    pub vertex_shader_hash: u128,
    pub fragment_shader_hash: u128,
    pub vertex_layout: VertexLayoutSignature,
    pub bindings: SmallVec<[BindingSlotKey; 8]>,
    pub topology: wgpu::PrimitiveTopology,
    pub strip_index_format: Option<wgpu::IndexFormat>,
    pub color_target: ColorTargetKey,
    pub depth_stencil: Option<DepthStencilKey>,
    pub multisample: MultisampleKey,
}

/// Cache key for a compute pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComputePipelineKey {
    pub shader_hash: u128,
    pub bindings: SmallVec<[BindingSlotKey; 8]>,
}

// ─── Convenience helpers ──────────────────────────────────────────────────────

/// Compute a `u64` hash of any `Hash`-able value using `FxHasher`.
#[inline]
#[must_use]
pub fn fx_hash_key<K: Hash>(key: &K) -> u64 {
    let mut hasher = rustc_hash::FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}
