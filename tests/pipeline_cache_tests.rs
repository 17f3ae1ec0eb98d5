//! Pipeline Key Tests
//!
//! Tests for:
//! - deterministic hashing: structurally identical keys hash identically,
//!   regardless of how their parts were produced
//! - sensitivity: any structural difference produces a different key
//!
//! The compile-once behavior of the cache itself is covered by the pool
//! unit tests next to the implementation (no GPU device is available
//! here).

use smallvec::SmallVec;

use weft::render::binding::{BindGroupBuilder, BindingSlotKey};
use weft::render::pipeline::key::{ComputePipelineKey, RenderPipelineKey, fx_hash_key};
use weft::render::uniform_layout::{UniformBlock, UniformField, UniformType};
use weft::render::vertex::generate_vertex_layout;
use weft::resources::buffer::VertexBuffer;
use weft::resources::geometry::Geometry;

fn plane_geometry() -> Geometry {
    let vertex_buffer = VertexBuffer::new(0, &[0.0; 20], 20)
        .add_attribute("position", wgpu::VertexFormat::Float32x3, 0)
        .add_attribute("uv", wgpu::VertexFormat::Float32x2, 12);
    Geometry::new().add_vertex_buffer(vertex_buffer)
}

fn test_bindings() -> SmallVec<[BindingSlotKey; 8]> {
    let block = UniformBlock::new(&[UniformField::new("tint", UniformType::Vec4F32)]).unwrap();
    let mut builder = BindGroupBuilder::new();
    builder.add_uniform_block("inputs", &block);
    builder.signature().into()
}

fn render_key() -> RenderPipelineKey {
    let layout = generate_vertex_layout(&plane_geometry()).unwrap();
    RenderPipelineKey {
        vertex_shader_hash: 0x1111,
        fragment_shader_hash: 0x2222,
        vertex_layout: layout.to_signature(),
        bindings: test_bindings(),
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        color_target: wgpu::ColorTargetState {
            format: wgpu::TextureFormat::Bgra8Unorm,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        }
        .into(),
        depth_stencil: Some(
            wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth24Plus,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }
            .into(),
        ),
        multisample: wgpu::MultisampleState::default().into(),
    }
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn structurally_identical_keys_hash_identically() {
    let a = render_key();
    let b = render_key();

    assert_eq!(a, b);
    assert_eq!(fx_hash_key(&a), fx_hash_key(&b));
}

#[test]
fn independently_built_signatures_agree() {
    // Two builders fed the same declarations must produce the same
    // signature, or structurally identical meshes would miss the cache.
    let block_a =
        UniformBlock::new(&[UniformField::new("tint", UniformType::Vec4F32)]).unwrap();
    let block_b =
        UniformBlock::new(&[UniformField::new("tint", UniformType::Vec4F32)]).unwrap();

    let mut builder_a = BindGroupBuilder::new();
    builder_a.add_uniform_block("inputs", &block_a);
    let mut builder_b = BindGroupBuilder::new();
    builder_b.add_uniform_block("inputs", &block_b);

    assert_eq!(builder_a.signature(), builder_b.signature());
}

#[test]
fn compute_key_hash_is_stable() {
    let a = ComputePipelineKey {
        shader_hash: 0xABCD,
        bindings: test_bindings(),
    };
    let b = ComputePipelineKey {
        shader_hash: 0xABCD,
        bindings: test_bindings(),
    };

    assert_eq!(fx_hash_key(&a), fx_hash_key(&b));
}

// ============================================================================
// Sensitivity
// ============================================================================

#[test]
fn shader_hash_changes_the_key() {
    let a = render_key();
    let mut b = render_key();
    b.fragment_shader_hash = 0x3333;

    assert_ne!(a, b);
    assert_ne!(fx_hash_key(&a), fx_hash_key(&b));
}

#[test]
fn blend_state_changes_the_key() {
    let a = render_key();
    let mut b = render_key();
    b.color_target = wgpu::ColorTargetState {
        format: wgpu::TextureFormat::Bgra8Unorm,
        blend: None,
        write_mask: wgpu::ColorWrites::ALL,
    }
    .into();

    assert_ne!(fx_hash_key(&a), fx_hash_key(&b));
}

#[test]
fn topology_changes_the_key() {
    let a = render_key();
    let mut b = render_key();
    b.topology = wgpu::PrimitiveTopology::LineList;

    assert_ne!(fx_hash_key(&a), fx_hash_key(&b));
}

#[test]
fn vertex_layout_changes_the_key() {
    let a = render_key();

    let vertex_buffer = VertexBuffer::new(0, &[0.0; 12], 12).add_attribute(
        "position",
        wgpu::VertexFormat::Float32x3,
        0,
    );
    let geometry = Geometry::new().add_vertex_buffer(vertex_buffer);
    let mut b = render_key();
    b.vertex_layout = generate_vertex_layout(&geometry).unwrap().to_signature();

    assert_ne!(fx_hash_key(&a), fx_hash_key(&b));
}

#[test]
fn binding_signature_changes_the_key() {
    let a = render_key();

    let block = UniformBlock::new(&[UniformField::new("tint", UniformType::Vec4F32)]).unwrap();
    let storage = weft::resources::buffer::StorageBuffer::new(64, true);
    let mut builder = BindGroupBuilder::new();
    builder.add_uniform_block("inputs", &block);
    builder.add_storage(&storage);
    let mut b = render_key();
    b.bindings = builder.signature().into();

    assert_ne!(fx_hash_key(&a), fx_hash_key(&b));
}
