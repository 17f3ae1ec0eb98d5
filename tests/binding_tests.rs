//! Binding Planner Tests
//!
//! Tests for:
//! - index assignment: contiguous from 0, fixed kind order, no gaps or
//!   duplicates for any resource combination
//! - consistency: the shader declarations carry exactly the planner's
//!   indices

use weft::render::binding::{BindGroupBuilder, BoundResource};
use weft::render::shader::{ShaderInput, ShaderSnippets, ShaderStage, assemble};
use weft::render::uniform_layout::{UniformBlock, UniformField, UniformType};
use weft::resources::buffer::StorageBuffer;
use weft::resources::sampler::Sampler;
use weft::resources::texture::Texture;

fn test_block(field: &str) -> UniformBlock {
    UniformBlock::new(&[UniformField::new(field, UniformType::Vec4F32)]).unwrap()
}

fn test_sampler(name: &str) -> Sampler {
    Sampler::new(name, wgpu::SamplerDescriptor::default())
}

fn test_texture(name: &str) -> Texture {
    Texture::empty(name, 4, 4, wgpu::TextureFormat::Rgba8Unorm)
}

fn test_storage(name: &str) -> StorageBuffer {
    StorageBuffer::new(64, false).set_struct(name, &[("value", UniformType::Vec4F32)])
}

// ============================================================================
// Index Assignment
// ============================================================================

#[test]
fn indices_are_a_contiguous_bijection_for_all_combinations() {
    let blocks = [test_block("a"), test_block("b")];
    let samplers = [test_sampler("s0"), test_sampler("s1")];
    let textures = [test_texture("t0"), test_texture("t1")];
    let storages = [test_storage("st0"), test_storage("st1")];

    for n in 0..=2usize {
        for s in 0..=2usize {
            for t in 0..=2usize {
                for b in 0..=2usize {
                    let mut builder = BindGroupBuilder::new();
                    for block in &blocks[..n] {
                        builder.add_uniform_block("ubo", block);
                    }
                    for sampler in &samplers[..s] {
                        builder.add_sampler(sampler);
                    }
                    for texture in &textures[..t] {
                        builder.add_texture(texture);
                    }
                    for storage in &storages[..b] {
                        builder.add_storage(storage);
                    }

                    let slots = builder.slots();
                    let indices: Vec<u32> = slots.iter().map(|slot| slot.index).collect();
                    let expected: Vec<u32> = (0..(n + s + t + b) as u32).collect();
                    assert_eq!(
                        indices, expected,
                        "Indices must be 0..total for N={n} S={s} T={t} B={b}"
                    );

                    let signature = builder.signature();
                    assert_eq!(signature.len(), slots.len());
                }
            }
        }
    }
}

#[test]
fn kind_order_is_ubos_samplers_textures_storages() {
    let block = test_block("a");
    let sampler = test_sampler("s");
    let texture = test_texture("t");
    let storage = test_storage("st");

    // Declared deliberately out of kind order.
    let mut builder = BindGroupBuilder::new();
    builder.add_storage(&storage);
    builder.add_texture(&texture);
    builder.add_sampler(&sampler);
    builder.add_uniform_block("ubo", &block);

    let slots = builder.slots();
    let kinds: Vec<&str> = slots
        .iter()
        .map(|slot| match slot.resource {
            BoundResource::UniformBlock { .. } => "ubo",
            BoundResource::Sampler(_) => "sampler",
            BoundResource::Texture(_) => "texture",
            BoundResource::Storage(_) => "storage",
        })
        .collect();

    assert_eq!(kinds, vec!["ubo", "sampler", "texture", "storage"]);
}

#[test]
fn declaration_order_within_a_kind_is_preserved() {
    let t0 = test_texture("first");
    let t1 = test_texture("second");

    let mut builder = BindGroupBuilder::new();
    builder.add_texture(&t0);
    builder.add_texture(&t1);

    let slots = builder.slots();
    let names: Vec<&str> = slots
        .iter()
        .map(|slot| match slot.resource {
            BoundResource::Texture(texture) => texture.name.as_str(),
            _ => panic!("Only textures were declared"),
        })
        .collect();

    assert_eq!(names, vec!["first", "second"]);
}

// ============================================================================
// Planner / Shader Consistency
// ============================================================================

#[test]
fn shader_declarations_use_the_planner_indices() {
    let block = test_block("tint");
    let sampler = test_sampler("albedo");
    let texture = test_texture("albedo");
    let storage = test_storage("Particle");

    let mut builder = BindGroupBuilder::new();
    builder.add_uniform_block("inputs", &block);
    builder.add_sampler(&sampler);
    builder.add_texture(&texture);
    builder.add_storage(&storage);

    let slots = builder.slots();
    let snippets = ShaderSnippets::main("output.color = vec4<f32>(1.0);");
    let source = assemble(
        ShaderStage::Fragment,
        &ShaderInput {
            bindings: &slots,
            varyings: &[],
            workgroup_size: [1, 1, 1],
            snippets: &snippets,
        },
    )
    .unwrap();

    assert!(source.contains("@group(0) @binding(0) var<uniform> u_inputs: Struct_inputs;"));
    assert!(source.contains("@group(0) @binding(1) var s_albedo: sampler;"));
    assert!(source.contains("@group(0) @binding(2) var t_albedo: texture_2d<f32>;"));
    assert!(
        source.contains(
            "@group(0) @binding(3) var<storage, read_write> st_Particle: array<Struct_Particle>;"
        )
    );
}

#[test]
fn every_planned_index_appears_exactly_once_in_the_shader() {
    let blocks = [test_block("a"), test_block("b")];
    let sampler = test_sampler("s");
    let textures = [test_texture("t0"), test_texture("t1")];
    let storage = test_storage("Item");

    let mut builder = BindGroupBuilder::new();
    builder.add_uniform_block("first", &blocks[0]);
    builder.add_uniform_block("second", &blocks[1]);
    builder.add_sampler(&sampler);
    builder.add_texture(&textures[0]);
    builder.add_texture(&textures[1]);
    builder.add_storage(&storage);

    let slots = builder.slots();
    let snippets = ShaderSnippets::main("output.color = vec4<f32>(1.0);");
    let source = assemble(
        ShaderStage::Fragment,
        &ShaderInput {
            bindings: &slots,
            varyings: &[],
            workgroup_size: [1, 1, 1],
            snippets: &snippets,
        },
    )
    .unwrap();

    for index in 0..6 {
        let needle = format!("@binding({index})");
        assert_eq!(
            source.matches(&needle).count(),
            1,
            "Binding index {index} must appear exactly once"
        );
    }
    assert!(!source.contains("@binding(6)"), "No index beyond the plan");
}

// ============================================================================
// Storage Struct Rule
// ============================================================================

#[test]
fn second_storage_struct_is_ignored_with_a_warning() {
    let storage = StorageBuffer::new(64, true)
        .set_struct("Light", &[("color", UniformType::Vec3F32)])
        .set_struct("Shadow", &[("depth", UniformType::F32)]);

    assert_eq!(storage.struct_name(), Some("Light"));
    assert_eq!(storage.struct_fields().len(), 1);
    assert_eq!(storage.struct_fields()[0].0, "color");
}
