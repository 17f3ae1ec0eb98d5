//! Uniform Layout Allocator Tests
//!
//! Tests for:
//! - 16-byte block packing: scalars fill a block before a new one starts
//! - vec3 special case: 16-byte slot reservation with 12 stored bytes
//! - matrix alignment: mat4x4 always lands on a 16-byte boundary
//! - hard failures: unknown type tags reject the whole layout
//! - UniformBlock: named writes land in the assigned ranges and read back

use weft::render::uniform_layout::{
    UniformBlock, UniformField, UniformType, compute_layout, compute_layout_from_tags,
};
use weft::WeftError;

fn fields(specs: &[(&str, UniformType)]) -> Vec<UniformField> {
    specs
        .iter()
        .map(|(name, ty)| UniformField::new(name, *ty))
        .collect()
}

// ============================================================================
// Scalar Packing
// ============================================================================

#[test]
fn four_scalars_fill_one_block() {
    let layout = compute_layout(&fields(&[
        ("a", UniformType::F32),
        ("b", UniformType::F32),
        ("c", UniformType::F32),
        ("d", UniformType::F32),
    ]))
    .unwrap();

    let offsets: Vec<u64> = layout.fields.iter().map(|f| f.byte_offset).collect();
    assert_eq!(offsets, vec![0, 4, 8, 12]);
    assert_eq!(layout.byte_length, 16);
}

#[test]
fn fifth_scalar_starts_the_next_block() {
    let layout = compute_layout(&fields(&[
        ("a", UniformType::F32),
        ("b", UniformType::F32),
        ("c", UniformType::F32),
        ("d", UniformType::F32),
        ("e", UniformType::F32),
    ]))
    .unwrap();

    let offsets: Vec<u64> = layout.fields.iter().map(|f| f.byte_offset).collect();
    assert_eq!(offsets, vec![0, 4, 8, 12, 16], "Fifth f32 must start block 2");
    assert_eq!(
        layout.byte_length, 20,
        "Scalar-only total is the plain sum of sizes"
    );
}

#[test]
fn short_scalars_pack_tightly() {
    let layout = compute_layout(&fields(&[
        ("a", UniformType::I16),
        ("b", UniformType::U16),
        ("c", UniformType::F32),
    ]))
    .unwrap();

    let offsets: Vec<u64> = layout.fields.iter().map(|f| f.byte_offset).collect();
    assert_eq!(offsets, vec![0, 2, 4]);
    assert_eq!(layout.byte_length, 8);
}

#[test]
fn total_length_is_not_rounded_to_block_size() {
    let layout = compute_layout(&fields(&[("a", UniformType::Vec3F32)])).unwrap();
    assert_eq!(
        layout.byte_length, 12,
        "Callers round for GPU buffers; the allocator must not"
    );

    let layout = compute_layout(&fields(&[("a", UniformType::F32)])).unwrap();
    assert_eq!(layout.byte_length, 4);
}

// ============================================================================
// vec3 Special Case
// ============================================================================

#[test]
fn vec3_reserves_a_block_but_scalar_fits_the_tail() {
    let layout = compute_layout(&fields(&[
        ("direction", UniformType::Vec3F32),
        ("intensity", UniformType::F32),
    ]))
    .unwrap();

    assert_eq!(layout.fields[0].byte_offset, 0);
    assert_eq!(layout.fields[0].byte_size, 12);
    assert_eq!(
        layout.fields[1].byte_offset, 12,
        "The f32 packs into the 4 leftover bytes of the vec3 slot"
    );
    assert_eq!(layout.byte_length, 16);
}

#[test]
fn vec3_after_vec2_closes_the_first_block() {
    let layout = compute_layout(&fields(&[
        ("uv", UniformType::Vec2F32),
        ("normal", UniformType::Vec3F32),
    ]))
    .unwrap();

    assert_eq!(
        layout.fields[0].byte_size, 16,
        "The vec2 absorbs the leftover so the offset stream has no gap"
    );
    assert_eq!(layout.fields[1].byte_offset, 16);
    assert_eq!(layout.byte_length, 28);
}

#[test]
fn consecutive_vec3s_each_reserve_a_block() {
    let layout = compute_layout(&fields(&[
        ("a", UniformType::Vec3F32),
        ("b", UniformType::Vec3F32),
    ]))
    .unwrap();

    assert_eq!(layout.fields[0].byte_offset, 0);
    assert_eq!(layout.fields[1].byte_offset, 16);
}

// ============================================================================
// Matrix Alignment
// ============================================================================

#[test]
fn mat4_is_always_16_byte_aligned() {
    let prefixes: &[&[(&str, UniformType)]] = &[
        &[],
        &[("a", UniformType::F32)],
        &[("a", UniformType::Vec2F32)],
        &[("a", UniformType::Vec3F32)],
        &[("a", UniformType::Vec4F32)],
        &[("a", UniformType::F32), ("b", UniformType::Vec3F32)],
        &[("a", UniformType::Mat4x4F32), ("b", UniformType::F32)],
        &[("a", UniformType::Mat3x3F32), ("b", UniformType::I16)],
    ];

    for prefix in prefixes {
        let mut all = fields(prefix);
        all.push(UniformField::new("m", UniformType::Mat4x4F32));
        let layout = compute_layout(&all).unwrap();
        let mat = layout.field("m").unwrap();
        assert_eq!(
            mat.byte_offset % 16,
            0,
            "mat4 must start on a 16-byte boundary after prefix {prefix:?}"
        );
    }
}

#[test]
fn scalar_then_mat4_pads_the_scalar() {
    let layout = compute_layout(&fields(&[
        ("scale", UniformType::F32),
        ("model", UniformType::Mat4x4F32),
    ]))
    .unwrap();

    assert_eq!(layout.fields[0].byte_size, 16);
    assert_eq!(layout.fields[1].byte_offset, 16);
    assert_eq!(layout.byte_length, 80);
}

#[test]
fn vec4_after_mat4_continues_contiguously() {
    let layout = compute_layout(&fields(&[
        ("model", UniformType::Mat4x4F32),
        ("color", UniformType::Vec4F32),
    ]))
    .unwrap();

    assert_eq!(layout.fields[1].byte_offset, 64);
    assert_eq!(layout.byte_length, 80);
}

#[test]
fn transform_block_layout_is_four_packed_matrices() {
    let layout = compute_layout(&fields(&[
        ("projection", UniformType::Mat4x4F32),
        ("view", UniformType::Mat4x4F32),
        ("model", UniformType::Mat4x4F32),
        ("normal", UniformType::Mat4x4F32),
    ]))
    .unwrap();

    let offsets: Vec<u64> = layout.fields.iter().map(|f| f.byte_offset).collect();
    assert_eq!(offsets, vec![0, 64, 128, 192]);
    assert_eq!(layout.byte_length, 256);
}

// ============================================================================
// Hard Failures
// ============================================================================

#[test]
fn unknown_type_tag_fails_the_whole_layout() {
    let result = compute_layout_from_tags(&[
        ("a".to_string(), "f32".to_string()),
        ("b".to_string(), "vec5<f32>".to_string()),
    ]);

    match result {
        Err(WeftError::UnknownUniformType(tag)) => assert_eq!(tag, "vec5<f32>"),
        other => panic!("Expected UnknownUniformType, got {other:?}"),
    }
}

#[test]
fn parse_rejects_unknown_tags_and_accepts_known_ones() {
    assert!(UniformType::parse("mat3x3<f32>").is_ok());
    assert!(UniformType::parse("vec2<u32>").is_ok());
    assert!(UniformType::parse("double").is_err());
    assert!(UniformType::parse("").is_err());
}

// ============================================================================
// UniformBlock Writes and Read-Back
// ============================================================================

#[test]
fn write_then_read_back_returns_the_exact_bytes() {
    let mut block = UniformBlock::new(&fields(&[
        ("color", UniformType::Vec4F32),
        ("opacity", UniformType::F32),
    ]))
    .unwrap();

    let color = [0x11u8; 16];
    let opacity = 0.5f32.to_le_bytes();
    block.set("color", &color).unwrap();
    block.set("opacity", &opacity).unwrap();

    assert_eq!(&block.field_bytes("color").unwrap()[..16], &color);
    assert_eq!(&block.field_bytes("opacity").unwrap()[..4], &opacity);
}

#[test]
fn initial_payloads_are_applied_at_construction() {
    let init = 2.0f32.to_le_bytes();
    let block = UniformBlock::new(&[
        UniformField::with_init("scale", UniformType::F32, &init),
        UniformField::new("bias", UniformType::F32),
    ])
    .unwrap();

    assert_eq!(&block.field_bytes("scale").unwrap()[..4], &init);
    assert_eq!(&block.field_bytes("bias").unwrap()[..4], &[0u8; 4]);
}

#[test]
fn writing_an_undeclared_uniform_is_a_hard_error() {
    let mut block = UniformBlock::new(&fields(&[("a", UniformType::F32)])).unwrap();

    match block.set("missing", &[0u8; 4]) {
        Err(WeftError::UnknownUniform(name)) => assert_eq!(name, "missing"),
        other => panic!("Expected UnknownUniform, got {other:?}"),
    }
}

#[test]
fn oversized_payload_is_rejected() {
    let mut block = UniformBlock::new(&fields(&[("a", UniformType::F32)])).unwrap();

    assert!(matches!(
        block.set("a", &[0u8; 8]),
        Err(WeftError::UniformSizeMismatch { .. })
    ));
}

#[test]
fn padded_field_accepts_its_declared_payload() {
    // The vec2 absorbs 8 padding bytes when the vec3 closes the block; a
    // plain 8-byte vec2 write must still succeed.
    let mut block = UniformBlock::new(&fields(&[
        ("uv", UniformType::Vec2F32),
        ("normal", UniformType::Vec3F32),
    ]))
    .unwrap();

    let uv = [0xABu8; 8];
    block.set("uv", &uv).unwrap();
    assert_eq!(&block.field_bytes("uv").unwrap()[..8], &uv);
}
