//! Uniform Layout Allocator
//!
//! Packs an ordered list of typed uniform fields into a single contiguous
//! byte layout under the 16-byte block rule (std140 layout): matrices and
//! 4-component vectors always start on a 16-byte boundary, a 3-component
//! vector reserves a full 16-byte slot but stores 12 bytes, and scalars and
//! 2-component vectors pack into leftover block space when they fit.
//!
//! [`compute_layout`] is a pure function: all accumulator state lives on the
//! stack of one call, so concurrent or recursive layout runs cannot observe
//! each other.

use crate::errors::{Result, WeftError};

// ─── Type Table ──────────────────────────────────────────────────────────────

/// The closed set of uniform field types.
///
/// Each variant carries a fixed (alignment, size) pair. Alignment equals size
/// for every type except the 3-component vectors, where the 16-byte alignment
/// exceeds the 12 stored bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    Mat4x4F32,
    Mat3x3F32,
    Vec4F32,
    Vec3F32,
    Vec2F32,
    Vec4I32,
    Vec3I32,
    Vec2I32,
    Vec4U32,
    Vec3U32,
    Vec2U32,
    F32,
    I32,
    U32,
    I16,
    U16,
}

impl UniformType {
    /// Parses a WGSL-style type tag.
    ///
    /// Unknown tags fail hard: a layout containing one must not be built at
    /// all, so callers propagate this error before any packing starts.
    pub fn parse(tag: &str) -> Result<Self> {
        let ty = match tag {
            "mat4x4<f32>" => Self::Mat4x4F32,
            "mat3x3<f32>" => Self::Mat3x3F32,
            "vec4<f32>" => Self::Vec4F32,
            "vec3<f32>" => Self::Vec3F32,
            "vec2<f32>" => Self::Vec2F32,
            "vec4<i32>" => Self::Vec4I32,
            "vec3<i32>" => Self::Vec3I32,
            "vec2<i32>" => Self::Vec2I32,
            "vec4<u32>" => Self::Vec4U32,
            "vec3<u32>" => Self::Vec3U32,
            "vec2<u32>" => Self::Vec2U32,
            "f32" => Self::F32,
            "i32" => Self::I32,
            "u32" => Self::U32,
            "i16" => Self::I16,
            "u16" => Self::U16,
            _ => return Err(WeftError::UnknownUniformType(tag.to_string())),
        };
        Ok(ty)
    }

    /// The WGSL spelling of the type, used verbatim in generated struct
    /// declarations.
    #[must_use]
    pub const fn wgsl_name(self) -> &'static str {
        match self {
            Self::Mat4x4F32 => "mat4x4<f32>",
            Self::Mat3x3F32 => "mat3x3<f32>",
            Self::Vec4F32 => "vec4<f32>",
            Self::Vec3F32 => "vec3<f32>",
            Self::Vec2F32 => "vec2<f32>",
            Self::Vec4I32 => "vec4<i32>",
            Self::Vec3I32 => "vec3<i32>",
            Self::Vec2I32 => "vec2<i32>",
            Self::Vec4U32 => "vec4<u32>",
            Self::Vec3U32 => "vec3<u32>",
            Self::Vec2U32 => "vec2<u32>",
            Self::F32 => "f32",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I16 => "i16",
            Self::U16 => "u16",
        }
    }

    /// Required alignment in bytes.
    #[must_use]
    pub const fn alignment(self) -> u64 {
        match self {
            Self::Mat4x4F32 => 64,
            Self::Mat3x3F32 => 48,
            Self::Vec4F32 | Self::Vec3F32 | Self::Vec4I32 | Self::Vec3I32 | Self::Vec4U32
            | Self::Vec3U32 => 16,
            Self::Vec2F32 | Self::Vec2I32 | Self::Vec2U32 => 8,
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::I16 | Self::U16 => 2,
        }
    }

    /// Stored size in bytes.
    #[must_use]
    pub const fn byte_size(self) -> u64 {
        match self {
            Self::Mat4x4F32 => 64,
            Self::Mat3x3F32 => 48,
            Self::Vec4F32 | Self::Vec4I32 | Self::Vec4U32 => 16,
            Self::Vec3F32 | Self::Vec3I32 | Self::Vec3U32 => 12,
            Self::Vec2F32 | Self::Vec2I32 | Self::Vec2U32 => 8,
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::I16 | Self::U16 => 2,
        }
    }
}

// ─── Field Declarations ──────────────────────────────────────────────────────

/// A declared uniform field, immutable for one layout run.
#[derive(Debug, Clone)]
pub struct UniformField {
    /// Field name, used for shader declarations and later value writes.
    pub name: String,
    /// Declared type.
    pub ty: UniformType,
    /// Optional initial byte payload, written once at construction.
    pub init: Option<Vec<u8>>,
}

impl UniformField {
    #[must_use]
    pub fn new(name: &str, ty: UniformType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            init: None,
        }
    }

    /// Declares a field with an initial byte payload.
    #[must_use]
    pub fn with_init(name: &str, ty: UniformType, init: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            ty,
            init: Some(init.to_vec()),
        }
    }
}

/// A field extended with its computed placement.
#[derive(Debug, Clone)]
pub struct UniformFieldLayout {
    pub name: String,
    pub ty: UniformType,
    /// Offset of the field within the block.
    pub byte_offset: u64,
    /// Effective size. May exceed `ty.byte_size()` when the field absorbed
    /// the leftover of a closed 16-byte block, so the offset stream reports
    /// no gap.
    pub byte_size: u64,
}

/// The packed result: total length plus per-field placement in input order.
#[derive(Debug, Clone, Default)]
pub struct UniformLayout {
    /// Total byte length. Not rounded up to 16; callers needing GPU buffer
    /// alignment round separately.
    pub byte_length: u64,
    pub fields: Vec<UniformFieldLayout>,
}

impl UniformLayout {
    /// Looks up a field placement by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&UniformFieldLayout> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ─── Allocation ──────────────────────────────────────────────────────────────

/// Computes byte offsets and sizes for `fields` under the 16-byte block rule.
///
/// The allocator walks the fields in order, tracking the remaining space in
/// the current 16-byte block:
/// - a field whose alignment fits the remaining space is placed at the
///   cursor;
/// - otherwise the leftover space is folded into the previously placed
///   field's size and a new block starts — except when a full fresh block
///   meets an exactly block-sized field, where padding would only insert an
///   empty block.
///
/// Fields larger than one block (matrices) leave the cursor on a block
/// boundary, so a following matrix is never misaligned by the overflow.
pub fn compute_layout(fields: &[UniformField]) -> Result<UniformLayout> {
    let mut block_space: u64 = 16;
    let mut byte_length: u64 = 0;
    let mut placed: Vec<UniformFieldLayout> = Vec::with_capacity(fields.len());

    for field in fields {
        let alignment = field.ty.alignment();
        let size = field.ty.byte_size();

        if block_space < alignment
            && block_space > 0
            && !(block_space == 16 && size == 16)
            && let Some(prev) = placed.last_mut()
        {
            // Close the current block: the leftover is folded into the
            // previous field so the offset stream stays gapless.
            prev.byte_size += block_space;
            byte_length += block_space;
        }

        placed.push(UniformFieldLayout {
            name: field.name.clone(),
            ty: field.ty,
            byte_offset: byte_length,
            byte_size: size,
        });
        byte_length += size;

        // Remaining space in the 16-byte block the cursor now sits in.
        block_space = if byte_length == 0 {
            16
        } else {
            match byte_length % 16 {
                0 => 0,
                used => 16 - used,
            }
        };
    }

    Ok(UniformLayout {
        byte_length,
        fields: placed,
    })
}

/// Parses textual type tags and computes the layout in one step.
///
/// Any unknown tag fails the whole allocation before packing begins — no
/// partial layout is produced.
pub fn compute_layout_from_tags(fields: &[(String, String)]) -> Result<UniformLayout> {
    let mut parsed = Vec::with_capacity(fields.len());
    for (name, tag) in fields {
        parsed.push(UniformField::new(name, UniformType::parse(tag)?));
    }
    compute_layout(&parsed)
}

// ─── CPU Staging Block ───────────────────────────────────────────────────────

/// A uniform layout together with its CPU staging bytes.
///
/// The staging copy is the writable mirror of the GPU-side uniform buffer:
/// named writes land in the allocator-assigned ranges here and are flushed
/// with [`UniformBlock::upload`]. Reading a field back returns exactly the
/// bytes last written.
#[derive(Debug, Clone, Default)]
pub struct UniformBlock {
    layout: UniformLayout,
    data: Vec<u8>,
}

impl UniformBlock {
    /// Builds the staging block and applies the declared initial payloads.
    pub fn new(fields: &[UniformField]) -> Result<Self> {
        let layout = compute_layout(fields)?;
        let mut block = Self {
            data: vec![0; layout.byte_length as usize],
            layout,
        };
        for field in fields {
            if let Some(init) = &field.init {
                block.set(&field.name, init)?;
            }
        }
        Ok(block)
    }

    #[must_use]
    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    #[must_use]
    pub fn byte_length(&self) -> u64 {
        self.layout.byte_length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Writes `bytes` into the range assigned to `name`.
    ///
    /// Referencing an undeclared field is a caller programming mistake and
    /// fails hard. The payload must not exceed the field's declared size
    /// (it may be shorter: a `vec3` update may write 12 bytes into a slot
    /// that absorbed padding).
    pub fn set(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let field = self
            .layout
            .field(name)
            .ok_or_else(|| WeftError::UnknownUniform(name.to_string()))?;
        if bytes.len() as u64 > field.byte_size {
            return Err(WeftError::UniformSizeMismatch {
                name: name.to_string(),
                expected: field.byte_size,
                actual: bytes.len() as u64,
            });
        }
        let start = field.byte_offset as usize;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Reads back the full byte range assigned to `name`.
    pub fn field_bytes(&self, name: &str) -> Result<&[u8]> {
        let field = self
            .layout
            .field(name)
            .ok_or_else(|| WeftError::UnknownUniform(name.to_string()))?;
        let start = field.byte_offset as usize;
        let end = start + field.byte_size as usize;
        Ok(&self.data[start..end])
    }

    /// Flushes the staging bytes to `buffer`.
    pub fn upload(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        if !self.data.is_empty() {
            queue.write_buffer(buffer, 0, &self.data);
        }
    }
}
