//! Vertex Layout Generator
//!
//! Produces the wgpu vertex-buffer layouts and the shader-facing attribute
//! declarations from a geometry's vertex buffers, assigning one sequential
//! shader location per attribute. Both outputs come from the same pass, so
//! the `@location` indices in generated WGSL always match the
//! `shader_location` values handed to the pipeline.

use crate::errors::{Result, WeftError};
use crate::resources::buffer::VertexBuffer;
use crate::resources::geometry::Geometry;

/// Owned mirror of `wgpu::VertexBufferLayout`.
#[derive(Debug, Clone)]
pub struct OwnedVertexBufferDesc {
    pub array_stride: u64,
    pub step_mode: wgpu::VertexStepMode,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

impl OwnedVertexBufferDesc {
    #[must_use]
    pub fn as_wgpu(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.array_stride,
            step_mode: self.step_mode,
            attributes: &self.attributes,
        }
    }
}

/// One shader-visible vertex attribute, as consumed by the shader builder.
#[derive(Debug, Clone)]
pub struct VaryingDecl {
    pub location: u32,
    pub name: String,
    pub wgsl_type: &'static str,
}

/// Vertex layout plus the matching shader declarations.
#[derive(Debug, Clone)]
pub struct GeneratedVertexLayout {
    pub buffers: Vec<OwnedVertexBufferDesc>,
    pub varyings: Vec<VaryingDecl>,
}

/// Hashable identity of a vertex layout, for pipeline keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayoutSignature {
    pub buffers: Vec<VertexBufferLayoutSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexBufferLayoutSignature {
    pub array_stride: u64,
    pub step_mode: wgpu::VertexStepMode,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

impl GeneratedVertexLayout {
    #[must_use]
    pub fn to_signature(&self) -> VertexLayoutSignature {
        let buffers = self
            .buffers
            .iter()
            .map(|b| VertexBufferLayoutSignature {
                array_stride: b.array_stride,
                step_mode: b.step_mode,
                attributes: b.attributes.clone(),
            })
            .collect();

        VertexLayoutSignature { buffers }
    }
}

/// Generates the vertex layout for `geometry`, walking its vertex buffers in
/// slot order and their attributes in declaration order.
///
/// A vertex buffer without attributes, or an attribute whose format has no
/// shader input mapping, rejects the whole build: emitting a declaration for
/// it would produce invalid shader source.
pub fn generate_vertex_layout(geometry: &Geometry) -> Result<GeneratedVertexLayout> {
    let mut buffers = Vec::with_capacity(geometry.vertex_buffers.len());
    let mut varyings = Vec::new();
    let mut current_location = 0;

    for vertex_buffer in &geometry.vertex_buffers {
        buffers.push(layout_for_buffer(
            vertex_buffer,
            &mut varyings,
            &mut current_location,
        )?);
    }

    Ok(GeneratedVertexLayout { buffers, varyings })
}

fn layout_for_buffer(
    vertex_buffer: &VertexBuffer,
    varyings: &mut Vec<VaryingDecl>,
    current_location: &mut u32,
) -> Result<OwnedVertexBufferDesc> {
    if vertex_buffer.attributes.is_empty() {
        return Err(WeftError::EmptyVertexBuffer {
            slot: vertex_buffer.slot,
        });
    }

    let mut wgpu_attributes = Vec::with_capacity(vertex_buffer.attributes.len());

    for attr in &vertex_buffer.attributes {
        let wgsl_type = format_to_wgsl_type(attr.format)?;
        let location = *current_location;
        *current_location += 1;

        wgpu_attributes.push(wgpu::VertexAttribute {
            format: attr.format,
            offset: attr.offset,
            shader_location: location,
        });

        varyings.push(VaryingDecl {
            location,
            name: attr.name.clone(),
            wgsl_type,
        });
    }

    Ok(OwnedVertexBufferDesc {
        array_stride: vertex_buffer.array_stride,
        step_mode: vertex_buffer.step_mode,
        attributes: wgpu_attributes,
    })
}

/// Maps a vertex format to its WGSL shader input type.
///
/// Only the 32-bit float/int/uint families have a direct input spelling
/// here; anything else fails the shader build rather than emitting an
/// invalid declaration.
pub fn format_to_wgsl_type(format: wgpu::VertexFormat) -> Result<&'static str> {
    use wgpu::VertexFormat;

    let wgsl = match format {
        VertexFormat::Float32 => "f32",
        VertexFormat::Float32x2 => "vec2<f32>",
        VertexFormat::Float32x3 => "vec3<f32>",
        VertexFormat::Float32x4 => "vec4<f32>",
        VertexFormat::Sint32 => "i32",
        VertexFormat::Sint32x2 => "vec2<i32>",
        VertexFormat::Sint32x3 => "vec3<i32>",
        VertexFormat::Sint32x4 => "vec4<i32>",
        VertexFormat::Uint32 => "u32",
        VertexFormat::Uint32x2 => "vec2<u32>",
        VertexFormat::Uint32x3 => "vec3<u32>",
        VertexFormat::Uint32x4 => "vec4<u32>",
        other => return Err(WeftError::UnsupportedVertexFormat(other)),
    };
    Ok(wgsl)
}
