//! Buffer Descriptions
//!
//! CPU-side descriptions of the buffers the composition layer binds:
//! vertex data, index data and storage blocks. Each type carries its data
//! and the metadata the binding planner and shader builder consume, and
//! realizes its GPU buffer on demand. [`UniformBuffer`] is the one
//! GPU-side wrapper here; uniform data is staged in
//! [`UniformBlock`](crate::render::uniform_layout::UniformBlock) and
//! flushed into it.

use crate::render::uniform_layout::UniformType;

/// Rounds a byte length up to the copy alignment wgpu requires.
pub(crate) fn padded_size(byte_length: u64) -> u64 {
    byte_length
        .next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT)
        .max(wgpu::COPY_BUFFER_ALIGNMENT)
}

pub(crate) fn create_buffer_with_data(
    device: &wgpu::Device,
    data: &[u8],
    usage: wgpu::BufferUsages,
    label: &str,
) -> wgpu::Buffer {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: padded_size(data.len() as u64),
        usage,
        mapped_at_creation: true,
    });
    buffer
        .slice(..)
        .get_mapped_range_mut()
        .slice(..data.len())
        .copy_from_slice(data);
    buffer.unmap();
    buffer
}

// ─── Vertex Buffer ───────────────────────────────────────────────────────────

/// One named attribute within a vertex buffer.
#[derive(Debug, Clone)]
pub struct VertexAttributeDesc {
    pub name: String,
    pub format: wgpu::VertexFormat,
    pub offset: u64,
}

/// Vertex data plus its ordered attribute set.
///
/// Attribute declaration order determines shader location assignment, so it
/// is preserved as given.
#[derive(Debug, Clone)]
pub struct VertexBuffer {
    /// Vertex buffer slot used at draw time.
    pub slot: u32,
    pub data: Vec<f32>,
    pub array_stride: u64,
    pub step_mode: wgpu::VertexStepMode,
    pub attributes: Vec<VertexAttributeDesc>,
}

impl VertexBuffer {
    #[must_use]
    pub fn new(slot: u32, data: &[f32], array_stride: u64) -> Self {
        Self {
            slot,
            data: data.to_vec(),
            array_stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: Vec::new(),
        }
    }

    /// Per-instance data instead of per-vertex.
    #[must_use]
    pub fn instanced(slot: u32, data: &[f32], array_stride: u64) -> Self {
        Self {
            step_mode: wgpu::VertexStepMode::Instance,
            ..Self::new(slot, data, array_stride)
        }
    }

    /// Appends a named attribute. Order matters: shader locations are
    /// assigned sequentially over the declaration order.
    #[must_use]
    pub fn add_attribute(mut self, name: &str, format: wgpu::VertexFormat, offset: u64) -> Self {
        self.attributes.push(VertexAttributeDesc {
            name: name.to_string(),
            format,
            offset,
        });
        self
    }

    /// Number of elements described by the data, per the declared stride.
    #[must_use]
    pub fn element_count(&self) -> u32 {
        ((self.data.len() * size_of::<f32>()) as u64 / self.array_stride) as u32
    }

    pub(crate) fn realize(&self, device: &wgpu::Device) -> wgpu::Buffer {
        create_buffer_with_data(
            device,
            bytemuck::cast_slice(&self.data),
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            "Vertex Buffer",
        )
    }
}

// ─── Index Buffer ────────────────────────────────────────────────────────────

/// Index data in either of the two supported widths.
#[derive(Debug, Clone)]
pub enum IndexBuffer {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexBuffer {
    #[must_use]
    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            Self::U16(_) => wgpu::IndexFormat::Uint16,
            Self::U32(_) => wgpu::IndexFormat::Uint32,
        }
    }

    #[must_use]
    pub fn index_count(&self) -> u32 {
        match self {
            Self::U16(indices) => indices.len() as u32,
            Self::U32(indices) => indices.len() as u32,
        }
    }

    pub(crate) fn realize(&self, device: &wgpu::Device) -> wgpu::Buffer {
        let bytes: &[u8] = match self {
            Self::U16(indices) => bytemuck::cast_slice(indices),
            Self::U32(indices) => bytemuck::cast_slice(indices),
        };
        create_buffer_with_data(
            device,
            bytes,
            wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            "Index Buffer",
        )
    }
}

// ─── Uniform Buffer ──────────────────────────────────────────────────────────

/// A fixed-size GPU uniform buffer, updated by explicit byte-range writes.
#[derive(Debug)]
pub struct UniformBuffer {
    buffer: wgpu::Buffer,
    byte_length: u64,
}

impl UniformBuffer {
    pub fn new(device: &wgpu::Device, byte_length: u64, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: padded_size(byte_length),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            byte_length,
        }
    }

    #[must_use]
    pub fn byte_length(&self) -> u64 {
        self.byte_length
    }

    #[must_use]
    pub fn raw(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn write(&self, queue: &wgpu::Queue, offset: u64, data: &[u8]) {
        queue.write_buffer(&self.buffer, offset, data);
    }

    pub fn destroy(&self) {
        self.buffer.destroy();
    }
}

// ─── Storage Buffer ──────────────────────────────────────────────────────────

/// Description of a storage buffer, exposed to shaders as a runtime-sized
/// array of one named struct.
#[derive(Debug, Clone)]
pub struct StorageBuffer {
    byte_length: u64,
    read_only: bool,
    init: Option<Vec<u8>>,
    struct_name: Option<String>,
    struct_fields: Vec<(String, UniformType)>,
}

impl StorageBuffer {
    /// An empty (zeroed) storage buffer of `byte_length` bytes.
    #[must_use]
    pub fn new(byte_length: u64, read_only: bool) -> Self {
        Self {
            byte_length,
            read_only,
            init: None,
            struct_name: None,
            struct_fields: Vec::new(),
        }
    }

    /// A storage buffer initialized with `data`.
    #[must_use]
    pub fn with_data(data: &[u8], read_only: bool) -> Self {
        Self {
            byte_length: data.len() as u64,
            read_only,
            init: Some(data.to_vec()),
            struct_name: None,
            struct_fields: Vec::new(),
        }
    }

    /// Names the element struct and its fields for shader declarations.
    ///
    /// A storage buffer supports exactly one struct; a second call is a
    /// recoverable misuse — it warns and leaves the first definition intact.
    #[must_use]
    pub fn set_struct(mut self, name: &str, fields: &[(&str, UniformType)]) -> Self {
        if self.struct_name.is_some() {
            log::warn!(
                "Storage buffer already has struct {:?}; ignoring {name:?}",
                self.struct_name
            );
            return self;
        }
        self.struct_name = Some(name.to_string());
        self.struct_fields = fields
            .iter()
            .map(|(field, ty)| ((*field).to_string(), *ty))
            .collect();
        self
    }

    #[must_use]
    pub fn struct_name(&self) -> Option<&str> {
        self.struct_name.as_deref()
    }

    #[must_use]
    pub fn struct_fields(&self) -> &[(String, UniformType)] {
        &self.struct_fields
    }

    #[must_use]
    pub fn read_only(&self) -> bool {
        self.read_only
    }

    #[must_use]
    pub fn byte_length(&self) -> u64 {
        self.byte_length
    }

    pub(crate) fn realize(&self, device: &wgpu::Device) -> wgpu::Buffer {
        let usage = wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_DST
            | wgpu::BufferUsages::COPY_SRC;
        match &self.init {
            Some(data) => create_buffer_with_data(device, data, usage, "Storage Buffer"),
            None => device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Storage Buffer"),
                size: padded_size(self.byte_length),
                usage,
                mapped_at_creation: false,
            }),
        }
    }
}
