//! Geometry
//!
//! The CPU-side container for vertex buffers, an optional index buffer and
//! the primitive topology, plus [`GpuGeometry`], its realized form with the
//! draw-time binding logic.

use crate::resources::buffer::{IndexBuffer, VertexBuffer};

#[derive(Debug, Clone)]
pub struct Geometry {
    pub vertex_buffers: Vec<VertexBuffer>,
    index_buffer: Option<IndexBuffer>,
    pub topology: wgpu::PrimitiveTopology,
    pub instance_count: u32,
    vertex_count: u32,
}

impl Geometry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            vertex_buffers: Vec::new(),
            index_buffer: None,
            topology: wgpu::PrimitiveTopology::TriangleList,
            instance_count: 1,
            vertex_count: 0,
        }
    }

    /// Adds a vertex buffer. The first per-vertex buffer determines the
    /// vertex count unless an index buffer overrides it.
    #[must_use]
    pub fn add_vertex_buffer(mut self, vertex_buffer: VertexBuffer) -> Self {
        if self.vertex_count == 0 && vertex_buffer.step_mode == wgpu::VertexStepMode::Vertex {
            self.vertex_count = vertex_buffer.element_count();
        }
        self.vertex_buffers.push(vertex_buffer);
        self
    }

    #[must_use]
    pub fn set_index_buffer(mut self, index_buffer: IndexBuffer) -> Self {
        self.vertex_count = index_buffer.index_count();
        self.index_buffer = Some(index_buffer);
        self
    }

    #[must_use]
    pub fn with_topology(mut self, topology: wgpu::PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    #[must_use]
    pub fn has_index(&self) -> bool {
        self.index_buffer.is_some()
    }

    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// The index format required by strip topologies, `None` otherwise.
    #[must_use]
    pub fn strip_index_format(&self) -> Option<wgpu::IndexFormat> {
        match self.topology {
            wgpu::PrimitiveTopology::LineStrip | wgpu::PrimitiveTopology::TriangleStrip => {
                self.index_buffer.as_ref().map(IndexBuffer::format)
            }
            _ => None,
        }
    }

    /// Uploads all buffers and returns the drawable form.
    pub(crate) fn realize(&self, device: &wgpu::Device) -> GpuGeometry {
        GpuGeometry {
            vertex_buffers: self
                .vertex_buffers
                .iter()
                .map(|vb| (vb.slot, vb.realize(device)))
                .collect(),
            index_buffer: self
                .index_buffer
                .as_ref()
                .map(|ib| (ib.realize(device), ib.format())),
            vertex_count: self.vertex_count,
            instance_count: self.instance_count,
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

/// Uploaded geometry, ready to draw.
pub struct GpuGeometry {
    vertex_buffers: Vec<(u32, wgpu::Buffer)>,
    index_buffer: Option<(wgpu::Buffer, wgpu::IndexFormat)>,
    vertex_count: u32,
    instance_count: u32,
}

impl GpuGeometry {
    /// Binds all buffers and issues the draw call.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        for (slot, buffer) in &self.vertex_buffers {
            pass.set_vertex_buffer(*slot, buffer.slice(..));
        }

        if let Some((buffer, format)) = &self.index_buffer {
            pass.set_index_buffer(buffer.slice(..), *format);
            pass.draw_indexed(0..self.vertex_count, 0, 0..self.instance_count);
        } else {
            pass.draw(0..self.vertex_count, 0..self.instance_count);
        }
    }

    pub fn destroy(&self) {
        if let Some((buffer, _)) = &self.index_buffer {
            buffer.destroy();
        }
        for (_, buffer) in &self.vertex_buffers {
            buffer.destroy();
        }
    }
}
