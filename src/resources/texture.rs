//! Texture Description
//!
//! The CPU-side description of a texture binding: a name, the sample type
//! and view dimension for the layout entry, the WGSL type tag used
//! verbatim in generated declarations, and optionally the raw pixel data
//! to upload. Image decoding is not handled here.

/// Declarative texture.
#[derive(Debug, Clone)]
pub struct Texture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    /// Tightly packed pixel rows, uploaded at realization when present.
    pub pixels: Option<Vec<u8>>,
    pub sample_type: wgpu::TextureSampleType,
    pub view_dimension: wgpu::TextureViewDimension,
    /// WGSL declaration type, e.g. `texture_2d<f32>`.
    pub wgsl_type: String,
}

impl Texture {
    /// A filterable 2D texture with pixel data to upload.
    #[must_use]
    pub fn from_pixels(
        name: &str,
        pixels: &[u8],
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            format,
            pixels: Some(pixels.to_vec()),
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            wgsl_type: "texture_2d<f32>".to_string(),
        }
    }

    /// An empty 2D texture (e.g. a render target to be filled elsewhere).
    #[must_use]
    pub fn empty(name: &str, width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            format,
            pixels: None,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            wgsl_type: "texture_2d<f32>".to_string(),
        }
    }

    /// Overrides the sample type, view dimension and WGSL tag together.
    /// They describe the same binding and must agree.
    #[must_use]
    pub fn with_binding_type(
        mut self,
        sample_type: wgpu::TextureSampleType,
        view_dimension: wgpu::TextureViewDimension,
        wgsl_type: &str,
    ) -> Self {
        self.sample_type = sample_type;
        self.view_dimension = view_dimension;
        self.wgsl_type = wgsl_type.to_string();
        self
    }

    pub(crate) fn realize(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> GpuTexture {
        let size = wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&self.name),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        if let Some(pixels) = &self.pixels {
            let block_size = self.format.block_copy_size(None).unwrap_or(4);
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.width * block_size),
                    rows_per_image: Some(self.height),
                },
                size,
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        GpuTexture { texture, view }
    }
}

/// A realized texture and its default view.
pub struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl GpuTexture {
    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}
