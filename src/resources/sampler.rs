//! Sampler Description

/// A named sampler plus the type tags used for its layout entry and WGSL
/// declaration.
#[derive(Debug, Clone)]
pub struct Sampler {
    pub name: String,
    pub binding_type: wgpu::SamplerBindingType,
    /// WGSL declaration type: `sampler` or `sampler_comparison`.
    pub wgsl_type: &'static str,
    pub descriptor: wgpu::SamplerDescriptor<'static>,
}

impl Sampler {
    #[must_use]
    pub fn new(name: &str, descriptor: wgpu::SamplerDescriptor<'static>) -> Self {
        Self {
            name: name.to_string(),
            binding_type: wgpu::SamplerBindingType::Filtering,
            wgsl_type: "sampler",
            descriptor,
        }
    }

    /// A comparison sampler for depth reads.
    #[must_use]
    pub fn comparison(name: &str, descriptor: wgpu::SamplerDescriptor<'static>) -> Self {
        Self {
            name: name.to_string(),
            binding_type: wgpu::SamplerBindingType::Comparison,
            wgsl_type: "sampler_comparison",
            descriptor,
        }
    }

    pub(crate) fn realize(&self, device: &wgpu::Device) -> wgpu::Sampler {
        device.create_sampler(&self.descriptor)
    }
}
