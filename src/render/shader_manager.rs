//! Shader Module Cache
//!
//! Deduplicates compiled `wgpu::ShaderModule`s by hashing the final WGSL
//! source with xxh3-128. Meshes that assemble byte-identical source share
//! one module, and the content hash doubles as the shader component of the
//! pipeline cache keys.

use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::xxh3_128;

/// Content-addressed shader module storage.
#[derive(Default)]
pub struct ShaderModuleCache {
    /// xxh3-128 of final WGSL → compiled module.
    modules: FxHashMap<u128, wgpu::ShaderModule>,
}

impl ShaderModuleCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            modules: FxHashMap::default(),
        }
    }

    /// Hashes `source`, compiling a module for it on first sight.
    ///
    /// Returns the content hash; pass it to [`module`](Self::module) to
    /// borrow the compiled module.
    pub fn ensure(&mut self, device: &wgpu::Device, source: &str, label: &str) -> u128 {
        let hash = xxh3_128(source.as_bytes());
        self.modules.entry(hash).or_insert_with(|| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        });
        hash
    }

    /// Borrows the module compiled for `hash`.
    ///
    /// **Panics** if the hash was never passed through
    /// [`ensure`](Self::ensure) on this cache.
    #[must_use]
    pub fn module(&self, hash: u128) -> &wgpu::ShaderModule {
        self.modules
            .get(&hash)
            .expect("Shader module was not compiled through this cache")
    }

    /// Number of distinct compiled modules.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}
