//! Shader Source Assembly
//!
//! Builds the WGSL source for one stage from the declarative inputs: the
//! planned binding slots, the generated vertex IO declarations, and the
//! caller's head/main snippets.
//!
//! One builder serves all three stages — the stage is a tag, not a
//! subclass — so the required append order lives in exactly one place,
//! [`assemble`]:
//!
//! 1. uniform block structs + declarations (transform block first, at
//!    binding 0; the optional user block follows at binding 1),
//! 2. vertex input / output structs (vertex and fragment stages),
//! 3. sampler declarations,
//! 4. texture declarations,
//! 5. storage struct + declarations,
//! 6. the verbatim head snippet,
//! 7. the stage entry point wrapping the mandatory main snippet.
//!
//! Binding indices come from the slot list and locations from the vertex
//! layout generator; nothing is renumbered here.
//!
//! Generated variable naming: uniform blocks are `u_{name}`, textures
//! `t_{name}`, samplers `s_{name}`, storage buffers `st_{name}`, with
//! struct types named `Struct_{name}`.

use std::fmt::Write;

use crate::errors::{Result, WeftError};
use crate::render::binding::{BindingSlot, BoundResource};
use crate::render::uniform_layout::UniformType;
use crate::render::vertex::VaryingDecl;

/// Shader stage tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

impl ShaderStage {
    /// Entry point function name emitted for (and expected from) this stage.
    #[must_use]
    pub const fn entry_point(self) -> &'static str {
        match self {
            Self::Vertex => "vs_main",
            Self::Fragment => "fs_main",
            Self::Compute => "main",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Compute => "compute",
        }
    }
}

/// Free-text shader snippets supplied by the caller.
///
/// `main` is spliced into the stage entry point and is mandatory; a shader
/// with no main body cannot compile. `head` is inserted verbatim before the
/// entry point and may be empty.
#[derive(Debug, Clone, Default)]
pub struct ShaderSnippets {
    pub head: String,
    pub main: String,
}

impl ShaderSnippets {
    #[must_use]
    pub fn main(main: &str) -> Self {
        Self {
            head: String::new(),
            main: main.to_string(),
        }
    }

    #[must_use]
    pub fn with_head(head: &str, main: &str) -> Self {
        Self {
            head: head.to_string(),
            main: main.to_string(),
        }
    }
}

/// Everything one stage build consumes.
pub struct ShaderInput<'a> {
    /// Planned binding slots, in index order.
    pub bindings: &'a [BindingSlot<'a>],
    /// Vertex attribute declarations. Ignored by the compute stage.
    pub varyings: &'a [VaryingDecl],
    /// Workgroup size. Used by the compute stage only.
    pub workgroup_size: [u32; 3],
    pub snippets: &'a ShaderSnippets,
}

/// Assembles the complete WGSL source for `stage`.
///
/// A missing main snippet fails before any source text is produced, so no
/// partially built shader can reach module creation.
pub fn assemble(stage: ShaderStage, input: &ShaderInput<'_>) -> Result<String> {
    if input.snippets.main.trim().is_empty() {
        return Err(WeftError::MissingMainSnippet {
            stage: stage.name(),
        });
    }

    let mut builder = ShaderBuilder::new(stage);
    builder.add_uniform_blocks(input.bindings);
    if stage != ShaderStage::Compute {
        builder.add_stage_io(input.varyings);
    }
    builder.add_samplers(input.bindings);
    builder.add_textures(input.bindings);
    builder.add_storages(input.bindings);
    builder.add_head(&input.snippets.head);
    builder.add_entry_point(&input.snippets.main, input.workgroup_size);
    Ok(builder.source)
}

struct ShaderBuilder {
    stage: ShaderStage,
    source: String,
}

impl ShaderBuilder {
    fn new(stage: ShaderStage) -> Self {
        Self {
            stage,
            source: String::new(),
        }
    }

    fn add_uniform_blocks(&mut self, bindings: &[BindingSlot<'_>]) {
        for slot in bindings {
            let BoundResource::UniformBlock { name, block } = &slot.resource else {
                continue;
            };
            self.push_struct(name, block.layout().fields.iter().map(|f| (f.name.as_str(), f.ty)));
            let _ = writeln!(
                self.source,
                "@group(0) @binding({}) var<uniform> u_{name}: Struct_{name};\n",
                slot.index
            );
        }
    }

    fn add_stage_io(&mut self, varyings: &[VaryingDecl]) {
        let mut inputs = String::new();
        let mut outputs = String::new();
        for v in varyings {
            let _ = writeln!(inputs, "    @location({}) {}: {},", v.location, v.name, v.wgsl_type);
            let _ = writeln!(outputs, "    @location({}) {}: {},", v.location, v.name, v.wgsl_type);
        }

        match self.stage {
            ShaderStage::Vertex => {
                let _ = write!(
                    self.source,
                    "struct VertexInput {{\n{inputs}}};\n\n\
                     struct VertexOutput {{\n    @builtin(position) clip_position: vec4<f32>,\n{outputs}}};\n\n"
                );
            }
            ShaderStage::Fragment => {
                // The fragment input mirrors the vertex output field for
                // field, locations included.
                let _ = write!(
                    self.source,
                    "struct FragmentInput {{\n    @builtin(position) clip_position: vec4<f32>,\n{inputs}}};\n\n\
                     struct FragmentOutput {{\n    @location(0) color: vec4<f32>,\n}};\n\n"
                );
            }
            ShaderStage::Compute => {}
        }
    }

    fn add_samplers(&mut self, bindings: &[BindingSlot<'_>]) {
        for slot in bindings {
            if let BoundResource::Sampler(sampler) = &slot.resource {
                let _ = writeln!(
                    self.source,
                    "@group(0) @binding({}) var s_{}: {};",
                    slot.index, sampler.name, sampler.wgsl_type
                );
            }
        }
    }

    fn add_textures(&mut self, bindings: &[BindingSlot<'_>]) {
        for slot in bindings {
            if let BoundResource::Texture(texture) = &slot.resource {
                let _ = writeln!(
                    self.source,
                    "@group(0) @binding({}) var t_{}: {};",
                    slot.index, texture.name, texture.wgsl_type
                );
            }
        }
    }

    fn add_storages(&mut self, bindings: &[BindingSlot<'_>]) {
        for slot in bindings {
            let BoundResource::Storage(storage) = &slot.resource else {
                continue;
            };
            let access = if storage.read_only() { "read" } else { "read_write" };
            // An unstructured storage buffer binds as a raw word array.
            let element = match storage.struct_name() {
                Some(name) => {
                    self.push_struct(name, storage.struct_fields().iter().map(|(n, t)| (n.as_str(), *t)));
                    format!("Struct_{name}")
                }
                None => "u32".to_string(),
            };
            let name = storage.struct_name().unwrap_or("data");
            let _ = writeln!(
                self.source,
                "@group(0) @binding({}) var<storage, {access}> st_{name}: array<{element}>;\n",
                slot.index
            );
        }
    }

    fn add_head(&mut self, head: &str) {
        if !head.is_empty() {
            self.source.push_str(head);
            self.source.push('\n');
        }
    }

    fn add_entry_point(&mut self, main: &str, workgroup_size: [u32; 3]) {
        match self.stage {
            ShaderStage::Vertex => {
                let _ = write!(
                    self.source,
                    "@vertex\nfn vs_main(input: VertexInput) -> VertexOutput {{\n\
                         var output: VertexOutput;\n{main}\n    return output;\n}}\n"
                );
            }
            ShaderStage::Fragment => {
                let _ = write!(
                    self.source,
                    "@fragment\nfn fs_main(input: FragmentInput) -> FragmentOutput {{\n\
                         var output: FragmentOutput;\n{main}\n    return output;\n}}\n"
                );
            }
            ShaderStage::Compute => {
                let [x, y, z] = workgroup_size;
                let _ = write!(
                    self.source,
                    "@compute @workgroup_size({x}, {y}, {z})\n\
                     fn main(@builtin(global_invocation_id) global_id: vec3<u32>) {{\n\
                         let index = global_id.x;\n{main}\n}}\n"
                );
            }
        }
    }

    fn push_struct<'f>(
        &mut self,
        name: &str,
        fields: impl Iterator<Item = (&'f str, UniformType)>,
    ) {
        let _ = writeln!(self.source, "struct Struct_{name} {{");
        for (field_name, ty) in fields {
            let _ = writeln!(self.source, "    {field_name}: {},", ty.wgsl_name());
        }
        self.source.push_str("};\n\n");
    }
}
