//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`WeftError`] covers the configuration failures of the
//! composition layer:
//! - Uniform layout errors (unknown type tags, unknown field names)
//! - Shader assembly errors (missing main snippet, unusable vertex input)
//!
//! All of these are deterministic structural mismatches: retrying without
//! changing the inputs cannot succeed, so there is no retry layer. Recoverable
//! misuse (writing to a uniform block index that does not exist, re-declaring
//! a storage struct) is reported through `log::warn!` and ignored instead of
//! surfacing here.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, WeftError>`.

use thiserror::Error;

/// The main error type for the Weft composition layer.
#[derive(Error, Debug)]
pub enum WeftError {
    // ========================================================================
    // Uniform Layout Errors
    // ========================================================================
    /// A textual uniform type tag did not match any supported type.
    #[error("Unknown uniform type tag: {0:?}")]
    UnknownUniformType(String),

    /// A uniform field name was not present in the declared set.
    #[error("Uniform not found in declared set: {0:?}")]
    UnknownUniform(String),

    /// A value written to a uniform field did not match the field's byte size.
    #[error("Uniform {name:?} expects {expected} bytes, got {actual}")]
    UniformSizeMismatch {
        /// The field being written.
        name: String,
        /// Byte size assigned by the layout allocator.
        expected: u64,
        /// Byte size of the supplied payload.
        actual: u64,
    },

    // ========================================================================
    // Shader Assembly Errors
    // ========================================================================
    /// A shader stage was built without a main snippet.
    #[error("Shader stage {stage} has no main snippet")]
    MissingMainSnippet {
        /// The stage that failed to build.
        stage: &'static str,
    },

    /// A vertex buffer carries no recognized attributes.
    #[error("Vertex buffer in slot {slot} has no attributes")]
    EmptyVertexBuffer {
        /// The vertex buffer slot index.
        slot: u32,
    },

    /// A vertex attribute uses a format with no WGSL input mapping.
    #[error("Unsupported vertex format for shader input: {0:?}")]
    UnsupportedVertexFormat(wgpu::VertexFormat),
}

/// Alias for `Result<T, WeftError>`.
pub type Result<T> = std::result::Result<T, WeftError>;
