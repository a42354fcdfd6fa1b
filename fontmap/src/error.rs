// Copyright 2024 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by font lookup, scanning and rendering.

/// Errors produced while locating, loading or rendering fonts.
///
/// Every variant is recoverable. Callers are expected to fall back to a
/// built-in face or skip the affected glyph or draw call.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No installed face satisfied the request.
    #[error("no matching font was found")]
    NotFound,
    /// A pixel format or blend mode combination cannot be composited.
    #[error("unsupported pixel format combination")]
    UnsupportedFormat,
    /// Font data failed validation.
    #[error("malformed font data: {0}")]
    MalformedFontData(&'static str),
    /// A glyph bitmap exceeded the fixed size cap.
    #[error("glyph bitmap of {width}x{height} exceeds the size limit")]
    ResourceLimitExceeded {
        /// Requested bitmap width in pixels.
        width: u32,
        /// Requested bitmap height in pixels.
        height: u32,
    },
    /// Reading a font file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type with [`Error`] as the default error.
pub type Result<T, E = Error> = core::result::Result<T, E>;
