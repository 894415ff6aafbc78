// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Scale Invariant

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or building a keyboard layout.
///
/// Attribute decoding never produces one of these: malformed values fall back
/// to their defaults.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("XML parse error at byte {position}: {message}")]
    Xml { position: usize, message: String },

    #[error("invalid structure: {0}")]
    InvalidStructure(String),

    #[error("unexpected end of description: {0}")]
    UnexpectedEof(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown layout: {0}")]
    UnknownLayout(String),
}

impl LayoutError {
    /// Stream errors truncate the layout; everything else aborts the build
    pub fn is_stream_error(&self) -> bool {
        matches!(self, LayoutError::Xml { .. } | LayoutError::UnexpectedEof(_) | LayoutError::Io { .. })
    }
}
