// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the flatc bridge and rewrite pipeline.

use std::path::PathBuf;

/// Install hint shown whenever flatc cannot be run.
pub const FLATC_INSTALL_HINT: &str = "Install \"flatc\". \
    debian/ubuntu: apt-get install -y flatbuffers-compiler. \
    Other than debian/ubuntu: https://github.com/google/flatbuffers/releases";

/// Errors that can occur while decoding, rewriting or re-encoding a model.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// flatc is not installed or not on `PATH`.
    #[error("cannot run '{}': {source}. {}", .program.display(), FLATC_INSTALL_HINT)]
    FlatcMissing {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// flatc ran but reported failure.
    #[error("'{}' exited with {status}: {stderr}", .program.display())]
    FlatcFailed {
        program: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// The schema file could not be downloaded.
    #[error("failed to fetch schema: {0}")]
    SchemaFetch(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Filesystem error outside of flatc itself.
    #[error("i/o error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Signature resolution or tree handling failed.
    #[error("model error: {0}")]
    ModelError(#[from] model_signature::ModelError),
}

impl RuntimeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
