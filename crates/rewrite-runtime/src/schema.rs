// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Local cache of the TFLite flatbuffers schema.
//!
//! flatc needs `schema.fbs` for both directions of the conversion. The file
//! is fetched once from the TensorFlow repository and reused afterwards.

use crate::RuntimeError;
use std::path::{Path, PathBuf};

/// A cached `schema.fbs` and where to fetch it from when absent.
#[derive(Debug, Clone)]
pub struct SchemaStore {
    path: PathBuf,
    url: String,
}

impl SchemaStore {
    pub fn new(path: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_cached(&self) -> bool {
        self.path.is_file()
    }

    /// Returns the schema path, downloading the file first if needed.
    pub fn ensure(&self) -> Result<&Path, RuntimeError> {
        if self.is_cached() {
            tracing::debug!("schema cached at {}", self.path.display());
            return Ok(&self.path);
        }

        tracing::info!("downloading schema from {}", self.url);
        let body = ureq::get(&self.url)
            .call()
            .map_err(|e| RuntimeError::SchemaFetch(format!("GET {}: {e}", self.url)))?
            .into_string()
            .map_err(|e| RuntimeError::SchemaFetch(format!("reading {}: {e}", self.url)))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| RuntimeError::io(dir, e))?;
        }
        std::fs::write(&self.path, body).map_err(|e| RuntimeError::io(&self.path, e))?;
        tracing::info!("schema saved to {}", self.path.display());
        Ok(&self.path)
    }
}
