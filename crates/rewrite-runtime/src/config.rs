// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Rewriter configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! flatc_path = "/usr/local/bin/flatc"
//! schema_version = "v2.13.0-rc1"
//! schema_dir = "/var/cache/tflite-iorw"
//! strict = false
//! ```

use model_signature::ResolvePolicy;
use std::path::{Path, PathBuf};

/// TensorFlow release the TFLite schema is taken from.
pub const DEFAULT_SCHEMA_VERSION: &str = "v2.13.0-rc1";

/// Schema file name, both remotely and in the cache directory.
pub const SCHEMA_FILE: &str = "schema.fbs";

/// Configuration for the decode → rewrite → encode pipeline.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RewriterConfig {
    /// flatc executable (looked up on `PATH` unless absolute).
    pub flatc_path: PathBuf,
    /// TensorFlow tag used to build the schema URL.
    pub schema_version: String,
    /// Full schema URL; overrides `schema_version` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_url: Option<String>,
    /// Directory caching `schema.fbs`. Defaults to the output directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_dir: Option<PathBuf>,
    /// Fail on unresolved or ambiguous signature references.
    pub strict: bool,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            flatc_path: PathBuf::from("flatc"),
            schema_version: DEFAULT_SCHEMA_VERSION.to_string(),
            schema_url: None,
            schema_dir: None,
            strict: false,
        }
    }
}

impl RewriterConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, super::RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::RuntimeError::ConfigError(format!(
                "cannot read config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, super::RuntimeError> {
        toml::from_str(toml_str).map_err(|e| {
            super::RuntimeError::ConfigError(format!("TOML parse error: {e}"))
        })
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, super::RuntimeError> {
        toml::to_string_pretty(self).map_err(|e| {
            super::RuntimeError::ConfigError(format!("TOML serialise error: {e}"))
        })
    }

    /// URL the schema is downloaded from.
    pub fn resolve_schema_url(&self) -> String {
        self.schema_url.clone().unwrap_or_else(|| {
            format!(
                "https://raw.githubusercontent.com/tensorflow/tensorflow/{}/tensorflow/lite/schema/{SCHEMA_FILE}",
                self.schema_version
            )
        })
    }

    /// Resolution policy for the signature rewriter.
    pub fn resolve_policy(&self) -> ResolvePolicy {
        if self.strict {
            ResolvePolicy::Strict
        } else {
            ResolvePolicy::Lenient
        }
    }

    /// Where `schema.fbs` lives for a run writing into `output_dir`.
    pub fn schema_path(&self, output_dir: &Path) -> PathBuf {
        self.schema_dir
            .as_deref()
            .unwrap_or(output_dir)
            .join(SCHEMA_FILE)
    }
}
