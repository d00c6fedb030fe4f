// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared CLI setup.

pub mod inspect;
pub mod rewrite;

use rewrite_runtime::RewriterConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level follows `--verbose`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the TOML config (or defaults) and applies CLI overrides on top.
pub fn load_config(
    path: Option<&Path>,
    flatc: Option<PathBuf>,
    strict: bool,
) -> anyhow::Result<RewriterConfig> {
    let mut config = match path {
        Some(path) => RewriterConfig::from_file(path).map_err(|e| {
            anyhow::anyhow!("failed to load config from '{}': {e}", path.display())
        })?,
        None => RewriterConfig::default(),
    };

    if let Some(flatc) = flatc {
        config.flatc_path = flatc;
    }
    config.strict |= strict;

    tracing::debug!(?config, "effective configuration");
    Ok(config)
}
