// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tflite-iorw -v`: print the model's signature definition.
//!
//! Decodes the model and lists every input and output signature with the
//! tensor it resolves to. Nothing is written back.

use rewrite_runtime::{RewriteJob, RewriteRequest, RewriterConfig};

pub fn execute(config: RewriterConfig, request: RewriteRequest, json: bool) -> anyhow::Result<()> {
    if !json {
        println!("╔══════════════════════════════════════════════════════╗");
        println!("║           tflite-iorw · Signature Viewer            ║");
        println!("╚══════════════════════════════════════════════════════╝");
        println!();
        println!("  Model:  {}", request.model.display());
        println!();
    }

    let decoded = RewriteJob::new(config, &request.model, &request.output_dir)
        .decode()
        .map_err(|e| anyhow::anyhow!("failed to decode '{}': {e}", request.model.display()))?;

    if !decoded.has_signature() {
        println!("  WARNING: signature_defs is not recorded in the model.");
        return Ok(());
    }

    let report = decoded.inspect()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    // ── Signatures ─────────────────────────────────────────────
    for line in report.to_string().lines() {
        println!("  {line}");
    }
    println!();

    let unresolved = report.unresolved_count();
    if unresolved > 0 {
        println!("  WARNING: {unresolved} signature(s) reference no tensor.");
        println!();
    }
    Ok(())
}
