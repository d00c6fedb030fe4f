// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Default mode: rename tensors after their signatures and re-encode.
//!
//! ```text
//! model.tflite ─flatc -t─▶ model.json ─rename─▶ model_renamed.json ─flatc -b─▶ model_renamed.tflite
//! ```

use model_signature::{RewriteEvent, RewriteObserver, TracingObserver};
use rewrite_runtime::{Outcome, Pipeline, RewriteRequest, RewriterConfig};

pub fn execute(config: RewriterConfig, request: RewriteRequest) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            tflite-iorw · Tensor Renamer             ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── Configuration ──────────────────────────────────────────
    println!("  Config:");
    println!("   Model:   {}", request.model.display());
    println!("   Output:  {}", request.output_dir.display());
    println!("   flatc:   {}", config.flatc_path.display());
    println!("   Policy:  {:?}", config.resolve_policy());
    if request.rules.is_empty() {
        println!("   Mode:    automatic (colliding outputs get a prefix)");
    } else {
        println!("   Mode:    {} rename rule(s)", request.rules.len());
        for rule in &request.rules {
            println!("            {} → {}", rule.from, rule.to);
        }
    }
    println!();

    // ── Rewrite ────────────────────────────────────────────────
    let mut log = TracingObserver;
    let mut printer = |event: &RewriteEvent| {
        log.on_event(event);
        match event {
            RewriteEvent::PhaseStarted { .. } => println!("  {event}"),
            RewriteEvent::TensorRenamed { .. } | RewriteEvent::SignatureRenamed { .. } => {
                println!("   {event}")
            }
            RewriteEvent::Unresolved { .. } => println!("   WARNING: {event}"),
        }
    };

    let outcome = Pipeline::new(config)
        .run(&request, &mut printer)
        .map_err(|e| anyhow::anyhow!("failed to rewrite '{}': {e}", request.model.display()))?;

    match outcome {
        Outcome::NoSignature { decoded_json } => {
            println!("  WARNING: signature_defs is not recorded in the model.");
            println!("   Decoded JSON left at {}", decoded_json.display());
        }
        Outcome::Inspected(report) => print!("{report}"),
        Outcome::Rewritten(output) => {
            println!();
            println!("  Summary: {}", output.summary);
            println!("   Decoded JSON:  {}", output.decoded_json.display());
            println!("   Renamed JSON:  {}", output.renamed_json.display());
            println!("   Model:         {}", output.model.display());
        }
    }
    println!();
    Ok(())
}
