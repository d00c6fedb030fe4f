// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tflite-iorw
//!
//! Renames the input/output tensors of a TFLite model after the names
//! recorded in its `signature_defs`.
//!
//! ## Usage
//! ```bash
//! # Print the signature definition
//! tflite-iorw -i movinet_a0.tflite -v
//!
//! # Rename tensors after their signatures, prefixing colliding outputs
//! tflite-iorw -i movinet_a0.tflite -o out
//!
//! # Explicit renames, matched against the current tensor names
//! tflite-iorw -i movinet_a0.tflite -r serving_default_image:0 image -r StatefulPartitionedCall:0 logits
//! ```

mod commands;

use clap::Parser;
use model_signature::RenameRule;
use rewrite_runtime::RewriteRequest;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tflite-iorw",
    about = "Rewrite TFLite input/output tensor names from signature_defs",
    version,
    author
)]
struct Cli {
    /// Input .tflite file.
    #[arg(short = 'i', long = "input_tflite_file_path")]
    input: PathBuf,

    /// Print the signature definition and exit without writing a model.
    #[arg(short = 'v', long)]
    view: bool,

    /// Output folder for the intermediate JSON files and the renamed model.
    #[arg(short = 'o', long = "output_folder_path", default_value = ".")]
    output: PathBuf,

    /// Rename the tensor currently named FROM to TO (repeatable).
    #[arg(
        short = 'r',
        long,
        num_args = 2,
        value_names = ["FROM", "TO"],
        action = clap::ArgAction::Append
    )]
    rename: Vec<String>,

    /// Path to a TOML configuration file (CLI flags take precedence).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// flatc program to run.
    #[arg(long)]
    flatc: Option<PathBuf>,

    /// Fail on dangling or ambiguous tensor_index references.
    #[arg(long)]
    strict: bool,

    /// Print the view report as JSON.
    #[arg(long, requires = "view")]
    json: bool,

    /// Enable verbose logging (repeat for more: --verbose --verbose).
    #[arg(long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    let config = commands::load_config(cli.config.as_deref(), cli.flatc, cli.strict)?;
    let rules = RenameRule::from_pairs(cli.rename.as_slice())?;

    let request = RewriteRequest {
        model: cli.input,
        output_dir: cli.output,
        view: cli.view,
        rules,
    };

    if request.view {
        commands::inspect::execute(config, request, cli.json)
    } else {
        commands::rewrite::execute(config, request)
    }
}
