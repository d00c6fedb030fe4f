// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # rewrite-runtime
//!
//! Everything around the signature rewriter that touches the outside world:
//!
//! - [`Flatc`]: runs the flatc schema compiler to turn a `.tflite` model
//!   into JSON and back.
//! - [`SchemaStore`]: keeps a local copy of the TFLite `schema.fbs`,
//!   downloading it once when missing.
//! - [`RewriterConfig`]: TOML configuration (flatc path, schema source,
//!   strict resolution).
//! - [`RewriteJob`]: the decode → rewrite → encode sequence as a
//!   type-state pipeline, and [`Pipeline`] to run it in one call.
//!
//! # Failure semantics
//! A missing flatc aborts before anything is written. A failing flatc
//! aborts the run; the intermediate JSON files may already exist, but the
//! output model is only valid when [`Pipeline::run`] returns
//! [`Outcome::Rewritten`].

mod config;
mod error;
pub mod flatc;
pub mod pipeline;
mod schema;

pub use config::{RewriterConfig, DEFAULT_SCHEMA_VERSION, SCHEMA_FILE};
pub use error::{RuntimeError, FLATC_INSTALL_HINT};
pub use flatc::Flatc;
pub use pipeline::{
    Decoded, JobState, Outcome, Pending, Pipeline, RewriteJob, RewriteOutput, RewriteRequest,
    Rewritten,
};
pub use schema::SchemaStore;
