// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The decode → rewrite → encode pipeline with type-state–enforced ordering.
//!
//! ```text
//! RewriteJob<Pending>
//!     │  .decode()        flatc check, schema cache, model.tflite → model.json
//!     ▼
//! RewriteJob<Decoded>     .inspect() is available here (read-only)
//!     │  .rewrite()       signature resolution and renaming, in memory
//!     ▼
//! RewriteJob<Rewritten>
//!     │  .encode()        model_renamed.json → model_renamed.tflite
//!     ▼
//!   RewriteOutput
//! ```
//!
//! Both JSON files are left in the output directory for inspection. They are
//! written before the final encode, so their presence alone does not mean
//! the run succeeded.

use crate::flatc::with_stem;
use crate::{Flatc, RewriterConfig, RuntimeError, SchemaStore};
use model_signature::{
    ModelTree, RenameRule, RewriteObserver, RewriteSummary, SignatureReport, SignatureRewriter,
};
use std::path::{Path, PathBuf};

/// Suffix appended to the stem of rewritten files.
pub const RENAMED_SUFFIX: &str = "_renamed";

// ── Type-state markers ─────────────────────────────────────────

/// Nothing has run yet.
#[derive(Debug)]
pub struct Pending;

/// The model has been decoded to JSON and parsed.
#[derive(Debug)]
pub struct Decoded {
    schema: PathBuf,
    json: PathBuf,
    tree: ModelTree,
}

/// Signature names have been rewritten in memory.
#[derive(Debug)]
pub struct Rewritten {
    decoded: Decoded,
    summary: RewriteSummary,
}

/// Sealed trait for job states.
pub trait JobState: std::fmt::Debug {}
impl JobState for Pending {}
impl JobState for Decoded {}
impl JobState for Rewritten {}

// ── Outputs ────────────────────────────────────────────────────

/// Files produced by a completed rewrite.
#[derive(Debug, Clone)]
pub struct RewriteOutput {
    /// flatc's JSON rendering of the input model.
    pub decoded_json: PathBuf,
    /// The JSON after renaming.
    pub renamed_json: PathBuf,
    /// The re-encoded model.
    pub model: PathBuf,
    pub summary: RewriteSummary,
}

// ── Job ────────────────────────────────────────────────────────

/// One model being processed.
///
/// # Example
/// ```no_run
/// use model_signature::TracingObserver;
/// use rewrite_runtime::{RewriteJob, RewriterConfig};
///
/// # fn example() -> Result<(), rewrite_runtime::RuntimeError> {
/// let decoded = RewriteJob::new(RewriterConfig::default(), "model.tflite", "out").decode()?;
/// println!("{}", decoded.inspect()?);
/// let output = decoded.rewrite(&[], &mut TracingObserver)?.encode()?;
/// println!("wrote {}", output.model.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RewriteJob<S: JobState = Pending> {
    config: RewriterConfig,
    flatc: Flatc,
    model: PathBuf,
    output_dir: PathBuf,
    state: S,
}

impl<S: JobState> RewriteJob<S> {
    pub fn config(&self) -> &RewriterConfig {
        &self.config
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn rewriter(&self) -> SignatureRewriter {
        SignatureRewriter::new(self.config.resolve_policy())
    }

    fn transition<T: JobState>(self, state: T) -> RewriteJob<T> {
        RewriteJob {
            config: self.config,
            flatc: self.flatc,
            model: self.model,
            output_dir: self.output_dir,
            state,
        }
    }
}

// ── Pending → Decoded ──────────────────────────────────────────

impl RewriteJob<Pending> {
    pub fn new(
        config: RewriterConfig,
        model: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        let flatc = Flatc::new(config.flatc_path.clone());
        Self {
            config,
            flatc,
            model: model.into(),
            output_dir: output_dir.into(),
            state: Pending,
        }
    }

    /// Decodes the model to JSON and parses it.
    ///
    /// Steps:
    /// 1. Confirm flatc runs (nothing is written if it does not).
    /// 2. Make sure `schema.fbs` is cached.
    /// 3. Create the output directory.
    /// 4. `flatc -t` the model into `<stem>.json` and parse it.
    pub fn decode(self) -> Result<RewriteJob<Decoded>, RuntimeError> {
        let version = self.flatc.version()?;
        tracing::info!("using {version}");

        let store = SchemaStore::new(
            self.config.schema_path(&self.output_dir),
            self.config.resolve_schema_url(),
        );
        let schema = store.ensure()?.to_path_buf();

        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| RuntimeError::io(&self.output_dir, e))?;

        let json = self.flatc.decode(&schema, &self.model, &self.output_dir)?;
        tracing::info!("decoded {} → {}", self.model.display(), json.display());
        let tree = ModelTree::from_file(&json)?;

        Ok(self.transition(Decoded { schema, json, tree }))
    }
}

// ── Decoded → Rewritten ────────────────────────────────────────

impl RewriteJob<Decoded> {
    pub fn tree(&self) -> &ModelTree {
        &self.state.tree
    }

    /// flatc's JSON rendering of the input model.
    pub fn decoded_json(&self) -> &Path {
        &self.state.json
    }

    pub fn has_signature(&self) -> bool {
        self.state.tree.has_signature()
    }

    /// Read-only report of the signature definition.
    pub fn inspect(&self) -> Result<SignatureReport, RuntimeError> {
        Ok(self.rewriter().inspect(&self.state.tree)?)
    }

    /// Renames signatures and tensors in memory.
    ///
    /// With no `rules`, colliding output names are prefixed automatically.
    pub fn rewrite(
        self,
        rules: &[RenameRule],
        observer: &mut dyn RewriteObserver,
    ) -> Result<RewriteJob<Rewritten>, RuntimeError> {
        let rewriter = self.rewriter();
        let RewriteJob {
            config,
            flatc,
            model,
            output_dir,
            state: mut decoded,
        } = self;

        let summary = rewriter.rewrite(&mut decoded.tree, rules, observer)?;
        tracing::info!("{summary}");

        Ok(RewriteJob {
            config,
            flatc,
            model,
            output_dir,
            state: Rewritten { decoded, summary },
        })
    }
}

// ── Rewritten → output ─────────────────────────────────────────

impl RewriteJob<Rewritten> {
    pub fn tree(&self) -> &ModelTree {
        &self.state.decoded.tree
    }

    pub fn summary(&self) -> RewriteSummary {
        self.state.summary
    }

    /// Writes `<stem>_renamed.json` and encodes it back to a model.
    pub fn encode(self) -> Result<RewriteOutput, RuntimeError> {
        let Rewritten { decoded, summary } = self.state;
        let renamed_json = renamed_json_path(&self.model, &self.output_dir)?;

        decoded.tree.write_to_file(&renamed_json)?;
        tracing::info!("wrote {}", renamed_json.display());

        let model = self
            .flatc
            .encode(&decoded.schema, &renamed_json, &self.output_dir)?;
        tracing::info!("encoded {}", model.display());

        Ok(RewriteOutput {
            decoded_json: decoded.json,
            renamed_json,
            model,
            summary,
        })
    }
}

/// `out_dir/<model stem>_renamed.json`.
pub fn renamed_json_path(model: &Path, output_dir: &Path) -> Result<PathBuf, RuntimeError> {
    let decoded = with_stem(model, output_dir, "json")?;
    let stem = decoded
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(output_dir.join(format!("{stem}{RENAMED_SUFFIX}.json")))
}

// ── One-shot pipeline ──────────────────────────────────────────

/// What the caller asked for.
#[derive(Debug, Clone, Default)]
pub struct RewriteRequest {
    pub model: PathBuf,
    pub output_dir: PathBuf,
    /// Only report the signature definition; write nothing back.
    pub view: bool,
    /// Explicit renames; empty means automatic collision handling.
    pub rules: Vec<RenameRule>,
}

/// How a pipeline run ended.
#[derive(Debug)]
pub enum Outcome {
    /// The model records no `signature_defs`; nothing was rewritten.
    NoSignature { decoded_json: PathBuf },
    /// View mode.
    Inspected(SignatureReport),
    Rewritten(RewriteOutput),
}

/// Runs a [`RewriteRequest`] from start to finish.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: RewriterConfig,
}

impl Pipeline {
    pub fn new(config: RewriterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RewriterConfig {
        &self.config
    }

    pub fn run(
        &self,
        request: &RewriteRequest,
        observer: &mut dyn RewriteObserver,
    ) -> Result<Outcome, RuntimeError> {
        let decoded = RewriteJob::new(
            self.config.clone(),
            request.model.clone(),
            request.output_dir.clone(),
        )
        .decode()?;

        if !decoded.has_signature() {
            tracing::warn!("signature_defs is not recorded in the model, nothing to do");
            return Ok(Outcome::NoSignature {
                decoded_json: decoded.decoded_json().to_path_buf(),
            });
        }

        if request.view {
            return Ok(Outcome::Inspected(decoded.inspect()?));
        }

        let output = decoded.rewrite(&request.rules, observer)?.encode()?;
        Ok(Outcome::Rewritten(output))
    }
}
