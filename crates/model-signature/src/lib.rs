// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-signature
//!
//! Resolves and rewrites the input/output names recorded in a TFLite
//! model's `signature_defs`, working on the JSON tree that flatc produces.
//!
//! Serving frameworks bind arguments by signature name, while the graph
//! itself names tensors independently. This crate makes the two agree:
//!
//! - [`ModelTree`]: the decoded model, kept as an untyped JSON value with
//!   typed views ([`Tensor`], [`SignatureEntry`]) over the fields we touch.
//! - [`resolve_tensor`] / [`TensorResolver`]: maps a signature entry's
//!   `tensor_index` to a tensor (`buffer == tensor_index + 1`).
//! - [`SignatureRewriter`]: inspect mode, automatic collision handling,
//!   and explicit [`RenameRule`]s.
//! - [`RewriteObserver`]: receives a [`RewriteEvent`] for every rename, so
//!   the engine itself never prints.
//!
//! # Example
//! ```
//! use model_signature::{ModelTree, SignatureRewriter, TracingObserver};
//!
//! let mut tree = ModelTree::from_json(r#"{
//!     "subgraphs": [{ "tensors": [
//!         { "name": "serving_default_image:0", "buffer": 1 },
//!         { "name": "StatefulPartitionedCall:0", "buffer": 2 }
//!     ]}],
//!     "signature_defs": [{
//!         "inputs":  [{ "name": "image", "tensor_index": 0 }],
//!         "outputs": [{ "name": "image", "tensor_index": 1 }]
//!     }]
//! }"#).unwrap();
//!
//! let rewriter = SignatureRewriter::default();
//! rewriter.auto_rewrite(&mut tree, &mut TracingObserver).unwrap();
//!
//! assert_eq!(tree.tensor(0).unwrap().name(), "image");
//! assert_eq!(tree.tensor(1).unwrap().name(), "output_image");
//! ```

mod error;
mod observer;
mod rename;
mod report;
pub mod resolve;
mod rewriter;
mod tree;

pub use error::ModelError;
pub use observer::{RenameReason, RewriteEvent, RewriteObserver, RewriteSummary, TracingObserver};
pub use rename::RenameRule;
pub use report::{ReportLine, SignatureReport, TensorSummary};
pub use resolve::{resolve_tensor, ResolvePolicy, TensorResolver};
pub use rewriter::{SignatureRewriter, OUTPUT_PREFIX};
pub use tree::{ModelTree, SignatureEntry, SignatureList, Tensor};
