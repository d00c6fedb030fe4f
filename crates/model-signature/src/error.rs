// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for signature resolution and tensor renaming.

use crate::SignatureList;

/// Errors that can occur when inspecting or rewriting a decoded model tree.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The decoded model file could not be read.
    #[error("failed to read model json: {0}")]
    ReadError(#[from] std::io::Error),

    /// The decoded model is not valid JSON.
    #[error("failed to parse model json: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The model carries no `signature_defs` (missing or empty).
    #[error("signature_defs is not recorded in the model")]
    NoSignature,

    /// A field the rewriter relies on is missing or has the wrong type.
    #[error("malformed model tree: {0}")]
    MalformedTree(String),

    /// Strict mode: a signature entry points at no tensor.
    #[error("{list} signature '{signature}' (tensor_index {tensor_index}) does not resolve to any tensor")]
    UnresolvedReference {
        list: SignatureList,
        signature: String,
        tensor_index: i64,
    },

    /// Strict mode: a signature entry matches more than one tensor.
    #[error("{list} signature '{signature}' (tensor_index {tensor_index}) matches {matches} tensors")]
    AmbiguousReference {
        list: SignatureList,
        signature: String,
        tensor_index: i64,
        matches: usize,
    },

    /// Strict mode: the rewrite would leave two entries of one list with the same name.
    #[error("rewrite would give two {list} signatures the name '{name}'")]
    DuplicateSignatureName { list: SignatureList, name: String },

    /// Rename arguments did not come in `from`/`to` pairs.
    #[error("rename arguments must come in FROM TO pairs, got {0} values")]
    InvalidRenamePairs(usize),
}
