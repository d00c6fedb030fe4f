// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor resolution: mapping a signature entry to the tensor it names.
//!
//! Signature definitions do not store tensor positions. They store a
//! buffer-relative index shifted down by one, because buffer 0 is reserved
//! for "no data". An entry with `tensor_index = k` therefore refers to the
//! tensor whose `buffer` field equals `k + 1`.

use crate::{ModelError, SignatureEntry, SignatureList, Tensor};

/// How to react to references that are missing or ambiguous.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolvePolicy {
    /// Skip unresolved entries; take the first of several matches.
    #[default]
    Lenient,
    /// Fail the whole operation on an unresolved or ambiguous reference.
    Strict,
}

/// Returns the position of the first tensor with `buffer == tensor_index + 1`.
///
/// A negative `tensor_index` never resolves.
pub fn resolve_tensor(tensors: &[Option<Tensor<'_>>], tensor_index: i64) -> Option<usize> {
    matching_positions(tensors, tensor_index).first().copied()
}

fn matching_positions(tensors: &[Option<Tensor<'_>>], tensor_index: i64) -> Vec<usize> {
    let Some(target) = buffer_for(tensor_index) else {
        return Vec::new();
    };
    tensors
        .iter()
        .enumerate()
        .filter(|(_, tensor)| tensor.is_some_and(|t| t.buffer() == target))
        .map(|(pos, _)| pos)
        .collect()
}

/// Buffer index referenced by a signature `tensor_index`.
fn buffer_for(tensor_index: i64) -> Option<i64> {
    if tensor_index < 0 {
        None
    } else {
        tensor_index.checked_add(1)
    }
}

/// Resolves signature entries against a tensor list under a [`ResolvePolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TensorResolver {
    policy: ResolvePolicy,
}

impl TensorResolver {
    pub fn new(policy: ResolvePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ResolvePolicy {
        self.policy
    }

    /// Resolves `entry` to a tensor position.
    ///
    /// `Ok(None)` means the entry is skipped (lenient mode only).
    pub fn resolve(
        &self,
        tensors: &[Option<Tensor<'_>>],
        list: SignatureList,
        entry: &SignatureEntry<'_>,
    ) -> Result<Option<usize>, ModelError> {
        let tensor_index = entry.tensor_index();
        let positions = matching_positions(tensors, tensor_index);
        let first = positions.first().copied();

        match self.policy {
            ResolvePolicy::Lenient => {
                if first.is_none() {
                    tracing::debug!(
                        "{list} signature '{}' (tensor_index {tensor_index}) has no tensor, skipping",
                        entry.name().unwrap_or_default(),
                    );
                }
                Ok(first)
            }
            ResolvePolicy::Strict => {
                let signature = entry.name().unwrap_or_default().to_string();
                let Some(first) = first else {
                    return Err(ModelError::UnresolvedReference {
                        list,
                        signature,
                        tensor_index,
                    });
                };
                if positions.len() > 1 {
                    return Err(ModelError::AmbiguousReference {
                        list,
                        signature,
                        tensor_index,
                        matches: positions.len(),
                    });
                }
                Ok(Some(first))
            }
        }
    }
}
