// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! User-supplied rename rules.

use crate::ModelError;

/// Renames signature entries whose linked tensor is currently named `from`.
///
/// Rules match tensor names, not signature names: use the `OPNAME` column of
/// the inspect report to find the `from` values.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RenameRule {
    pub from: String,
    pub to: String,
}

impl RenameRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Builds rules from a flat `[from, to, from, to, ..]` argument list.
    pub fn from_pairs<S: AsRef<str>>(values: &[S]) -> Result<Vec<Self>, ModelError> {
        if values.len() % 2 != 0 {
            return Err(ModelError::InvalidRenamePairs(values.len()));
        }
        Ok(values
            .chunks_exact(2)
            .map(|pair| Self::new(pair[0].as_ref(), pair[1].as_ref()))
            .collect())
    }
}

impl<A: Into<String>, B: Into<String>> From<(A, B)> for RenameRule {
    fn from((from, to): (A, B)) -> Self {
        Self::new(from, to)
    }
}

/// First rule whose `from` equals `tensor_name`.
pub(crate) fn find_rule<'r>(rules: &'r [RenameRule], tensor_name: &str) -> Option<&'r RenameRule> {
    rules.iter().find(|rule| rule.from == tensor_name)
}
