// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Rewrite events and the observer interface that receives them.
//!
//! The rewriter never prints. Every rename it performs, and every entry it
//! has to skip, is reported as a [`RewriteEvent`] so that callers decide how
//! (and whether) to present it.

use crate::SignatureList;
use std::fmt;

/// Why a signature entry changed its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameReason {
    /// An output shared its name with an input and got the `output_` prefix.
    Collision,
    /// A user-supplied rule matched the linked tensor's name.
    Rule,
}

/// A single step taken by the rewriter.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RewriteEvent {
    /// Tensor names are about to be overwritten from one signature list.
    PhaseStarted { list: SignatureList },
    SignatureRenamed {
        list: SignatureList,
        from: String,
        to: String,
        reason: RenameReason,
    },
    TensorRenamed {
        list: SignatureList,
        from: String,
        to: String,
    },
    /// The entry's `tensor_index` matched no tensor and was skipped.
    Unresolved {
        list: SignatureList,
        signature: String,
        tensor_index: i64,
    },
}

impl fmt::Display for RewriteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PhaseStarted { list } => write!(
                f,
                "Overwriting the {list} OP names with the contents of signature_defs"
            ),
            Self::SignatureRenamed {
                list,
                from,
                to,
                reason,
            } => {
                let why = match reason {
                    RenameReason::Collision => "collides with an input",
                    RenameReason::Rule => "rename rule",
                };
                write!(f, "{list} signature FROM: {from} TO: {to} ({why})")
            }
            Self::TensorRenamed { from, to, .. } => write!(f, "FROM: {from} TO: {to}"),
            Self::Unresolved {
                list,
                signature,
                tensor_index,
            } => write!(
                f,
                "{list} signature '{signature}' (tensor_index {tensor_index}) has no tensor, skipped"
            ),
        }
    }
}

/// Receives [`RewriteEvent`]s as the rewriter runs.
pub trait RewriteObserver {
    fn on_event(&mut self, event: &RewriteEvent);
}

impl<F: FnMut(&RewriteEvent)> RewriteObserver for F {
    fn on_event(&mut self, event: &RewriteEvent) {
        self(event)
    }
}

/// Records every event; handy for tests and for JSON output.
impl RewriteObserver for Vec<RewriteEvent> {
    fn on_event(&mut self, event: &RewriteEvent) {
        self.push(event.clone());
    }
}

/// Forwards events to `tracing` at info level (skips at warn).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RewriteObserver for TracingObserver {
    fn on_event(&mut self, event: &RewriteEvent) {
        match event {
            RewriteEvent::Unresolved { .. } => tracing::warn!("{event}"),
            _ => tracing::info!("{event}"),
        }
    }
}

/// Counts of what a rewrite changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RewriteSummary {
    pub signatures_renamed: usize,
    pub tensors_renamed: usize,
    pub unresolved: usize,
}

impl fmt::Display for RewriteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} signature names changed, {} tensors renamed, {} entries unresolved",
            self.signatures_renamed, self.tensors_renamed, self.unresolved,
        )
    }
}
