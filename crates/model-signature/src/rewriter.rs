// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The signature resolver/rewriter.
//!
//! Every operation runs in two stages:
//!
//! ```text
//! plan:  resolve each signature entry to a tensor, decide every new name
//!          (read-only; all errors surface here)
//! apply: write signature names, then copy them onto the linked tensors
//! ```
//!
//! Because nothing is written until planning succeeds, a failed call leaves
//! the tree exactly as it was.

use crate::rename::find_rule;
use crate::{
    ModelError, ModelTree, RenameReason, RenameRule, ReportLine, ResolvePolicy, RewriteEvent,
    RewriteObserver, RewriteSummary, SignatureList, SignatureReport, TensorResolver,
    TensorSummary,
};
use std::collections::HashSet;

/// Prefix given to output signatures that share a name with an input.
pub const OUTPUT_PREFIX: &str = "output_";

/// Resolved state of one signature entry.
#[derive(Debug, Clone)]
struct EntryPlan {
    name: Option<String>,
    tensor_index: i64,
    tensor: Option<usize>,
    renamed: Option<(String, RenameReason)>,
}

impl EntryPlan {
    fn final_name(&self) -> Option<&str> {
        self.renamed
            .as_ref()
            .map(|(to, _)| to.as_str())
            .or(self.name.as_deref())
    }
}

#[derive(Debug)]
struct RewritePlan {
    inputs: Vec<EntryPlan>,
    outputs: Vec<EntryPlan>,
    /// Tensor names before any change, by position.
    tensor_names: Vec<String>,
}

impl RewritePlan {
    fn entries(&self, list: SignatureList) -> &[EntryPlan] {
        match list {
            SignatureList::Inputs => &self.inputs,
            SignatureList::Outputs => &self.outputs,
        }
    }

    fn entries_mut(&mut self, list: SignatureList) -> &mut [EntryPlan] {
        match list {
            SignatureList::Inputs => &mut self.inputs,
            SignatureList::Outputs => &mut self.outputs,
        }
    }
}

/// Inspects and rewrites the first signature definition of a [`ModelTree`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureRewriter {
    resolver: TensorResolver,
}

impl SignatureRewriter {
    pub fn new(policy: ResolvePolicy) -> Self {
        Self {
            resolver: TensorResolver::new(policy),
        }
    }

    pub fn policy(&self) -> ResolvePolicy {
        self.resolver.policy()
    }

    /// Reports every signature entry with its linked tensor. Never mutates.
    pub fn inspect(&self, tree: &ModelTree) -> Result<SignatureReport, ModelError> {
        let plan = self.plan(tree)?;
        let line = |entry: &EntryPlan| ReportLine {
            signature_name: entry.name.clone().unwrap_or_default(),
            tensor_index: entry.tensor_index,
            tensor: entry.tensor.and_then(|pos| tree.tensor(pos)).map(|t| TensorSummary {
                name: t.name().to_string(),
                tensor_type: t.tensor_type(),
                shape: t.shape(),
            }),
        };
        Ok(SignatureReport {
            signature_key: tree.signature_key().map(str::to_string),
            inputs: plan.inputs.iter().map(line).collect(),
            outputs: plan.outputs.iter().map(line).collect(),
        })
    }

    /// Applies `rules` when any are given, otherwise [`Self::auto_rewrite`].
    pub fn rewrite(
        &self,
        tree: &mut ModelTree,
        rules: &[RenameRule],
        observer: &mut dyn RewriteObserver,
    ) -> Result<RewriteSummary, ModelError> {
        if rules.is_empty() {
            self.auto_rewrite(tree, observer)
        } else {
            self.rename_with(tree, rules, observer)
        }
    }

    /// Prefixes colliding output names with `output_`, then names every
    /// linked tensor after its signature entry.
    ///
    /// Only one level of collision is resolved: a prefixed name that still
    /// collides is reported and left as is.
    pub fn auto_rewrite(
        &self,
        tree: &mut ModelTree,
        observer: &mut dyn RewriteObserver,
    ) -> Result<RewriteSummary, ModelError> {
        let mut plan = self.plan(tree)?;

        let input_names: HashSet<String> =
            plan.inputs.iter().filter_map(|e| e.name.clone()).collect();
        for entry in &mut plan.outputs {
            if let Some(name) = entry.name.as_deref().filter(|n| input_names.contains(*n)) {
                entry.renamed = Some((format!("{OUTPUT_PREFIX}{name}"), RenameReason::Collision));
            }
        }

        for entry in &plan.outputs {
            if let Some(name) = entry.final_name().filter(|n| input_names.contains(*n)) {
                tracing::warn!("output signature '{name}' still collides with an input name");
            }
        }

        self.apply(tree, plan, observer)
    }

    /// Renames signature entries whose linked tensor matches a rule's `from`,
    /// then names every linked tensor after its signature entry.
    ///
    /// Rules are matched against the tensor names as they were before the
    /// call. The first matching rule wins.
    pub fn rename_with(
        &self,
        tree: &mut ModelTree,
        rules: &[RenameRule],
        observer: &mut dyn RewriteObserver,
    ) -> Result<RewriteSummary, ModelError> {
        let mut plan = self.plan(tree)?;

        for list in SignatureList::ALL {
            let RewritePlan {
                inputs,
                outputs,
                tensor_names,
            } = &mut plan;
            let entries = match list {
                SignatureList::Inputs => inputs,
                SignatureList::Outputs => outputs,
            };
            for entry in entries.iter_mut() {
                let Some(pos) = entry.tensor else { continue };
                if let Some(rule) = find_rule(rules, &tensor_names[pos]) {
                    entry.renamed = Some((rule.to.clone(), RenameReason::Rule));
                }
            }
        }

        for rule in rules {
            if !plan.tensor_names.iter().any(|n| *n == rule.from) {
                tracing::debug!("rename rule '{}' matches no tensor", rule.from);
            }
        }

        self.apply(tree, plan, observer)
    }

    /// Resolves every entry of the first signature definition.
    fn plan(&self, tree: &ModelTree) -> Result<RewritePlan, ModelError> {
        if !tree.has_signature() {
            return Err(ModelError::NoSignature);
        }
        let count = tree.signature_count();
        if count > 1 {
            tracing::warn!("model records {count} signature_defs, only the first is used");
        }

        let tensors = tree.tensors()?;
        let mut plan = RewritePlan {
            inputs: Vec::new(),
            outputs: Vec::new(),
            tensor_names: tensors
                .iter()
                .map(|t| t.map(|t| t.name().to_string()).unwrap_or_default())
                .collect(),
        };

        for list in SignatureList::ALL {
            let mut entries = Vec::new();
            for entry in tree.signature_entries(list)? {
                entries.push(EntryPlan {
                    name: entry.name().map(str::to_string),
                    tensor_index: entry.tensor_index(),
                    tensor: self.resolver.resolve(&tensors, list, &entry)?,
                    renamed: None,
                });
            }
            match list {
                SignatureList::Inputs => plan.inputs = entries,
                SignatureList::Outputs => plan.outputs = entries,
            }
        }
        Ok(plan)
    }

    /// Rejects (strict) or reports (lenient) names the rewrite made non-unique.
    fn check_unique(&self, plan: &RewritePlan) -> Result<(), ModelError> {
        for list in SignatureList::ALL {
            let entries = plan.entries(list);
            let mut seen = HashSet::new();
            for entry in entries {
                let Some(name) = entry.final_name() else { continue };
                if seen.insert(name) {
                    continue;
                }
                let introduced = entries
                    .iter()
                    .filter(|e| e.final_name() == Some(name))
                    .any(|e| e.renamed.is_some());
                if !introduced {
                    continue;
                }
                match self.policy() {
                    ResolvePolicy::Strict => {
                        return Err(ModelError::DuplicateSignatureName {
                            list,
                            name: name.to_string(),
                        })
                    }
                    ResolvePolicy::Lenient => {
                        tracing::warn!("rewrite gives two {list} signatures the name '{name}'")
                    }
                }
            }
        }
        Ok(())
    }

    /// Writes the planned signature names, then copies them onto tensors.
    fn apply(
        &self,
        tree: &mut ModelTree,
        mut plan: RewritePlan,
        observer: &mut dyn RewriteObserver,
    ) -> Result<RewriteSummary, ModelError> {
        self.check_unique(&plan)?;
        let mut summary = RewriteSummary::default();

        for list in SignatureList::ALL {
            for (pos, entry) in plan.entries_mut(list).iter_mut().enumerate() {
                let Some((to, reason)) = entry.renamed.take() else { continue };
                let from = entry.name.replace(to.clone()).unwrap_or_default();
                if from == to {
                    continue;
                }
                tree.set_signature_name(list, pos, &to);
                summary.signatures_renamed += 1;
                observer.on_event(&RewriteEvent::SignatureRenamed {
                    list,
                    from,
                    to,
                    reason,
                });
            }
        }

        for list in SignatureList::ALL {
            observer.on_event(&RewriteEvent::PhaseStarted { list });
            let RewritePlan {
                inputs,
                outputs,
                tensor_names,
            } = &mut plan;
            let entries = match list {
                SignatureList::Inputs => inputs,
                SignatureList::Outputs => outputs,
            };
            for entry in entries.iter() {
                let Some(pos) = entry.tensor else {
                    summary.unresolved += 1;
                    observer.on_event(&RewriteEvent::Unresolved {
                        list,
                        signature: entry.name.clone().unwrap_or_default(),
                        tensor_index: entry.tensor_index,
                    });
                    continue;
                };
                let Some(name) = entry.name.as_deref() else {
                    tracing::warn!(
                        "{list} signature with tensor_index {} has no name, tensor left as is",
                        entry.tensor_index,
                    );
                    continue;
                };
                let from = std::mem::replace(&mut tensor_names[pos], name.to_string());
                tree.set_tensor_name(pos, name);
                if from != name {
                    summary.tensors_renamed += 1;
                }
                observer.on_event(&RewriteEvent::TensorRenamed {
                    list,
                    from,
                    to: name.to_string(),
                });
            }
        }

        tracing::debug!("{summary}");
        Ok(summary)
    }
}
