// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The decoded model tree and typed views over the few fields we touch.
//!
//! flatc emits the model as JSON that follows the TFLite schema. Only a
//! handful of fields matter here, so the tree is kept as an untyped
//! [`serde_json::Value`] and everything else passes through untouched:
//!
//! ```text
//! {
//!   "subgraphs": [ { "tensors": [ { "name", "buffer", "type", "shape", .. } ], .. } ],
//!   "signature_defs": [ { "inputs":  [ { "name", "tensor_index" } ],
//!                         "outputs": [ { "name", "tensor_index" } ],
//!                         "signature_key", .. } ],
//!   ..
//! }
//! ```
//!
//! Only the first subgraph and the first signature definition are used.

use crate::ModelError;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

const SUBGRAPHS: &str = "subgraphs";
const TENSORS: &str = "tensors";
const SIGNATURE_DEFS: &str = "signature_defs";
const SIGNATURE_KEY: &str = "signature_key";
const NAME: &str = "name";
const BUFFER: &str = "buffer";
const TYPE: &str = "type";
const SHAPE: &str = "shape";
const TENSOR_INDEX: &str = "tensor_index";

/// Which side of the signature definition an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureList {
    Inputs,
    Outputs,
}

impl SignatureList {
    /// Both lists in processing order.
    pub const ALL: [SignatureList; 2] = [SignatureList::Inputs, SignatureList::Outputs];

    /// The JSON key of this list inside a signature definition.
    pub fn key(self) -> &'static str {
        match self {
            Self::Inputs => "inputs",
            Self::Outputs => "outputs",
        }
    }
}

impl fmt::Display for SignatureList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inputs => f.write_str("input"),
            Self::Outputs => f.write_str("output"),
        }
    }
}

/// Read-only view over one entry of `subgraphs[0].tensors`.
#[derive(Debug, Clone, Copy)]
pub struct Tensor<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> Tensor<'a> {
    fn new(value: &'a Value) -> Option<Self> {
        value.as_object().map(|fields| Self { fields })
    }

    /// Current tensor name, empty if the field is absent.
    pub fn name(&self) -> &'a str {
        self.fields.get(NAME).and_then(Value::as_str).unwrap_or("")
    }

    /// Index into the model buffer table. Absent means 0, the flatbuffers default.
    pub fn buffer(&self) -> i64 {
        self.fields.get(BUFFER).and_then(as_integer).unwrap_or(0)
    }

    /// Element type, e.g. `FLOAT32`.
    pub fn tensor_type(&self) -> String {
        match self.fields.get(TYPE) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "FLOAT32".to_string(),
        }
    }

    /// Tensor dimensions. Non-integer entries are skipped.
    pub fn shape(&self) -> Vec<i64> {
        self.fields
            .get(SHAPE)
            .and_then(Value::as_array)
            .map(|dims| dims.iter().filter_map(as_integer).collect())
            .unwrap_or_default()
    }
}

/// Read-only view over one entry of a signature's `inputs` or `outputs`.
#[derive(Debug, Clone, Copy)]
pub struct SignatureEntry<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> SignatureEntry<'a> {
    fn new(value: &'a Value) -> Option<Self> {
        value.as_object().map(|fields| Self { fields })
    }

    /// Externally visible signature name, if recorded.
    pub fn name(&self) -> Option<&'a str> {
        self.fields.get(NAME).and_then(Value::as_str)
    }

    /// Linked tensor reference; `-1` when absent.
    pub fn tensor_index(&self) -> i64 {
        self.fields.get(TENSOR_INDEX).and_then(as_integer).unwrap_or(-1)
    }
}

/// Accepts both JSON integers and integers that flatc emitted as strings.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A decoded model, owned for the duration of one inspect or rewrite.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTree {
    root: Value,
}

impl ModelTree {
    /// Wraps an already-parsed JSON value.
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Parses a decoded model from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(Self::from_value(serde_json::from_str(json)?))
    }

    /// Loads a decoded model from a JSON file produced by flatc.
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialises the tree as compact JSON.
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(&self.root)?)
    }

    /// Serialises the tree as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    /// Writes the tree to `path` as compact JSON.
    pub fn write_to_file(&self, path: &Path) -> Result<(), ModelError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    /// Number of recorded signature definitions.
    pub fn signature_count(&self) -> usize {
        self.root
            .get(SIGNATURE_DEFS)
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// Whether the model records at least one signature definition.
    pub fn has_signature(&self) -> bool {
        self.signature_count() > 0
    }

    /// `signature_key` of the signature definition in use, if any.
    pub fn signature_key(&self) -> Option<&str> {
        self.signature_def()
            .ok()
            .and_then(|def| def.get(SIGNATURE_KEY))
            .and_then(Value::as_str)
    }

    /// Raw tensor list of the first subgraph.
    pub(crate) fn tensor_values(&self) -> Result<&[Value], ModelError> {
        let subgraph = self
            .root
            .get(SUBGRAPHS)
            .and_then(Value::as_array)
            .and_then(|s| s.first())
            .ok_or_else(|| ModelError::MalformedTree("model has no subgraphs".into()))?;
        match subgraph.get(TENSORS) {
            Some(Value::Array(tensors)) => Ok(tensors.as_slice()),
            None => Ok(&[]),
            Some(_) => Err(ModelError::MalformedTree(
                "subgraphs[0].tensors is not an array".into(),
            )),
        }
    }

    /// Typed views over the tensors of the first subgraph.
    ///
    /// Positions are preserved: non-object entries yield `None`.
    pub fn tensors(&self) -> Result<Vec<Option<Tensor<'_>>>, ModelError> {
        Ok(self.tensor_values()?.iter().map(Tensor::new).collect())
    }

    /// Typed view over the tensor at `position`.
    pub fn tensor(&self, position: usize) -> Option<Tensor<'_>> {
        self.tensor_values()
            .ok()
            .and_then(|tensors| tensors.get(position))
            .and_then(Tensor::new)
    }

    fn signature_def(&self) -> Result<&Value, ModelError> {
        self.root
            .get(SIGNATURE_DEFS)
            .and_then(Value::as_array)
            .and_then(|defs| defs.first())
            .ok_or(ModelError::NoSignature)
    }

    /// Entries of one signature list, in recorded order.
    pub fn signature_entries(
        &self,
        list: SignatureList,
    ) -> Result<Vec<SignatureEntry<'_>>, ModelError> {
        let def = self.signature_def()?;
        let values: &[Value] = match def.get(list.key()) {
            Some(Value::Array(values)) => values.as_slice(),
            None => &[],
            Some(_) => {
                return Err(ModelError::MalformedTree(format!(
                    "signature_defs[0].{} is not an array",
                    list.key()
                )))
            }
        };
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                SignatureEntry::new(v).ok_or_else(|| {
                    ModelError::MalformedTree(format!(
                        "signature_defs[0].{}[{i}] is not an object",
                        list.key()
                    ))
                })
            })
            .collect()
    }

    /// Overwrites the `name` of signature entry `position` in `list`.
    ///
    /// Callers validate the position beforehand via [`Self::signature_entries`].
    pub(crate) fn set_signature_name(&mut self, list: SignatureList, position: usize, name: &str) {
        let entry = self
            .root
            .get_mut(SIGNATURE_DEFS)
            .and_then(|defs| defs.get_mut(0))
            .and_then(|def| def.get_mut(list.key()))
            .and_then(|entries| entries.get_mut(position))
            .and_then(Value::as_object_mut);
        if let Some(fields) = entry {
            fields.insert(NAME.to_string(), Value::String(name.to_string()));
        }
    }

    /// Overwrites the `name` of the tensor at `position` in the first subgraph.
    pub(crate) fn set_tensor_name(&mut self, position: usize, name: &str) {
        let tensor = self
            .root
            .get_mut(SUBGRAPHS)
            .and_then(|subgraphs| subgraphs.get_mut(0))
            .and_then(|subgraph| subgraph.get_mut(TENSORS))
            .and_then(|tensors| tensors.get_mut(position))
            .and_then(Value::as_object_mut);
        if let Some(fields) = tensor {
            fields.insert(NAME.to_string(), Value::String(name.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ModelTree {
        ModelTree::from_value(json!({
            "version": 3,
            "subgraphs": [{
                "tensors": [
                    { "name": "serving_default_x:0", "buffer": 1, "type": "FLOAT32", "shape": [1, 4] },
                    { "name": "StatefulPartitionedCall:0", "buffer": "2", "shape": [1, 2] },
                    7
                ]
            }],
            "signature_defs": [{
                "signature_key": "serving_default",
                "inputs": [{ "name": "x", "tensor_index": 0 }],
                "outputs": [{ "name": "y" }]
            }]
        }))
    }

    #[test]
    fn test_tensor_views() {
        let tree = sample();
        let tensors = tree.tensors().unwrap();
        assert_eq!(tensors.len(), 3);

        let t0 = tensors[0].unwrap();
        assert_eq!(t0.name(), "serving_default_x:0");
        assert_eq!(t0.buffer(), 1);
        assert_eq!(t0.tensor_type(), "FLOAT32");
        assert_eq!(t0.shape(), vec![1, 4]);

        // String-encoded buffer and a defaulted type.
        let t1 = tensors[1].unwrap();
        assert_eq!(t1.buffer(), 2);
        assert_eq!(t1.tensor_type(), "FLOAT32");

        assert!(tensors[2].is_none());
    }

    #[test]
    fn test_signature_entries() {
        let tree = sample();
        let inputs = tree.signature_entries(SignatureList::Inputs).unwrap();
        assert_eq!(inputs[0].name(), Some("x"));
        assert_eq!(inputs[0].tensor_index(), 0);

        let outputs = tree.signature_entries(SignatureList::Outputs).unwrap();
        assert_eq!(outputs[0].tensor_index(), -1);
        assert_eq!(tree.signature_key(), Some("serving_default"));
    }

    #[test]
    fn test_missing_signature_defs() {
        let tree = ModelTree::from_value(json!({ "subgraphs": [{ "tensors": [] }] }));
        assert!(!tree.has_signature());
        assert!(matches!(
            tree.signature_entries(SignatureList::Inputs),
            Err(ModelError::NoSignature)
        ));

        let empty = ModelTree::from_value(json!({ "signature_defs": [] }));
        assert!(!empty.has_signature());
    }

    #[test]
    fn test_missing_subgraphs_is_malformed() {
        let tree = ModelTree::from_value(json!({ "signature_defs": [{}] }));
        assert!(matches!(tree.tensors(), Err(ModelError::MalformedTree(_))));
    }

    #[test]
    fn test_non_array_list_is_malformed() {
        let tree = ModelTree::from_value(json!({
            "subgraphs": [{ "tensors": [] }],
            "signature_defs": [{ "inputs": {} }]
        }));
        assert!(matches!(
            tree.signature_entries(SignatureList::Inputs),
            Err(ModelError::MalformedTree(_))
        ));
        // Absent list reads as empty.
        assert!(tree.signature_entries(SignatureList::Outputs).unwrap().is_empty());
    }

    #[test]
    fn test_setters_touch_only_name() {
        let mut tree = sample();
        tree.set_tensor_name(0, "x");
        tree.set_signature_name(SignatureList::Outputs, 0, "output_y");

        let t0 = tree.tensor(0).unwrap();
        assert_eq!(t0.name(), "x");
        assert_eq!(t0.buffer(), 1);
        assert_eq!(t0.shape(), vec![1, 4]);
        let outputs = tree.signature_entries(SignatureList::Outputs).unwrap();
        assert_eq!(outputs[0].name(), Some("output_y"));
    }

    #[test]
    fn test_json_roundtrip_preserves_tree() {
        let tree = sample();
        let back = ModelTree::from_json(&tree.to_json().unwrap()).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let tree = sample();
        tree.write_to_file(&path).unwrap();
        assert_eq!(ModelTree::from_file(&path).unwrap(), tree);
    }
}
