// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Read-only signature report produced by inspect mode.

use crate::SignatureList;
use std::fmt;

/// What a signature entry resolves to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TensorSummary {
    /// Current internal tensor name (the `OPNAME` a rename rule matches).
    pub name: String,
    pub tensor_type: String,
    pub shape: Vec<i64>,
}

/// One signature entry and its linked tensor.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ReportLine {
    pub signature_name: String,
    pub tensor_index: i64,
    /// `None` when `tensor_index` matches no tensor.
    pub tensor: Option<TensorSummary>,
}

/// The first signature definition of a model, with every entry resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SignatureReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_key: Option<String>,
    pub inputs: Vec<ReportLine>,
    pub outputs: Vec<ReportLine>,
}

impl SignatureReport {
    pub fn lines(&self, list: SignatureList) -> &[ReportLine] {
        match list {
            SignatureList::Inputs => &self.inputs,
            SignatureList::Outputs => &self.outputs,
        }
    }

    /// Number of entries whose tensor could not be found.
    pub fn unresolved_count(&self) -> usize {
        self.inputs
            .iter()
            .chain(&self.outputs)
            .filter(|line| line.tensor.is_none())
            .count()
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tensor {
            Some(t) => write!(
                f,
                "NAME: {} TYPE: {} SHAPE: {:?} OPNAME: {}",
                self.signature_name, t.tensor_type, t.shape, t.name,
            ),
            None => write!(
                f,
                "NAME: {} (unresolved tensor_index {})",
                self.signature_name, self.tensor_index,
            ),
        }
    }
}

impl fmt::Display for SignatureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(key) = &self.signature_key {
            writeln!(f, "Signature: {key}")?;
        }
        for list in SignatureList::ALL {
            writeln!(f, "{} signature_defs:", capitalise(list.key()))?;
            for line in self.lines(list) {
                writeln!(f, "  {line}")?;
            }
        }
        Ok(())
    }
}

fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> SignatureReport {
        SignatureReport {
            signature_key: Some("serving_default".into()),
            inputs: vec![ReportLine {
                signature_name: "image".into(),
                tensor_index: 0,
                tensor: Some(TensorSummary {
                    name: "serving_default_image:0".into(),
                    tensor_type: "FLOAT32".into(),
                    shape: vec![1, 172, 172, 3],
                }),
            }],
            outputs: vec![ReportLine {
                signature_name: "logits".into(),
                tensor_index: 41,
                tensor: None,
            }],
        }
    }

    #[test]
    fn test_display() {
        let text = report().to_string();
        assert!(text.contains("Signature: serving_default"));
        assert!(text.contains("Inputs signature_defs:"));
        assert!(text.contains(
            "NAME: image TYPE: FLOAT32 SHAPE: [1, 172, 172, 3] OPNAME: serving_default_image:0"
        ));
        assert!(text.contains("NAME: logits (unresolved tensor_index 41)"));
    }

    #[test]
    fn test_unresolved_count() {
        assert_eq!(report().unresolved_count(), 1);
        assert_eq!(SignatureReport::default().unresolved_count(), 0);
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["inputs"][0]["tensor"]["shape"][3], 3);
        assert!(json["outputs"][0]["tensor"].is_null());
    }
}
