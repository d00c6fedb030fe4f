// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: the full decode → rewrite → encode pipeline.
//!
//! A stub `flatc` shell script stands in for the real compiler. The "binary"
//! model handed to it is already JSON, so decoding and encoding are plain
//! copies that follow flatc's output naming rules.

#![cfg(unix)]

use model_signature::{ModelError, ModelTree, RenameRule, RewriteEvent, SignatureList};
use rewrite_runtime::{
    Outcome, Pipeline, RewriteJob, RewriteRequest, RewriterConfig, RuntimeError, SCHEMA_FILE,
};
use serde_json::json;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

// Writing an executable while another test thread forks can fail with
// ETXTBSY; every test holds this lock while it creates and runs the stub.
static FLATC_LOCK: Mutex<()> = Mutex::new(());

// ── Helpers ────────────────────────────────────────────────────

const STUB_FLATC: &str = r#"#!/bin/sh
set -e
case "$1" in
  --version)
    echo "flatc version 23.5.26"
    ;;
  -t)
    # -t --strict-json --defaults-json -o OUT SCHEMA -- MODEL
    name=$(basename "$8")
    cp "$8" "$5/${name%.*}.json"
    ;;
  -o)
    # -o OUT -b SCHEMA JSON
    if [ -n "$STUB_FAIL_ENCODE" ]; then
      echo "error: schema mismatch" >&2
      exit 1
    fi
    name=$(basename "$5")
    cp "$5" "$2/${name%.*}.tflite"
    ;;
  *)
    echo "unexpected arguments: $*" >&2
    exit 2
    ;;
esac
"#;

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
    config: RewriterConfig,
}

impl Fixture {
    fn new(fail_encode: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();

        let script = if fail_encode {
            STUB_FLATC.replacen("set -e", "set -e\nSTUB_FAIL_ENCODE=1", 1)
        } else {
            STUB_FLATC.to_string()
        };
        let flatc = root.join("flatc");
        std::fs::write(&flatc, script).unwrap();
        std::fs::set_permissions(&flatc, std::fs::Permissions::from_mode(0o755)).unwrap();

        let schema_dir = root.join("schema");
        std::fs::create_dir_all(&schema_dir).unwrap();
        std::fs::write(schema_dir.join(SCHEMA_FILE), "namespace tflite;\n").unwrap();

        let config = RewriterConfig {
            flatc_path: flatc,
            schema_dir: Some(schema_dir),
            ..Default::default()
        };
        Self {
            _dir: dir,
            root,
            config,
        }
    }

    fn write_model(&self, model: &serde_json::Value) -> PathBuf {
        let path = self.root.join("movinet_a0.tflite");
        std::fs::write(&path, model.to_string()).unwrap();
        path
    }

    fn out(&self) -> PathBuf {
        self.root.join("out")
    }

    fn request(&self, model: PathBuf) -> RewriteRequest {
        RewriteRequest {
            model,
            output_dir: self.out(),
            ..Default::default()
        }
    }
}

fn model() -> serde_json::Value {
    json!({
        "version": 3,
        "subgraphs": [{
            "tensors": [
                { "name": "serving_default_image:0", "buffer": 1, "type": "FLOAT32", "shape": [1, 172, 172, 3] },
                { "name": "StatefulPartitionedCall:0", "buffer": 2, "type": "FLOAT32", "shape": [1, 600] }
            ]
        }],
        "buffers": [{}, {}, {}],
        "signature_defs": [{
            "inputs": [{ "name": "image", "tensor_index": 0 }],
            "outputs": [{ "name": "image", "tensor_index": 1 }],
            "signature_key": "serving_default"
        }]
    })
}

fn tensor_names(path: &Path) -> Vec<String> {
    let tree = ModelTree::from_file(path).unwrap();
    tree.tensors()
        .unwrap()
        .iter()
        .map(|t| t.unwrap().name().to_string())
        .collect()
}

fn lock() -> std::sync::MutexGuard<'static, ()> {
    FLATC_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

// ── Tests ──────────────────────────────────────────────────────

#[test]
fn test_auto_rewrite_end_to_end() {
    let _guard = lock();
    let fx = Fixture::new(false);
    let request = fx.request(fx.write_model(&model()));

    let mut events: Vec<RewriteEvent> = Vec::new();
    let outcome = Pipeline::new(fx.config.clone())
        .run(&request, &mut events)
        .unwrap();

    let Outcome::Rewritten(output) = outcome else {
        panic!("expected a rewritten model, got {outcome:?}");
    };
    assert_eq!(output.decoded_json, fx.out().join("movinet_a0.json"));
    assert_eq!(output.renamed_json, fx.out().join("movinet_a0_renamed.json"));
    assert_eq!(output.model, fx.out().join("movinet_a0_renamed.tflite"));

    // Both intermediates are left on disk.
    assert!(output.decoded_json.is_file());
    assert!(output.renamed_json.is_file());

    assert_eq!(tensor_names(&output.model), ["image", "output_image"]);
    assert_eq!(
        tensor_names(&output.decoded_json),
        ["serving_default_image:0", "StatefulPartitionedCall:0"]
    );
    assert_eq!(output.summary.signatures_renamed, 1);
    assert!(!events.is_empty());
}

#[test]
fn test_explicit_rename_end_to_end() {
    let _guard = lock();
    let fx = Fixture::new(false);
    let mut request = fx.request(fx.write_model(&model()));
    request.rules = vec![
        RenameRule::new("serving_default_image:0", "input_tensor"),
        RenameRule::new("StatefulPartitionedCall:0", "logits"),
    ];

    let outcome = Pipeline::new(fx.config.clone())
        .run(&request, &mut Vec::<RewriteEvent>::new())
        .unwrap();
    let Outcome::Rewritten(output) = outcome else {
        panic!("expected a rewritten model");
    };

    assert_eq!(tensor_names(&output.model), ["input_tensor", "logits"]);
    let tree = ModelTree::from_file(&output.model).unwrap();
    let outputs = tree.signature_entries(SignatureList::Outputs).unwrap();
    assert_eq!(outputs[0].name(), Some("logits"));
}

#[test]
fn test_view_mode_writes_no_model() {
    let _guard = lock();
    let fx = Fixture::new(false);
    let mut request = fx.request(fx.write_model(&model()));
    request.view = true;

    let outcome = Pipeline::new(fx.config.clone())
        .run(&request, &mut Vec::<RewriteEvent>::new())
        .unwrap();
    let Outcome::Inspected(report) = outcome else {
        panic!("expected a report");
    };

    assert_eq!(report.inputs[0].signature_name, "image");
    assert_eq!(
        report.outputs[0].tensor.as_ref().unwrap().name,
        "StatefulPartitionedCall:0"
    );
    assert!(!fx.out().join("movinet_a0_renamed.json").exists());
    assert!(!fx.out().join("movinet_a0_renamed.tflite").exists());
}

#[test]
fn test_missing_signature_defs_is_not_an_error() {
    let _guard = lock();
    let fx = Fixture::new(false);
    let mut bare = model();
    bare["signature_defs"] = json!([]);
    let request = fx.request(fx.write_model(&bare));

    let outcome = Pipeline::new(fx.config.clone())
        .run(&request, &mut Vec::<RewriteEvent>::new())
        .unwrap();
    assert!(matches!(outcome, Outcome::NoSignature { .. }));
    assert!(!fx.out().join("movinet_a0_renamed.json").exists());
}

#[test]
fn test_encode_failure_propagates() {
    let _guard = lock();
    let fx = Fixture::new(true);
    let request = fx.request(fx.write_model(&model()));

    let err = Pipeline::new(fx.config.clone())
        .run(&request, &mut Vec::<RewriteEvent>::new())
        .unwrap_err();
    match err {
        RuntimeError::FlatcFailed { stderr, .. } => assert!(stderr.contains("schema mismatch")),
        other => panic!("unexpected error: {other}"),
    }
    // The renamed JSON was written before the failing encode; the model was not.
    assert!(fx.out().join("movinet_a0_renamed.json").is_file());
    assert!(!fx.out().join("movinet_a0_renamed.tflite").exists());
}

#[test]
fn test_missing_flatc_aborts_before_writing() {
    let _guard = lock();
    let fx = Fixture::new(false);
    let config = RewriterConfig {
        flatc_path: fx.root.join("no-such-flatc"),
        ..fx.config.clone()
    };
    let request = fx.request(fx.write_model(&model()));

    let err = Pipeline::new(config)
        .run(&request, &mut Vec::<RewriteEvent>::new())
        .unwrap_err();
    assert!(matches!(err, RuntimeError::FlatcMissing { .. }));
    assert!(!fx.out().exists());
}

#[test]
fn test_strict_mode_rejects_dangling_reference() {
    let _guard = lock();
    let fx = Fixture::new(false);
    let mut dangling = model();
    dangling["signature_defs"][0]["outputs"][0]["tensor_index"] = json!(41);
    let request = fx.request(fx.write_model(&dangling));
    let config = RewriterConfig {
        strict: true,
        ..fx.config.clone()
    };

    let err = Pipeline::new(config)
        .run(&request, &mut Vec::<RewriteEvent>::new())
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::ModelError(ModelError::UnresolvedReference { .. })
    ));
    assert!(!fx.out().join("movinet_a0_renamed.json").exists());
}

#[test]
fn test_job_stages() {
    let _guard = lock();
    let fx = Fixture::new(false);
    let model_path = fx.write_model(&model());

    let decoded = RewriteJob::new(fx.config.clone(), model_path, fx.out())
        .decode()
        .unwrap();
    assert!(decoded.has_signature());
    assert_eq!(decoded.inspect().unwrap().outputs.len(), 1);

    let rewritten = decoded
        .rewrite(&[], &mut Vec::<RewriteEvent>::new())
        .unwrap();
    assert_eq!(rewritten.summary().tensors_renamed, 2);
    assert_eq!(rewritten.tree().tensor(1).unwrap().name(), "output_image");

    let output = rewritten.encode().unwrap();
    assert!(output.model.is_file());
}
