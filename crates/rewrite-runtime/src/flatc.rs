// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Bridge to the `flatc` schema compiler.
//!
//! flatc converts between the binary `.tflite` container and its JSON form:
//!
//! ```text
//! decode:  flatc -t --strict-json --defaults-json -o OUT schema.fbs -- model.tflite  → OUT/model.json
//! encode:  flatc -o OUT -b schema.fbs model_renamed.json                              → OUT/model_renamed.tflite
//! ```
//!
//! `--defaults-json` makes flatc write defaulted fields (e.g. `buffer: 0`),
//! which tensor resolution depends on. Calls are synchronous.

use crate::RuntimeError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Extension flatc gives binaries built from the TFLite schema.
pub const MODEL_EXTENSION: &str = "tflite";

/// A flatc executable.
#[derive(Debug, Clone)]
pub struct Flatc {
    program: PathBuf,
}

impl Flatc {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Runs `flatc --version`, confirming the tool is installed.
    pub fn version(&self) -> Result<String, RuntimeError> {
        let output = self.run([OsStr::new("--version")])?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Converts a binary model to JSON in `out_dir`, returning the JSON path.
    pub fn decode(
        &self,
        schema: &Path,
        model: &Path,
        out_dir: &Path,
    ) -> Result<PathBuf, RuntimeError> {
        self.run([
            OsStr::new("-t"),
            OsStr::new("--strict-json"),
            OsStr::new("--defaults-json"),
            OsStr::new("-o"),
            out_dir.as_os_str(),
            schema.as_os_str(),
            OsStr::new("--"),
            model.as_os_str(),
        ])?;
        expect_output(with_stem(model, out_dir, "json")?)
    }

    /// Converts a JSON model back to binary in `out_dir`, returning the model path.
    pub fn encode(
        &self,
        schema: &Path,
        json: &Path,
        out_dir: &Path,
    ) -> Result<PathBuf, RuntimeError> {
        self.run([
            OsStr::new("-o"),
            out_dir.as_os_str(),
            OsStr::new("-b"),
            schema.as_os_str(),
            json.as_os_str(),
        ])?;
        expect_output(with_stem(json, out_dir, MODEL_EXTENSION)?)
    }

    fn run<'a>(&self, args: impl IntoIterator<Item = &'a OsStr>) -> Result<Output, RuntimeError> {
        let args: Vec<&OsStr> = args.into_iter().collect();
        tracing::debug!("running {} {:?}", self.program.display(), args);

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| RuntimeError::FlatcMissing {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RuntimeError::FlatcFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

impl Default for Flatc {
    fn default() -> Self {
        Self::new("flatc")
    }
}

/// `out_dir/<stem of path>.<extension>`, the naming flatc uses for its outputs.
pub fn with_stem(path: &Path, out_dir: &Path, extension: &str) -> Result<PathBuf, RuntimeError> {
    let stem = path.file_stem().ok_or_else(|| {
        RuntimeError::ConfigError(format!("'{}' has no file name", path.display()))
    })?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(extension);
    Ok(out_dir.join(name))
}

fn expect_output(path: PathBuf) -> Result<PathBuf, RuntimeError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(RuntimeError::io(
            &path,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "flatc reported success but wrote no output",
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program() {
        let flatc = Flatc::new("flatc-that-does-not-exist-1f2e3d");
        let err = flatc.version().unwrap_err();
        assert!(matches!(err, RuntimeError::FlatcMissing { .. }));
        assert!(err.to_string().contains("flatbuffers-compiler"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program() {
        let err = Flatc::new("false").version().unwrap_err();
        assert!(matches!(err, RuntimeError::FlatcFailed { .. }));
    }

    #[test]
    fn test_with_stem() {
        let out = Path::new("/out");
        assert_eq!(
            with_stem(Path::new("/models/movinet_a0.tflite"), out, "json").unwrap(),
            PathBuf::from("/out/movinet_a0.json")
        );
        assert_eq!(
            with_stem(Path::new("movinet_a0_renamed.json"), out, MODEL_EXTENSION).unwrap(),
            PathBuf::from("/out/movinet_a0_renamed.tflite")
        );
        // Only the last extension is replaced.
        assert_eq!(
            with_stem(Path::new("model.v2.tflite"), out, "json").unwrap(),
            PathBuf::from("/out/model.v2.json")
        );
        assert!(with_stem(Path::new("/"), out, "json").is_err());
    }

    #[test]
    fn test_default_program() {
        assert_eq!(Flatc::default().program(), Path::new("flatc"));
    }
}
