//! The persisted result-array bundle.
//!
//! One bundle is written per training run, at a fixed path under the output
//! directory, and overwritten on re-run. It holds the independent-variable
//! arrays plus, per dependent variable, a `pred_*` array and (when a closed
//! form exists) a `true_*` array, all with the same row count.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const PRED_PREFIX: &str = "pred_";
pub const TRUE_PREFIX: &str = "true_";

/// Conventional bundle location for an example.
pub fn validator_path(outdir: &Path, example: &str) -> PathBuf {
    outdir.join(example).join("validators").join("validator.json")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultBundle {
    arrays: BTreeMap<String, Vec<f64>>,
}

impl ResultBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named array; all arrays in a bundle share one row count.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if let Some(rows) = self.arrays.values().next().map(Vec::len) {
            if values.len() != rows {
                return Err(Error::Config(format!(
                    "bundle array '{name}' has {} rows, expected {rows}",
                    values.len()
                )));
            }
        }
        self.arrays.insert(name, values);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.arrays.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arrays.keys().map(String::as_str)
    }

    pub fn rows(&self) -> usize {
        self.arrays.values().next().map_or(0, Vec::len)
    }

    /// Dependent variables present in the bundle, from the `pred_*` arrays.
    pub fn dependent_variables(&self) -> Vec<String> {
        self.arrays
            .keys()
            .filter_map(|k| k.strip_prefix(PRED_PREFIX))
            .map(str::to_string)
            .collect()
    }

    /// Independent-variable arrays: everything that is neither `pred_*` nor
    /// `true_*`.
    pub fn independent_variables(&self) -> Vec<String> {
        self.arrays
            .keys()
            .filter(|k| !k.starts_with(PRED_PREFIX) && !k.starts_with(TRUE_PREFIX))
            .cloned()
            .collect()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| Error::Artifact {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        writer.flush()?;
        Ok(())
    }

    /// Load a previously written bundle. A missing file means training has
    /// not run yet (or ran under a different working directory).
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::MissingArtifact {
                    path: path.to_path_buf(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        let bundle: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::Artifact {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let rows = bundle.rows();
        for (name, column) in &bundle.arrays {
            if column.len() != rows {
                return Err(Error::Artifact {
                    path: path.to_path_buf(),
                    message: format!("array '{name}' has {} rows, expected {rows}", column.len()),
                });
            }
        }
        Ok(bundle)
    }
}
