//! Validation/inference declarations.
//!
//! Held-out input arrays with, when a closed form exists, matching true
//! values. Inputs are deterministic grids; truth is always computed from the
//! analytical solution, never learned.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    inputs: BTreeMap<String, Vec<f64>>,
    truth: BTreeMap<String, Vec<f64>>,
}

impl Validation {
    /// `truth` may be empty (pure inference); otherwise every array must
    /// share the inputs' row count.
    pub fn new(
        inputs: BTreeMap<String, Vec<f64>>,
        truth: BTreeMap<String, Vec<f64>>,
    ) -> Result<Self> {
        let rows = inputs
            .values()
            .next()
            .map(Vec::len)
            .ok_or_else(|| Error::Config("validation declares no inputs".into()))?;
        for (name, column) in inputs.iter().chain(truth.iter()) {
            if column.len() != rows {
                return Err(Error::Config(format!(
                    "validation array '{name}' has {} rows, expected {rows}",
                    column.len()
                )));
            }
        }
        Ok(Self { inputs, truth })
    }

    pub fn len(&self) -> usize {
        self.inputs.values().next().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn inputs(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.inputs
    }

    pub fn truth(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.truth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::grid;

    #[test]
    fn rejects_mismatched_truth_rows() {
        let result = Validation::new(
            BTreeMap::from([("t".to_string(), grid(0.0, 1.0, 0.1))]),
            BTreeMap::from([("x".to_string(), vec![0.0; 3])]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn truth_is_optional() {
        let v = Validation::new(
            BTreeMap::from([("t".to_string(), grid(0.0, 1.0, 0.1))]),
            BTreeMap::new(),
        )
        .unwrap();
        assert_eq!(v.len(), 10);
        assert!(v.truth().is_empty());
    }
}
