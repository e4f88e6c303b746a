//! Problem aggregation and the trainer boundary.
//!
//! A [`Problem`] bundles everything an example declares: equations, the
//! network's input/output names, the sample sets forming the training
//! objective and the validation declaration. The trainer behind [`Runner`]
//! is an injected capability; tests substitute an oracle that never trains.

use crate::bundle::ResultBundle;
use crate::config::TrainConfig;
use crate::equation::EquationSet;
use crate::error::{Error, Result};
use crate::sample::{SampleSet, parse_target_key};
use crate::validator::Validation;

#[derive(Debug, Clone)]
pub struct Problem {
    pub name: String,
    /// Independent variables, in network-input order.
    pub independent: Vec<String>,
    /// Network outputs: dependent variables plus any parameters to infer.
    pub outputs: Vec<String>,
    pub equations: EquationSet,
    pub samples: Vec<SampleSet>,
    pub validation: Validation,
}

impl Problem {
    /// Check the whole declaration before any training step: every equation
    /// unknown is a declared output, every sample-set input is an independent
    /// variable and every target key resolves.
    pub fn validate(&self) -> Result<()> {
        if self.independent.is_empty() {
            return Err(Error::Config(format!(
                "problem '{}' declares no independent variables",
                self.name
            )));
        }
        if self.outputs.is_empty() {
            return Err(Error::Config(format!(
                "problem '{}' declares no outputs",
                self.name
            )));
        }
        for unknown in self.equations.unknowns() {
            if !self.outputs.contains(&unknown) {
                return Err(Error::Config(format!(
                    "equation references '{unknown}', which no network outputs"
                )));
            }
        }
        if self.samples.is_empty() {
            return Err(Error::Config(format!(
                "problem '{}' declares no sample sets",
                self.name
            )));
        }
        for set in &self.samples {
            for name in set.inputs().keys() {
                if !self.independent.contains(name) {
                    return Err(Error::Config(format!(
                        "sample set '{}' feeds input '{name}', which is not an independent variable",
                        set.label()
                    )));
                }
            }
            if set.inputs().len() != self.independent.len() {
                return Err(Error::Config(format!(
                    "sample set '{}' must supply every independent variable",
                    set.label()
                )));
            }
            for key in set.targets().keys() {
                parse_target_key(key, &self.equations, &self.outputs, &self.independent)?;
            }
        }
        for name in self.validation.inputs().keys() {
            if !self.independent.contains(name) {
                return Err(Error::Config(format!(
                    "validation input '{name}' is not an independent variable"
                )));
            }
        }
        for name in self.validation.truth().keys() {
            if !self.outputs.contains(name) {
                return Err(Error::Config(format!(
                    "validation truth '{name}' is not a declared output"
                )));
            }
        }
        Ok(())
    }
}

/// The delegated training run: consumes a problem declaration and eventually
/// produces a result-array bundle. The production implementation is
/// [`crate::training::Trainer`].
pub trait Runner {
    fn run(&self, problem: &Problem, cfg: &TrainConfig) -> Result<ResultBundle>;
}
