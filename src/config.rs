//! Training configuration.
//!
//! Defaults suit the shipped examples; any field can be overridden from a
//! TOML file passed with `--config`. Validation is fail-fast: non-positive
//! counts are rejected before a problem is even constructed.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
    /// Total optimizer steps.
    pub max_steps: usize,
    /// Initial Adam learning rate.
    pub learning_rate: f64,
    /// Exponential decay applied every `decay_steps`.
    pub decay_rate: f64,
    pub decay_steps: usize,
    /// Loss is recorded and logged every this many steps.
    pub record_freq: usize,
    /// MLP width and number of hidden layers.
    pub hidden_size: usize,
    pub hidden_layers: usize,
    /// Step used for finite-difference derivatives of the network.
    pub fd_step: f64,
    /// Seed for collocation-point sampling.
    pub seed: u64,
    /// Per-sample-set batch-size overrides, keyed by set label.
    pub batch_size: BTreeMap<String, usize>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_steps: 5000,
            learning_rate: 1e-3,
            decay_rate: 0.95,
            decay_steps: 1000,
            record_freq: 200,
            hidden_size: 64,
            hidden_layers: 4,
            fd_step: 1e-3,
            seed: 42,
            batch_size: BTreeMap::new(),
        }
    }
}

impl TrainConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let cfg: Self = toml::from_str(&text)
            .map_err(|e| Error::Config(format!("bad config '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("max_steps", self.max_steps),
            ("decay_steps", self.decay_steps),
            ("record_freq", self.record_freq),
            ("hidden_size", self.hidden_size),
            ("hidden_layers", self.hidden_layers),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{name} must be a positive integer")));
            }
        }
        for (label, size) in &self.batch_size {
            if *size == 0 {
                return Err(Error::Config(format!(
                    "batch size for sample set '{label}' must be a positive integer"
                )));
            }
        }
        if !(self.learning_rate > 0.0) {
            return Err(Error::Config("learning_rate must be positive".into()));
        }
        if !(self.decay_rate > 0.0 && self.decay_rate <= 1.0) {
            return Err(Error::Config("decay_rate must be in (0, 1]".into()));
        }
        if !(self.fd_step > 0.0) {
            return Err(Error::Config("fd_step must be positive".into()));
        }
        Ok(())
    }

    /// Batch size for the sample set `label`, falling back to the example's
    /// default.
    pub fn batch(&self, label: &str, default: usize) -> usize {
        self.batch_size.get(label).copied().unwrap_or(default)
    }

    /// Exponentially decayed learning rate at an optimizer step.
    pub fn lr_at(&self, step: usize) -> f64 {
        let stages = (step / self.decay_steps) as i32;
        self.learning_rate * self.decay_rate.powi(stages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_validate() {
        TrainConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_counts_rejected() {
        let mut cfg = TrainConfig::default();
        cfg.max_steps = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = TrainConfig::default();
        cfg.batch_size.insert("interior".into(), 0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn toml_overrides_apply() {
        let cfg: TrainConfig =
            toml::from_str("max_steps = 100\n[batch_size]\ninterior = 256\n").unwrap();
        assert_eq!(cfg.max_steps, 100);
        assert_eq!(cfg.batch("interior", 1000), 256);
        assert_eq!(cfg.batch("ic", 100), 100);
    }

    #[test]
    fn learning_rate_decays_by_stage() {
        let cfg = TrainConfig::default();
        assert_relative_eq!(cfg.lr_at(1), 1e-3);
        assert_relative_eq!(cfg.lr_at(1000), 1e-3 * 0.95);
        assert_relative_eq!(cfg.lr_at(2500), 1e-3 * 0.95 * 0.95);
    }
}
