//! The bootcamp curriculum: each example declares its equations, sample sets
//! and validation grid, then hands the whole problem to the trainer.

pub mod diffusion;
pub mod projectile;
pub mod spring_mass;

use crate::config::TrainConfig;
use crate::error::Result;
use crate::problem::Problem;
use clap::ValueEnum;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Example {
    /// Projectile motion under gravity (two uncoupled ODEs).
    Projectile,
    /// Three masses, four springs, forward problem.
    SpringMass,
    /// Spring-mass with m1 and k4 recovered from observed motion.
    SpringMassInverse,
    /// 1D transient diffusion (one PDE in t and x).
    Diffusion,
}

impl Example {
    pub fn all() -> [Example; 4] {
        [
            Example::Projectile,
            Example::SpringMass,
            Example::SpringMassInverse,
            Example::Diffusion,
        ]
    }

    /// Directory name under the output root.
    pub fn name(&self) -> &'static str {
        match self {
            Example::Projectile => "projectile",
            Example::SpringMass => "spring_mass",
            Example::SpringMassInverse => "spring_mass_inverse",
            Example::Diffusion => "diffusion",
        }
    }

    pub fn build(&self, cfg: &TrainConfig) -> Result<Problem> {
        match self {
            Example::Projectile => projectile::problem(cfg),
            Example::SpringMass => spring_mass::forward_problem(cfg),
            Example::SpringMassInverse => spring_mass::inverse_problem(cfg),
            Example::Diffusion => diffusion::problem(cfg),
        }
    }
}

impl fmt::Display for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_example_builds_a_valid_problem() {
        let cfg = TrainConfig::default();
        for example in Example::all() {
            let problem = example.build(&cfg).unwrap();
            problem.validate().unwrap();
            assert_eq!(problem.name, example.name());
        }
    }

    #[test]
    fn declarations_are_idempotent() {
        let cfg = TrainConfig::default();
        for example in Example::all() {
            let a = example.build(&cfg).unwrap();
            let b = example.build(&cfg).unwrap();
            assert_eq!(a.equations, b.equations);
            assert_eq!(a.samples, b.samples);
            assert_eq!(a.validation, b.validation);
        }
    }
}
