//! Projectile motion: the bootcamp's first ODE example.
//!
//! `x'' = 0`, `y'' = -g`, launched at 40 m/s, 60 degrees. The closed form is
//! elementary, which makes this the example where predicted and true curves
//! are easiest to eyeball.

use crate::config::TrainConfig;
use crate::equation;
use crate::error::Result;
use crate::problem::Problem;
use crate::sample::{SampleSet, grid};
use crate::validator::Validation;
use std::collections::BTreeMap;
use std::f64::consts::PI;

pub const GRAVITY: f64 = 9.81;
pub const T_MAX: f64 = 5.0;
pub const GRID_STEP: f64 = 0.01;
pub const INITIAL_SPEED: f64 = 40.0;
pub const LAUNCH_ANGLE: f64 = PI / 3.0;

/// Analytical trajectory at time `t`: `(x, y)`.
pub fn truth(t: f64) -> (f64, f64) {
    let vx = INITIAL_SPEED * LAUNCH_ANGLE.cos();
    let vy = INITIAL_SPEED * LAUNCH_ANGLE.sin();
    (vx * t, vy * t - 0.5 * GRAVITY * t * t)
}

pub fn problem(cfg: &TrainConfig) -> Result<Problem> {
    let equations = equation::projectile(GRAVITY);
    let vx = INITIAL_SPEED * LAUNCH_ANGLE.cos();
    let vy = INITIAL_SPEED * LAUNCH_ANGLE.sin();

    let ic = SampleSet::boundary(
        "ic",
        &[("t", 0.0)],
        &[("x", 0.0), ("y", 0.0), ("x__t", vx), ("y__t", vy)],
        cfg.batch("ic", 100),
    )?;
    let interior = SampleSet::interior(
        "interior",
        &[("t", 0.0, T_MAX)],
        &equations,
        cfg.batch("interior", 1000),
        cfg.seed,
    )?;

    let t = grid(0.0, T_MAX, GRID_STEP);
    let (xs, ys): (Vec<f64>, Vec<f64>) = t.iter().map(|&t| truth(t)).unzip();
    let validation = Validation::new(
        BTreeMap::from([("t".to_string(), t)]),
        BTreeMap::from([("x".to_string(), xs), ("y".to_string(), ys)]),
    )?;

    let problem = Problem {
        name: "projectile".into(),
        independent: vec!["t".into()],
        outputs: vec!["x".into(), "y".into()],
        equations,
        samples: vec![ic, interior],
        validation,
    };
    problem.validate()?;
    Ok(problem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn validation_arrays_match_the_stated_formulas() {
        let problem = problem(&TrainConfig::default()).unwrap();
        let t = problem.validation.inputs().get("t").unwrap();
        assert_eq!(t.len(), 500);
        let x = problem.validation.truth().get("x").unwrap();
        let y = problem.validation.truth().get("y").unwrap();
        for i in 0..t.len() {
            assert_relative_eq!(x[i], 40.0 * (PI / 3.0).cos() * t[i]);
            assert_relative_eq!(y[i], 40.0 * (PI / 3.0).sin() * t[i] - 4.905 * t[i] * t[i]);
        }
    }

    #[test]
    fn initial_conditions_pin_time_to_zero() {
        let problem = problem(&TrainConfig::default()).unwrap();
        let ic = &problem.samples[0];
        assert!(ic.input("t").unwrap().iter().all(|&v| v == 0.0));
        assert_relative_eq!(ic.target("x__t").unwrap()[0], 20.0, max_relative = 1e-12);
        assert_relative_eq!(ic.target("y__t").unwrap()[0], 40.0 * (PI / 3.0).sin());
    }

    #[test]
    fn launch_velocity_components() {
        // v0 = 40 at 60 degrees: vx = 20, vy = 20*sqrt(3)
        let (x, y) = truth(1.0);
        assert_relative_eq!(x, 20.0, max_relative = 1e-12);
        assert_relative_eq!(y, 20.0 * 3f64.sqrt() - 4.905, max_relative = 1e-12);
    }
}
