//! 1D transient diffusion: the bootcamp's first PDE, two independent
//! variables.
//!
//! `u_t = D u_xx` on `x in [0, 1]` with `u(0, x) = sin(pi x)` and both ends
//! held at zero. The separable closed form `u = sin(pi x) exp(-D pi^2 t)`
//! validates the run.

use crate::config::TrainConfig;
use crate::equation;
use crate::error::Result;
use crate::problem::Problem;
use crate::sample::{SampleSet, grid};
use crate::validator::Validation;
use std::collections::BTreeMap;
use std::f64::consts::PI;

pub const DIFFUSIVITY: f64 = 0.1;
pub const T_MAX: f64 = 1.0;

/// Analytical temperature at `(t, x)`.
pub fn truth(t: f64, x: f64) -> f64 {
    (PI * x).sin() * (-DIFFUSIVITY * PI * PI * t).exp()
}

pub fn problem(cfg: &TrainConfig) -> Result<Problem> {
    let equations = equation::diffusion(DIFFUSIVITY.into());

    let initial_profile: &dyn Fn(f64) -> f64 = &|x: f64| (PI * x).sin();
    let zero: &dyn Fn(f64) -> f64 = &|_| 0.0;
    let ic = SampleSet::boundary_profile(
        "ic",
        &[("t", 0.0)],
        ("x", 0.0, 1.0),
        &[("u", initial_profile)],
        cfg.batch("ic", 200),
        cfg.seed,
    )?;
    let bc_left = SampleSet::boundary_profile(
        "bc_left",
        &[("x", 0.0)],
        ("t", 0.0, T_MAX),
        &[("u", zero)],
        cfg.batch("bc_left", 100),
        cfg.seed.wrapping_add(1),
    )?;
    let bc_right = SampleSet::boundary_profile(
        "bc_right",
        &[("x", 1.0)],
        ("t", 0.0, T_MAX),
        &[("u", zero)],
        cfg.batch("bc_right", 100),
        cfg.seed.wrapping_add(2),
    )?;
    let interior = SampleSet::interior(
        "interior",
        &[("t", 0.0, T_MAX), ("x", 0.0, 1.0)],
        &equations,
        cfg.batch("interior", 2000),
        cfg.seed.wrapping_add(3),
    )?;

    // flattened (t, x) mesh, coarse enough to keep the bundle small
    let t_axis = grid(0.0, T_MAX, 0.05);
    let x_axis = grid(0.0, 1.0 + 1e-9, 0.05);
    let mut t_mesh = Vec::with_capacity(t_axis.len() * x_axis.len());
    let mut x_mesh = Vec::with_capacity(t_axis.len() * x_axis.len());
    let mut u_mesh = Vec::with_capacity(t_axis.len() * x_axis.len());
    for &t in &t_axis {
        for &x in &x_axis {
            t_mesh.push(t);
            x_mesh.push(x);
            u_mesh.push(truth(t, x));
        }
    }
    let validation = Validation::new(
        BTreeMap::from([("t".to_string(), t_mesh), ("x".to_string(), x_mesh)]),
        BTreeMap::from([("u".to_string(), u_mesh)]),
    )?;

    let problem = Problem {
        name: "diffusion".into(),
        independent: vec!["t".into(), "x".into()],
        outputs: vec!["u".into()],
        equations,
        samples: vec![ic, bc_left, bc_right, interior],
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
    fn truth_respects_boundaries_and_decay() {
        assert_relative_eq!(truth(0.3, 0.0), 0.0, epsilon = 1e-15);
        assert_relative_eq!(truth(0.3, 1.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(truth(0.0, 0.5), 1.0);
        assert!(truth(1.0, 0.5) < truth(0.0, 0.5));
    }

    #[test]
    fn initial_set_pins_time_and_samples_space() {
        let problem = problem(&TrainConfig::default()).unwrap();
        let ic = problem.samples.iter().find(|s| s.label() == "ic").unwrap();
        assert!(ic.input("t").unwrap().iter().all(|&v| v == 0.0));
        let x = ic.input("x").unwrap();
        let u = ic.target("u").unwrap();
        for (xv, uv) in x.iter().zip(u) {
            assert_relative_eq!((PI * xv).sin(), *uv);
        }
    }

    #[test]
    fn every_set_supplies_both_variables() {
        let problem = problem(&TrainConfig::default()).unwrap();
        for set in &problem.samples {
            assert!(set.input("t").is_some(), "set '{}'", set.label());
            assert!(set.input("x").is_some(), "set '{}'", set.label());
        }
    }
}
