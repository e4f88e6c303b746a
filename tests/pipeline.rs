//! End-to-end declaration -> run -> artifact -> plot pipeline, with the
//! trainer replaced by an oracle that answers from the closed-form solution.
//! Real training never runs here; these tests pin down the contracts around
//! the delegated run.

use pinn_bootcamp::bundle::{ResultBundle, validator_path};
use pinn_bootcamp::config::TrainConfig;
use pinn_bootcamp::error::Error;
use pinn_bootcamp::plot;
use pinn_bootcamp::problem::{Problem, Runner};
use pinn_bootcamp::problems::Example;
use std::path::PathBuf;

/// A runner that skips training and reports the analytical solution as its
/// prediction, writing the bundle exactly where the real trainer would.
struct OracleRunner {
    outdir: PathBuf,
}

impl Runner for OracleRunner {
    fn run(&self, problem: &Problem, cfg: &TrainConfig) -> pinn_bootcamp::Result<ResultBundle> {
        cfg.validate()?;
        problem.validate()?;
        let mut bundle = ResultBundle::new();
        for (name, values) in problem.validation.inputs() {
            bundle.insert(name.clone(), values.clone())?;
        }
        for name in &problem.outputs {
            let predicted = match problem.validation.truth().get(name) {
                Some(truth) => truth.clone(),
                // no closed form (e.g. an inferred parameter): report zeros
                None => vec![0.0; problem.validation.len()],
            };
            bundle.insert(format!("pred_{name}"), predicted)?;
        }
        for (name, values) in problem.validation.truth() {
            bundle.insert(format!("true_{name}"), values.clone())?;
        }
        bundle.save(&validator_path(&self.outdir, &problem.name))?;
        Ok(bundle)
    }
}

#[test]
fn oracle_run_produces_a_loadable_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = TrainConfig::default();
    let problem = Example::Projectile.build(&cfg).unwrap();
    let runner = OracleRunner {
        outdir: dir.path().to_path_buf(),
    };
    let bundle = runner.run(&problem, &cfg).unwrap();

    let path = validator_path(dir.path(), "projectile");
    let loaded = ResultBundle::load(&path).unwrap();
    assert_eq!(loaded, bundle);
    assert_eq!(loaded.rows(), 500);
    assert_eq!(loaded.dependent_variables(), ["x", "y"]);
    assert_eq!(loaded.independent_variables(), ["t"]);
}

#[test]
fn plotting_follows_the_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = TrainConfig::default();
    let problem = Example::SpringMass.build(&cfg).unwrap();
    let runner = OracleRunner {
        outdir: dir.path().to_path_buf(),
    };
    runner.run(&problem, &cfg).unwrap();

    let bundle = ResultBundle::load(&validator_path(dir.path(), "spring_mass")).unwrap();
    let plots = plot::plot_validation(&bundle, &dir.path().join("plots")).unwrap();
    assert_eq!(plots.len(), 3);
    for file in plots {
        assert!(file.exists());
    }
}

#[test]
fn plotting_before_training_is_a_missing_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = validator_path(dir.path(), "diffusion");
    match ResultBundle::load(&path) {
        Err(Error::MissingArtifact { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected MissingArtifact, got {other:?}"),
    }
}

#[test]
fn rerun_overwrites_the_previous_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = TrainConfig::default();
    let problem = Example::SpringMassInverse.build(&cfg).unwrap();
    let runner = OracleRunner {
        outdir: dir.path().to_path_buf(),
    };
    let first = runner.run(&problem, &cfg).unwrap();
    let second = runner.run(&problem, &cfg).unwrap();
    assert_eq!(first, second);
    let loaded = ResultBundle::load(&validator_path(dir.path(), "spring_mass_inverse")).unwrap();
    // the inverse bundle carries predictions for the inferred parameters too
    assert!(loaded.get("pred_m1").is_some());
    assert!(loaded.get("pred_k4").is_some());
    assert!(loaded.get("true_m1").is_none());
}

#[test]
fn invalid_config_fails_before_any_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = TrainConfig::default();
    cfg.record_freq = 0;
    let problem = Example::Projectile.build(&TrainConfig::default()).unwrap();
    let runner = OracleRunner {
        outdir: dir.path().to_path_buf(),
    };
    assert!(runner.run(&problem, &cfg).is_err());
    assert!(!validator_path(dir.path(), "projectile").exists());
}
