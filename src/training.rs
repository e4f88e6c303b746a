//! The delegated training run.
//!
//! [`Trainer`] is the production [`Runner`]: it lowers each sample set to
//! tensors, composes the loss as a sum of MSE terms over every declared
//! target (data values against predicted columns, derivative targets and
//! equation residuals against finite-difference derivatives of the network,
//! so the whole loss stays differentiable), steps Adam with a decayed
//! learning rate and finally writes the model record, the loss-history chart
//! and the result bundle.

use crate::bundle::{PRED_PREFIX, TRUE_PREFIX, ResultBundle, validator_path};
use crate::config::TrainConfig;
use crate::error::{Error, Result};
use crate::expr::{Expr, deriv_label};
use crate::model::Model;
use crate::plot;
use crate::problem::{Problem, Runner};
use crate::sample::{SampleSet, TargetKey, parse_target_key};
use burn::backend::{Autodiff, NdArray};
use burn::module::Module;
use burn::nn::loss::{MseLoss, Reduction};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::Backend;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use burn::tensor::Tensor;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

type TrainBackend = Autodiff<NdArray<f32>>;

/// The runtime we delegate to is built for multi-process launches; identify
/// this as a single-process run when the launcher has not set the variables.
fn ensure_single_process_env() {
    for (key, value) in [
        ("RANK", "0"),
        ("WORLD_SIZE", "1"),
        ("MASTER_ADDR", "localhost"),
    ] {
        if std::env::var_os(key).is_none() {
            // single-threaded at this point; no concurrent reader exists
            unsafe { std::env::set_var(key, value) };
        }
    }
}

/// Lower an f64 array to an `[n, 1]` tensor column.
fn column<B: Backend>(values: &[f64], device: &B::Device) -> Tensor<B, 2> {
    let floats: Vec<f32> = values.iter().map(|&v| v as f32).collect();
    Tensor::<B, 1>::from_floats(floats.as_slice(), device).reshape([values.len(), 1])
}

/// Network fields over one sample set: predicted output columns and their
/// finite-difference derivatives, all as in-graph tensors.
struct FieldEval<'a, B: Backend> {
    model: &'a Model<B>,
    columns: &'a BTreeMap<String, Tensor<B, 2>>,
    independent: &'a [String],
    outputs: &'a [String],
    center: Tensor<B, 2>,
    rows: usize,
    fd_step: f64,
    device: &'a B::Device,
}

impl<'a, B: Backend> FieldEval<'a, B> {
    fn new(
        model: &'a Model<B>,
        columns: &'a BTreeMap<String, Tensor<B, 2>>,
        independent: &'a [String],
        outputs: &'a [String],
        rows: usize,
        fd_step: f64,
        device: &'a B::Device,
    ) -> Self {
        let center = model.forward(Self::assemble(columns, independent, None));
        Self {
            model,
            columns,
            independent,
            outputs,
            center,
            rows,
            fd_step,
            device,
        }
    }

    /// Concatenate the input columns in declaration order, optionally
    /// shifting one variable by `h` for a finite-difference stencil.
    fn assemble(
        columns: &BTreeMap<String, Tensor<B, 2>>,
        independent: &[String],
        shift: Option<(&str, f64)>,
    ) -> Tensor<B, 2> {
        let cols: Vec<Tensor<B, 2>> = independent
            .iter()
            .map(|name| {
                let base = columns[name].clone();
                match shift {
                    Some((v, h)) if v == name => base.add_scalar(h),
                    _ => base,
                }
            })
            .collect();
        Tensor::cat(cols, 1)
    }

    fn shifted(&self, variable: &str, h: f64) -> Tensor<B, 2> {
        self.model.forward(Self::assemble(
            self.columns,
            self.independent,
            Some((variable, h)),
        ))
    }

    fn output_column(&self, predictions: Tensor<B, 2>, name: &str) -> Result<Tensor<B, 2>> {
        let j = self
            .outputs
            .iter()
            .position(|o| o == name)
            .ok_or_else(|| Error::Config(format!("'{name}' is not a declared output")))?;
        Ok(predictions.slice([0..self.rows, j..j + 1]))
    }

    fn value(&self, name: &str) -> Result<Tensor<B, 2>> {
        self.output_column(self.center.clone(), name)
    }

    /// Central finite differences; first and repeated-second order cover the
    /// curriculum's residuals.
    fn derivative(&self, name: &str, wrt: &[String]) -> Result<Tensor<B, 2>> {
        let h = self.fd_step;
        match wrt {
            [v] => {
                let plus = self.output_column(self.shifted(v, h), name)?;
                let minus = self.output_column(self.shifted(v, -h), name)?;
                Ok((plus - minus).mul_scalar(1.0 / (2.0 * h)))
            }
            [a, b] if a == b => {
                let plus = self.output_column(self.shifted(a, h), name)?;
                let minus = self.output_column(self.shifted(a, -h), name)?;
                let center = self.value(name)?;
                Ok((plus - center.mul_scalar(2.0) + minus).mul_scalar(1.0 / (h * h)))
            }
            _ => Err(Error::Config(format!(
                "derivative '{}' is mixed or higher than second order, which the trainer does not support",
                deriv_label(name, wrt)
            ))),
        }
    }

    fn constant(&self, value: f64) -> Tensor<B, 2> {
        Tensor::ones([self.rows, 1], self.device).mul_scalar(value)
    }
}

/// Evaluate a residual expression over a sample set, producing an `[n, 1]`
/// tensor that stays differentiable with respect to the model parameters.
fn eval_expr<B: Backend>(expr: &Expr, fields: &FieldEval<'_, B>) -> Result<Tensor<B, 2>> {
    match expr {
        Expr::Const(value) => Ok(fields.constant(*value)),
        Expr::Func(name) => fields.value(name),
        Expr::Deriv { name, wrt } => fields.derivative(name, wrt),
        Expr::Add(a, b) => Ok(eval_expr(a, fields)? + eval_expr(b, fields)?),
        Expr::Sub(a, b) => Ok(eval_expr(a, fields)? - eval_expr(b, fields)?),
        Expr::Mul(a, b) => Ok(eval_expr(a, fields)? * eval_expr(b, fields)?),
        Expr::Neg(a) => Ok(eval_expr(a, fields)?.neg()),
    }
}

/// Sum of MSE terms over every target declared by one sample set.
fn set_loss<B: Backend>(
    problem: &Problem,
    set: &SampleSet,
    model: &Model<B>,
    fd_step: f64,
    device: &B::Device,
) -> Result<Tensor<B, 1>> {
    let rows = set.len();
    let columns: BTreeMap<String, Tensor<B, 2>> = set
        .inputs()
        .iter()
        .map(|(name, values)| (name.clone(), column(values, device)))
        .collect();
    let fields = FieldEval::new(
        model,
        &columns,
        &problem.independent,
        &problem.outputs,
        rows,
        fd_step,
        device,
    );

    let mut loss: Option<Tensor<B, 1>> = None;
    for (key, target_values) in set.targets() {
        let predicted = match parse_target_key(
            key,
            &problem.equations,
            &problem.outputs,
            &problem.independent,
        )? {
            TargetKey::Equation(label) => {
                let residual = problem
                    .equations
                    .get(&label)
                    .ok_or_else(|| Error::Config(format!("unknown equation label '{label}'")))?;
                eval_expr(residual, &fields)?
            }
            TargetKey::Output(name) => fields.value(&name)?,
            TargetKey::Deriv { name, wrt } => fields.derivative(&name, &wrt)?,
        };
        let target = column(target_values, device);
        let term = MseLoss::new().forward(predicted, target, Reduction::Mean);
        loss = Some(match loss {
            Some(acc) => acc + term,
            None => term,
        });
    }
    loss.ok_or_else(|| Error::Config(format!("sample set '{}' declares no targets", set.label())))
}

/// Run the trained model over the validation grid and assemble the
/// result-array bundle.
fn evaluate<B: Backend>(
    problem: &Problem,
    model: &Model<B>,
    device: &B::Device,
) -> Result<ResultBundle> {
    let validation = &problem.validation;
    let rows = validation.len();
    let cols: Vec<Tensor<B, 2>> = problem
        .independent
        .iter()
        .map(|name| {
            validation
                .inputs()
                .get(name)
                .map(|values| column(values, device))
                .ok_or_else(|| {
                    Error::Config(format!("validation supplies no input array for '{name}'"))
                })
        })
        .collect::<Result<_>>()?;
    let predictions = model.forward(Tensor::cat(cols, 1));
    let flat = predictions
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| Error::Train(format!("could not read predictions: {e:?}")))?;

    let mut bundle = ResultBundle::new();
    for (name, values) in validation.inputs() {
        bundle.insert(name.clone(), values.clone())?;
    }
    let width = problem.outputs.len();
    for (j, name) in problem.outputs.iter().enumerate() {
        let predicted: Vec<f64> = (0..rows).map(|i| f64::from(flat[i * width + j])).collect();
        bundle.insert(format!("{PRED_PREFIX}{name}"), predicted)?;
    }
    for (name, values) in validation.truth() {
        bundle.insert(format!("{TRUE_PREFIX}{name}"), values.clone())?;
    }
    Ok(bundle)
}

/// The production trainer. Owns only the output root; everything else comes
/// from the problem declaration and the training config.
pub struct Trainer {
    outdir: PathBuf,
}

impl Trainer {
    pub fn new(outdir: impl Into<PathBuf>) -> Self {
        Self {
            outdir: outdir.into(),
        }
    }
}

impl Runner for Trainer {
    fn run(&self, problem: &Problem, cfg: &TrainConfig) -> Result<ResultBundle> {
        cfg.validate()?;
        problem.validate()?;
        ensure_single_process_env();

        let device = Default::default();
        let mut model = Model::<TrainBackend>::new(
            &device,
            problem.independent.len(),
            problem.outputs.len(),
            cfg.hidden_size,
            cfg.hidden_layers,
        );
        let mut optim = AdamConfig::new().init();
        let mut loss_history = Vec::new();
        let start = Instant::now();

        log::info!(
            "training '{}' for {} steps (backend: NdArray, CPU)",
            problem.name,
            cfg.max_steps
        );
        for step in 1..=cfg.max_steps {
            let mut total: Option<Tensor<TrainBackend, 1>> = None;
            for set in &problem.samples {
                let term = set_loss(problem, set, &model, cfg.fd_step, &device)?;
                total = Some(match total {
                    Some(acc) => acc + term,
                    None => term,
                });
            }
            let total = total
                .ok_or_else(|| Error::Config("problem declares no sample sets".to_string()))?;

            if step % cfg.record_freq == 0 {
                let value = f64::from(total.clone().into_scalar());
                loss_history.push(value);
                log::info!("[step {step}] total loss: {value:.6}");
            }

            let grads = total.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr_at(step), model, grads);
        }
        log::info!(
            "training '{}' finished in {:.2?}",
            problem.name,
            start.elapsed()
        );

        let example_dir = self.outdir.join(&problem.name);
        std::fs::create_dir_all(&example_dir)?;

        let bundle = evaluate(problem, &model, &device)?;

        let model_path = example_dir.join("model.mpk");
        model
            .save_file(
                model_path.clone(),
                &NamedMpkFileRecorder::<FullPrecisionSettings>::new(),
            )
            .map_err(|e| Error::Train(format!("could not save model record: {e}")))?;
        log::info!("saved model record to '{}'", model_path.display());

        if !loss_history.is_empty() {
            plot::plot_loss_history(&loss_history, cfg.record_freq, &example_dir.join("loss.png"))?;
        }

        let bundle_path = validator_path(&self.outdir, &problem.name);
        bundle.save(&bundle_path)?;
        log::info!("wrote result bundle to '{}'", bundle_path.display());

        Ok(bundle)
    }
}
