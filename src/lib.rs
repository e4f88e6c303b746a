//! # Physics-informed neural network bootcamp
//!
//! A hands-on set of PINN examples built on the `burn` framework: each
//! example states a differential equation as symbolic residual expressions,
//! declares the sample sets its training objective is built from, delegates
//! the run to a trainer and persists a result bundle for plotting.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- train projectile
//! cargo run --release -- plot projectile
//! ```
//!
//! The curriculum covers projectile motion, a three-mass spring system (both
//! forward and inverse, recovering `m1` and `k4` from observed motion) and
//! 1D transient diffusion.

pub mod bundle;
pub mod cli;
pub mod config;
pub mod equation;
pub mod error;
pub mod expr;
pub mod model;
pub mod plot;
pub mod problem;
pub mod problems;
pub mod sample;
pub mod training;
pub mod validator;

pub use error::{Error, Result};
