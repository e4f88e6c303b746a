//! Error types for the bootcamp crate.
//!
//! Every failure is surfaced directly to the caller; there is no internal
//! retry or degraded mode. Declaration errors fail at construction time,
//! before any training step runs.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// A declaration references an unknown name, a malformed target key, or a
    /// non-positive count.
    #[error("configuration error: {0}")]
    #[diagnostic(
        code(pinn::config),
        help("check the equation, sample-set and training-config declarations")
    )]
    Config(String),

    /// The visualization step ran before training produced its output bundle,
    /// or ran from a different working directory.
    #[error("result bundle not found at '{path}'")]
    #[diagnostic(
        code(pinn::missing_artifact),
        help("run `pinn-bootcamp train <example>` first, from the same working directory")
    )]
    MissingArtifact { path: PathBuf },

    /// The bundle file exists but could not be parsed or is internally
    /// inconsistent.
    #[error("malformed result bundle at '{path}': {message}")]
    #[diagnostic(code(pinn::artifact))]
    Artifact { path: PathBuf, message: String },

    /// The delegated training run failed; the underlying message is surfaced
    /// verbatim.
    #[error("training failed: {0}")]
    #[diagnostic(code(pinn::train))]
    Train(String),

    #[error("plot rendering failed: {0}")]
    #[diagnostic(code(pinn::plot))]
    Plot(String),

    #[error(transparent)]
    #[diagnostic(code(pinn::io))]
    Io(#[from] std::io::Error),
}
