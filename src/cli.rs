use crate::problems::Example;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line surface: each example is runnable standalone, with training
/// and plotting as separate steps so plots can be re-rendered without
/// re-training.
#[derive(Parser, Debug)]
#[command(author, version, about = "Physics-informed neural network bootcamp examples", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train an example and write its model, loss chart and result bundle
    Train {
        /// Which bootcamp example to run
        #[arg(value_enum)]
        example: Example,
        /// Optional TOML training configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output root for models, bundles and plots
        #[arg(long, default_value = "outputs")]
        outdir: PathBuf,
    },
    /// Render predicted-vs-true charts from a saved result bundle
    Plot {
        /// Which example's bundle to plot
        #[arg(value_enum)]
        example: Example,
        /// Output root the bundle was written under
        #[arg(long, default_value = "outputs")]
        outdir: PathBuf,
    },
    /// List the available examples
    List,
}
