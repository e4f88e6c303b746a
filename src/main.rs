use clap::Parser;
use pinn_bootcamp::bundle::{ResultBundle, validator_path};
use pinn_bootcamp::cli::{Cli, Commands};
use pinn_bootcamp::config::TrainConfig;
use pinn_bootcamp::plot;
use pinn_bootcamp::problem::Runner;
use pinn_bootcamp::problems::Example;
use pinn_bootcamp::training::Trainer;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

fn main() -> miette::Result<()> {
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .ok();
    let cli = Cli::parse();
    run(cli).map_err(Into::into)
}

fn run(cli: Cli) -> pinn_bootcamp::Result<()> {
    match cli.command {
        Commands::Train {
            example,
            config,
            outdir,
        } => {
            let cfg = match config {
                Some(path) => TrainConfig::load(&path)?,
                None => TrainConfig::default(),
            };
            let problem = example.build(&cfg)?;
            Trainer::new(&outdir).run(&problem, &cfg)?;
        }
        Commands::Plot { example, outdir } => {
            let path = validator_path(&outdir, example.name());
            let bundle = ResultBundle::load(&path)?;
            let dir = outdir.join(example.name()).join("plots");
            let files = plot::plot_validation(&bundle, &dir)?;
            for file in files {
                log::info!("wrote '{}'", file.display());
            }
        }
        Commands::List => {
            for example in Example::all() {
                println!("{example}");
            }
        }
    }
    Ok(())
}
