use std::process::ExitCode;

use clap::Parser;
use talentlayer_scripts::{
    cli::Cli,
    config::{ChainConfig, ScriptConfig},
};
use tracing::error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let Cli {
        network,
        deployments_dir,
        dry_run,
        command,
    } = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = ScriptConfig::new(network, deployments_dir, dry_run);
    if command.requires_chain(dry_run) {
        match ChainConfig::from_env(network, |key| std::env::var(key).ok()) {
            Ok(chain) => config = config.with_chain(chain),
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }

    match command.run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(%network, "{e}");
            ExitCode::FAILURE
        }
    }
}
