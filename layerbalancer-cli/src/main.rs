//! `lb`: balances a Lambda layer version across AWS regions.
//!
//! Usage:
//!   lb bump shared-deps --regions us-east-1,eu-west-1
//!   lb verify shared-deps --regions us-east-1,eu-west-1
//!   lb completions bash > /etc/bash_completion.d/lb
//!
//! Credentials come from the default AWS provider chain; `--profile` and
//! `--endpoint-url` override it.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use layerbalancer_aws::{connect, load_sdk_config};
use layerbalancer_cli::{Cli, Commands, commands};
use layerbalancer_core::{CancellationToken, LayerError};
use std::io;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.downcast_ref::<LayerError>().is_some_and(LayerError::is_cancelled) => {
            eprintln!("{}", LayerError::Cancelled);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("layerbalancer_core=debug,layerbalancer_aws=debug,layerbalancer_cli=debug,lb=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let target = match command {
        Commands::Completions { shell } => {
            commands::completions(*shell, &mut io::stdout());
            return Ok(());
        }
        Commands::Bump { target, .. } | Commands::Verify { target } => target,
    };

    // Usage errors surface before any credentials are resolved.
    let layer_name = target.layer_name()?;
    let regions = target.region_set()?;

    let settings = cli.aws_settings();
    let sdk_config = load_sdk_config(&settings)
        .await
        .context("failed to load AWS configuration")?;
    let layer = connect(layer_name, &sdk_config, &settings)?;
    debug!("Connected {layer:?}");

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling outstanding work");
            on_interrupt.cancel();
        }
    });

    let mut stdout = io::stdout();
    match command {
        Commands::Bump { .. } => {
            commands::bump(layer, &regions, cli.reconcile_config(), &cancel, &mut stdout).await?;
        }
        Commands::Verify { .. } => {
            commands::verify(&layer, &regions, &cancel, &mut stdout).await?;
        }
        Commands::Completions { .. } => {}
    }
    Ok(())
}
