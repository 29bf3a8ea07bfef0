use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info_span, Instrument};
use tracing_subscriber::EnvFilter;

use ledger_agent::{create_router, create_state};
use ledger_agent_configuration::environment::ProcessEnvironment;
use ledger_agent_configuration::{
    make_runtime_configuration, parse_configuration, write_parsed_configuration,
    ParsedConfiguration,
};

#[derive(Parser)]
#[command(version, about)]
struct ServerOptions {
    /// Directory holding configuration.json.
    #[arg(
        long,
        env = "LEDGER_AGENT_CONFIGURATION",
        value_name = "DIRECTORY",
        default_value = "."
    )]
    configuration: PathBuf,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve HTTP requests (the default).
    Serve,
    /// Write the initial configuration and its JSON schema into the configuration directory.
    Initialize,
}

#[tokio::main]
pub async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = ServerOptions::parse();
    let result = match options.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(options.configuration, options.port).await,
        Command::Initialize => initialize(options.configuration).await,
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(configuration_dir: PathBuf, port: u16) -> anyhow::Result<()> {
    let parsed = parse_configuration(&configuration_dir)
        .instrument(info_span!("parse configuration"))
        .await
        .context("unable to parse the configuration")?;
    let configuration = make_runtime_configuration(parsed, ProcessEnvironment)
        .context("unable to resolve the configuration")?;
    tracing::debug!(?configuration, "runtime configuration");

    let mut metrics_registry = prometheus::Registry::new();
    let state = create_state(&configuration, &mut metrics_registry).await?;
    let router = create_router(state);

    let address = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%address, "starting server");
    axum::Server::bind(&address)
        .serve(router.into_make_service())
        .await?;
    Ok(())
}

async fn initialize(configuration_dir: PathBuf) -> anyhow::Result<()> {
    write_parsed_configuration(ParsedConfiguration::initial(), &configuration_dir)
        .await
        .with_context(|| {
            format!(
                "unable to write the configuration to {}",
                configuration_dir.display()
            )
        })?;
    tracing::info!(directory = %configuration_dir.display(), "wrote the initial configuration");
    Ok(())
}
