mod commands;
mod config;
mod views;

use clap::{Parser, Subcommand};
use config::CliConfig;
use sorteio_core::RaffleConfig;
use sorteio_raffle::RaffleError;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sorteio")]
#[command(about = "Sorteio - live number raffle with admin and client surfaces")]
#[command(version)]
struct Cli {
    /// Data directory holding the shared database and client profiles
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Client profile name, one per simulated browser
    #[arg(short, long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Admin commands: draw numbers and follow the raffle
    #[command(subcommand)]
    Admin(commands::AdminCommands),

    /// Client commands: join draws and see the outcome
    #[command(subcommand)]
    Client(commands::ClientCommands),

    /// Run an admin and several clients against an in-memory store
    Demo(commands::DemoArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = CliConfig::new(cli.data_dir, cli.profile, cli.verbose);

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_filter()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Execute command
    let result = run(cli.command, config).await;

    if let Err(e) = result {
        match e.downcast_ref::<RaffleError>() {
            Some(RaffleError::InvalidRange { min, max }) => {
                eprintln!("Error: Invalid range '{}' to '{}'", min, max);
                eprintln!("Both bounds must be integers and MIN must be less than MAX");
            }
            _ => {
                eprintln!("Error: {:#}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Commands, config: CliConfig) -> anyhow::Result<()> {
    let raffle = RaffleConfig::from_env()?;

    match command {
        Commands::Demo(args) => commands::run_demo(args, raffle).await,
        Commands::Admin(cmd) => run_with_store(config, raffle, |ctx| async move {
            commands::handle_admin_command(cmd, &ctx).await
        })
        .await
        .map_err(anyhow::Error::from),
        Commands::Client(cmd) => run_with_store(config, raffle, |ctx| async move {
            commands::handle_client_command(cmd, &ctx).await
        })
        .await
        .map_err(anyhow::Error::from),
    }
}

async fn run_with_store<F, Fut>(
    config: CliConfig,
    raffle: RaffleConfig,
    command: F,
) -> sorteio_raffle::Result<()>
where
    F: FnOnce(commands::AppContext) -> Fut,
    Fut: std::future::Future<Output = sorteio_raffle::Result<()>>,
{
    let ctx = commands::AppContext::open(config, raffle).await?;
    command(ctx).await
}
