use anyhow::Result;
use clap::{Parser, Subcommand};
use docrag::{AppState, Config};
use docrag_api::RequestParams;

/// docrag - Document query frontend
#[derive(Parser)]
#[command(name = "docrag")]
#[command(about = "Web frontend for the document query backend", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Check that the backend is reachable
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    docrag::logging::init(&config.logging, config.server.environment)?;

    match cli.command {
        Commands::Serve { host, port } => docrag::server::serve(config, host, port).await,
        Commands::Ping => ping(config).await,
    }
}

#[tracing::instrument(skip_all)]
async fn ping(config: Config) -> Result<()> {
    let state = AppState::new(config)?;
    let reply = state.api.health(RequestParams::default()).await?;

    println!("{} -> {reply}", state.api.base_url());

    Ok(())
}
