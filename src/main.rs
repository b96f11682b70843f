use clap::{Parser, Subcommand};
use tracing::info;

use zenith_api::bootstrap::{build_state, ServiceReport};
use zenith_api::config::Config;
use zenith_api::{logging, metrics, server};

#[derive(Parser)]
#[command(name = "zenith")]
#[command(about = "Zenith wellbeing API: mood journal, psychologist directory and AI chat")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Keep data in memory instead of Firestore (local development)
        #[arg(long)]
        in_memory: bool,
    },
    /// Show which external services the current environment configures
    Config,
}

fn status(enabled: bool) -> &'static str {
    if enabled {
        "configured"
    } else {
        "NOT configured"
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Serve { port, in_memory } => {
            if let Some(metrics_port) = config.metrics_port {
                metrics::init_metrics(metrics_port);
            }
            let state = build_state(&config, in_memory)?;
            let port = port.unwrap_or(config.port);
            info!("Starting Zenith API");
            server::start_server(state, &config.cors_origins, port).await?;
        }
        Commands::Config => {
            let report = ServiceReport::from_config(&config);
            println!("Firestore (FIREBASE_CREDENTIALS): {}", status(report.store));
            println!("Identity (FIREBASE_API_KEY):      {}", status(report.identity));
            println!("Gemini (GEMINI_API_KEY):          {}", status(report.generator));
            println!("CORS origins:                     {}", config.cors_origins.join(", "));
            if config.uses_default_secret() {
                println!("SECRET_KEY:                       development default");
            }
        }
    }
    Ok(())
}
