// Entity - local AI agent over a self-bootstrapped Ollama runtime
// Main entry point

use anyhow::Result;
use clap::Parser;
use tracing::info;

use entity::cli::Repl;
use entity::config::constants::DEFAULT_HTTP_ADDR;
use entity::config::load_config;
use entity::ollama::{ensure_ready, OllamaClient, ReadinessOrchestrator};
use entity::web;

#[derive(Parser, Debug)]
#[command(name = "entity", version, about = "Local AI agent backed by Ollama")]
struct Args {
    /// Locate or install the Ollama CLI, print its path, and exit
    #[arg(long)]
    install_ollama: bool,

    /// Model to use, overriding config file and environment
    #[arg(long, value_name = "NAME")]
    llm_model: Option<String>,

    /// Serve the web interface instead of the terminal REPL
    #[arg(long)]
    web: bool,

    /// Bind address for the web interface
    #[arg(long, value_name = "ADDR", default_value = DEFAULT_HTTP_ADDR)]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    // Load configuration; the flag outranks environment and files
    let mut config = load_config()?;
    if let Some(model) = args.llm_model {
        config.model = model;
    }

    if args.install_ollama {
        let orchestrator = ReadinessOrchestrator::new(&config)?;
        let path = orchestrator.ensure_cli_installed().await?;
        println!("Ollama CLI at {}", path.display());
        return Ok(());
    }

    // Bring the runtime up before any surface starts
    let handle = ensure_ready(&config).await?;
    info!(
        "Runtime ready: {} serving {}",
        handle.executable.display(),
        handle.model
    );

    let client = OllamaClient::new(config.ollama_url())?;

    if args.web {
        let state = web::AppState {
            client,
            model: handle.model,
        };
        web::serve(&args.bind, state).await
    } else {
        Repl::new(client, handle.model).run().await
    }
}
