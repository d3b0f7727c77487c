//! roadtrip - conversational road trip planner
//!
//! CLI entry point for the interactive planner and its trip utilities.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use eyre::{Context, Result};
use tracing::info;

use roadtrip::cli::{Cli, Command, OutputFormat, get_log_path};
use roadtrip::config::Config;
use roadtrip::places::PlacesClient;
use roadtrip::repl::{format_trip, run_interactive};
use roadtrip::tools::{InterpreterOptions, ToolInterpreter};
use roadtrip::trip::TripPersistence;

fn setup_logging(verbose: bool) -> Result<()> {
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Write to the log file, never to the terminal the REPL draws on
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(
        "roadtrip loaded config: provider={}, model={}",
        config.llm.provider, config.llm.model
    );

    match cli.command {
        Some(Command::Chat { prompt }) => run_interactive(&config, prompt).await,
        None => run_interactive(&config, None).await,
        Some(Command::Show { format }) => cmd_show(&config, format),
        Some(Command::Reset) => cmd_reset(&config),
        Some(Command::Places { lat, lng, query }) => cmd_places(&config, lat, lng, query).await,
        Some(Command::Tools) => cmd_tools(&config),
    }
}

fn cmd_show(config: &Config, format: OutputFormat) -> Result<()> {
    let persistence = TripPersistence::new(&config.storage.state_file);
    let doc = persistence.load().unwrap_or_default();
    match format {
        OutputFormat::Text => println!("{}", format_trip(&doc)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&doc)?),
    }
    Ok(())
}

fn cmd_reset(config: &Config) -> Result<()> {
    let persistence = TripPersistence::new(&config.storage.state_file);
    persistence.clear()?;
    info!(path = %persistence.path().display(), "Trip cleared");
    println!("Trip cleared.");
    Ok(())
}

async fn cmd_places(config: &Config, lat: f64, lng: f64, query: Option<String>) -> Result<()> {
    let client = PlacesClient::from_config(&config.places)?;
    if !client.is_configured() {
        eprintln!(
            "No places API key found; set {} to enable search.",
            config.places.api_key_env
        );
    }

    let places = client.search(lat, lng, query.as_deref()).await?;
    if places.is_empty() {
        println!("No places found.");
        return Ok(());
    }
    for place in places {
        let address = place.address.as_deref().unwrap_or("");
        println!("{:.1}  {}  {}", place.rating, place.name, address);
    }
    Ok(())
}

fn cmd_tools(config: &Config) -> Result<()> {
    let interpreter = ToolInterpreter::standard(InterpreterOptions {
        strict_recommendations: config.tools.strict_recommendations,
    });
    let schemas: Vec<_> = interpreter
        .definitions(&config.chat.currency)
        .iter()
        .map(|d| d.to_anthropic_schema())
        .collect();
    println!("{}", serde_json::to_string_pretty(&schemas)?);
    Ok(())
}
