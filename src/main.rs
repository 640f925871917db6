mod cli;

use crosscast::{adapters::Adapters, config, events::EventBus, pipeline, server};
use crosscast_common::EpisodeId;
use crosscast_db::pool::init_pool;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "crosscast=trace,crosscast_db=debug,crosscast_common=debug,tower_http=debug".to_string()
        } else {
            "crosscast=debug,crosscast_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Process { episode_id } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(process_episode(episode_id, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("crosscast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn start_server(host: String, port: u16, config_path: Option<&std::path::Path>) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    config.server.host = host;
    config.server.port = port;

    tracing::info!("Starting Crosscast server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

async fn process_episode(episode_id: uuid::Uuid, config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    std::fs::create_dir_all(&config.app.data_dir)?;
    let db_path = config.app.data_dir.join("crosscast.db");
    let pool = init_pool(&db_path.to_string_lossy())?;

    let adapters = Adapters::from_config(&config);
    let orchestrator =
        pipeline::PipelineOrchestrator::new(pool, adapters, EventBus::new(), &config);

    let outcome = orchestrator.run(EpisodeId::from(episode_id)).await?;
    match outcome {
        pipeline::RunOutcome::Completed => println!("Episode {} completed", episode_id),
        pipeline::RunOutcome::Failed => {
            println!("Episode {} failed; see the step ledger for details", episode_id);
        }
    }

    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Public URL: {}", config.app.public_url);
            println!("  Data dir: {:?}", config.app.data_dir);
            println!("  Adapter timeout: {}s", config.adapters.timeout_secs);
            println!("  Platforms: {}", config.platforms.len());
            println!(
                "    Enabled: {}",
                config.platforms.iter().filter(|p| p.enabled).count()
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
