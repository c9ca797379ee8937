//! Mines API Server Binary
//!
//! Loads configuration, opens the session store and serves the game over HTTP.

use clap::Parser;
use mines::api::ApiServer;
use mines::config::{ConfigLoader, MinesConfig, StorageBackend};
use mines::factory::ServiceFactory;

#[derive(Parser, Debug)]
#[command(name = "mines-api")]
#[command(about = "Mines wager game API server", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Start from a preset instead of the defaults (development, production)
    #[arg(long)]
    preset: Option<String>,

    /// API server host
    #[arg(long)]
    host: Option<String>,

    /// API server port
    #[arg(long)]
    port: Option<u16>,

    /// Session store backend (memory, rocksdb)
    #[arg(long)]
    backend: Option<StorageBackend>,

    /// Database directory for the rocksdb backend
    #[arg(long)]
    db_path: Option<String>,

    /// Allowed CORS origins (comma-separated, use * for all)
    #[arg(long)]
    cors_origins: Option<String>,
}

fn load_config(args: &Args) -> Result<MinesConfig, Box<dyn std::error::Error>> {
    let loader = match (&args.config, args.preset.as_deref()) {
        (Some(path), _) => ConfigLoader::new().with_path(path),
        (None, Some(name)) => ConfigLoader::new().with_base(MinesConfig::preset(name)?),
        (None, None) => ConfigLoader::new(),
    };
    // environment overrides apply to presets as well
    let mut config = loader.load()?;

    // Command line flags override file and environment
    if let Some(host) = &args.host {
        config.api.host = host.clone();
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(backend) = args.backend {
        config.storage.backend = backend;
    }
    if let Some(db_path) = &args.db_path {
        config.storage.data_directory = db_path.clone();
    }
    if let Some(origins) = &args.cors_origins {
        config.api.allowed_origins = origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args)?;

    ApiServer::init_tracing(&config);

    let runtime = ServiceFactory::create_runtime(&config)?;
    let server = ApiServer::new(config, runtime.service.clone());
    let result = server.run().await;

    runtime.shutdown();
    result
}
