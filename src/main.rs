use std::process::ExitCode;

use tracing::{error, info};

use mailroom::mail::transport_from_config;
use mailroom::{Config, Database, WebServer};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = mailroom::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        mailroom::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    info!("Mailroom {}", env!("CARGO_PKG_VERSION"));

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server stopped: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> mailroom::Result<()> {
    let db = Database::open(&config.database.path).await?;
    info!(path = %config.database.path, "Database ready");

    let transport = transport_from_config(&config.smtp)?;
    info!(transport = transport.name(), "Delivery configured");

    let server = WebServer::new(&config, db.clone(), transport)?;
    let result = server.run().await;

    db.close().await;
    result
}
