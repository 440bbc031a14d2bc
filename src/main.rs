use chat_trigger_hook::logging::setup_logging;
use chat_trigger_hook::trigger_api::BuildTriggerClient;
use chat_trigger_hook::{AppState, api, load_config};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "hook_config.toml";

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config_path = PathBuf::from(
        std::env::var("HOOK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
    );

    let mut config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Ok(bind_address) = std::env::var("BIND_ADDRESS") {
        config.server.bind_address = bind_address;
    }

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = match setup_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to set up logging: {}", e);
            std::process::exit(1);
        }
    };

    let trigger_client = match BuildTriggerClient::new(&config.trigger_api) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create trigger API client: {}", e);
            std::process::exit(1);
        }
    };

    let bind_address = config.server.bind_address.clone();
    info!("Using config at {:?}", config_path);
    info!("Trigger API: {}", config.trigger_api.base_url);
    if config.slack.signing_secret().is_none() {
        info!("No Slack signing secret configured, request signatures are not verified");
    }

    let state = Arc::new(AppState::new(config, Arc::new(trigger_client)));
    let app = api::router(state);

    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", bind_address, e);
            std::process::exit(1);
        }
    };
    info!("Listening on {}", bind_address);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
