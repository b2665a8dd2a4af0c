use anyhow::Result;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use stt_api::config::Config;
use stt_api::routes;
use stt_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("stt_api=debug,tower_http=debug")
        .init();

    // Load configuration - try multiple paths, fall back to defaults since
    // every key has one
    let config_paths: Vec<String> = vec![
        std::env::var("CONFIG_PATH").ok(),
        Some("conf.yaml".to_string()),
        Some("conf.json".to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut config = None;
    for path in config_paths {
        match Config::load(&path) {
            Ok(cfg) => {
                info!("Loaded configuration from: {}", path);
                config = Some(cfg);
                break;
            }
            Err(e) => {
                tracing::debug!("Failed to load config from {}: {}", path, e);
                continue;
            }
        }
    }

    let config = config.unwrap_or_else(|| {
        info!("No config file found, using defaults");
        Config::default()
    });

    info!(
        policy = ?config.error_policy,
        language = %config.recognition.language,
        "resolved runtime configuration"
    );

    let app_state = AppState::new(config.clone());

    // Build application
    let app = Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let addr = format!("{}:{}", config.system.host, config.system.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
