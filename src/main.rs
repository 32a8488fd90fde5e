use axum::response::Html;
use axum::routing::{get, post, put};
use axum::Router;
use tracing_subscriber::EnvFilter;

use snippet_search::api;
use snippet_search::config::Config;
use snippet_search::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!(
        "Embedding provider: {} ({})",
        config.llm.provider,
        config.llm.base_url
    );

    // Standards and vocabulary are mandatory: evaluation and the live
    // keyword step cannot run without them, so startup aborts here
    // rather than limping into a degraded mode.
    let state = AppState::new(config.clone())?;

    let app = Router::new()
        // Serve frontend
        .route("/", get(serve_index))
        // API routes
        .route("/api/search", post(api::search::search))
        .route("/api/index", post(api::index::run_index))
        .route("/api/status", get(api::index::status))
        .route("/api/config", get(api::config::get_config))
        .route("/api/config", put(api::config::update_config))
        .with_state(state)
        .fallback(get(serve_index));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}
