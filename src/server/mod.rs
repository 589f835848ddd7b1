pub mod handlers;
pub mod types;

pub use handlers::AppState;

use crate::{
    Error, Result,
    config::Config,
    generation::{SqlGenerator, T5SqlGenerator},
};
use axum::{Router, routing::post};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/generate_sql", post(handlers::generate_sql))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    // Hub downloads and weight loading block; a failure here aborts startup.
    let model_config = config.model.clone();
    let generator = tokio::task::spawn_blocking(move || T5SqlGenerator::load(&model_config))
        .await
        .map_err(|e| Error::internal(format!("model loading task failed: {}", e)))??;

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!(
        "Starting server on {} (model {} on {:?})",
        addr,
        config.model.model_path,
        generator.device()
    );

    let generator: Arc<dyn SqlGenerator> = Arc::new(generator);
    let app = create_router(AppState::new(generator));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
