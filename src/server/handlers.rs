use super::types::{ErrorResponse, GenerateSqlRequest, GenerateSqlResponse};
use crate::generation::SqlGenerator;
use axum::{extract::State, http::StatusCode, response::Json};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn SqlGenerator>,
}

impl AppState {
    pub fn new(generator: Arc<dyn SqlGenerator>) -> Self {
        Self { generator }
    }
}

pub async fn generate_sql(
    State(state): State<AppState>,
    Json(request): Json<GenerateSqlRequest>,
) -> Result<Json<GenerateSqlResponse>, (StatusCode, Json<ErrorResponse>)> {
    let prompt = request.prompt.unwrap_or_default();
    info!("Received generate_sql request ({} chars)", prompt.len());

    // Generation is CPU-bound; keep it off the async workers.
    let generator = Arc::clone(&state.generator);
    let result = tokio::task::spawn_blocking(move || generator.generate_sql(&prompt)).await;

    match result {
        Ok(Ok(server_response)) => {
            info!("Generated SQL ({} chars)", server_response.len());
            Ok(Json(GenerateSqlResponse { server_response }))
        }
        Ok(Err(e)) => {
            error!("Failed to generate SQL: {}", e);
            Err(internal_error(format!("Generation error: {}", e)))
        }
        Err(e) => {
            error!("Generation task did not complete: {}", e);
            Err(internal_error(format!("Generation task failed: {}", e)))
        }
    }
}

fn internal_error(message: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: message }),
    )
}
