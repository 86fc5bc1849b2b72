use axum::extract::State;
use axum::Json;
use rota_core::stats::Stats;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/stats: pool and ledger counts with per-worker totals.
pub async fn get_stats(State(app): State<AppState>) -> Result<Json<Stats>, AppError> {
    let db = app.db.clone();
    let stats = tokio::task::spawn_blocking(move || db.stats())
        .await
        .map_err(AppError::join)??;
    Ok(Json(stats))
}
