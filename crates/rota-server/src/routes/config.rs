use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET /api/config: the loaded configuration plus validation warnings.
pub async fn get_config(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "config": app.config.as_ref(),
        "warnings": app.config.validate(),
    }))
}
