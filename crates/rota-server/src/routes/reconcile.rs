use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rota_core::reconcile::{reconcile_all, ReconcileReport};

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Serialize)]
pub struct ReconcileResponse {
    #[serde(flatten)]
    pub report: ReconcileReport,
    pub summary: String,
}

/// POST /api/reconcile: assign every item that is still unassigned.
///
/// A pass halted by a store failure answers 503 with the partial report.
pub async fn reconcile(
    State(app): State<AppState>,
) -> Result<(StatusCode, Json<ReconcileResponse>), AppError> {
    let db = app.db.clone();
    let report = tokio::task::spawn_blocking(move || reconcile_all(db.as_ref()))
        .await
        .map_err(AppError::join)??;

    let status = status_for(&report);
    let body = ReconcileResponse {
        summary: report.summary(),
        report,
    };
    Ok((status, Json(body)))
}

fn status_for(report: &ReconcileReport) -> StatusCode {
    if report.halted {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}
