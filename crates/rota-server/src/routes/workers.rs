use axum::extract::{Path, State};
use axum::Json;
use rota_core::types::Eligibility;
use rota_core::worker::{parse_worker_id, Worker, WorkerUpdate};

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct CreateWorkerBody {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// GET /api/workers: all workers, oldest first.
pub async fn list_workers(State(app): State<AppState>) -> Result<Json<Vec<Worker>>, AppError> {
    let db = app.db.clone();
    let workers = tokio::task::spawn_blocking(move || db.list_workers())
        .await
        .map_err(AppError::join)??;
    Ok(Json(workers))
}

/// POST /api/workers: add a worker to the pool.
pub async fn create_worker(
    State(app): State<AppState>,
    Json(body): Json<CreateWorkerBody>,
) -> Result<Json<Worker>, AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::bad_request("name is required"));
    }
    let status: Eligibility = match body.status.as_deref() {
        Some(s) => s.parse()?,
        None => Eligibility::Active,
    };

    let mut worker = Worker::new(body.name.trim());
    worker.email = body.email;
    worker.status = status;

    let db = app.db.clone();
    let worker = tokio::task::spawn_blocking(move || {
        db.add_worker(&worker)?;
        Ok::<_, rota_core::RotaError>(worker)
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(worker))
}

/// PATCH /api/workers/:id: edit name or email without touching the rotation.
pub async fn update_worker(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<WorkerUpdate>,
) -> Result<Json<Worker>, AppError> {
    let id = parse_worker_id(&id)?;
    let db = app.db.clone();
    let worker = tokio::task::spawn_blocking(move || db.update_worker(id, body))
        .await
        .map_err(AppError::join)??;
    Ok(Json(worker))
}

/// POST /api/workers/:id/activate: put a worker (back) into the rotation.
pub async fn activate_worker(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Worker>, AppError> {
    set_status(app, &id, Eligibility::Active).await
}

/// POST /api/workers/:id/deactivate: take a worker out of the rotation.
pub async fn deactivate_worker(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Worker>, AppError> {
    set_status(app, &id, Eligibility::Inactive).await
}

async fn set_status(app: AppState, id: &str, status: Eligibility) -> Result<Json<Worker>, AppError> {
    let id = parse_worker_id(id)?;
    let db = app.db.clone();
    let worker = tokio::task::spawn_blocking(move || db.set_eligibility(id, status))
        .await
        .map_err(AppError::join)??;
    Ok(Json(worker))
}
