use axum::extract::{Path, Query, State};
use axum::Json;
use rota_core::assigner;
use rota_core::item::{Item, ItemFilter, NewItem};

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct ListItemsQuery {
    #[serde(default)]
    pub assigned: Option<bool>,
}

/// GET /api/items?assigned=true|false: items ascending by id.
///
/// The assigned view is newest first.
pub async fn list_items(
    State(app): State<AppState>,
    Query(q): Query<ListItemsQuery>,
) -> Result<Json<Vec<Item>>, AppError> {
    let db = app.db.clone();
    let filter = ItemFilter::from_flag(q.assigned);
    let items = tokio::task::spawn_blocking(move || {
        let mut items = db.list_items(filter)?;
        if filter == ItemFilter::Assigned {
            items.reverse();
        }
        Ok::<_, rota_core::RotaError>(items)
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(items))
}

/// POST /api/items: record a new item and fire the item-created trigger.
pub async fn create_item(
    State(app): State<AppState>,
    Json(body): Json<NewItem>,
) -> Result<Json<serde_json::Value>, AppError> {
    let db = app.db.clone();
    let assign_on_create = app.config.assignment.assign_on_create;
    let result = tokio::task::spawn_blocking(move || {
        if assign_on_create {
            let (item, outcome) = assigner::submit(&db, body)?;
            Ok::<_, rota_core::RotaError>(serde_json::json!({
                "item": item,
                "assignment": outcome,
            }))
        } else {
            let item = db.create_item(body)?;
            Ok(serde_json::json!({ "item": item, "assignment": null }))
        }
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}

/// POST /api/items/:id/assign: run the single-item assigner for one item.
pub async fn assign_item(
    State(app): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let db = app.db.clone();
    let result = tokio::task::spawn_blocking(move || {
        let outcome = assigner::assign_one(db.as_ref(), id)?;
        let item = db.get_item(id)?;
        Ok::<_, rota_core::RotaError>(serde_json::json!({
            "item": item,
            "assignment": outcome,
        }))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}
