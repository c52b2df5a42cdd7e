use crate::middleware::EquipmentId;
use crate::models::equipment::without_identifier;
use crate::models::{Equipment, EquipmentFields, InsertResponse, MessageResponse};
use crate::services::PREVIEW_LIMIT;
use crate::startup::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub email: Option<String>,
}

pub async fn list_equipment(
    State(state): State<AppState>,
) -> Result<Json<Vec<Equipment>>, AppError> {
    let equipment = state
        .store
        .list(None)
        .await
        .map_err(|e| e.into_app_error("Failed to fetch equipment"))?;

    Ok(Json(equipment))
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Equipment>>, AppError> {
    let products = state
        .store
        .list(Some(PREVIEW_LIMIT))
        .await
        .map_err(|e| e.into_app_error("Failed to fetch products"))?;

    Ok(Json(products))
}

pub async fn list_user_equipment(
    State(state): State<AppState>,
    query: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<Vec<Equipment>>, AppError> {
    let Query(query) = query?;

    let equipment = state
        .store
        .list_by_owner(query.email.as_deref())
        .await
        .map_err(|e| e.into_app_error("Failed to fetch user equipment"))?;

    tracing::debug!(count = equipment.len(), "Fetched user equipment");

    Ok(Json(equipment))
}

pub async fn get_equipment(
    State(state): State<AppState>,
    EquipmentId(id): EquipmentId,
) -> Result<Json<Equipment>, AppError> {
    let equipment = state
        .store
        .get(id)
        .await
        .map_err(|e| e.into_app_error("Failed to fetch equipment details"))?;

    Ok(Json(equipment))
}

pub async fn add_equipment(
    State(state): State<AppState>,
    payload: Result<Json<EquipmentFields>, JsonRejection>,
) -> Result<(StatusCode, Json<InsertResponse>), AppError> {
    let Json(fields) = payload?;

    let id = state
        .store
        .insert(without_identifier(fields))
        .await
        .map_err(|e| e.into_app_error("Failed to add equipment"))?;

    tracing::info!(equipment_id = %id, "Equipment added");

    Ok((StatusCode::CREATED, Json(InsertResponse::new(id))))
}

pub async fn update_equipment(
    State(state): State<AppState>,
    EquipmentId(id): EquipmentId,
    payload: Result<Json<EquipmentFields>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(fields) = payload?;

    state
        .store
        .update(id, without_identifier(fields))
        .await
        .map_err(|e| e.into_app_error("Failed to update equipment"))?;

    tracing::info!(equipment_id = %id, "Equipment updated");

    Ok(Json(MessageResponse {
        message: "Equipment updated successfully",
    }))
}

pub async fn delete_equipment(
    State(state): State<AppState>,
    EquipmentId(id): EquipmentId,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .store
        .delete(id)
        .await
        .map_err(|e| e.into_app_error("Failed to delete equipment"))?;

    tracing::info!(equipment_id = %id, "Equipment deleted");

    Ok(Json(MessageResponse {
        message: "Equipment deleted successfully",
    }))
}
