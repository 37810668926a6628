//! Equipment category endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::material_type::{CreateMaterialType, MaterialType},
};

use super::{AdminUser, AuthenticatedUser};

/// List categories
#[utoipa::path(
    get,
    path = "/material_types/",
    tag = "material_types",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of categories", body = Vec<MaterialType>)
    )
)]
pub async fn list_material_types(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> AppResult<Json<Vec<MaterialType>>> {
    let types = state.services.material_types.list().await?;
    Ok(Json(types))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/material_types/",
    tag = "material_types",
    security(("bearer_auth" = [])),
    request_body = CreateMaterialType,
    responses(
        (status = 201, description = "Category created", body = MaterialType),
        (status = 409, description = "Name already used")
    )
)]
pub async fn create_material_type(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    Json(data): Json<CreateMaterialType>,
) -> AppResult<(StatusCode, Json<MaterialType>)> {
    let created = state.services.material_types.create(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Rename a category
#[utoipa::path(
    put,
    path = "/material_types/{id}",
    tag = "material_types",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    request_body = CreateMaterialType,
    responses(
        (status = 200, description = "Category updated", body = MaterialType),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Name already used")
    )
)]
pub async fn update_material_type(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
    Json(data): Json<CreateMaterialType>,
) -> AppResult<Json<MaterialType>> {
    let updated = state.services.material_types.update(id, data).await?;
    Ok(Json(updated))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/material_types/{id}",
    tag = "material_types",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn delete_material_type(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.material_types.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
