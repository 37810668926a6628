//! Equipment endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::materiel::{CreateMateriel, Materiel, MaterielFilter},
};

use super::AuthenticatedUser;

/// List equipment visible to the caller
#[utoipa::path(
    get,
    path = "/materiels/",
    tag = "materiels",
    security(("bearer_auth" = [])),
    params(
        ("search_query" = Option<String>, Query, description = "Category, reference, resident or sector"),
        ("material_type_id" = Option<i32>, Query, description = "Category ID"),
        ("start_date" = Option<String>, Query, description = "Delivered on or after (YYYY-MM-DD)"),
        ("end_date" = Option<String>, Query, description = "Delivered on or before (YYYY-MM-DD)"),
        ("start_date_reprise" = Option<String>, Query, description = "Returned on or after (YYYY-MM-DD)"),
        ("end_date_reprise" = Option<String>, Query, description = "Returned on or before (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "List of equipment", body = Vec<Materiel>)
    )
)]
pub async fn list_materiels(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<MaterielFilter>,
) -> AppResult<Json<Vec<Materiel>>> {
    let materiels = state.services.materiels.list(&user, filter).await?;
    Ok(Json(materiels))
}

/// Create equipment
#[utoipa::path(
    post,
    path = "/materiels/",
    tag = "materiels",
    security(("bearer_auth" = [])),
    request_body = CreateMateriel,
    responses(
        (status = 201, description = "Equipment created", body = Materiel)
    )
)]
pub async fn create_materiel(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(data): Json<CreateMateriel>,
) -> AppResult<(StatusCode, Json<Materiel>)> {
    let created = state.services.materiels.create(&user, data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update equipment
#[utoipa::path(
    put,
    path = "/materiels/{id}",
    tag = "materiels",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    request_body = CreateMateriel,
    responses(
        (status = 200, description = "Equipment updated", body = Materiel),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn update_materiel(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<CreateMateriel>,
) -> AppResult<Json<Materiel>> {
    let updated = state.services.materiels.update(&user, id, data).await?;
    Ok(Json(updated))
}

/// Delete equipment
#[utoipa::path(
    delete,
    path = "/materiels/{id}",
    tag = "materiels",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 204, description = "Equipment deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn delete_materiel(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.materiels.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
