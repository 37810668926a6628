//! Location endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::localisation::{CreateLocalisation, Localisation, LocalisationQuery},
};

use super::AuthenticatedUser;

/// List locations visible to the caller
#[utoipa::path(
    get,
    path = "/localisations/",
    tag = "localisations",
    security(("bearer_auth" = [])),
    params(
        ("search_query" = Option<String>, Query, description = "Facility, sector, room or resident")
    ),
    responses(
        (status = 200, description = "List of locations", body = Vec<Localisation>)
    )
)]
pub async fn list_localisations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<LocalisationQuery>,
) -> AppResult<Json<Vec<Localisation>>> {
    let localisations = state
        .services
        .localisations
        .list(&user, query.search_query.as_deref())
        .await?;
    Ok(Json(localisations))
}

/// Create a location
#[utoipa::path(
    post,
    path = "/localisations/",
    tag = "localisations",
    security(("bearer_auth" = [])),
    request_body = CreateLocalisation,
    responses(
        (status = 201, description = "Location created", body = Localisation),
        (status = 404, description = "Owner not found")
    )
)]
pub async fn create_localisation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(data): Json<CreateLocalisation>,
) -> AppResult<(StatusCode, Json<Localisation>)> {
    let created = state.services.localisations.create(&user, data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a location
#[utoipa::path(
    put,
    path = "/localisations/{id}",
    tag = "localisations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    request_body = CreateLocalisation,
    responses(
        (status = 200, description = "Location updated", body = Localisation),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Location not found")
    )
)]
pub async fn update_localisation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<CreateLocalisation>,
) -> AppResult<Json<Localisation>> {
    let updated = state.services.localisations.update(&user, id, data).await?;
    Ok(Json(updated))
}

/// Delete a location
#[utoipa::path(
    delete,
    path = "/localisations/{id}",
    tag = "localisations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 204, description = "Location deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Location not found")
    )
)]
pub async fn delete_localisation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.localisations.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
