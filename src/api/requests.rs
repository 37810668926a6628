//! Service request endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::request::{RequestDraft, ServiceRequest, UpdateRequestStatus},
};

use super::{AdminUser, AuthenticatedUser};

/// List requests visible to the caller, newest first
#[utoipa::path(
    get,
    path = "/requests/",
    tag = "requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of requests", body = Vec<ServiceRequest>)
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> AppResult<Json<Vec<ServiceRequest>>> {
    let requests = state.services.requests.list(&user).await?;
    Ok(Json(requests))
}

/// Get one request
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request", body = ServiceRequest),
        (status = 403, description = "Not the requester"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ServiceRequest>> {
    let request = state.services.requests.get(&user, id).await?;
    Ok(Json(request))
}

/// File a single request for the caller
#[utoipa::path(
    post,
    path = "/requests/",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = RequestDraft,
    responses(
        (status = 201, description = "Request created", body = ServiceRequest),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(draft): Json<RequestDraft>,
) -> AppResult<(StatusCode, Json<ServiceRequest>)> {
    let request = state.services.requests.create(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Create a request on behalf of the equipment owner, bypassing the cart
#[utoipa::path(
    post,
    path = "/requests/direct",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = RequestDraft,
    responses(
        (status = 201, description = "Request created", body = ServiceRequest),
        (status = 400, description = "Equipment has no owner"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn create_direct_request(
    State(state): State<crate::AppState>,
    AdminUser(admin): AdminUser,
    Json(draft): Json<RequestDraft>,
) -> AppResult<(StatusCode, Json<ServiceRequest>)> {
    let request = state.services.requests.create_direct(&admin, draft).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Change the status of a request
#[utoipa::path(
    put,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = UpdateRequestStatus,
    responses(
        (status = 200, description = "Request updated", body = ServiceRequest),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn update_request_status(
    State(state): State<crate::AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
    Json(update): Json<UpdateRequestStatus>,
) -> AppResult<Json<ServiceRequest>> {
    let request = state
        .services
        .requests
        .update_status(&admin, id, update.status)
        .await?;
    Ok(Json(request))
}

/// Delete a request
#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 204, description = "Request deleted"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn delete_request(
    State(state): State<crate::AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.requests.delete(&admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
