//! Authentication endpoint

use axum::{extract::State, Form, Json};

use crate::{
    error::AppResult,
    models::user::{LoginForm, TokenResponse},
};

/// Exchange a username and password for a bearer token
#[utoipa::path(
    post,
    path = "/token",
    tag = "auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Incorrect username or password", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .services
        .users
        .authenticate(&form.username, &form.password)
        .await?;
    Ok(Json(token))
}
