//! API handlers for LocEHPAD REST endpoints

pub mod auth;
pub mod cart;
pub mod health;
pub mod localisations;
pub mod material_types;
pub mod materiels;
pub mod openapi;
pub mod requests;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    error::AppError,
    models::user::{User, UserClaims},
    AppState,
};

/// Verify the bearer token of a request
fn bearer_claims(parts: &Parts, state: &AppState) -> Result<UserClaims, AppError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Not authenticated".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

    state.services.users.decode_token(token)
}

async fn load_user(state: &AppState, claims: &UserClaims) -> Result<User, AppError> {
    state
        .services
        .users
        .find_user(claims.user_id)
        .await?
        .ok_or_else(|| AppError::Authentication("Could not validate credentials".to_string()))
}

/// Extractor for the account behind a valid bearer token
pub struct AuthenticatedUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state)?;
        let user = load_user(state, &claims).await?;
        Ok(AuthenticatedUser(user))
    }
}

/// Extractor for an administrator account
///
/// Non-admin tokens are refused before the account is loaded.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state)?;
        claims.require_admin()?;
        let user = load_user(state, &claims).await?;
        user.require_admin()?;
        Ok(AdminUser(user))
    }
}

/// Build the application router with all routes and API documentation
pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        // Health
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        // Authentication
        .route("/token", post(auth::login))
        // Users
        .route("/users/", get(users::list_users).post(users::create_user))
        .route("/users/me/", get(users::me))
        .route("/users/:id", delete(users::delete_user))
        // Equipment categories
        .route(
            "/material_types/",
            get(material_types::list_material_types).post(material_types::create_material_type),
        )
        .route(
            "/material_types/:id",
            put(material_types::update_material_type).delete(material_types::delete_material_type),
        )
        // Locations
        .route(
            "/localisations/",
            get(localisations::list_localisations).post(localisations::create_localisation),
        )
        .route(
            "/localisations/:id",
            put(localisations::update_localisation).delete(localisations::delete_localisation),
        )
        // Equipment
        .route("/materiels/", get(materiels::list_materiels).post(materiels::create_materiel))
        .route(
            "/materiels/:id",
            put(materiels::update_materiel).delete(materiels::delete_materiel),
        )
        // Cart
        .route("/cart/", get(cart::get_cart).post(cart::get_cart))
        .route("/cart/items", post(cart::add_item))
        .route("/cart/items/:id", delete(cart::remove_item))
        .route("/cart/submit", post(cart::submit_cart))
        // Requests
        .route("/requests/", get(requests::list_requests).post(requests::create_request))
        .route("/requests/direct", post(requests::create_direct_request))
        .route(
            "/requests/:id",
            get(requests::get_request)
                .put(requests::update_request_status)
                .delete(requests::delete_request),
        )
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
}
