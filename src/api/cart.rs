//! Cart endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        cart::{Cart, CartItem, SubmitCartResponse},
        request::RequestDraft,
    },
};

use super::AuthenticatedUser;

/// The caller's cart, created on first access
#[utoipa::path(
    get,
    path = "/cart/",
    tag = "cart",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cart with its items", body = Cart)
    )
)]
pub async fn get_cart(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> AppResult<Json<Cart>> {
    let cart = state.services.cart.get(&user).await?;
    Ok(Json(cart))
}

/// Add a request draft to the cart
#[utoipa::path(
    post,
    path = "/cart/items",
    tag = "cart",
    security(("bearer_auth" = [])),
    request_body = RequestDraft,
    responses(
        (status = 201, description = "Item added", body = CartItem),
        (status = 403, description = "Equipment not owned by caller"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn add_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(draft): Json<RequestDraft>,
) -> AppResult<(StatusCode, Json<CartItem>)> {
    let item = state.services.cart.add_item(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Remove an item from the cart
#[utoipa::path(
    delete,
    path = "/cart/items/{id}",
    tag = "cart",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Cart item ID")),
    responses(
        (status = 204, description = "Item removed"),
        (status = 404, description = "Item not in caller's cart")
    )
)]
pub async fn remove_item(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.cart.remove_item(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Turn every cart item into a pending request
#[utoipa::path(
    post,
    path = "/cart/submit",
    tag = "cart",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Requests created", body = SubmitCartResponse),
        (status = 400, description = "Cart is empty")
    )
)]
pub async fn submit_cart(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> AppResult<Json<SubmitCartResponse>> {
    let response = state.services.cart.submit(&user).await?;
    Ok(Json(response))
}
