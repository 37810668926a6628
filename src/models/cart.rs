//! Cart model: per-user staging area for request drafts

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{enums::RequestType, materiel::Materiel};

/// The caller's cart with its pending drafts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub id: i32,
    pub user_id: i32,
    pub items: Vec<CartItem>,
}

/// A pending request draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: i32,
    pub cart_id: i32,
    pub materiel_id: i32,
    pub request_type: RequestType,
    pub description: Option<String>,
    pub materiel: Materiel,
}

/// Bare cart row
#[derive(Debug, Clone, FromRow)]
pub struct CartRow {
    pub id: i32,
    pub user_id: i32,
}

/// Bare cart item row, as returned on insert
#[derive(Debug, Clone, FromRow)]
pub struct CartItemRow {
    pub id: i32,
    pub cart_id: i32,
    pub materiel_id: i32,
    pub request_type: RequestType,
    pub description: Option<String>,
}

/// One request created by a cart submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubmittedRequest {
    pub request_id: i32,
    pub request_type: RequestType,
    pub reference_interne: Option<String>,
    pub description: Option<String>,
}

/// Result of `POST /cart/submit`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitCartResponse {
    pub message: String,
    pub batch_id: Uuid,
    pub requests_created: usize,
}
