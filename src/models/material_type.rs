//! Equipment category model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Equipment category (wheelchair, medical bed, lift...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaterialType {
    pub id: i32,
    pub name: String,
}

/// Create or rename a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMaterialType {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}
