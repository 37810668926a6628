//! Service request model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    enums::{RequestStatus, RequestType},
    materiel::Materiel,
    user::User,
};

/// A tracked service action against a piece of equipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ServiceRequest {
    pub id: i32,
    /// Shared by all requests created by one cart submission
    pub batch_id: Uuid,
    pub materiel_id: Option<i32>,
    /// Requester; `None` once the account is deleted
    pub user_id: Option<i32>,
    pub request_type: RequestType,
    pub status: RequestStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub materiel: Option<Materiel>,
    pub user: Option<User>,
}

/// Draft of a request: a cart item, a direct request or a single request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RequestDraft {
    pub materiel_id: i32,
    pub request_type: RequestType,
    #[serde(default)]
    pub description: Option<String>,
}

/// Status change request (admin only)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateRequestStatus {
    pub status: RequestStatus,
}
