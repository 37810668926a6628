//! Service request workflow

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RequestStatus,
        request::{RequestDraft, ServiceRequest},
        user::User,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
}

impl RequestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Requests visible to `user`, newest first
    pub async fn list(&self, user: &User) -> AppResult<Vec<ServiceRequest>> {
        let requester = if user.is_admin { None } else { Some(user.id) };
        self.repository.requests_list(requester).await
    }

    pub async fn get(&self, user: &User, id: i32) -> AppResult<ServiceRequest> {
        let request = self.repository.requests_get_by_id(id).await?;
        if !user.can_access(request.user_id) {
            return Err(AppError::Authorization("Not allowed to access this request".to_string()));
        }
        Ok(request)
    }

    /// File one request for the caller on equipment they may access
    pub async fn create(&self, user: &User, draft: RequestDraft) -> AppResult<ServiceRequest> {
        let materiel = self.repository.materiels_get_by_id(draft.materiel_id).await?;
        if !user.can_access(materiel.owner_id) {
            return Err(AppError::Authorization("Not allowed to access this equipment".to_string()));
        }

        let request = self.repository.requests_create(&draft, user.id).await?;
        tracing::info!(request_id = request.id, user_id = user.id, "request created");
        Ok(request)
    }

    /// File a request on behalf of the equipment owner, bypassing the cart
    pub async fn create_direct(&self, admin: &User, draft: RequestDraft) -> AppResult<ServiceRequest> {
        admin.require_admin()?;

        let materiel = self.repository.materiels_get_by_id(draft.materiel_id).await?;
        let owner_id = materiel
            .owner_id
            .ok_or_else(|| AppError::BadRequest("Equipment has no owner".to_string()))?;

        let request = self.repository.requests_create(&draft, owner_id).await?;
        tracing::info!(
            request_id = request.id,
            owner_id,
            created_by = admin.id,
            "direct request created"
        );
        Ok(request)
    }

    /// Set any status; there is no enforced transition order
    pub async fn update_status(&self, admin: &User, id: i32, status: RequestStatus) -> AppResult<ServiceRequest> {
        admin.require_admin()?;
        let request = self.repository.requests_update_status(id, status).await?;
        tracing::info!(request_id = id, status = %status, "request status changed");
        Ok(request)
    }

    pub async fn delete(&self, admin: &User, id: i32) -> AppResult<()> {
        admin.require_admin()?;
        self.repository.requests_delete(id).await?;
        tracing::info!(request_id = id, "request deleted");
        Ok(())
    }
}
