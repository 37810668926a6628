//! Cart service: staging, submission and batch notification

use std::sync::Arc;

use uuid::Uuid;

use super::email::{notify_batch, Notifier};
use crate::{
    error::{AppError, AppResult},
    models::{
        cart::{Cart, CartItem, SubmitCartResponse},
        request::RequestDraft,
        user::User,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CartService {
    repository: Repository,
    notifier: Arc<dyn Notifier>,
}

impl CartService {
    pub fn new(repository: Repository, notifier: Arc<dyn Notifier>) -> Self {
        Self { repository, notifier }
    }

    /// The caller's cart, created on first use
    pub async fn get(&self, user: &User) -> AppResult<Cart> {
        self.repository.carts_get(user.id).await
    }

    /// Stage a draft; non-admins may only stage equipment they own
    pub async fn add_item(&self, user: &User, draft: RequestDraft) -> AppResult<CartItem> {
        let materiel = self.repository.materiels_get_by_id(draft.materiel_id).await?;
        if !user.can_access(materiel.owner_id) {
            return Err(AppError::Authorization("Not allowed to request this equipment".to_string()));
        }

        let row = self.repository.carts_add_item(user.id, &draft).await?;
        tracing::debug!(cart_id = row.cart_id, item_id = row.id, "cart item added");

        Ok(CartItem {
            id: row.id,
            cart_id: row.cart_id,
            materiel_id: row.materiel_id,
            request_type: row.request_type,
            description: row.description,
            materiel,
        })
    }

    pub async fn remove_item(&self, user: &User, item_id: i32) -> AppResult<()> {
        self.repository.carts_remove_item(user.id, item_id).await
    }

    /// Convert every staged draft into a pending request sharing one batch id
    pub async fn submit(&self, user: &User) -> AppResult<SubmitCartResponse> {
        let batch_id = Uuid::new_v4();
        let submitted = self.repository.carts_submit(user.id, batch_id).await?;
        tracing::info!(
            user_id = user.id,
            %batch_id,
            requests = submitted.len(),
            "cart submitted"
        );

        notify_batch(self.notifier.as_ref(), &user.username, batch_id, &submitted).await;

        Ok(SubmitCartResponse {
            message: "Demandes soumises avec succès !".to_string(),
            batch_id,
            requests_created: submitted.len(),
        })
    }
}
