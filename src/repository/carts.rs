//! Carts and cart items

use sqlx::Row;
use uuid::Uuid;

use super::{
    materiels::{materiel_from_row, MATERIEL_COLUMNS, MATERIEL_JOINS},
    Repository,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        cart::{Cart, CartItem, CartItemRow, CartRow, SubmittedRequest},
        enums::RequestType,
        request::RequestDraft,
    },
};

impl Repository {
    /// Get the cart of `user_id`, creating it on first use
    pub async fn carts_get_or_create(&self, user_id: i32) -> AppResult<CartRow> {
        let cart = sqlx::query_as::<_, CartRow>(
            r#"
            INSERT INTO carts (user_id) VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id, user_id
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(cart)
    }

    /// Get the cart of `user_id` with its items
    pub async fn carts_get(&self, user_id: i32) -> AppResult<Cart> {
        let cart = self.carts_get_or_create(user_id).await?;
        let items = self.carts_items(cart.id).await?;
        Ok(Cart {
            id: cart.id,
            user_id: cart.user_id,
            items,
        })
    }

    /// Items of a cart, oldest first, with their equipment
    pub async fn carts_items(&self, cart_id: i32) -> AppResult<Vec<CartItem>> {
        let query = format!(
            r#"
            SELECT ci.id, ci.cart_id, ci.materiel_id, ci.request_type, ci.description, {}
            FROM cart_items ci
            JOIN materiels m ON m.id = ci.materiel_id
            {}
            WHERE ci.cart_id = $1
            ORDER BY ci.id
            "#,
            MATERIEL_COLUMNS, MATERIEL_JOINS
        );

        let rows = sqlx::query(&query).bind(cart_id).fetch_all(&self.pool).await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: i32 = row.try_get("id")?;
            let materiel = materiel_from_row(row)?
                .ok_or_else(|| AppError::Internal(format!("Cart item {} has no equipment", id)))?;
            items.push(CartItem {
                id,
                cart_id: row.try_get("cart_id")?,
                materiel_id: row.try_get("materiel_id")?,
                request_type: row.try_get("request_type")?,
                description: row.try_get("description")?,
                materiel,
            });
        }
        Ok(items)
    }

    /// Append a draft to the cart of `user_id`
    pub async fn carts_add_item(&self, user_id: i32, draft: &RequestDraft) -> AppResult<CartItemRow> {
        let cart = self.carts_get_or_create(user_id).await?;
        let item = sqlx::query_as::<_, CartItemRow>(
            r#"
            INSERT INTO cart_items (cart_id, materiel_id, request_type, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, cart_id, materiel_id, request_type, description
            "#,
        )
        .bind(cart.id)
        .bind(draft.materiel_id)
        .bind(draft.request_type)
        .bind(&draft.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    /// Remove an item from the cart of `user_id`
    ///
    /// Items of other users' carts are reported as not found.
    pub async fn carts_remove_item(&self, user_id: i32, item_id: i32) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM cart_items ci
            USING carts c
            WHERE ci.cart_id = c.id AND c.user_id = $1 AND ci.id = $2
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Cart item {} not found", item_id)));
        }
        Ok(())
    }

    /// Turn every item of the cart of `user_id` into a pending request
    ///
    /// All requests share `batch_id`. Request creation and cart clearing
    /// happen in one transaction: either every item becomes a request and the
    /// cart is empty, or nothing changes.
    pub async fn carts_submit(&self, user_id: i32, batch_id: Uuid) -> AppResult<Vec<SubmittedRequest>> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(
            r#"
            SELECT ci.id, ci.materiel_id, ci.request_type, ci.description, m.reference_interne
            FROM cart_items ci
            JOIN carts c ON c.id = ci.cart_id
            JOIN materiels m ON m.id = ci.materiel_id
            WHERE c.user_id = $1
            ORDER BY ci.id
            FOR UPDATE OF ci
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        if rows.is_empty() {
            return Err(AppError::EmptyCart);
        }

        let mut submitted = Vec::with_capacity(rows.len());
        let mut item_ids = Vec::with_capacity(rows.len());
        for row in &rows {
            let request_type: RequestType = row.try_get("request_type")?;
            let description: Option<String> = row.try_get("description")?;
            let request_id = Self::requests_insert(
                &mut tx,
                batch_id,
                row.try_get("materiel_id")?,
                user_id,
                request_type,
                description.as_deref(),
            )
            .await?;

            item_ids.push(row.try_get::<i32, _>("id")?);
            submitted.push(SubmittedRequest {
                request_id,
                request_type,
                reference_interne: row.try_get("reference_interne")?,
                description,
            });
        }

        sqlx::query("DELETE FROM cart_items WHERE id = ANY($1)")
            .bind(&item_ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(submitted)
    }
}
