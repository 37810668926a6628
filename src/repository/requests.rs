//! Service requests

use sqlx::{postgres::PgRow, Postgres, Row, Transaction};
use uuid::Uuid;

use super::{
    materiels::{materiel_from_row, MATERIEL_COLUMNS, MATERIEL_JOINS},
    Repository,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{RequestStatus, RequestType},
        request::{RequestDraft, ServiceRequest},
        user::User,
    },
};

fn request_select() -> String {
    format!(
        r#"
        SELECT r.id, r.batch_id, r.materiel_id, r.user_id, r.request_type, r.status,
               r.description, r.created_at, r.updated_at,
               u.id AS u_id, u.username AS u_username, u.is_admin AS u_is_admin,
               {}
        FROM requests r
        LEFT JOIN users u ON u.id = r.user_id
        LEFT JOIN materiels m ON m.id = r.materiel_id
        {}
        "#,
        MATERIEL_COLUMNS, MATERIEL_JOINS
    )
}

fn request_from_row(row: &PgRow) -> Result<ServiceRequest, sqlx::Error> {
    let user = match row.try_get::<Option<i32>, _>("u_id")? {
        Some(id) => Some(User {
            id,
            username: row.try_get::<Option<String>, _>("u_username")?.unwrap_or_default(),
            is_admin: row.try_get::<Option<bool>, _>("u_is_admin")?.unwrap_or(false),
        }),
        None => None,
    };

    Ok(ServiceRequest {
        id: row.try_get("id")?,
        batch_id: row.try_get("batch_id")?,
        materiel_id: row.try_get("materiel_id")?,
        user_id: row.try_get("user_id")?,
        request_type: row.try_get("request_type")?,
        status: row.try_get("status")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        materiel: materiel_from_row(row)?,
        user,
    })
}

impl Repository {
    /// List requests, newest first, restricted to `user_id` when given
    pub async fn requests_list(&self, user_id: Option<i32>) -> AppResult<Vec<ServiceRequest>> {
        let where_clause = if user_id.is_some() { "WHERE r.user_id = $1" } else { "" };
        let query = format!("{} {} ORDER BY r.created_at DESC, r.id DESC", request_select(), where_clause);

        let mut builder = sqlx::query(&query);
        if let Some(user) = user_id {
            builder = builder.bind(user);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        let requests = rows.iter().map(request_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(requests)
    }

    /// Get request by ID
    pub async fn requests_get_by_id(&self, id: i32) -> AppResult<ServiceRequest> {
        let query = format!("{} WHERE r.id = $1", request_select());
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))?;
        Ok(request_from_row(&row)?)
    }

    /// Create a single request in its own batch
    pub async fn requests_create(&self, draft: &RequestDraft, user_id: i32) -> AppResult<ServiceRequest> {
        let mut tx = self.pool.begin().await?;
        let id = Self::requests_insert(
            &mut tx,
            Uuid::new_v4(),
            draft.materiel_id,
            user_id,
            draft.request_type,
            draft.description.as_deref(),
        )
        .await?;
        tx.commit().await?;

        self.requests_get_by_id(id).await
    }

    /// Insert a pending request inside an open transaction
    pub(crate) async fn requests_insert(
        tx: &mut Transaction<'_, Postgres>,
        batch_id: Uuid,
        materiel_id: i32,
        user_id: i32,
        request_type: RequestType,
        description: Option<&str>,
    ) -> AppResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO requests (batch_id, materiel_id, user_id, request_type, status, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(batch_id)
        .bind(materiel_id)
        .bind(user_id)
        .bind(request_type)
        .bind(RequestStatus::default())
        .bind(description)
        .fetch_one(&mut **tx)
        .await?;
        Ok(id)
    }

    /// Change the status of a request
    pub async fn requests_update_status(&self, id: i32, status: RequestStatus) -> AppResult<ServiceRequest> {
        let updated: Option<i32> = sqlx::query_scalar(
            "UPDATE requests SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.requests_get_by_id(id).await,
            None => Err(AppError::NotFound(format!("Request {} not found", id))),
        }
    }

    /// Delete a request
    pub async fn requests_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Request {} not found", id)));
        }
        Ok(())
    }
}
