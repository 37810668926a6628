//! Equipment categories

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::material_type::MaterialType,
};

impl Repository {
    /// List all categories
    pub async fn material_types_list(&self) -> AppResult<Vec<MaterialType>> {
        let rows = sqlx::query_as::<_, MaterialType>("SELECT * FROM material_types ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get category by ID
    pub async fn material_types_get_by_id(&self, id: i32) -> AppResult<MaterialType> {
        sqlx::query_as::<_, MaterialType>("SELECT * FROM material_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Material type {} not found", id)))
    }

    /// Check if a category name is taken by another category
    pub async fn material_types_name_exists(&self, name: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM material_types WHERE LOWER(name) = LOWER($1) AND ($2::int IS NULL OR id != $2))",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a category
    pub async fn material_types_create(&self, name: &str) -> AppResult<MaterialType> {
        let row = sqlx::query_as::<_, MaterialType>("INSERT INTO material_types (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Rename a category
    pub async fn material_types_update(&self, id: i32, name: &str) -> AppResult<MaterialType> {
        sqlx::query_as::<_, MaterialType>("UPDATE material_types SET name = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Material type {} not found", id)))
    }

    /// Delete a category; its equipment keeps a NULL category
    pub async fn material_types_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM material_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Material type {} not found", id)));
        }
        Ok(())
    }
}
