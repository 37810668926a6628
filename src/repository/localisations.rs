//! Locations

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::localisation::{CreateLocalisation, Localisation},
};

impl Repository {
    /// List locations, restricted to `owner_id` when given
    pub async fn localisations_list(&self, owner_id: Option<i32>, search: Option<&str>) -> AppResult<Vec<Localisation>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if owner_id.is_some() {
            conditions.push(format!("owner_id = ${}", idx));
            idx += 1;
        }
        if search.is_some() {
            conditions.push(format!(
                "(nom_etablissement ILIKE ${idx} OR secteur ILIKE ${idx} OR numero_chambre ILIKE ${idx} OR nom_complet_resident ILIKE ${idx})"
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!("SELECT * FROM localisations {} ORDER BY id", where_clause);
        let mut builder = sqlx::query_as::<_, Localisation>(&query);
        if let Some(owner) = owner_id {
            builder = builder.bind(owner);
        }
        if let Some(s) = search {
            builder = builder.bind(format!("%{}%", s));
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Get location by ID
    pub async fn localisations_get_by_id(&self, id: i32) -> AppResult<Localisation> {
        sqlx::query_as::<_, Localisation>("SELECT * FROM localisations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Localisation {} not found", id)))
    }

    /// Create a location owned by `owner_id`
    pub async fn localisations_create(&self, data: &CreateLocalisation, owner_id: i32) -> AppResult<Localisation> {
        let row = sqlx::query_as::<_, Localisation>(
            r#"
            INSERT INTO localisations (nom_etablissement, secteur, numero_chambre, nom_complet_resident, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.nom_etablissement)
        .bind(&data.secteur)
        .bind(&data.numero_chambre)
        .bind(&data.nom_complet_resident)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Replace the descriptive fields and owner of a location
    pub async fn localisations_update(&self, id: i32, data: &CreateLocalisation, owner_id: Option<i32>) -> AppResult<Localisation> {
        sqlx::query_as::<_, Localisation>(
            r#"
            UPDATE localisations
            SET nom_etablissement = $2, secteur = $3, numero_chambre = $4,
                nom_complet_resident = $5, owner_id = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.nom_etablissement)
        .bind(&data.secteur)
        .bind(&data.numero_chambre)
        .bind(&data.nom_complet_resident)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Localisation {} not found", id)))
    }

    /// Delete a location; its equipment keeps a NULL location
    pub async fn localisations_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM localisations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Localisation {} not found", id)));
        }
        Ok(())
    }
}
