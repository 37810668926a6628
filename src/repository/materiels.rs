//! Equipment

use chrono::{DateTime, Days, NaiveDate, Utc};
use sqlx::{postgres::PgRow, Row};

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        localisation::Localisation,
        material_type::MaterialType,
        materiel::{CreateMateriel, Materiel, MaterielFilter},
    },
};

/// Equipment columns with category and location, aliased for [`materiel_from_row`]
pub(crate) const MATERIEL_COLUMNS: &str = r#"
    m.id AS m_id, m.owner_id AS m_owner_id, m.material_type_id AS m_material_type_id,
    m.reference_interne AS m_reference_interne, m.localisation_id AS m_localisation_id,
    m.date_livraison AS m_date_livraison, m.date_reprise AS m_date_reprise,
    mt.name AS mt_name,
    l.nom_etablissement AS l_nom_etablissement, l.secteur AS l_secteur,
    l.numero_chambre AS l_numero_chambre, l.nom_complet_resident AS l_nom_complet_resident,
    l.owner_id AS l_owner_id
"#;

/// Joins resolving category and location of `m`
pub(crate) const MATERIEL_JOINS: &str = r#"
    LEFT JOIN material_types mt ON mt.id = m.material_type_id
    LEFT JOIN localisations l ON l.id = m.localisation_id
"#;

/// Build a [`Materiel`] from a row selected with [`MATERIEL_COLUMNS`]
///
/// Returns `None` when the equipment side of an outer join is empty.
pub(crate) fn materiel_from_row(row: &PgRow) -> Result<Option<Materiel>, sqlx::Error> {
    let Some(id) = row.try_get::<Option<i32>, _>("m_id")? else {
        return Ok(None);
    };

    let material_type_id: Option<i32> = row.try_get("m_material_type_id")?;
    let material_type = match (material_type_id, row.try_get::<Option<String>, _>("mt_name")?) {
        (Some(type_id), Some(name)) => Some(MaterialType { id: type_id, name }),
        _ => None,
    };

    let localisation_id: Option<i32> = row.try_get("m_localisation_id")?;
    let localisation = match (localisation_id, row.try_get::<Option<String>, _>("l_nom_etablissement")?) {
        (Some(loc_id), Some(nom_etablissement)) => Some(Localisation {
            id: loc_id,
            nom_etablissement,
            secteur: row.try_get::<Option<String>, _>("l_secteur")?.unwrap_or_default(),
            numero_chambre: row.try_get::<Option<String>, _>("l_numero_chambre")?.unwrap_or_default(),
            nom_complet_resident: row
                .try_get::<Option<String>, _>("l_nom_complet_resident")?
                .unwrap_or_default(),
            owner_id: row.try_get("l_owner_id")?,
        }),
        _ => None,
    };

    Ok(Some(Materiel {
        id,
        owner_id: row.try_get("m_owner_id")?,
        material_type_id,
        material_type,
        reference_interne: row.try_get("m_reference_interne")?,
        localisation_id,
        localisation,
        date_livraison: row.try_get("m_date_livraison")?,
        date_reprise: row.try_get("m_date_reprise")?,
    }))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// First instant after `date`, so that `< end_of_day(date)` includes the whole day
fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date.checked_add_days(Days::new(1)).unwrap_or(date))
}

/// WHERE conditions for `materiels_list`, numbered in bind order
fn filter_conditions(owner_id: Option<i32>, filter: &MaterielFilter) -> Vec<String> {
    let mut conditions: Vec<String> = Vec::new();

    macro_rules! add_condition {
        ($field:expr, $sql:literal) => {
            if $field.is_some() {
                conditions.push(format!($sql, conditions.len() + 1));
            }
        };
    }

    add_condition!(owner_id, "m.owner_id = ${}");
    add_condition!(
        filter.search_query,
        "(mt.name ILIKE ${0} OR m.reference_interne ILIKE ${0} OR l.nom_complet_resident ILIKE ${0} OR l.secteur ILIKE ${0})"
    );
    add_condition!(filter.material_type_id, "m.material_type_id = ${}");
    add_condition!(filter.start_date, "m.date_livraison >= ${}");
    add_condition!(filter.end_date, "m.date_livraison < ${}");
    add_condition!(filter.start_date_reprise, "m.date_reprise >= ${}");
    add_condition!(filter.end_date_reprise, "m.date_reprise < ${}");
    conditions
}

impl Repository {
    /// List equipment matching `filter`, restricted to `owner_id` when given
    pub async fn materiels_list(&self, owner_id: Option<i32>, filter: &MaterielFilter) -> AppResult<Vec<Materiel>> {
        let conditions = filter_conditions(owner_id, filter);

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {} FROM materiels m {} {} ORDER BY m.id",
            MATERIEL_COLUMNS, MATERIEL_JOINS, where_clause
        );

        let mut builder = sqlx::query(&query);
        if let Some(owner) = owner_id {
            builder = builder.bind(owner);
        }
        if let Some(ref search) = filter.search_query {
            builder = builder.bind(format!("%{}%", search));
        }
        if let Some(type_id) = filter.material_type_id {
            builder = builder.bind(type_id);
        }
        if let Some(d) = filter.start_date {
            builder = builder.bind(start_of_day(d));
        }
        if let Some(d) = filter.end_date {
            builder = builder.bind(end_of_day(d));
        }
        if let Some(d) = filter.start_date_reprise {
            builder = builder.bind(start_of_day(d));
        }
        if let Some(d) = filter.end_date_reprise {
            builder = builder.bind(end_of_day(d));
        }

        let rows = builder.fetch_all(&self.pool).await?;
        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(materiel) = materiel_from_row(row)? {
                result.push(materiel);
            }
        }
        Ok(result)
    }

    /// Get equipment by ID
    pub async fn materiels_get_by_id(&self, id: i32) -> AppResult<Materiel> {
        let query = format!(
            "SELECT {} FROM materiels m {} WHERE m.id = $1",
            MATERIEL_COLUMNS, MATERIEL_JOINS
        );
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;

        match row {
            Some(row) => materiel_from_row(&row)?,
            None => None,
        }
        .ok_or_else(|| AppError::NotFound(format!("Materiel {} not found", id)))
    }

    /// Create equipment owned by `owner_id`
    pub async fn materiels_create(&self, data: &CreateMateriel, owner_id: Option<i32>) -> AppResult<Materiel> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO materiels (material_type_id, reference_interne, localisation_id, owner_id, date_livraison, date_reprise)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(data.material_type_id)
        .bind(&data.reference_interne)
        .bind(data.localisation_id)
        .bind(owner_id)
        .bind(data.date_livraison)
        .bind(data.date_reprise)
        .fetch_one(&self.pool)
        .await?;

        self.materiels_get_by_id(id).await
    }

    /// Replace all fields of an equipment record
    pub async fn materiels_update(&self, id: i32, data: &CreateMateriel, owner_id: Option<i32>) -> AppResult<Materiel> {
        let updated: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE materiels
            SET material_type_id = $2, reference_interne = $3, localisation_id = $4,
                owner_id = $5, date_livraison = $6, date_reprise = $7
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(data.material_type_id)
        .bind(&data.reference_interne)
        .bind(data.localisation_id)
        .bind(owner_id)
        .bind(data.date_livraison)
        .bind(data.date_reprise)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.materiels_get_by_id(id).await,
            None => Err(AppError::NotFound(format!("Materiel {} not found", id))),
        }
    }

    /// Delete equipment
    ///
    /// Cart items referencing it are removed; requests keep a NULL equipment.
    pub async fn materiels_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM materiels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Materiel {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_day_bounds() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(start_of_day(date).to_rfc3339(), "2024-02-29T00:00:00+00:00");
        let end = end_of_day(date);
        assert_eq!(end.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(end.hour(), 0);
    }

    #[test]
    fn test_filter_conditions_number_in_bind_order() {
        let filter = MaterielFilter {
            search_query: Some("lit".to_string()),
            end_date: NaiveDate::from_ymd_opt(2024, 5, 2),
            ..Default::default()
        };
        let conditions = filter_conditions(Some(7), &filter);

        assert_eq!(conditions.len(), 3);
        assert_eq!(conditions[0], "m.owner_id = $1");
        assert!(conditions[1].starts_with("(mt.name ILIKE $2 OR"));
        assert!(!conditions[1].contains("$3"));
        assert_eq!(conditions[2], "m.date_livraison < $3");
    }

    #[test]
    fn test_filter_conditions_empty() {
        assert!(filter_conditions(None, &MaterielFilter::default()).is_empty());
    }
}
