//! Equipment (matériel) model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use utoipa::ToSchema;

use super::{localisation::Localisation, material_type::MaterialType};

/// Equipment record with its category and location resolved
///
/// `material_type` and `localisation` are `None` when the record has no
/// association or when the referenced row was deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Materiel {
    pub id: i32,
    pub owner_id: Option<i32>,
    pub material_type_id: Option<i32>,
    pub material_type: Option<MaterialType>,
    pub reference_interne: Option<String>,
    pub localisation_id: Option<i32>,
    pub localisation: Option<Localisation>,
    pub date_livraison: Option<DateTime<Utc>>,
    pub date_reprise: Option<DateTime<Utc>>,
}

/// Create or update equipment
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateMateriel {
    #[serde(default)]
    pub material_type_id: Option<i32>,
    #[serde(default)]
    pub reference_interne: Option<String>,
    #[serde(default)]
    pub localisation_id: Option<i32>,
    /// Delivery date (`YYYY-MM-DD` or RFC 3339)
    #[serde(default, with = "crate::models::dates::flexible")]
    pub date_livraison: Option<DateTime<Utc>>,
    /// Return date (`YYYY-MM-DD` or RFC 3339)
    #[serde(default, with = "crate::models::dates::flexible")]
    pub date_reprise: Option<DateTime<Utc>>,
    /// Only honoured for administrators
    #[serde(default)]
    pub owner_id: Option<i32>,
}

/// Equipment list filter (`GET /materiels/` query string)
///
/// Absent fields are left out of the query string entirely; empty values
/// coming from a form are read back as absent.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterielFilter {
    /// Matches category name, internal reference, resident name or sector
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_type_id: Option<i32>,
    /// Delivered on or after
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Delivered on or before
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Returned on or after
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date_reprise: Option<NaiveDate>,
    /// Returned on or before
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date_reprise: Option<NaiveDate>,
}

// Every field is optional; referential checks happen server-side.
impl validator::Validate for CreateMateriel {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        Ok(())
    }
}

impl MaterielFilter {
    /// Drop blank free-text input so it is treated as absent
    pub fn normalized(mut self) -> Self {
        self.search_query = self
            .search_query
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == MaterielFilter::default()
    }
}
