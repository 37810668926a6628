//! Location model: where a piece of equipment is placed

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A facility / sector / room / resident tuple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Localisation {
    pub id: i32,
    /// Facility name
    pub nom_etablissement: String,
    pub secteur: String,
    /// Room number
    pub numero_chambre: String,
    /// Resident full name
    pub nom_complet_resident: String,
    pub owner_id: Option<i32>,
}

/// Create or update a location
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateLocalisation {
    #[validate(length(min = 1, message = "Facility name is required"))]
    pub nom_etablissement: String,
    #[validate(length(min = 1, message = "Sector is required"))]
    pub secteur: String,
    #[validate(length(min = 1, message = "Room number is required"))]
    pub numero_chambre: String,
    #[validate(length(min = 1, message = "Resident name is required"))]
    pub nom_complet_resident: String,
    /// Only honoured for administrators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i32>,
}

/// `GET /localisations/` query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalisationQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
}

impl Localisation {
    /// "Facility, Sector, Ch. 12 - Resident"
    pub fn label(&self) -> String {
        format!(
            "{}, {}, Ch. {} - {}",
            self.nom_etablissement, self.secteur, self.numero_chambre, self.nom_complet_resident
        )
    }
}
