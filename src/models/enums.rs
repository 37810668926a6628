//! Request type and status enums
//!
//! Both are stored as TEXT and travel on the wire as the fixed French labels
//! used by the facilities ("LIVRAISON", "EN ATTENTE", ...).

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Maps a string-backed enum to a Postgres TEXT column
macro_rules! text_column {
    ($ty:ty) => {
        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as Decode<Postgres>>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// RequestType
// ---------------------------------------------------------------------------

/// Kind of service action requested on a piece of equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum RequestType {
    /// Delivery
    #[serde(rename = "LIVRAISON")]
    Livraison,
    /// Pickup
    #[serde(rename = "REPRISE")]
    Reprise,
    /// Repair
    #[serde(rename = "DEPANNAGE")]
    Depannage,
}

impl RequestType {
    pub const ALL: [RequestType; 3] = [RequestType::Livraison, RequestType::Reprise, RequestType::Depannage];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Livraison => "LIVRAISON",
            RequestType::Reprise => "REPRISE",
            RequestType::Depannage => "DEPANNAGE",
        }
    }
}

impl std::str::FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LIVRAISON" | "DELIVERY" => Ok(RequestType::Livraison),
            "REPRISE" | "PICKUP" => Ok(RequestType::Reprise),
            "DEPANNAGE" | "REPAIR" => Ok(RequestType::Depannage),
            _ => Err(format!("Invalid request type: {}", s)),
        }
    }
}

text_column!(RequestType);

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

/// Processing status of a service request
///
/// Any status may be set from any other; the order below is the usual
/// progression only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum RequestStatus {
    /// Pending
    #[default]
    #[serde(rename = "EN ATTENTE")]
    EnAttente,
    /// Acknowledged
    #[serde(rename = "PRISE EN COMPTE")]
    PriseEnCompte,
    /// In progress
    #[serde(rename = "EN COURS DE REALISATION")]
    EnCoursDeRealisation,
    /// Done
    #[serde(rename = "TERMINEE")]
    Terminee,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::EnAttente,
        RequestStatus::PriseEnCompte,
        RequestStatus::EnCoursDeRealisation,
        RequestStatus::Terminee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::EnAttente => "EN ATTENTE",
            RequestStatus::PriseEnCompte => "PRISE EN COMPTE",
            RequestStatus::EnCoursDeRealisation => "EN COURS DE REALISATION",
            RequestStatus::Terminee => "TERMINEE",
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "EN ATTENTE" | "PENDING" => Ok(RequestStatus::EnAttente),
            "PRISE EN COMPTE" | "ACKNOWLEDGED" => Ok(RequestStatus::PriseEnCompte),
            "EN COURS DE REALISATION" | "IN PROGRESS" => Ok(RequestStatus::EnCoursDeRealisation),
            "TERMINEE" | "DONE" => Ok(RequestStatus::Terminee),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

text_column!(RequestStatus);
