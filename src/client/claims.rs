//! Bearer token claims as seen by the client
//!
//! The payload is read without checking the signature. It only decides what
//! the front-end offers; the server checks every call again.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

use super::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// Username
    pub sub: String,
    #[serde(default)]
    pub user_id: Option<i32>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decode the payload segment of a JWT
pub fn decode_claims(token: &str) -> ClientResult<TokenClaims> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(ClientError::TokenDecode("expected three segments".to_string())),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ClientError::TokenDecode(format!("payload is not base64url: {}", e)))?;

    serde_json::from_slice(&bytes).map_err(|e| ClientError::TokenDecode(format!("payload is not valid claims: {}", e)))
}

/// Actions the front-end offers to the current user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub manage_users: bool,
    pub manage_material_types: bool,
    pub choose_owner: bool,
    pub direct_request: bool,
    pub change_request_status: bool,
    pub delete_requests: bool,
}

impl Capabilities {
    pub fn for_admin(is_admin: bool) -> Self {
        Self {
            manage_users: is_admin,
            manage_material_types: is_admin,
            choose_owner: is_admin,
            direct_request: is_admin,
            change_request_status: is_admin,
            delete_requests: is_admin,
        }
    }

    pub fn from_claims(claims: Option<&TokenClaims>) -> Self {
        Self::for_admin(claims.map(|c| c.is_admin).unwrap_or(false))
    }
}

#[cfg(test)]
pub(crate) fn unsigned_token(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.signature", header, body)
}
