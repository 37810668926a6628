//! Typed client for the LocEHPAD REST API
//!
//! [`ApiClient`] carries the shared [`Session`]: every call attaches the
//! bearer token and any 401 expires the session. [`Resource`] gives the CRUD
//! calls of each registry, and [`pages`] holds the screen-level flows that
//! re-fetch after each mutation.

pub mod claims;
pub mod pages;
pub mod resource;
pub mod session;
pub mod store;
pub mod table;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub use claims::{decode_claims, Capabilities, TokenClaims};
pub use resource::Resource;
pub use session::{AuthState, Session};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};

use crate::{
    error::ErrorResponse,
    models::user::TokenResponse,
};

/// Client-side error type
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Session expired, please log in again")]
    Unauthorized,

    #[error("Server returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid token: {0}")]
    TokenDecode(String),

    #[error("Token storage error: {0}")]
    Storage(#[from] std::io::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// HTTP client bound to one API base URL and one session
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<Session>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in with a username and password
    ///
    /// Bad credentials leave the current session untouched.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<AuthState> {
        let response = self
            .http
            .post(self.url("/token"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(username, "login rejected");
            return Err(ClientError::InvalidCredentials);
        }
        let token: TokenResponse = check(response).await?.json().await?;

        self.session.start(token.access_token)?;
        Ok(self.session.state())
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.session.logout()
    }

    /// Send an authenticated request and map failures to [`ClientError`]
    async fn send(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let token = self.session.token().ok_or(ClientError::Unauthorized)?;
        let response = builder.bearer_auth(&token).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.session.expire_token(&token);
            return Err(ClientError::Unauthorized);
        }
        check(response).await
    }

    pub async fn get<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.send(self.http.get(self.url(path)).query(query)).await?;
        Ok(response.json().await?)
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(self.http.post(self.url(path)).json(body)).await?;
        Ok(response.json().await?)
    }

    /// POST without a body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.send(self.http.post(self.url(path))).await?;
        Ok(response.json().await?)
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.send(self.http.put(self.url(path)).json(body)).await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send(self.http.delete(self.url(path))).await?;
        Ok(())
    }
}

/// Turn a non-success response into [`ClientError::Api`]
async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => body.message,
        Err(_) => serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .unwrap_or(text),
    };
    Err(ClientError::Api { status, message })
}
