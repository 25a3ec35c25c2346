use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

mod mapping;
mod profile_repo;
mod quiz_repo;
mod streak_repo;

/// Connection settings for the backend API.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HttpInitError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

/// Adapter for the backend JSON API.
///
/// One client instance implements every persistence trait, the same way the
/// in-memory backend does.
#[derive(Clone)]
pub struct HttpRepository {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpRepository {
    /// Build a client for the given backend.
    ///
    /// # Errors
    ///
    /// Returns `HttpInitError` if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: HttpConfig) -> Result<Self, HttpInitError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token,
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}
