//! HTTP client implementation

use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::errors::DeployError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TOKEN_HEADER: &str = "X-Nomad-Token";

/// Build the shared reqwest client
pub fn build_client() -> Result<Client, DeployError> {
    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    Ok(client)
}

/// Accept "host:port" as well as full URLs, defaulting to plain HTTP
pub fn normalize_base_url(address: &str) -> Result<Url, DeployError> {
    let address = address.trim();
    let with_scheme = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| DeployError::Configuration(format!("invalid address {:?}: {}", address, e)))?;
    if url.cannot_be_a_base() {
        return Err(DeployError::Configuration(format!(
            "invalid address {:?}: not a base URL",
            address
        )));
    }
    Ok(url)
}

/// HTTP client bound to one API endpoint
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(address: &str) -> Result<Self, DeployError> {
        Self::with_client(build_client()?, address)
    }

    /// Reuse an existing reqwest client
    pub fn with_client(client: Client, address: &str) -> Result<Self, DeployError> {
        Ok(Self {
            client,
            base_url: normalize_base_url(address)?,
            token: None,
        })
    }

    /// Send an ACL token with every request
    pub fn with_token(mut self, token: Option<SecretString>) -> Self {
        self.token = token;
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments, escaping each one
    pub fn endpoint<I, S>(&self, segments: I) -> Url
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.header(TOKEN_HEADER, token.expose_secret()),
            None => builder,
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, DeployError> {
        debug!("GET {}", url);

        let response = self.request(self.client.get(url)).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("HTTP GET failed: {} - {}", status, body);
            return Err(DeployError::ApiError(format!("{}: {}", status, body.trim())));
        }

        let body = response.json().await?;
        Ok(body)
    }

    /// Make a GET request for a raw body, `None` on 404
    pub async fn get_raw(&self, url: Url) -> Result<Option<String>, DeployError> {
        debug!("GET {}", url);

        let response = self.request(self.client.get(url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("HTTP GET failed: {} - {}", status, body);
            return Err(DeployError::ApiError(format!("{}: {}", status, body.trim())));
        }

        Ok(Some(response.text().await?))
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, DeployError> {
        debug!("POST {}", url);

        let response = self.request(self.client.post(url)).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("HTTP POST failed: {} - {}", status, body);
            return Err(DeployError::ApiError(format!("{}: {}", status, body.trim())));
        }

        let body = response.json().await?;
        Ok(body)
    }
}
