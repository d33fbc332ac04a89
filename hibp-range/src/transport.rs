//! The HTTP boundary: issue a GET against the range API and hand back the body.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use tracing::{debug, warn};

use crate::Error;
use crate::config::ClientConfig;

/// Executes a GET for a path relative to the API base and returns the body of
/// a successful response.
///
/// Any status other than 200 must be reported as [`Error::HttpStatus`], and
/// network failures as [`Error::HttpRequest`].
pub trait Transport: Send + Sync {
    fn get(&self, path: &str) -> Result<String, Error>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, path: &str) -> Result<String, Error> {
        (**self).get(path)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, path: &str) -> Result<String, Error> {
        (**self).get(path)
    }
}

/// Blocking reqwest transport that sends a fixed User-Agent.
///
/// The wrapped [`Client`] must not be created or dropped from inside an async
/// runtime; see reqwest's blocking module docs.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl HttpTransport {
    /// Creates a transport with a default reqwest client.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let client = Client::builder().build().map_err(Error::Client)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a transport around a caller-supplied client, e.g. one carrying
    /// its own timeout.
    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str) -> Result<String, Error> {
        let url = self.url(path);
        debug!(%url, "requesting range");

        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .map_err(|source| {
                warn!(%url, error = %source, "range request failed");
                Error::HttpRequest { path: path.to_string(), source }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%url, status = status.as_u16(), "unexpected range response status");
            return Err(Error::HttpStatus { path: path.to_string(), status: status.as_u16() });
        }

        response
            .text()
            .map_err(|source| Error::HttpRequest { path: path.to_string(), source })
    }
}
