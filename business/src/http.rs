//! Uniform JSON request helper.
//!
//! Every request carries `Content-Type: application/json`, and
//! `Authorization: Bearer <token>` when a token is supplied. Non-2xx responses
//! become [`RequestError::Http`] with the raw body; callers derive user-facing
//! messages. There is no retry and no caching here.

use std::collections::HashMap;

use log::debug;
use roster_states::State;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub const CONTENT_TYPE: &str = "content-type";
pub const AUTHORIZATION: &str = "authorization";
const APPLICATION_JSON: &str = "application/json";

/// HTTP method for requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Failure of a single request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The server answered with a non-2xx status.
    #[error("request failed with status {status}")]
    Http { status: u16, body: String },
    /// The success body was not valid JSON for the expected type.
    #[error("failed to parse response body: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(String),
    /// The body parsed but is missing something the caller requires.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The request URL could not be built.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl RequestError {
    /// Status code for [`RequestError::Http`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type RequestResult<T> = Result<T, RequestError>;

/// Per-request inputs: an optional bearer token and an optional JSON body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub token: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Attach the token when one is available.
    pub fn maybe_bearer(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_owned);
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> RequestResult<Self> {
        self.body = Some(serde_json::to_value(body).map_err(RequestError::Encode)?);
        Ok(self)
    }
}

/// A fully assembled request, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    /// Header names are lowercase.
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl PreparedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }
}

/// Assemble headers and body for a request.
///
/// An empty token is treated as no token.
pub fn build_request(
    method: Method,
    url: impl Into<String>,
    options: &RequestOptions,
) -> RequestResult<PreparedRequest> {
    let mut headers = HashMap::new();
    headers.insert(CONTENT_TYPE.to_owned(), APPLICATION_JSON.to_owned());

    if let Some(token) = options.token.as_deref().filter(|t| !t.is_empty()) {
        headers.insert(AUTHORIZATION.to_owned(), format!("Bearer {token}"));
    }

    let body = options
        .body
        .as_ref()
        .map(serde_json::to_vec)
        .transpose()
        .map_err(RequestError::Encode)?;

    Ok(PreparedRequest {
        method,
        url: url.into(),
        headers,
        body,
    })
}

/// A received response; only owned, `Send` data.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    /// Lowercased header names.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    /// Returns true if the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// The shared request helper.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone, Default)]
pub struct Rest {
    client: reqwest::Client,
}

impl State for Rest {}

impl Rest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send a prepared request and collect the whole response.
    pub async fn send(&self, request: PreparedRequest) -> RequestResult<Response> {
        debug!("{} {}", request.method.as_str(), request.url);

        let mut builder = self
            .client
            .request(request.method.to_reqwest(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.as_str().to_lowercase(), v.to_owned());
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?
            .to_vec();

        Ok(Response {
            status,
            headers,
            body,
        })
    }

    /// Build, send, classify and parse.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> RequestResult<T> {
        let prepared = build_request(method, url, &options)?;
        let response = self.send(prepared).await?;

        if !response.is_success() {
            debug!("{} {url} -> {}", method.as_str(), response.status);
            return Err(RequestError::Http {
                status: response.status,
                body: response.text_lossy(),
            });
        }

        response.json().map_err(RequestError::Parse)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> RequestResult<T> {
        self.request(Method::Get, url, options).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> RequestResult<T> {
        self.request(Method::Post, url, options).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> RequestResult<T> {
        self.request(Method::Put, url, options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> RequestResult<T> {
        self.request(Method::Delete, url, options).await
    }
}
