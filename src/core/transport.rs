use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::api::{ChatRequest, ChatResponse, Endpoint, ExercisePayload, QuizPayload, SessionRequest};
use crate::utils::url::construct_endpoint_url;

/// A request that did not produce a usable response.
///
/// Network failures, non-2xx statuses and undecodable bodies are all the same
/// failure to callers; the variants only carry diagnostic detail.
#[derive(Debug)]
pub enum TransportError {
    Request {
        endpoint: Endpoint,
        source: reqwest::Error,
    },
    Status {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },
    Decode {
        endpoint: Endpoint,
        source: serde_json::Error,
    },
}

impl TransportError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            TransportError::Request { endpoint, .. }
            | TransportError::Status { endpoint, .. }
            | TransportError::Decode { endpoint, .. } => *endpoint,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request { endpoint, source } => {
                write!(f, "request to {endpoint} failed: {source}")
            }
            TransportError::Status {
                endpoint,
                status,
                body,
            } => {
                let body = body.trim();
                if body.is_empty() {
                    write!(f, "{endpoint} returned HTTP {status}")
                } else {
                    write!(f, "{endpoint} returned HTTP {status}: {body}")
                }
            }
            TransportError::Decode { endpoint, source } => {
                write!(f, "could not decode {endpoint} response: {source}")
            }
        }
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TransportError::Request { source, .. } => Some(source),
            TransportError::Decode { source, .. } => Some(source),
            TransportError::Status { .. } => None,
        }
    }
}

/// The backend as seen by the session adapter.
#[async_trait]
pub trait TutorTransport: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, TransportError>;
    async fn exercise(&self, request: SessionRequest) -> Result<ExercisePayload, TransportError>;
    async fn quiz(&self, request: SessionRequest) -> Result<QuizPayload, TransportError>;
}

pub fn client_builder(timeout: Option<Duration>) -> reqwest::ClientBuilder {
    let builder = reqwest::Client::builder();
    match timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Builds a client honouring an optional request timeout. `None` leaves
    /// timing entirely to the server and the network stack.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(client_builder(timeout).build()?, base_url))
    }

    async fn post_json<B, R>(&self, endpoint: Endpoint, body: &B) -> Result<R, TransportError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = construct_endpoint_url(&self.base_url, endpoint.path());
        debug!(%url, "posting tutor request");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|source| TransportError::Request { endpoint, source })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| TransportError::Request { endpoint, source })?;

        if !status.is_success() {
            return Err(TransportError::Status {
                endpoint,
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|source| TransportError::Decode { endpoint, source })
    }
}

#[async_trait]
impl TutorTransport for HttpTransport {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, TransportError> {
        self.post_json(Endpoint::Chat, &request).await
    }

    async fn exercise(&self, request: SessionRequest) -> Result<ExercisePayload, TransportError> {
        self.post_json(Endpoint::Exercise, &request).await
    }

    async fn quiz(&self, request: SessionRequest) -> Result<QuizPayload, TransportError> {
        self.post_json(Endpoint::Quiz, &request).await
    }
}
