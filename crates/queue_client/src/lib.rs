//! REST client for the barbershop queue service.
//!
//! This crate provides:
//! - QueueApi: one async operation per remote capability
//! - HttpClient: the reqwest-backed implementation
//! - FakeShop: an in-memory implementation for tests (feature `fake`)
//!
//! Every call is a single round trip. Nothing is retried or cached.

mod http;

#[cfg(any(test, feature = "fake"))]
mod fake;

use async_trait::async_trait;
use queue_types::{Barber, BarberStatus, NewBarber, NewQueueEntry, QueueEntry, QueueStats};
use thiserror::Error;

pub use http::HttpClient;

#[cfg(any(test, feature = "fake"))]
pub use fake::FakeShop;

/// Errors from queue service requests.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("network: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(String),

    #[error("invalid base URL: {0}")]
    InvalidUrl(String),
}

impl RequestError {
    /// HTTP status of the failed request, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            RequestError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Build a `Status` error from a non-2xx response body.
    ///
    /// Prefers a JSON `message` or `error` field, then the raw body, then
    /// the canonical reason phrase.
    pub fn from_response(status: u16, body: &str) -> Self {
        let from_json = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["message", "error"].iter().find_map(|key| {
                    value
                        .get(key)
                        .and_then(|v| v.as_str())
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                })
            });

        let message = from_json
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| {
                reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("request failed")
                    .to_string()
            });

        RequestError::Status { status, message }
    }
}

/// Result type for queue service requests.
pub type Result<T> = std::result::Result<T, RequestError>;

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL including the API prefix (default: http://localhost:8080/api)
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

/// Operations exposed by the queue service.
#[async_trait]
pub trait QueueApi: Send + Sync {
    /// `GET /barbers`
    async fn list_barbers(&self) -> Result<Vec<Barber>>;

    /// `GET /barbers/{id}`
    async fn get_barber(&self, id: &str) -> Result<Barber>;

    /// `POST /barbers`
    async fn create_barber(&self, barber: &NewBarber) -> Result<Barber>;

    /// `PUT /barbers/{id}`
    async fn update_barber(&self, id: &str, barber: &NewBarber) -> Result<Barber>;

    /// `DELETE /barbers/{id}`
    async fn delete_barber(&self, id: &str) -> Result<()>;

    /// `PATCH /barbers/{id}/status?status=`
    async fn update_barber_status(&self, id: &str, status: BarberStatus) -> Result<Barber>;

    /// `GET /barbers/available`
    async fn available_barbers(&self) -> Result<Vec<Barber>>;

    /// `POST /barbers/{id}/finish-service`
    async fn finish_service(&self, barber_id: &str) -> Result<Barber>;

    /// `GET /queue` (waiting entries, by position)
    async fn list_queue(&self) -> Result<Vec<QueueEntry>>;

    /// `GET /queue/{id}`
    async fn get_queue_entry(&self, id: &str) -> Result<QueueEntry>;

    /// `POST /queue`
    async fn join_queue(&self, entry: &NewQueueEntry) -> Result<QueueEntry>;

    /// `DELETE /queue/{id}`
    async fn remove_from_queue(&self, id: &str) -> Result<()>;

    /// `POST /queue/call-next?barberId=`
    async fn call_next(&self, barber_id: &str) -> Result<QueueEntry>;

    /// `POST /queue/{id}/complete`
    async fn complete_service(&self, id: &str) -> Result<QueueEntry>;

    /// `GET /queue/stats`
    async fn queue_stats(&self) -> Result<QueueStats>;
}
