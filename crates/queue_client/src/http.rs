//! reqwest-backed [`QueueApi`] implementation.

use async_trait::async_trait;
use queue_types::{Barber, BarberStatus, NewBarber, NewQueueEntry, QueueEntry, QueueStats};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{ClientConfig, QueueApi, RequestError, Result};

/// Client for the queue service REST API.
#[derive(Debug, Clone)]
pub struct HttpClient {
    config: ClientConfig,
    base: Url,
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a new HttpClient with the given config.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Create a client that reuses an existing reqwest client.
    pub fn with_client(config: ClientConfig, client: reqwest::Client) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| RequestError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(RequestError::InvalidUrl(config.base_url.clone()));
        }

        Ok(Self {
            config,
            base,
            client,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!(%method, %url, "queue api request");
        self.client.request(method, url)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = RequestError::from_response(status.as_u16(), &body);
        debug!(status = status.as_u16(), error = %err, "queue api rejected request");
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.execute(request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| RequestError::Decode(e.to_string()))
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        self.execute(request).await?;
        Ok(())
    }
}

#[async_trait]
impl QueueApi for HttpClient {
    async fn list_barbers(&self) -> Result<Vec<Barber>> {
        self.send_json(self.request(Method::GET, &["barbers"])).await
    }

    async fn get_barber(&self, id: &str) -> Result<Barber> {
        self.send_json(self.request(Method::GET, &["barbers", id])).await
    }

    async fn create_barber(&self, barber: &NewBarber) -> Result<Barber> {
        self.send_json(self.request(Method::POST, &["barbers"]).json(barber))
            .await
    }

    async fn update_barber(&self, id: &str, barber: &NewBarber) -> Result<Barber> {
        self.send_json(self.request(Method::PUT, &["barbers", id]).json(barber))
            .await
    }

    async fn delete_barber(&self, id: &str) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &["barbers", id]))
            .await
    }

    async fn update_barber_status(&self, id: &str, status: BarberStatus) -> Result<Barber> {
        let request = self
            .request(Method::PATCH, &["barbers", id, "status"])
            .query(&[("status", status.as_str())]);
        self.send_json(request).await
    }

    async fn available_barbers(&self) -> Result<Vec<Barber>> {
        self.send_json(self.request(Method::GET, &["barbers", "available"]))
            .await
    }

    async fn finish_service(&self, barber_id: &str) -> Result<Barber> {
        self.send_json(self.request(Method::POST, &["barbers", barber_id, "finish-service"]))
            .await
    }

    async fn list_queue(&self) -> Result<Vec<QueueEntry>> {
        self.send_json(self.request(Method::GET, &["queue"])).await
    }

    async fn get_queue_entry(&self, id: &str) -> Result<QueueEntry> {
        self.send_json(self.request(Method::GET, &["queue", id])).await
    }

    async fn join_queue(&self, entry: &NewQueueEntry) -> Result<QueueEntry> {
        self.send_json(self.request(Method::POST, &["queue"]).json(entry))
            .await
    }

    async fn remove_from_queue(&self, id: &str) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &["queue", id]))
            .await
    }

    async fn call_next(&self, barber_id: &str) -> Result<QueueEntry> {
        let request = self
            .request(Method::POST, &["queue", "call-next"])
            .query(&[("barberId", barber_id)]);
        self.send_json(request).await
    }

    async fn complete_service(&self, id: &str) -> Result<QueueEntry> {
        self.send_json(self.request(Method::POST, &["queue", id, "complete"]))
            .await
    }

    async fn queue_stats(&self) -> Result<QueueStats> {
        self.send_json(self.request(Method::GET, &["queue", "stats"]))
            .await
    }
}
