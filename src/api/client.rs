use reqwest::{Client as ReqwestClient, ClientBuilder, Method, Url};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::models::{ClearOutcome, DatabaseInfo, Location, Machine, Stats};
use crate::state::LocationQuery;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Server-side confirmation tokens for the two destructive endpoints.
/// The UI enforces its own typed phrase on top of these.
pub const CLEAR_ALL_TOKEN: &str = "DELETE_ALL_DATA";
pub const CLEAR_MACHINE_TOKEN: &str = "DELETE_MACHINE_DATA";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Handles all backend communication. One call per operation, single
/// attempt, fixed timeout; no client-side state is mutated here.
#[derive(Clone)]
pub struct ApiClient {
    client: Arc<ReqwestClient>,
    base_url: String,
}

#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl ApiClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| ApiError::Config("Base URL must be provided".to_string()))?;

        let client = ClientBuilder::new()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(ApiError::Network)?;

        Ok(ApiClient {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(serde::Deserialize)]
struct LocationsEnvelope {
    #[serde(default)]
    locations: Vec<Location>,
}

#[derive(serde::Deserialize)]
struct MachinesEnvelope {
    #[serde(default)]
    machines: Vec<Machine>,
}

#[derive(serde::Deserialize)]
struct StatsEnvelope {
    statistics: Stats,
}

#[derive(serde::Deserialize)]
struct DatabaseEnvelope {
    database: DatabaseInfo,
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder().base_url(base_url).build()
    }

    /// Build an endpoint URL from path segments, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ApiError::Config(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Config("base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request<T, R>(&self, method: Method, url: Url, body: Option<&T>) -> Result<R>
    where
        T: Serialize + Sync,
        R: DeserializeOwned,
    {
        debug!("Making request to {}", url);

        let mut request = self.client.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::Network)?;
        let status = response.status();
        if status.is_success() {
            return response
                .json::<R>()
                .await
                .map_err(|e| ApiError::Parse(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        error!("Server error from {}: {} - {}", url, status, message);

        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }

    /// List recent locations across all machines
    #[instrument(skip(self))]
    pub async fn list_locations(&self, limit: u32) -> Result<Vec<Location>> {
        let mut url = self.endpoint(&["locations"])?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        let envelope: LocationsEnvelope = self.request::<(), _>(Method::GET, url, None).await?;
        Ok(envelope.locations)
    }

    /// List locations for one machine, bounded by a recency window
    #[instrument(skip(self))]
    pub async fn list_machine_locations(
        &self,
        machine: &str,
        limit: u32,
        hours: u32,
    ) -> Result<Vec<Location>> {
        let mut url = self.endpoint(&["locations", "machine", machine])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("hours", &hours.to_string());
        let envelope: LocationsEnvelope = self.request::<(), _>(Method::GET, url, None).await?;
        Ok(envelope.locations)
    }

    /// Dispatch a location query to the right endpoint
    pub async fn locations(&self, query: &LocationQuery) -> Result<Vec<Location>> {
        match query {
            LocationQuery::All { limit } => self.list_locations(*limit).await,
            LocationQuery::Machine { name, limit, hours } => {
                self.list_machine_locations(name, *limit, *hours).await
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn list_machines(&self) -> Result<Vec<Machine>> {
        let url = self.endpoint(&["machines"])?;
        let envelope: MachinesEnvelope = self.request::<(), _>(Method::GET, url, None).await?;
        Ok(envelope.machines)
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<Stats> {
        let url = self.endpoint(&["stats"])?;
        let envelope: StatsEnvelope = self.request::<(), _>(Method::GET, url, None).await?;
        Ok(envelope.statistics)
    }

    #[instrument(skip(self))]
    pub async fn database_info(&self) -> Result<DatabaseInfo> {
        let url = self.endpoint(&["database", "info"])?;
        let envelope: DatabaseEnvelope = self.request::<(), _>(Method::GET, url, None).await?;
        Ok(envelope.database)
    }

    /// Quick size summary; shape is implementation-defined on the server side
    #[instrument(skip(self))]
    pub async fn database_size(&self) -> Result<serde_json::Value> {
        let url = self.endpoint(&["database", "size"])?;
        self.request::<(), _>(Method::GET, url, None).await
    }

    /// Submit a location record. Testing utility, not wired into any view.
    #[instrument(skip(self, payload))]
    pub async fn report_location(&self, payload: &serde_json::Value) -> Result<serde_json::Value> {
        let url = self.endpoint(&["location"])?;
        self.request(Method::POST, url, Some(payload)).await
    }

    /// Wipe every location record. The server rejects the call unless the
    /// confirmation token matches.
    #[instrument(skip(self))]
    pub async fn clear_all(&self) -> Result<ClearOutcome> {
        let url = self.endpoint(&["admin", "clear-database"])?;
        let body = serde_json::json!({ "confirm": CLEAR_ALL_TOKEN });
        self.request(Method::DELETE, url, Some(&body)).await
    }

    /// Wipe one machine's records, with its own confirmation token
    #[instrument(skip(self))]
    pub async fn clear_machine(&self, machine: &str) -> Result<ClearOutcome> {
        let url = self.endpoint(&["admin", "clear-machine", machine])?;
        let body = serde_json::json!({ "confirm": CLEAR_MACHINE_TOKEN });
        self.request(Method::DELETE, url, Some(&body)).await
    }
}

/// Prefer a structured message from a JSON error body, fall back to the raw
/// body text.
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(message) = value.get(key).and_then(|m| m.as_str()) {
                return message.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        String::from("Unknown error")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn lists_locations_with_limit_only() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/locations")
            .match_query(Matcher::Exact("limit=100".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "locations": [{
                        "id": 1,
                        "machine_name": "LAPTOP-1",
                        "latitude": -12.0464,
                        "longitude": -77.0428,
                        "created_at": "2024-03-04T10:30:00Z"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(format!("{}/api", server.url())).unwrap();
        let locations = client.list_locations(100).await.unwrap();

        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].machine_name, "LAPTOP-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn scoped_listing_sends_limit_and_hours() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/locations/machine/LAPTOP-1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "100".into()),
                Matcher::UrlEncoded("hours".into(), "24".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "locations": [] }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(format!("{}/api", server.url())).unwrap();
        let locations = client
            .list_machine_locations("LAPTOP-1", 100, 24)
            .await
            .unwrap();

        assert!(locations.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn machine_name_is_percent_encoded() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/locations/machine/DESK%20TOP")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "locations": [] }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(format!("{}/api", server.url())).unwrap();
        client
            .list_machine_locations("DESK TOP", 10, 1)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_message_is_extracted_from_json_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/machines")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(json!({ "message": "database locked" }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(format!("{}/api", server.url())).unwrap();
        let err = client.list_machines().await.unwrap_err();

        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "database locked");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn clear_all_carries_confirmation_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/admin/clear-database")
            .match_body(Matcher::Json(json!({ "confirm": "DELETE_ALL_DATA" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "message": "database cleared", "deleted_records": 321 }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(format!("{}/api", server.url())).unwrap();
        let outcome = client.clear_all().await.unwrap();

        assert_eq!(outcome.deleted_records, 321);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn clear_machine_carries_its_own_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/admin/clear-machine/LAPTOP-1")
            .match_body(Matcher::Json(json!({ "confirm": "DELETE_MACHINE_DATA" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "message": "machine cleared", "deleted_records": 17 }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(format!("{}/api", server.url())).unwrap();
        let outcome = client.clear_machine("LAPTOP-1").await.unwrap();

        assert_eq!(outcome.deleted_records, 17);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn report_location_posts_the_payload_as_json() {
        let mut server = Server::new_async().await;
        let payload = json!({
            "machine_name": "LAPTOP-1",
            "latitude": -12.0464,
            "longitude": -77.0428
        });
        let mock = server
            .mock("POST", "/api/location")
            .match_body(Matcher::Json(payload.clone()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "status": "ok", "id": 7 }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(format!("{}/api", server.url())).unwrap();
        let reply = client.report_location(&payload).await.unwrap();

        assert_eq!(reply["id"], 7);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn database_size_returns_the_raw_value() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/database/size")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "size_mb": 2.5 }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(format!("{}/api", server.url())).unwrap();
        let size = client.database_size().await.unwrap();
        assert_eq!(size["size_mb"], 2.5);
    }

    #[tokio::test]
    async fn stats_envelope_is_unwrapped() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/stats")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "statistics": { "total_locations": 990, "unique_machines": 4 } })
                    .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(format!("{}/api", server.url())).unwrap();
        let stats = client.stats().await.unwrap();
        assert_eq!(stats.total_locations, 990);
        assert_eq!(stats.unique_machines, 4);
    }
}
