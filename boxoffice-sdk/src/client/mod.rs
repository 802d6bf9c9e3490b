//! HTTP client for the Box Office API.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.

use reqwest::{Client, StatusCode};
use url::Url;
use uuid::Uuid;

use crate::objects::{
    BuyTicketsRequest, BuyTicketsResponse, CreateEventRequest, CreateSpotsRequest,
    CreateSpotsResponse, EventResponse, ListEventsResponse, ListSpotsResponse,
};

/// Errors produced by the SDK HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Typed HTTP client for the Box Office API.
#[derive(Debug, Clone)]
pub struct BoxOfficeClient {
    http: Client,
    base_url: Url,
}

impl BoxOfficeClient {
    /// Create a new client rooted at `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /events`
    pub async fn list_events(&self) -> Result<ListEventsResponse, ClientError> {
        let url = self.base_url.join("/events")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `GET /events/{event_id}`
    pub async fn get_event(&self, event_id: Uuid) -> Result<EventResponse, ClientError> {
        let url = self.base_url.join(&format!("/events/{event_id}"))?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /events`
    pub async fn create_event(
        &self,
        request: &CreateEventRequest,
    ) -> Result<EventResponse, ClientError> {
        let url = self.base_url.join("/events")?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_response(resp).await
    }

    /// `GET /events/{event_id}/spots`
    pub async fn list_spots(&self, event_id: Uuid) -> Result<ListSpotsResponse, ClientError> {
        let url = self.base_url.join(&format!("/events/{event_id}/spots"))?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `POST /events/{event_id}/spots`
    pub async fn create_spots(
        &self,
        event_id: Uuid,
        number_of_spots: u32,
    ) -> Result<CreateSpotsResponse, ClientError> {
        let url = self.base_url.join(&format!("/events/{event_id}/spots"))?;
        let resp = self
            .http
            .post(url)
            .json(&CreateSpotsRequest { number_of_spots })
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `POST /checkout`
    pub async fn buy_tickets(
        &self,
        request: &BuyTicketsRequest,
    ) -> Result<BuyTicketsResponse, ClientError> {
        let url = self.base_url.join("/checkout")?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_response(resp).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
