//! REST client for the event-ingestion platform.
//!
//! The platform authenticates with a session cookie issued by `login`; the
//! client keeps it in a cookie store so every later call rides the same
//! session, mirroring how the platform's own console talks to it.

use serde::Serialize;

use remap_api::column::ColumnMapping;
use remap_api::event::{EventType, EventTypeSummary};
use remap_api::mapping::MappingCommit;

use crate::error::PlatformError;

pub struct PlatformClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl PlatformClient {
    pub fn new(base_url: &str) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| PlatformError::Config(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Open the session. The auth cookie lands in the cookie store and
    /// propagates to all subsequent calls.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), PlatformError> {
        let resp = self
            .http
            .post(format!("{}/login", self.base_url))
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        Self::check(resp).await?;
        tracing::debug!("platform session established");
        Ok(())
    }

    /// All event types with their name and lifecycle state.
    pub async fn list_event_types(&self) -> Result<Vec<EventTypeSummary>, PlatformError> {
        let resp = self
            .http
            .get(format!("{}/event-types", self.base_url))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Full definition of one event type: field tree plus statistics.
    pub async fn event_type(&self, name: &str) -> Result<EventType, PlatformError> {
        let resp = self
            .http
            .get(format!(
                "{}/event-types/{}",
                self.base_url,
                urlencoding::encode(name)
            ))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Run the platform's generic auto-mapper over a definition and return
    /// the tree it produced.
    pub async fn auto_map(&self, evt: &EventType) -> Result<EventType, PlatformError> {
        let resp = self
            .http
            .post(format!(
                "{}/event-types/{}/auto-map",
                self.base_url,
                urlencoding::encode(&evt.name)
            ))
            .json(evt)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Declare the destination table. Safe to call again with the same shape.
    pub async fn create_table(
        &self,
        schema: &str,
        table: &str,
        columns: &[ColumnMapping],
    ) -> Result<(), PlatformError> {
        let resp = self
            .http
            .post(format!(
                "{}/tables/{}/{}",
                self.base_url,
                urlencoding::encode(schema),
                urlencoding::encode(table)
            ))
            .json(columns)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// Commit the mapping: future events of this type are routed to the
    /// destination table.
    pub async fn commit_mapping(&self, commit: &MappingCommit) -> Result<(), PlatformError> {
        let resp = self
            .http
            .post(format!(
                "{}/event-types/{}/mapping",
                self.base_url,
                urlencoding::encode(&commit.name)
            ))
            .json(commit)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// Remove an event type's definition from the platform.
    pub async fn delete_event_type(&self, name: &str) -> Result<(), PlatformError> {
        let resp = self
            .http
            .delete(format!(
                "{}/event-types/{}",
                self.base_url,
                urlencoding::encode(name)
            ))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// Surface non-2xx responses with whatever body the platform sent.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, PlatformError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(PlatformError::Api {
            status: status.as_u16(),
            body,
        })
    }
}
