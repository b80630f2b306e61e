//! DigitalOcean API client
//!
//! Direct implementation of the v2 block storage endpoints used for
//! snapshot rotation. Uses Bearer token authentication.

use crate::error::{DigitalOceanError, Result};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use snapshotter_config::ProviderConfig;
use std::collections::HashSet;

const SNAPSHOTS_PER_PAGE: u32 = 200;

/// DigitalOcean block storage API client
pub struct DigitalOceanClient {
    client: reqwest::Client,
    api_token: String,
    api_url: Url,
}

impl DigitalOceanClient {
    /// Create a new client from the provider settings
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_url = Url::parse(&config.api_url)
            .map_err(|e| DigitalOceanError::InvalidUrl(format!("{}: {}", config.api_url, e)))?;
        if api_url.cannot_be_a_base() {
            return Err(DigitalOceanError::InvalidUrl(config.api_url.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("snapshotter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_token: config.token.expose().to_string(),
            api_url,
        })
    }

    /// Resolve path segments against the API base
    ///
    /// Each segment is percent-encoded, so an identifier can never add path
    /// components or a query of its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| DigitalOceanError::InvalidUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Get a volume by ID
    pub async fn get_volume(&self, volume_id: &str) -> Result<ApiVolume> {
        let url = self.endpoint(&["volumes", volume_id])?;
        tracing::debug!("GET {}", url);

        let response: VolumeResponse = self.send(self.client.get(url)).await?;
        Ok(response.volume)
    }

    /// Create a snapshot from a volume
    pub async fn create_snapshot(&self, volume_id: &str, name: &str) -> Result<ApiSnapshot> {
        let url = self.endpoint(&["volumes", volume_id, "snapshots"])?;
        tracing::debug!("POST {} name={}", url, name);

        let request_body = CreateSnapshotRequest {
            name: name.to_string(),
        };

        let response: SnapshotResponse = self
            .send(self.client.post(url).json(&request_body))
            .await?;
        Ok(response.snapshot)
    }

    /// List every snapshot of a volume, following pagination links
    ///
    /// A `next` link that leads back to any page already fetched is rejected,
    /// so a misbehaving server cannot keep the listing going forever.
    pub async fn list_snapshots(&self, volume_id: &str) -> Result<Vec<ApiSnapshot>> {
        let mut url = self.endpoint(&["volumes", volume_id, "snapshots"])?;
        url.query_pairs_mut()
            .append_pair("page", "1")
            .append_pair("per_page", &SNAPSHOTS_PER_PAGE.to_string());

        let mut fetched = HashSet::new();
        let mut snapshots = Vec::new();

        loop {
            fetched.insert(url.to_string());
            tracing::debug!("GET {}", url);
            let page: SnapshotListResponse = self.send(self.client.get(url.clone())).await?;
            snapshots.extend(page.snapshots);

            let Some(next) = page.links.next_page() else {
                break;
            };
            let next = Url::parse(next).map_err(|e| {
                DigitalOceanError::InvalidResponse(format!("invalid pagination link {}: {}", next, e))
            })?;
            if fetched.contains(next.as_str()) {
                return Err(DigitalOceanError::InvalidResponse(format!(
                    "pagination link revisits an already fetched page: {}",
                    next
                )));
            }
            url = next;
        }

        tracing::debug!("Listed {} snapshots for volume {}", snapshots.len(), volume_id);
        Ok(snapshots)
    }

    /// Delete a snapshot
    pub async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()> {
        let url = self.endpoint(&["snapshots", snapshot_id])?;
        tracing::debug!("DELETE {}", url);

        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(api_error(status, &body));
        }

        Ok(())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.bearer_auth(&self.api_token).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Build an API error from a failed response
///
/// DigitalOcean reports failures as `{"id": ..., "message": ...}`; anything
/// else falls back to the raw body or the status reason.
fn api_error(status: StatusCode, body: &str) -> DigitalOceanError {
    let (id, message) = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(error) => (error.id, error.message),
        Err(_) if !body.trim().is_empty() => ("unknown".to_string(), body.trim().to_string()),
        Err(_) => (
            "unknown".to_string(),
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        ),
    };

    DigitalOceanError::Api {
        status: status.as_u16(),
        id,
        message,
    }
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct VolumeResponse {
    volume: ApiVolume,
}

#[derive(Debug, Deserialize)]
pub struct ApiVolume {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub region: Option<ApiRegion>,
    #[serde(default)]
    pub size_gigabytes: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ApiRegion {
    pub slug: String,
}

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    snapshot: ApiSnapshot,
}

#[derive(Debug, Deserialize)]
struct SnapshotListResponse {
    #[serde(default)]
    snapshots: Vec<ApiSnapshot>,
    #[serde(default)]
    links: ApiLinks,
}

#[derive(Debug, Deserialize)]
pub struct ApiSnapshot {
    pub id: String,
    pub name: String,
    pub created_at: String,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub size_gigabytes: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiLinks {
    #[serde(default)]
    pages: Option<ApiPages>,
}

impl ApiLinks {
    fn next_page(&self) -> Option<&str> {
        self.pages.as_ref().and_then(|p| p.next.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiPages {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    id: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct CreateSnapshotRequest {
    name: String,
}
