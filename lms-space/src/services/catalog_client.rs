//! Music catalog Web API client
//!
//! Client-credentials authentication plus the two bulk lookups enrichment
//! needs: track metadata and audio features. Responses are returned aligned
//! with the request (one entry per requested id, `None` when unknown); the
//! caller joins them by id.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::{FeatureVector, TrackId};

const USER_AGENT: &str = concat!("lms-space/", env!("CARGO_PKG_VERSION"));

/// Tokens are refreshed this long before the server-side expiry
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Catalog client errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// Credentials rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Track id unknown to the catalog
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Catalog returned an error response
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse response JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// Bulk response length differs from the request
    #[error("Response mismatch: requested {expected} entries, got {actual}")]
    ResponseMismatch { expected: usize, actual: usize },
}

/// Catalog service location and request limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogEndpoints {
    /// Base URL of the accounts service (token endpoint is `/api/token`)
    pub accounts_url: String,
    /// Base URL of the Web API (`/v1/...`)
    pub api_url: String,
    /// Ids per bulk request
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for CatalogEndpoints {
    fn default() -> Self {
        Self {
            accounts_url: "https://accounts.spotify.com".to_string(),
            api_url: "https://api.spotify.com".to_string(),
            batch_size: 50,
            timeout_secs: 30,
        }
    }
}

/// Track metadata used by the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogTrack {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Largest album image
    pub artwork: Option<String>,
}

/// Audio features of one track
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AudioFeatures {
    pub id: TrackId,
    pub danceability: f64,
    pub energy: f64,
    pub key: f64,
    pub loudness: f64,
    pub mode: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub duration_ms: f64,
    pub time_signature: f64,
}

impl AudioFeatures {
    /// Feature vector in session order
    pub fn to_vector(&self) -> FeatureVector {
        [
            self.danceability,
            self.energy,
            self.key,
            self.loudness,
            self.mode,
            self.speechiness,
            self.acousticness,
            self.instrumentalness,
            self.liveness,
            self.valence,
            self.tempo,
            self.duration_ms,
            self.time_signature,
        ]
    }
}

/// Bulk lookups against the catalog
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Track metadata, one entry per requested id
    async fn tracks(&self, ids: &[TrackId]) -> Result<Vec<Option<CatalogTrack>>, CatalogError>;

    /// Audio features, one entry per requested id
    async fn audio_features(
        &self,
        ids: &[TrackId],
    ) -> Result<Vec<Option<AudioFeatures>>, CatalogError>;
}

/// Creates an authenticated catalog session from decrypted credentials
#[async_trait]
pub trait CatalogConnector: Send + Sync {
    async fn connect(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Arc<dyn CatalogService>, CatalogError>;
}

// Wire format

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct TracksResponse {
    tracks: Vec<Option<TrackObject>>,
}

#[derive(Debug, Deserialize)]
struct AudioFeaturesResponse {
    audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<NamedObject>,
    album: AlbumObject,
}

#[derive(Debug, Deserialize)]
struct NamedObject {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumObject {
    name: String,
    #[serde(default)]
    images: Vec<ImageObject>,
}

#[derive(Debug, Deserialize)]
struct ImageObject {
    url: String,
    width: Option<u32>,
    height: Option<u32>,
}

impl From<TrackObject> for CatalogTrack {
    fn from(track: TrackObject) -> Self {
        let artwork = track
            .album
            .images
            .iter()
            .max_by_key(|img| u64::from(img.width.unwrap_or(0)) * u64::from(img.height.unwrap_or(0)))
            .map(|img| img.url.clone());

        CatalogTrack {
            id: TrackId::new(track.id),
            title: track.name,
            artist: track
                .artists
                .into_iter()
                .next()
                .map(|a| a.name)
                .unwrap_or_default(),
            album: track.album.name,
            artwork,
        }
    }
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Catalog Web API client
pub struct CatalogClient {
    http_client: reqwest::Client,
    endpoints: CatalogEndpoints,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<AccessToken>>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("endpoints", &self.endpoints)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    pub fn new(
        endpoints: CatalogEndpoints,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(endpoints.timeout_secs))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoints,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token: Mutex::new(None),
        })
    }

    /// Fetch (or reuse) an access token
    pub async fn authenticate(&self) -> Result<(), CatalogError> {
        self.access_token().await.map(|_| ())
    }

    async fn access_token(&self) -> Result<String, CatalogError> {
        let mut token = self.token.lock().await;

        if let Some(current) = token.as_ref() {
            if current.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN {
                return Ok(current.value.clone());
            }
        }

        let url = format!("{}/api/token", self.endpoints.accounts_url.trim_end_matches('/'));
        tracing::debug!(url = %url, "Requesting catalog access token");

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if status == 400 || status == 401 {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Catalog rejected client credentials");
            return Err(CatalogError::Unauthorized(error_text));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        tracing::info!(expires_in = parsed.expires_in, "Catalog access token acquired");

        let value = parsed.access_token.clone();
        *token = Some(AccessToken {
            value: parsed.access_token,
            expires_at: Instant::now() + Duration::from_secs(parsed.expires_in),
        });
        Ok(value)
    }

    async fn get_bulk<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        ids: &[TrackId],
    ) -> Result<T, CatalogError> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.endpoints.api_url.trim_end_matches('/'), path);
        let joined = ids.iter().map(TrackId::as_str).collect::<Vec<_>>().join(",");

        tracing::debug!(url = %url, count = ids.len(), "Querying catalog API");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .query(&[("ids", joined.as_str())])
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if status == 401 {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Unauthorized(error_text));
        }
        if status == 400 || status == 404 {
            return Err(CatalogError::TrackNotFound(joined));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

fn check_len<T>(ids: &[TrackId], entries: &[T]) -> Result<(), CatalogError> {
    if entries.len() != ids.len() {
        return Err(CatalogError::ResponseMismatch {
            expected: ids.len(),
            actual: entries.len(),
        });
    }
    Ok(())
}

#[async_trait]
impl CatalogService for CatalogClient {
    async fn tracks(&self, ids: &[TrackId]) -> Result<Vec<Option<CatalogTrack>>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let body: TracksResponse = self.get_bulk("/v1/tracks", ids).await?;
        check_len(ids, &body.tracks)?;
        Ok(body
            .tracks
            .into_iter()
            .map(|t| t.map(CatalogTrack::from))
            .collect())
    }

    async fn audio_features(
        &self,
        ids: &[TrackId],
    ) -> Result<Vec<Option<AudioFeatures>>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let body: AudioFeaturesResponse = self.get_bulk("/v1/audio-features", ids).await?;
        check_len(ids, &body.audio_features)?;
        Ok(body.audio_features)
    }
}

/// Connector that authenticates against the configured endpoints
#[derive(Debug, Clone, Default)]
pub struct HttpCatalogConnector {
    endpoints: CatalogEndpoints,
}

impl HttpCatalogConnector {
    pub fn new(endpoints: CatalogEndpoints) -> Self {
        Self { endpoints }
    }
}

#[async_trait]
impl CatalogConnector for HttpCatalogConnector {
    async fn connect(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Arc<dyn CatalogService>, CatalogError> {
        let client = CatalogClient::new(self.endpoints.clone(), client_id, client_secret)?;
        client.authenticate().await?;
        Ok(Arc::new(client))
    }
}
