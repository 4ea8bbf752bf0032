//! Session endpoints: unlock, add member, embedding control, hover, annotations
//!
//! Network work (key derivation, catalog calls) runs without holding the
//! session lock. Results are applied through [`SessionState::apply`], which
//! re-checks duplicates.

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::embedding::{EmbeddingMethod, EmbeddingSettings, FitPolicy};
use crate::error::{ApiError, ApiResult, SpaceError};
use crate::models::{parse_dataset, TrackId};
use crate::services::{CatalogError, CatalogService, Enricher};
use crate::session::{PlotPoint, SessionEvent, SpaceSnapshot};
use crate::AppState;

const AUTH_SUCCESS: &str = "Authentication success";
const WELCOME: &str = "Welcome to Lab Music Space!";
const DATA_CORRUPTED: &str = "Data corrupted, check uri";

/// POST /api/unlock request
#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub password: String,
}

/// POST /api/unlock response
#[derive(Debug, Serialize)]
pub struct UnlockResponse {
    pub message: &'static str,
    pub welcome: &'static str,
    pub tracks: usize,
    pub space: SpaceSnapshot,
}

/// POST /api/members request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub member: String,
    pub reference: String,
}

/// POST /api/members response
#[derive(Debug, Serialize)]
pub struct AddMemberResponse {
    /// False when the track was already in the space
    pub added: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<PlotPoint>,
}

/// PUT /api/embedding request
#[derive(Debug, Deserialize)]
pub struct EmbeddingRequest {
    pub method: String,
    pub n_neighbors: Option<usize>,
    pub fit_policy: Option<FitPolicy>,
}

/// POST /api/hover request
#[derive(Debug, Deserialize)]
pub struct HoverRequest {
    pub id: Option<TrackId>,
}

/// Hover response
#[derive(Debug, Serialize)]
pub struct HoverResponse {
    pub track: Option<PlotPoint>,
}

/// POST /api/annotations/render response
#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub annotations: Vec<PlotPoint>,
}

/// Build session routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/unlock", post(unlock))
        .route("/api/members", post(add_member))
        .route("/api/embedding", put(set_embedding))
        .route("/api/hover", post(set_hover).get(get_hover))
        .route("/api/space", get(get_space))
        .route("/api/annotations/render", post(render_annotations))
}

/// Keep the most recent failure for /health
async fn remember<T>(state: &AppState, result: ApiResult<T>) -> ApiResult<T> {
    if let Err(err) = &result {
        *state.last_error.write().await = Some(err.to_string());
    }
    result
}

/// Errors while loading the dataset all point the user at the data itself
fn dataset_failure(err: SpaceError) -> ApiError {
    match err {
        SpaceError::InvalidReference(_)
        | SpaceError::Dataset(_)
        | SpaceError::Catalog(CatalogError::ResponseMismatch { .. })
        | SpaceError::Catalog(CatalogError::Parse(_)) => {
            warn!(error = %err, "Dataset could not be loaded");
            ApiError::Unprocessable(DATA_CORRUPTED.to_string())
        }
        other => other.into(),
    }
}

/// POST /api/unlock
///
/// Decrypt the bundle, authenticate with the catalog, enrich the dataset and
/// fit the initial embedding.
pub async fn unlock(
    State(state): State<AppState>,
    Json(request): Json<UnlockRequest>,
) -> ApiResult<Json<UnlockResponse>> {
    let result = unlock_inner(&state, request).await;
    remember(&state, result).await
}

async fn unlock_inner(state: &AppState, request: UnlockRequest) -> ApiResult<Json<UnlockResponse>> {
    if request.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required".to_string()));
    }

    // PBKDF2 runs on the blocking pool
    let bundle = state.bundle.clone();
    let password = request.password;
    let payload = tokio::task::spawn_blocking(move || bundle.unseal(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("Key derivation task failed: {}", e)))?
        .map_err(SpaceError::from)?;
    info!("Bundle decrypted");

    let catalog = state
        .connector
        .connect(&payload.service_id, &payload.service_secret)
        .await
        .map_err(SpaceError::from)?;
    info!("{}", AUTH_SUCCESS);

    let rows = parse_dataset(&payload.dataset).map_err(dataset_failure)?;
    let enricher = Enricher::new(catalog.clone(), state.config.catalog.batch_size);
    let records = enricher.enrich(&rows).await.map_err(dataset_failure)?;

    let space = {
        let mut session = state.session.write().await;
        session.apply(SessionEvent::Loaded(records))?;
        session.snapshot()?
    };
    *state.catalog.write().await = Some(catalog);

    info!(tracks = space.points.len(), method = space.method, "Session unlocked");

    Ok(Json(UnlockResponse {
        message: AUTH_SUCCESS,
        welcome: WELCOME,
        tracks: space.points.len(),
        space,
    }))
}

/// POST /api/members
///
/// Resolve a member's track and add it as an annotated point.
pub async fn add_member(
    State(state): State<AppState>,
    Json(request): Json<AddMemberRequest>,
) -> ApiResult<Json<AddMemberResponse>> {
    let result = add_member_inner(&state, request).await;
    remember(&state, result).await
}

async fn add_member_inner(
    state: &AppState,
    request: AddMemberRequest,
) -> ApiResult<Json<AddMemberResponse>> {
    let member = request.member.trim().to_string();
    if member.is_empty() {
        return Err(ApiError::BadRequest("Member name is required".to_string()));
    }

    let catalog: Arc<dyn CatalogService> = state
        .catalog
        .read()
        .await
        .clone()
        .ok_or(SpaceError::Locked)?;
    let table = state.session.read().await.table().clone();

    let enricher = Enricher::new(catalog, state.config.catalog.batch_size);
    let record = match enricher.enrich_one(&table, &member, &request.reference).await {
        Ok(record) => record,
        Err(SpaceError::DuplicateReference(id)) => return Ok(Json(already_present(&id))),
        Err(err) => return Err(err.into()),
    };
    let id = record.id.clone();

    let mut session = state.session.write().await;
    match session.apply(SessionEvent::MemberAdded(record)) {
        Ok(()) => {}
        Err(SpaceError::DuplicateReference(id)) => return Ok(Json(already_present(&id))),
        Err(err) => return Err(err.into()),
    }
    let point = session.pending_annotations().into_iter().find(|p| p.id == id);

    info!(member = %member, id = %id, "Member added");
    Ok(Json(AddMemberResponse {
        added: true,
        message: format!("Added {}", member),
        point,
    }))
}

fn already_present(id: &str) -> AddMemberResponse {
    info!(id = %id, "Track already in the space, nothing added");
    AddMemberResponse {
        added: false,
        message: "Track already in the space".to_string(),
        point: None,
    }
}

/// PUT /api/embedding
///
/// Switch method, neighbor count or fit policy and refit.
pub async fn set_embedding(
    State(state): State<AppState>,
    Json(request): Json<EmbeddingRequest>,
) -> ApiResult<Json<SpaceSnapshot>> {
    let result = set_embedding_inner(&state, request).await;
    remember(&state, result).await
}

async fn set_embedding_inner(
    state: &AppState,
    request: EmbeddingRequest,
) -> ApiResult<Json<SpaceSnapshot>> {
    let method = EmbeddingMethod::from_name(&request.method, request.n_neighbors)
        .map_err(SpaceError::from)?;

    let mut session = state.session.write().await;
    let settings = EmbeddingSettings {
        method,
        fit_policy: request.fit_policy.unwrap_or(session.settings().fit_policy),
    };
    session.apply(SessionEvent::EmbeddingChanged(settings))?;
    Ok(Json(session.snapshot()?))
}

/// POST /api/hover
pub async fn set_hover(
    State(state): State<AppState>,
    Json(request): Json<HoverRequest>,
) -> ApiResult<Json<HoverResponse>> {
    let mut session = state.session.write().await;
    session.apply(SessionEvent::Hovered(request.id))?;
    Ok(Json(HoverResponse {
        track: session.highlighted_track(),
    }))
}

/// GET /api/hover
pub async fn get_hover(State(state): State<AppState>) -> Json<HoverResponse> {
    Json(HoverResponse {
        track: state.session.read().await.highlighted_track(),
    })
}

/// GET /api/space
pub async fn get_space(State(state): State<AppState>) -> ApiResult<Json<SpaceSnapshot>> {
    Ok(Json(state.session.read().await.snapshot()?))
}

/// POST /api/annotations/render
///
/// Hand out annotated points not yet drawn and mark them drawn.
pub async fn render_annotations(State(state): State<AppState>) -> ApiResult<Json<RenderResponse>> {
    let mut session = state.session.write().await;
    let annotations = session.pending_annotations();
    let ids = annotations.iter().map(|p| p.id.clone()).collect();
    session.apply(SessionEvent::AnnotationsRendered(ids))?;
    Ok(Json(RenderResponse { annotations }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_failures_point_at_data() {
        for err in [
            SpaceError::InvalidReference("x".into()),
            SpaceError::Dataset("bad row".into()),
            SpaceError::Catalog(CatalogError::ResponseMismatch {
                expected: 2,
                actual: 1,
            }),
        ] {
            match dataset_failure(err) {
                ApiError::Unprocessable(msg) => assert_eq!(msg, DATA_CORRUPTED),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_auth_failure_is_not_a_data_problem() {
        assert!(matches!(
            dataset_failure(SpaceError::ServiceAuthFailure),
            ApiError::Unauthorized(_)
        ));
    }
}
