use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use log::debug;
use serde::Deserialize;
use serde_json::json;

use pfasmatch::resolve::{derive_asset_stem, AssetStore};
use pfasmatch::{AssetError, Pipeline, PipelineError, ResolutionResult, StemError};

pub(crate) struct AppState {
    pub(crate) pipeline: Pipeline,
    pub(crate) assets: AssetStore,
}

#[derive(Deserialize)]
pub(crate) struct TextQuery {
    text: String,
}

#[derive(Deserialize)]
pub(crate) struct SmilesQuery {
    smiles: String,
}

pub(crate) async fn index() -> Json<serde_json::Value> {
    Json(json!({"PFAS": "DETA-adsorber"}))
}

pub(crate) async fn smiles_from_text(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TextQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.pipeline.smiles_from_text(&q.text).await?))
}

pub(crate) async fn render_2d(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SmilesQuery>,
) -> Result<Response, ApiError> {
    debug!("render2d for {:?}", q.smiles);
    let stem = derive_asset_stem(&q.smiles)?;
    let path = state.assets.image_2d(&stem)?;
    let bytes = std::fs::read(&path)?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response())
}

pub(crate) async fn render_3d(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SmilesQuery>,
) -> Result<Response, ApiError> {
    debug!("render3d for {:?}", q.smiles);
    let stem = derive_asset_stem(&q.smiles)?;
    let path = state.assets.structure_3d(&stem)?;
    let bytes = std::fs::read(&path)?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        bytes,
    )
        .into_response())
}

pub(crate) async fn images_from_text(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TextQuery>,
) -> Result<Json<ResolutionResult>, ApiError> {
    Ok(Json(state.pipeline.resolve_text(&q.text).await?))
}

/// maps core errors onto status codes: bad chemistry is the client's problem,
/// a missing render is a 404, an unreachable oracle is an upstream failure
pub(crate) enum ApiError {
    Stem(StemError),
    Asset(AssetError),
    Pipeline(PipelineError),
    Io(std::io::Error),
}

impl From<StemError> for ApiError {
    fn from(e: StemError) -> Self {
        Self::Stem(e)
    }
}

impl From<AssetError> for ApiError {
    fn from(e: AssetError) -> Self {
        Self::Asset(e)
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            Self::Stem(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            Self::Asset(e) => (StatusCode::NOT_FOUND, e.to_string()),
            Self::Pipeline(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            Self::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };
        (status, Json(json!({"error": msg}))).into_response()
    }
}
