//! HTTP request handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::conllu;
use crate::labeling::{CacheStats, LabelDistribution, LabelingError, SentenceSelector};
use crate::midas::MidasSentence;
use crate::models::Sentence;
use crate::services::{random_head_probabilities, random_sentence_probabilities, HeadPrediction};

use super::api_types::{ApiError, ApiJson, Probabilities};
use super::AppState;

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
pub struct SentSplitRequest {
    /// Every sentence of the document, as CoNLL-U.
    pub full_conllu: String,
    /// The target sentence, used for its `sent_id` when no selector is given.
    #[serde(default)]
    pub conllu: Option<String>,
    #[serde(default)]
    pub sentence_index: Option<i64>,
    #[serde(default)]
    pub sent_id: Option<String>,
}

impl SentSplitRequest {
    /// A non-negative index, then an explicit id, then the id of the target
    /// sentence itself.
    fn selector(&self) -> Result<SentenceSelector, ApiError> {
        if let Some(selector) =
            SentenceSelector::from_parts(self.sentence_index, self.sent_id.as_deref())
        {
            return Ok(selector);
        }

        let conllu = self.conllu.as_deref().ok_or_else(|| {
            ApiError::bad_request("one of sentence_index, sent_id or conllu is required")
        })?;
        let sentence = conllu::parse_sentence(conllu).map_err(LabelingError::from)?;
        sentence
            .sent_id()
            .map(|id| SentenceSelector::Id(id.to_string()))
            .ok_or_else(|| ApiError::bad_request("target sentence has no sent_id"))
    }
}

#[derive(Debug, Deserialize)]
pub struct ConlluRequest {
    pub conllu: String,
}

#[derive(Debug, Deserialize)]
pub struct MidasRequest {
    pub json: MidasSentence,
}

/// Sentence boundary probabilities for one sentence of a document.
pub async fn sentsplit(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SentSplitRequest>,
) -> Result<Json<Probabilities<LabelDistribution>>, ApiError> {
    let splitter = state
        .services
        .splitter
        .as_ref()
        .ok_or_else(|| ApiError::unavailable("sentence"))?;

    let selector = req.selector()?;
    let doc = conllu::parse(&req.full_conllu).map_err(LabelingError::from)?;
    let probabilities = splitter.split(&doc, &selector).await?;
    Ok(Probabilities::json(probabilities))
}

/// XPOS label scores for each token of one sentence.
pub async fn xpos(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ConlluRequest>,
) -> Result<Json<Probabilities<LabelDistribution>>, ApiError> {
    let tagger = state
        .services
        .xpos
        .as_ref()
        .ok_or_else(|| ApiError::unavailable("xpos"))?;

    let sentence = conllu::parse_sentence(&req.conllu).map_err(LabelingError::from)?;
    Ok(Probabilities::json(tagger.tag(&sentence).await?))
}

/// A fresh dependency parse of one sentence.
pub async fn dep(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ConlluRequest>,
) -> Result<Json<Probabilities<HeadPrediction>>, ApiError> {
    let parser = state
        .services
        .dep
        .as_ref()
        .ok_or_else(|| ApiError::unavailable("dep"))?;

    let sentence = conllu::parse_sentence(&req.conllu).map_err(LabelingError::from)?;
    Ok(Probabilities::json(parser.parse(&sentence).await?))
}

pub async fn random_sentence(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ConlluRequest>,
) -> Result<Json<Probabilities<LabelDistribution>>, ApiError> {
    let sentence = conllu::parse_sentence(&req.conllu).map_err(LabelingError::from)?;
    let mut rng = StdRng::from_entropy();
    Ok(Probabilities::json(random_sentence_probabilities(
        &sentence,
        &state.settings.label_pair(),
        &mut rng,
    )))
}

pub async fn random_head(
    ApiJson(req): ApiJson<MidasRequest>,
) -> Json<Probabilities<LabelDistribution>> {
    let mut rng = StdRng::from_entropy();
    let sentence = Sentence::from(&req.json);
    Probabilities::json(random_head_probabilities(&sentence, &mut rng))
}

#[derive(Debug, Serialize)]
pub struct WindowStatus {
    pub span_size: usize,
    pub stride_size: usize,
    pub batch_size: usize,
}

#[derive(Debug, Serialize)]
pub struct BackendStatus {
    pub sentence: String,
    pub xpos: String,
    pub dep: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub cache: CacheStats,
    pub window: WindowStatus,
    pub backends: BackendStatus,
}

/// Cache counters and the active configuration.
pub async fn api_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let settings = &state.settings;
    Json(StatusResponse {
        cache: state.services.cache.stats(),
        window: WindowStatus {
            span_size: settings.splitter.span_size,
            stride_size: settings.splitter.stride_size,
            batch_size: settings.splitter.batch_size,
        },
        backends: BackendStatus {
            sentence: settings.backends.sentence.kind.to_string(),
            xpos: settings.backends.xpos.kind.to_string(),
            dep: settings.backends.dep.kind.to_string(),
        },
    })
}
