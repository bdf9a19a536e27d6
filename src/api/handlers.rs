use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{ItemId, ScoredItem, ScoredUser, UserId},
    services::{BlendWeights, Recommender},
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SimilarUsersQuery {
    pub k: Option<usize>,
    pub threshold: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarItemsQuery {
    pub k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub top_n: Option<usize>,
    pub content_weight: Option<f32>,
    pub collaborative_weight: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct SimilarUsersResponse {
    pub user_id: UserId,
    pub similar_users: Vec<ScoredUser>,
}

/// An item enriched with catalog metadata
#[derive(Debug, Serialize)]
pub struct ItemView {
    pub item_id: ItemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl ItemView {
    fn new(recommender: &Recommender, item_id: ItemId) -> Self {
        let item = recommender.item(&item_id);
        Self {
            item_id,
            name: item.map(|i| i.name.clone()),
            genres: item.map(|i| i.genres.clone()).unwrap_or_default(),
            rating: None,
            score: None,
        }
    }

    fn scored(recommender: &Recommender, candidate: &ScoredItem) -> Self {
        Self {
            score: Some(candidate.score),
            ..Self::new(recommender, candidate.item_id)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub user_id: UserId,
    pub preferences: Vec<ItemView>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub user_id: UserId,
    pub weights: BlendWeights,
    pub recommendations: Vec<ItemView>,
}

#[derive(Debug, Serialize)]
pub struct SimilarItemsResponse {
    pub item_id: ItemId,
    pub similar_items: Vec<ItemView>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Users closest to the given user in embedding space
pub async fn similar_users(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<u64>,
    Query(query): Query<SimilarUsersQuery>,
) -> AppResult<Json<SimilarUsersResponse>> {
    if query.k == Some(0) {
        return Err(AppError::InvalidInput("k must be at least 1".to_string()));
    }
    if let Some(threshold) = query.threshold {
        if !(-1.0..=1.0).contains(&threshold) {
            return Err(AppError::InvalidInput(
                "threshold must lie in [-1, 1]".to_string(),
            ));
        }
    }

    let user_id = UserId(user_id);
    tracing::info!(request_id = %request_id, user_id = %user_id, "Finding similar users");

    let similar_users = state
        .recommender
        .find_similar_users(user_id, query.k, query.threshold)?;

    Ok(Json(SimilarUsersResponse {
        user_id,
        similar_users,
    }))
}

/// Items the user rated at or above the rating floor
pub async fn user_preferences(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> AppResult<Json<PreferencesResponse>> {
    let user_id = UserId(user_id);
    let recommender = &state.recommender;

    let preferences = recommender
        .get_user_preferences(user_id)?
        .iter()
        .map(|p| ItemView {
            rating: Some(p.rating),
            ..ItemView::new(recommender, p.item_id)
        })
        .collect();

    Ok(Json(PreferencesResponse {
        user_id,
        preferences,
    }))
}

/// Hybrid collaborative + content recommendations for a user
pub async fn recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<u64>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationsResponse>> {
    let recommender = &state.recommender;
    let defaults = recommender.config();

    let top_n = query.top_n.unwrap_or(defaults.top_n);
    if top_n == 0 {
        return Err(AppError::InvalidInput("top_n must be at least 1".to_string()));
    }

    let weights = BlendWeights {
        collaborative: query
            .collaborative_weight
            .unwrap_or(defaults.weights.collaborative),
        content: query.content_weight.unwrap_or(defaults.weights.content),
    };
    if !(weights.collaborative >= 0.0 && weights.content >= 0.0)
        || !weights.collaborative.is_finite()
        || !weights.content.is_finite()
    {
        return Err(AppError::InvalidInput(
            "weights must be non-negative numbers".to_string(),
        ));
    }

    let user_id = UserId(user_id);
    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        top_n,
        collaborative_weight = weights.collaborative,
        content_weight = weights.content,
        "Processing recommendation request"
    );

    let recommendations = recommender
        .hybrid_recommendation(user_id, Some(weights), Some(top_n))?
        .iter()
        .map(|candidate| ItemView::scored(recommender, candidate))
        .collect();

    Ok(Json(RecommendationsResponse {
        user_id,
        weights,
        recommendations,
    }))
}

/// Anime closest to the given anime in embedding space
pub async fn similar_items(
    State(state): State<AppState>,
    Path(item_id): Path<u64>,
    Query(query): Query<SimilarItemsQuery>,
) -> AppResult<Json<SimilarItemsResponse>> {
    if query.k == Some(0) {
        return Err(AppError::InvalidInput("k must be at least 1".to_string()));
    }

    let item_id = ItemId(item_id);
    let recommender = &state.recommender;

    let similar_items = recommender
        .find_similar_items(item_id, query.k)?
        .iter()
        .map(|candidate| ItemView::scored(recommender, candidate))
        .collect();

    Ok(Json(SimilarItemsResponse {
        item_id,
        similar_items,
    }))
}
