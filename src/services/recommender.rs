use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Deserialize;

use crate::{
    error::RecommendError,
    models::{
        EmbeddingMatrix, EncodingTable, Item, ItemId, Preference, Rating, ScoredItem, ScoredUser,
        UserId,
    },
    services::{
        artifacts::Artifacts,
        collaborative::aggregate,
        content::{content_candidates, ContentSimilarity, EmbeddingContentIndex, SynopsisIndex},
        hybrid::{blend, BlendWeights},
        preferences::{collect_preferences, get_user_preferences, RatingFloor},
        ratings::RatingCorpus,
        similarity::{find_similar_items, find_similar_users},
    },
};

/// Which basis the content half of the hybrid signal is computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    Synopsis,
    Embedding,
}

/// Scoring parameters, fixed for the lifetime of a [`Recommender`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringConfig {
    pub similar_users_k: usize,
    pub similarity_threshold: f32,
    pub rating_floor: RatingFloor,
    pub seed_items: usize,
    pub content_neighbors: usize,
    pub weights: BlendWeights,
    pub top_n: usize,
    pub content_source: ContentSource,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            similar_users_k: 10,
            similarity_threshold: 0.0,
            rating_floor: RatingFloor::Percentile(75.0),
            seed_items: 5,
            content_neighbors: 10,
            weights: BlendWeights::default(),
            top_n: 10,
            content_source: ContentSource::Synopsis,
        }
    }
}

/// Read-only recommendation engine over the loaded training artifacts
///
/// Every entry point is a pure function of the tables captured at
/// construction, so a single instance can be shared across requests.
pub struct Recommender {
    users: EncodingTable<UserId>,
    items: Arc<EncodingTable<ItemId>>,
    user_weights: EmbeddingMatrix,
    item_weights: Arc<EmbeddingMatrix>,
    ratings: RatingCorpus,
    catalog: HashMap<ItemId, Item>,
    content: Box<dyn ContentSimilarity>,
    config: ScoringConfig,
}

impl Recommender {
    /// Builds the engine with the content source named in `config`
    pub fn new(artifacts: Artifacts, config: ScoringConfig) -> Result<Self, RecommendError> {
        let items = Arc::new(artifacts.items);
        let item_weights = Arc::new(artifacts.item_weights);

        let content: Box<dyn ContentSimilarity> = match config.content_source {
            ContentSource::Synopsis => Box::new(SynopsisIndex::build(&artifacts.catalog)),
            ContentSource::Embedding => Box::new(EmbeddingContentIndex::new(
                Arc::clone(&items),
                Arc::clone(&item_weights),
            )),
        };

        Self::assemble(
            artifacts.users,
            items,
            artifacts.user_weights,
            item_weights,
            artifacts.ratings,
            artifacts.catalog,
            content,
            config,
        )
    }

    /// Builds the engine around a caller-supplied content source
    pub fn with_content_source(
        artifacts: Artifacts,
        content: Box<dyn ContentSimilarity>,
        config: ScoringConfig,
    ) -> Result<Self, RecommendError> {
        Self::assemble(
            artifacts.users,
            Arc::new(artifacts.items),
            artifacts.user_weights,
            Arc::new(artifacts.item_weights),
            artifacts.ratings,
            artifacts.catalog,
            content,
            config,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        users: EncodingTable<UserId>,
        items: Arc<EncodingTable<ItemId>>,
        user_weights: EmbeddingMatrix,
        item_weights: Arc<EmbeddingMatrix>,
        ratings: Vec<Rating>,
        catalog: Vec<Item>,
        content: Box<dyn ContentSimilarity>,
        config: ScoringConfig,
    ) -> Result<Self, RecommendError> {
        check_rows(users.name(), users.len(), &user_weights)?;
        check_rows(items.name(), items.len(), &item_weights)?;

        let ratings = RatingCorpus::new(ratings)?;
        ratings.validate(&users, &items)?;

        let catalog = catalog.into_iter().map(|item| (item.id, item)).collect();

        tracing::info!(
            users = users.len(),
            items = items.len(),
            ratings = ratings.len(),
            content_source = content.name(),
            rating_floor = %config.rating_floor,
            "Recommender ready"
        );

        Ok(Self {
            users,
            items,
            user_weights,
            item_weights,
            ratings,
            catalog,
            content,
            config,
        })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Catalog metadata for an item, when the catalog has it
    pub fn item(&self, item_id: &ItemId) -> Option<&Item> {
        self.catalog.get(item_id)
    }

    /// Users most similar to `user_id`, falling back to configured `k` and threshold
    pub fn find_similar_users(
        &self,
        user_id: UserId,
        top_k: Option<usize>,
        similarity_threshold: Option<f32>,
    ) -> Result<Vec<ScoredUser>, RecommendError> {
        find_similar_users(
            user_id,
            &self.users,
            &self.user_weights,
            top_k.unwrap_or(self.config.similar_users_k),
            similarity_threshold.unwrap_or(self.config.similarity_threshold),
        )
    }

    /// Anime most similar to `item_id` in the item embedding space
    pub fn find_similar_items(
        &self,
        item_id: ItemId,
        top_k: Option<usize>,
    ) -> Result<Vec<ScoredItem>, RecommendError> {
        find_similar_items(
            item_id,
            &self.items,
            &self.item_weights,
            top_k.unwrap_or(self.config.top_n),
        )
    }

    /// Items the user rated at or above the configured floor, best first
    pub fn get_user_preferences(&self, user_id: UserId) -> Result<Vec<Preference>, RecommendError> {
        get_user_preferences(user_id, &self.ratings, &self.items, self.config.rating_floor)
    }

    /// Collaborative candidates for `user_id` from its embedding neighbours
    pub fn collaborative_candidates(
        &self,
        user_id: UserId,
        preferences: &[Preference],
    ) -> Result<Vec<ScoredItem>, RecommendError> {
        let similar = self.find_similar_users(user_id, None, None)?;
        aggregate(
            user_id,
            &similar,
            preferences,
            &self.ratings,
            &self.items,
            self.config.rating_floor,
        )
    }

    /// Blends collaborative and content candidates into the final ranking
    ///
    /// Fails with `NotFound` when the user has no embedding. Every rated user
    /// is encoded, so that also covers users absent from the rating corpus.
    /// A user without ratings or without similar users still gets a list from
    /// whichever signal remains.
    pub fn hybrid_recommendation(
        &self,
        user_id: UserId,
        weights: Option<BlendWeights>,
        top_n: Option<usize>,
    ) -> Result<Vec<ScoredItem>, RecommendError> {
        let weights = weights.unwrap_or(self.config.weights);
        let top_n = top_n.unwrap_or(self.config.top_n);

        if !self.users.contains(&user_id) {
            return Err(RecommendError::not_found("user", user_id));
        }

        let preferences =
            collect_preferences(user_id, &self.ratings, &self.items, self.config.rating_floor)?;
        let collaborative = self.collaborative_candidates(user_id, &preferences)?;

        let known: HashSet<ItemId> = preferences.iter().map(|p| p.item_id).collect();
        let seeds: Vec<ItemId> = preferences
            .iter()
            .take(self.config.seed_items)
            .map(|p| p.item_id)
            .collect();
        let content = content_candidates(
            self.content.as_ref(),
            &seeds,
            &known,
            self.config.content_neighbors,
        )?;

        let recommendations = blend(&collaborative, &content, weights, top_n);

        tracing::info!(
            user_id = %user_id,
            collaborative = collaborative.len(),
            content = content.len(),
            returned = recommendations.len(),
            "Hybrid recommendation computed"
        );

        Ok(recommendations)
    }
}

fn check_rows(
    table: &'static str,
    encoded: usize,
    weights: &EmbeddingMatrix,
) -> Result<(), RecommendError> {
    if encoded != weights.len() {
        return Err(RecommendError::inconsistent(
            table,
            format!(
                "encoding table has {} ids but embedding matrix has {} rows",
                encoded,
                weights.len()
            ),
        ));
    }
    Ok(())
}
