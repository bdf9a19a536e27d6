use std::path::PathBuf;

use serde::Deserialize;

use crate::services::{BlendWeights, ContentSource, RatingFloor, ScoringConfig};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding encodings, weights, ratings and the anime catalog
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    /// Number of similar users consulted per request
    #[serde(default = "default_similar_users_k")]
    pub similar_users_k: usize,

    /// Minimum cosine similarity for a user to count as similar
    #[serde(default)]
    pub similarity_threshold: f32,

    /// `percentile:<p>` or `absolute:<x>`
    #[serde(default = "default_rating_floor")]
    pub rating_floor: RatingFloor,

    /// How many of the user's own favourites seed the content lookup
    #[serde(default = "default_seed_items")]
    pub seed_items: usize,

    /// Content neighbours fetched per seed
    #[serde(default = "default_content_neighbors")]
    pub content_neighbors: usize,

    #[serde(default = "default_weight")]
    pub collaborative_weight: f32,

    #[serde(default = "default_weight")]
    pub content_weight: f32,

    /// Length of the hybrid recommendation list
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_content_source")]
    pub content_source: ContentSource,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_similar_users_k() -> usize {
    10
}

fn default_rating_floor() -> RatingFloor {
    RatingFloor::Percentile(75.0)
}

fn default_seed_items() -> usize {
    5
}

fn default_content_neighbors() -> usize {
    10
}

fn default_weight() -> f32 {
    0.5
}

fn default_top_n() -> usize {
    10
}

fn default_content_source() -> ContentSource {
    ContentSource::Synopsis
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the scoring path cannot work with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.similar_users_k == 0 {
            anyhow::bail!("SIMILAR_USERS_K must be at least 1");
        }
        if self.top_n == 0 {
            anyhow::bail!("TOP_N must be at least 1");
        }
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            anyhow::bail!(
                "SIMILARITY_THRESHOLD must lie in [-1, 1], got {}",
                self.similarity_threshold
            );
        }
        for (name, weight) in [
            ("COLLABORATIVE_WEIGHT", self.collaborative_weight),
            ("CONTENT_WEIGHT", self.content_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                anyhow::bail!("{} must be a non-negative number, got {}", name, weight);
            }
        }
        Ok(())
    }

    /// The immutable scoring parameters handed to the recommender
    pub fn scoring(&self) -> ScoringConfig {
        ScoringConfig {
            similar_users_k: self.similar_users_k,
            similarity_threshold: self.similarity_threshold,
            rating_floor: self.rating_floor,
            seed_items: self.seed_items,
            content_neighbors: self.content_neighbors,
            weights: BlendWeights {
                collaborative: self.collaborative_weight,
                content: self.content_weight,
            },
            top_n: self.top_n,
            content_source: self.content_source,
        }
    }
}
