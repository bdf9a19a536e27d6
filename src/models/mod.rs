use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod embedding;
pub mod encoding;

pub use embedding::EmbeddingMatrix;
pub use encoding::EncodingTable;

/// Raw external identifier of a user, as it appears in the rating export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Raw external identifier of an anime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single historical rating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    #[serde(rename = "anime_id")]
    pub item_id: ItemId,
    pub rating: f32,
}

impl Rating {
    pub fn new(user_id: u64, item_id: u64, rating: f32) -> Self {
        Self {
            user_id: UserId(user_id),
            item_id: ItemId(item_id),
            rating,
        }
    }
}

/// Catalog entry for an anime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
}

impl Item {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: ItemId(id),
            name: name.into(),
            genres: Vec::new(),
            synopsis: None,
        }
    }

    pub fn with_genres(mut self, genres: &[&str]) -> Self {
        self.genres = genres.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn with_synopsis(mut self, synopsis: impl Into<String>) -> Self {
        self.synopsis = Some(synopsis.into());
        self
    }
}

/// A user paired with its cosine similarity to a query user
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredUser {
    pub user_id: UserId,
    pub similarity: f32,
}

/// A recommendation candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredItem {
    pub item_id: ItemId,
    pub score: f32,
}

/// An item a user rated at or above their rating floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preference {
    pub item_id: ItemId,
    pub rating: f32,
}
