use std::{fmt::Display, str::FromStr};

use serde::Deserialize;

use crate::{
    error::RecommendError,
    models::{EncodingTable, ItemId, Preference, UserId},
    services::ratings::RatingCorpus,
};

/// Minimum rating for an item to count as a positive preference
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub enum RatingFloor {
    /// Fixed cutoff on the raw rating scale
    Absolute(f32),
    /// Percentile (0-100) of the user's own ratings
    Percentile(f32),
}

impl RatingFloor {
    /// Resolves the floor against one user's ratings
    pub fn resolve(&self, ratings: &[f32]) -> f32 {
        match *self {
            RatingFloor::Absolute(value) => value,
            RatingFloor::Percentile(p) => percentile(ratings, p),
        }
    }
}

impl FromStr for RatingFloor {
    type Err = String;

    /// Parses `percentile:<p>` or `absolute:<x>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| format!("expected `percentile:<p>` or `absolute:<x>`, got `{}`", s))?;
        let value: f32 = value
            .trim()
            .parse()
            .map_err(|e| format!("invalid rating floor value `{}`: {}", value, e))?;

        match kind.trim() {
            "percentile" if (0.0..=100.0).contains(&value) => Ok(RatingFloor::Percentile(value)),
            "percentile" => Err(format!("percentile {} outside 0..=100", value)),
            "absolute" if value.is_finite() => Ok(RatingFloor::Absolute(value)),
            "absolute" => Err(format!("absolute floor must be finite, got {}", value)),
            other => Err(format!("unknown rating floor kind `{}`", other)),
        }
    }
}

impl TryFrom<String> for RatingFloor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for RatingFloor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatingFloor::Absolute(value) => write!(f, "absolute:{}", value),
            RatingFloor::Percentile(p) => write!(f, "percentile:{}", p),
        }
    }
}

/// Linear interpolation between closest ranks
fn percentile(values: &[f32], p: f32) -> f32 {
    if values.is_empty() {
        return f32::INFINITY;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);

    let position = (p / 100.0) * (sorted.len() - 1) as f32;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f32;

    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Returns the items a user rated at or above the floor, best first
///
/// Fails with `NotFound` when the user has no ratings at all.
pub fn get_user_preferences(
    user_id: UserId,
    ratings: &RatingCorpus,
    items: &EncodingTable<ItemId>,
    floor: RatingFloor,
) -> Result<Vec<Preference>, RecommendError> {
    if !ratings.contains_user(&user_id) {
        return Err(RecommendError::not_found("ratings for user", user_id));
    }
    collect_preferences(user_id, ratings, items, floor)
}

/// Same as [`get_user_preferences`] but a user without ratings yields an empty list
pub(crate) fn collect_preferences(
    user_id: UserId,
    ratings: &RatingCorpus,
    items: &EncodingTable<ItemId>,
    floor: RatingFloor,
) -> Result<Vec<Preference>, RecommendError> {
    let values: Vec<f32> = ratings.for_user(&user_id).map(|r| r.rating).collect();
    let cutoff = floor.resolve(&values);

    let mut preferences = Vec::new();
    for rating in ratings.for_user(&user_id) {
        if rating.rating < cutoff {
            continue;
        }

        let item_id = items
            .encode(&rating.item_id)
            .and_then(|index| items.decode(index))
            .ok_or_else(|| {
                RecommendError::inconsistent(
                    "ratings",
                    format!("user {} rated unknown item {}", user_id, rating.item_id),
                )
            })?;

        preferences.push(Preference {
            item_id,
            rating: rating.rating,
        });
    }

    // Stable: equal ratings keep corpus order
    preferences.sort_by(|a, b| b.rating.total_cmp(&a.rating));

    tracing::debug!(
        user_id = %user_id,
        cutoff,
        rated = values.len(),
        preferred = preferences.len(),
        "Extracted user preferences"
    );

    Ok(preferences)
}
