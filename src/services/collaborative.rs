use std::collections::{HashMap, HashSet};

use crate::{
    error::RecommendError,
    models::{EncodingTable, ItemId, Preference, ScoredItem, ScoredUser, UserId},
    services::{
        preferences::{collect_preferences, RatingFloor},
        ratings::RatingCorpus,
    },
};

/// Accumulates scores keyed by item while remembering first-seen order
#[derive(Debug, Default)]
pub(crate) struct ScoreBoard {
    positions: HashMap<ItemId, usize>,
    entries: Vec<ScoredItem>,
}

impl ScoreBoard {
    pub(crate) fn add(&mut self, item_id: ItemId, score: f32) {
        match self.positions.get(&item_id) {
            Some(&position) => self.entries[position].score += score,
            None => self.push(item_id, score),
        }
    }

    pub(crate) fn keep_max(&mut self, item_id: ItemId, score: f32) {
        match self.positions.get(&item_id) {
            Some(&position) => {
                let entry = &mut self.entries[position];
                entry.score = entry.score.max(score);
            }
            None => self.push(item_id, score),
        }
    }

    fn push(&mut self, item_id: ItemId, score: f32) {
        self.positions.insert(item_id, self.entries.len());
        self.entries.push(ScoredItem { item_id, score });
    }

    /// Ranks by score descending; equal scores stay in first-seen order
    pub(crate) fn into_ranked(mut self) -> Vec<ScoredItem> {
        self.entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.entries
    }
}

/// Turns the preferences of similar users into a ranked candidate list
///
/// Each candidate scores `similarity * normalized_rating`, summed over every
/// similar user who prefers it. Items the target already prefers are skipped.
pub fn aggregate(
    target: UserId,
    similar_users: &[ScoredUser],
    target_preferences: &[Preference],
    ratings: &RatingCorpus,
    items: &EncodingTable<ItemId>,
    floor: RatingFloor,
) -> Result<Vec<ScoredItem>, RecommendError> {
    let known: HashSet<ItemId> = target_preferences.iter().map(|p| p.item_id).collect();
    let mut board = ScoreBoard::default();

    for neighbour in similar_users.iter().filter(|n| n.user_id != target) {
        let preferences = collect_preferences(neighbour.user_id, ratings, items, floor)?;

        for preference in preferences {
            if known.contains(&preference.item_id) {
                continue;
            }
            let contribution = neighbour.similarity * ratings.normalize(preference.rating);
            if contribution.is_nan() {
                return Err(RecommendError::Computation(format!(
                    "NaN contribution from user {} for item {}",
                    neighbour.user_id, preference.item_id
                )));
            }
            board.add(preference.item_id, contribution);
        }
    }

    let ranked = board.into_ranked();

    tracing::debug!(
        user_id = %target,
        neighbours = similar_users.len(),
        candidates = ranked.len(),
        "Aggregated collaborative candidates"
    );

    Ok(ranked)
}
