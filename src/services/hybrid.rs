use std::collections::HashMap;

use serde::Serialize;

use crate::models::{ItemId, ScoredItem};

/// Weights applied to each signal when blending
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlendWeights {
    pub collaborative: f32,
    pub content: f32,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            collaborative: 0.5,
            content: 0.5,
        }
    }
}

struct Blended {
    item_id: ItemId,
    score: f32,
    collaborative_rank: usize,
    content_rank: usize,
}

/// Merges the collaborative and content rankings into the final list
///
/// An item present in only one list keeps that list's weighted score; it is
/// not penalized for being absent from the other. Ties fall back to the
/// collaborative rank, then the content rank.
pub fn blend(
    collaborative: &[ScoredItem],
    content: &[ScoredItem],
    weights: BlendWeights,
    top_n: usize,
) -> Vec<ScoredItem> {
    let mut merged: Vec<Blended> = Vec::with_capacity(collaborative.len() + content.len());
    let mut positions: HashMap<ItemId, usize> = HashMap::new();

    for (rank, candidate) in collaborative.iter().enumerate() {
        positions.insert(candidate.item_id, merged.len());
        merged.push(Blended {
            item_id: candidate.item_id,
            score: weights.collaborative * candidate.score,
            collaborative_rank: rank,
            content_rank: usize::MAX,
        });
    }

    for (rank, candidate) in content.iter().enumerate() {
        let contribution = weights.content * candidate.score;
        match positions.get(&candidate.item_id) {
            Some(&position) => {
                let entry = &mut merged[position];
                entry.score += contribution;
                entry.content_rank = rank;
            }
            None => {
                positions.insert(candidate.item_id, merged.len());
                merged.push(Blended {
                    item_id: candidate.item_id,
                    score: contribution,
                    collaborative_rank: usize::MAX,
                    content_rank: rank,
                });
            }
        }
    }

    merged.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.collaborative_rank.cmp(&b.collaborative_rank))
            .then(a.content_rank.cmp(&b.content_rank))
    });

    merged
        .into_iter()
        .take(top_n)
        .map(|b| ScoredItem {
            item_id: b.item_id,
            score: b.score,
        })
        .collect()
}
