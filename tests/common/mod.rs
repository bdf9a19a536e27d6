#![allow(dead_code)]

use anime_recommender::{
    models::{EmbeddingMatrix, EncodingTable, Item, ItemId, Rating, UserId},
    services::{Artifacts, BlendWeights, ContentSource, RatingFloor, ScoringConfig},
};

pub const A: UserId = UserId(1);
pub const B: UserId = UserId(2);
pub const C: UserId = UserId(3);
/// Has an embedding but no ratings
pub const D: UserId = UserId(4);

pub const X: ItemId = ItemId(10);
pub const Y: ItemId = ItemId(11);
pub const Z: ItemId = ItemId(12);
pub const W: ItemId = ItemId(13);
pub const Q: ItemId = ItemId(14);

/// Users with sim(A,B) = 0.9, sim(A,C) = 0.1, sim(A,D) = 0
///
/// A rated X=5 and Y=2; B rated X=4 and Z=5; C rated W=5.
pub fn artifacts() -> Artifacts {
    let b = (1.0f32 - 0.81).sqrt();
    let c = (1.0f32 - 0.01).sqrt();

    Artifacts {
        users: EncodingTable::new("user", vec![A, B, C, D]).unwrap(),
        items: EncodingTable::new("item", vec![X, Y, Z, W, Q]).unwrap(),
        user_weights: EmbeddingMatrix::from_rows(
            "user",
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.9, b, 0.0],
                vec![0.1, 0.0, c],
                vec![0.0, 1.0, 0.0],
            ],
        )
        .unwrap(),
        item_weights: EmbeddingMatrix::from_rows(
            "item",
            vec![
                vec![1.0, 0.1],
                vec![0.2, 1.0],
                vec![0.7, 0.7],
                vec![-1.0, 0.3],
                vec![0.9, 0.2],
            ],
        )
        .unwrap(),
        ratings: vec![
            Rating::new(1, 10, 5.0),
            Rating::new(1, 11, 2.0),
            Rating::new(2, 10, 4.0),
            Rating::new(2, 12, 5.0),
            Rating::new(3, 13, 5.0),
        ],
        catalog: vec![
            Item::new(10, "Cowboy Bebop")
                .with_genres(&["Action", "Sci-Fi"])
                .with_synopsis("Space cowboys hunt bounties across the solar system"),
            Item::new(11, "School Days").with_synopsis("A school romance"),
            Item::new(12, "Trigun")
                .with_genres(&["Action"])
                .with_synopsis("A gunman with a bounty on his head wanders a desert planet"),
            Item::new(13, "Mushishi").with_synopsis("A wanderer studies mysterious lifeforms"),
            Item::new(14, "Space Dandy")
                .with_genres(&["Comedy", "Sci-Fi"])
                .with_synopsis("Alien hunting space cowboys chase bounties"),
        ],
    }
}

pub fn scoring() -> ScoringConfig {
    ScoringConfig {
        similar_users_k: 5,
        similarity_threshold: 0.4,
        rating_floor: RatingFloor::Absolute(4.0),
        seed_items: 3,
        content_neighbors: 5,
        weights: BlendWeights {
            collaborative: 0.7,
            content: 0.3,
        },
        top_n: 10,
        content_source: ContentSource::Synopsis,
    }
}
