use crate::{
    error::RecommendError,
    models::{EmbeddingMatrix, EncodingTable, ItemId, ScoredItem, ScoredUser, UserId},
};

/// Returns up to `top_k` users closest to `user_id` in embedding space
///
/// Users below `similarity_threshold` and the query user itself are dropped
/// before truncation, so the result may be shorter than `top_k`.
pub fn find_similar_users(
    user_id: UserId,
    users: &EncodingTable<UserId>,
    weights: &EmbeddingMatrix,
    top_k: usize,
    similarity_threshold: f32,
) -> Result<Vec<ScoredUser>, RecommendError> {
    let index = users.require(&user_id)?;
    let neighbours = nearest_rows(index, weights, top_k, similarity_threshold)?;

    neighbours
        .into_iter()
        .map(|(row, similarity)| {
            let user_id = users.decode(row).ok_or_else(|| {
                RecommendError::inconsistent(users.name(), format!("no user encoded at row {}", row))
            })?;
            Ok(ScoredUser {
                user_id,
                similarity,
            })
        })
        .collect()
}

/// Returns up to `top_k` anime closest to `item_id` in embedding space
pub fn find_similar_items(
    item_id: ItemId,
    items: &EncodingTable<ItemId>,
    weights: &EmbeddingMatrix,
    top_k: usize,
) -> Result<Vec<ScoredItem>, RecommendError> {
    let index = items.require(&item_id)?;
    let neighbours = nearest_rows(index, weights, top_k, f32::NEG_INFINITY)?;

    neighbours
        .into_iter()
        .map(|(row, score)| {
            let item_id = items.decode(row).ok_or_else(|| {
                RecommendError::inconsistent(items.name(), format!("no item encoded at row {}", row))
            })?;
            Ok(ScoredItem { item_id, score })
        })
        .collect()
}

/// Ranks every other row by cosine similarity to row `index`
///
/// Ties keep row order.
fn nearest_rows(
    index: usize,
    weights: &EmbeddingMatrix,
    top_k: usize,
    threshold: f32,
) -> Result<Vec<(usize, f32)>, RecommendError> {
    let similarities = weights.similarities(index)?;

    let mut ranked = Vec::with_capacity(similarities.len());
    for (row, &similarity) in similarities.iter().enumerate() {
        if similarity.is_nan() {
            return Err(RecommendError::Computation(format!(
                "NaN similarity between {} rows {} and {}",
                weights.name(),
                index,
                row
            )));
        }
        if row != index && similarity >= threshold {
            ranked.push((row, similarity));
        }
    }

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(top_k);

    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit vectors with sim(A,B) = 0.9 and sim(A,C) = 0.1
    fn fixture() -> (EncodingTable<UserId>, EmbeddingMatrix) {
        let users = EncodingTable::new("user", vec![UserId(1), UserId(2), UserId(3)]).unwrap();
        let b = (1.0f32 - 0.81).sqrt();
        let c = (1.0f32 - 0.01).sqrt();
        let weights = EmbeddingMatrix::from_rows(
            "user",
            vec![vec![1.0, 0.0, 0.0], vec![0.9, b, 0.0], vec![0.1, 0.0, c]],
        )
        .unwrap();
        (users, weights)
    }

    #[test]
    fn test_threshold_filters_neighbours() {
        let (users, weights) = fixture();
        let similar = find_similar_users(UserId(1), &users, &weights, 5, 0.5).unwrap();
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].user_id, UserId(2));
        assert!((similar[0].similarity - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_never_returns_query_user() {
        let (users, weights) = fixture();
        for user in users.ids() {
            let similar = find_similar_users(*user, &users, &weights, 10, -1.0).unwrap();
            assert_eq!(similar.len(), 2);
            assert!(similar.iter().all(|s| s.user_id != *user));
        }
    }

    #[test]
    fn test_scores_non_increasing_and_truncated() {
        let (users, weights) = fixture();
        let similar = find_similar_users(UserId(1), &users, &weights, 1, -1.0).unwrap();
        assert_eq!(similar.len(), 1);

        let similar = find_similar_users(UserId(3), &users, &weights, 10, -1.0).unwrap();
        assert!(similar.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let (users, weights) = fixture();
        let result = find_similar_users(UserId(99), &users, &weights, 5, 0.0);
        assert!(matches!(result, Err(RecommendError::NotFound { entity: "user", .. })));
    }

    #[test]
    fn test_similar_items_excludes_self() {
        let items = EncodingTable::new("item", vec![ItemId(20), ItemId(21), ItemId(22)]).unwrap();
        let weights = EmbeddingMatrix::from_rows(
            "item",
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
        )
        .unwrap();
        let similar = find_similar_items(ItemId(20), &items, &weights, 5).unwrap();
        let ids: Vec<ItemId> = similar.iter().map(|s| s.item_id).collect();
        assert_eq!(ids, vec![ItemId(22), ItemId(21)]);
    }
}
