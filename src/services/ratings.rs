use std::collections::HashMap;

use crate::{
    error::RecommendError,
    models::{EncodingTable, ItemId, Rating, UserId},
};

/// The historical rating corpus, indexed by user
///
/// Keeps the corpus-wide rating range so contributions can be rescaled
/// to `[0, 1]` regardless of the rating scale the export uses.
#[derive(Debug, Clone)]
pub struct RatingCorpus {
    ratings: Vec<Rating>,
    by_user: HashMap<UserId, Vec<usize>>,
    min: f32,
    max: f32,
}

impl RatingCorpus {
    pub fn new(ratings: Vec<Rating>) -> Result<Self, RecommendError> {
        let mut by_user: HashMap<UserId, Vec<usize>> = HashMap::new();
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;

        for (position, rating) in ratings.iter().enumerate() {
            if !rating.rating.is_finite() {
                return Err(RecommendError::inconsistent(
                    "ratings",
                    format!(
                        "user {} rated item {} with non-finite value",
                        rating.user_id, rating.item_id
                    ),
                ));
            }
            min = min.min(rating.rating);
            max = max.max(rating.rating);
            by_user.entry(rating.user_id).or_default().push(position);
        }

        Ok(Self {
            ratings,
            by_user,
            min,
            max,
        })
    }

    /// Checks that every rating references an encoded user and item
    pub fn validate(
        &self,
        users: &EncodingTable<UserId>,
        items: &EncodingTable<ItemId>,
    ) -> Result<(), RecommendError> {
        for rating in &self.ratings {
            if !users.contains(&rating.user_id) {
                return Err(RecommendError::inconsistent(
                    "ratings",
                    format!("rating references unknown user {}", rating.user_id),
                ));
            }
            if !items.contains(&rating.item_id) {
                return Err(RecommendError::inconsistent(
                    "ratings",
                    format!("rating references unknown item {}", rating.item_id),
                ));
            }
        }
        Ok(())
    }

    /// Ratings of one user in corpus order
    pub fn for_user(&self, user_id: &UserId) -> impl Iterator<Item = &Rating> + '_ {
        self.by_user
            .get(user_id)
            .into_iter()
            .flatten()
            .map(|&position| &self.ratings[position])
    }

    pub fn contains_user(&self, user_id: &UserId) -> bool {
        self.by_user.contains_key(user_id)
    }

    /// Linearly maps a rating onto `[0, 1]` using the corpus-wide range
    ///
    /// A corpus with a single distinct value maps everything to `1.0`.
    pub fn normalize(&self, rating: f32) -> f32 {
        let range = self.max - self.min;
        if range > 0.0 {
            (rating - self.min) / range
        } else {
            1.0
        }
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> RatingCorpus {
        RatingCorpus::new(vec![
            Rating::new(1, 10, 10.0),
            Rating::new(2, 10, 0.0),
            Rating::new(1, 11, 5.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_for_user_keeps_corpus_order() {
        let corpus = corpus();
        let items: Vec<ItemId> = corpus.for_user(&UserId(1)).map(|r| r.item_id).collect();
        assert_eq!(items, vec![ItemId(10), ItemId(11)]);
        assert_eq!(corpus.for_user(&UserId(99)).count(), 0);
    }

    #[test]
    fn test_normalize_uses_corpus_range() {
        let corpus = corpus();
        assert_eq!(corpus.normalize(10.0), 1.0);
        assert_eq!(corpus.normalize(0.0), 0.0);
        assert_eq!(corpus.normalize(5.0), 0.5);
    }

    #[test]
    fn test_normalize_flat_corpus() {
        let corpus = RatingCorpus::new(vec![Rating::new(1, 1, 7.0)]).unwrap();
        assert_eq!(corpus.normalize(7.0), 1.0);
    }

    #[test]
    fn test_nan_rating_rejected() {
        let result = RatingCorpus::new(vec![Rating::new(1, 1, f32::NAN)]);
        assert!(matches!(
            result,
            Err(RecommendError::DataInconsistency { table: "ratings", .. })
        ));
    }

    #[test]
    fn test_validate_unknown_item() {
        let users = EncodingTable::new("user", vec![UserId(1), UserId(2)]).unwrap();
        let items = EncodingTable::new("item", vec![ItemId(10)]).unwrap();
        assert!(corpus().validate(&users, &items).is_err());

        let items = EncodingTable::new("item", vec![ItemId(10), ItemId(11)]).unwrap();
        assert!(corpus().validate(&users, &items).is_ok());
    }
}
