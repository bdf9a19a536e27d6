use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use crate::error::RecommendError;

/// Bidirectional mapping between raw entity IDs and dense embedding row indices
///
/// The two directions are exact inverses over the contiguous index range
/// `[0, len)`. Tables are only built through validating constructors.
#[derive(Debug, Clone)]
pub struct EncodingTable<Id> {
    name: &'static str,
    encoded: HashMap<Id, usize>,
    decoded: Vec<Id>,
}

impl<Id> EncodingTable<Id>
where
    Id: Copy + Eq + Hash + Display,
{
    /// Builds a table from raw IDs listed in encoded-index order
    ///
    /// Fails if an ID appears twice, since the reverse mapping would then be lossy.
    pub fn new(name: &'static str, decoded: Vec<Id>) -> Result<Self, RecommendError> {
        let mut encoded = HashMap::with_capacity(decoded.len());
        for (index, id) in decoded.iter().enumerate() {
            if let Some(previous) = encoded.insert(*id, index) {
                return Err(RecommendError::inconsistent(
                    name,
                    format!("id {} encoded at both {} and {}", id, previous, index),
                ));
            }
        }

        Ok(Self {
            name,
            encoded,
            decoded,
        })
    }

    /// Builds a table from separately stored "encoded" and "decoded" maps
    ///
    /// Rejects size mismatches, gaps in the index range and any pair that
    /// does not round-trip.
    pub fn from_maps(
        name: &'static str,
        encoded: HashMap<Id, usize>,
        decoded: HashMap<usize, Id>,
    ) -> Result<Self, RecommendError> {
        if encoded.len() != decoded.len() {
            return Err(RecommendError::inconsistent(
                name,
                format!(
                    "encoded map has {} entries but decoded map has {}",
                    encoded.len(),
                    decoded.len()
                ),
            ));
        }

        let mut ordered = Vec::with_capacity(decoded.len());
        for index in 0..decoded.len() {
            let id = decoded.get(&index).copied().ok_or_else(|| {
                RecommendError::inconsistent(name, format!("index {} missing from decoded map", index))
            })?;
            if encoded.get(&id) != Some(&index) {
                return Err(RecommendError::inconsistent(
                    name,
                    format!("id {} does not round-trip through index {}", id, index),
                ));
            }
            ordered.push(id);
        }

        Self::new(name, ordered)
    }

    /// Encodes raw IDs in first-seen order, skipping repeats
    pub fn from_ids(name: &'static str, ids: impl IntoIterator<Item = Id>) -> Self {
        let mut encoded = HashMap::new();
        let mut decoded = Vec::new();
        for id in ids {
            encoded.entry(id).or_insert_with(|| {
                decoded.push(id);
                decoded.len() - 1
            });
        }

        Self {
            name,
            encoded,
            decoded,
        }
    }

    /// Table name used in error context ("user", "item")
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn encode(&self, id: &Id) -> Option<usize> {
        self.encoded.get(id).copied()
    }

    pub fn decode(&self, index: usize) -> Option<Id> {
        self.decoded.get(index).copied()
    }

    /// Encodes an ID, failing with `NotFound` when it is unknown
    pub fn require(&self, id: &Id) -> Result<usize, RecommendError> {
        self.encode(id)
            .ok_or_else(|| RecommendError::not_found(self.name, id))
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.encoded.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.decoded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoded.is_empty()
    }

    /// Raw IDs in encoded-index order
    pub fn ids(&self) -> &[Id] {
        &self.decoded
    }
}
