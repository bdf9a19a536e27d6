use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    error::RecommendError,
    models::{EmbeddingMatrix, EncodingTable, Item, ItemId, ScoredItem},
    services::{collaborative::ScoreBoard, similarity::find_similar_items},
};

/// A source of item-to-item content similarity
///
/// Implementations answer from a basis independent of the user embeddings
/// (synopsis text, item embeddings). An item the source knows nothing about
/// has no neighbours.
#[cfg_attr(test, mockall::automock)]
pub trait ContentSimilarity: Send + Sync {
    /// Up to `k` items most similar to `item_id`, best first
    fn similar_items(&self, item_id: ItemId, k: usize) -> Result<Vec<ScoredItem>, RecommendError>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// TF-IDF cosine similarity over anime synopses
#[derive(Debug, Clone)]
pub struct SynopsisIndex {
    items: Vec<ItemId>,
    positions: HashMap<ItemId, usize>,
    /// Sparse unit vectors as `(term, weight)` sorted by term
    vectors: Vec<Vec<(usize, f32)>>,
}

impl SynopsisIndex {
    pub fn build(catalog: &[Item]) -> Self {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut documents: Vec<Vec<usize>> = Vec::with_capacity(catalog.len());

        for item in catalog {
            let terms = item
                .synopsis
                .as_deref()
                .map(tokenize)
                .unwrap_or_default()
                .into_iter()
                .map(|token| {
                    let next = vocabulary.len();
                    *vocabulary.entry(token).or_insert(next)
                })
                .collect();
            documents.push(terms);
        }

        let mut document_frequency = vec![0usize; vocabulary.len()];
        for terms in &documents {
            let unique: HashSet<usize> = terms.iter().copied().collect();
            for term in unique {
                document_frequency[term] += 1;
            }
        }

        let n_documents = documents.len() as f32;
        let idf: Vec<f32> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n_documents) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        let vectors = documents
            .iter()
            .map(|terms| weigh(terms, &idf))
            .collect();

        let items: Vec<ItemId> = catalog.iter().map(|item| item.id).collect();
        let positions = items
            .iter()
            .enumerate()
            .map(|(position, id)| (*id, position))
            .collect();

        tracing::info!(
            items = items.len(),
            vocabulary = vocabulary.len(),
            "Built synopsis index"
        );

        Self {
            items,
            positions,
            vectors,
        }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Term-frequency times IDF, scaled to unit length
fn weigh(terms: &[usize], idf: &[f32]) -> Vec<(usize, f32)> {
    if terms.is_empty() {
        return Vec::new();
    }

    let mut counts: HashMap<usize, usize> = HashMap::new();
    for &term in terms {
        *counts.entry(term).or_default() += 1;
    }

    let total = terms.len() as f32;
    let mut vector: Vec<(usize, f32)> = counts
        .into_iter()
        .map(|(term, count)| (term, count as f32 / total * idf[term]))
        .collect();
    vector.sort_by_key(|&(term, _)| term);

    let norm = vector.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    for (_, weight) in vector.iter_mut() {
        *weight /= norm;
    }
    vector
}

fn sparse_dot(a: &[(usize, f32)], b: &[(usize, f32)]) -> f32 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

impl ContentSimilarity for SynopsisIndex {
    fn similar_items(&self, item_id: ItemId, k: usize) -> Result<Vec<ScoredItem>, RecommendError> {
        let Some(&position) = self.positions.get(&item_id) else {
            return Ok(Vec::new());
        };
        let query = &self.vectors[position];
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut ranked: Vec<ScoredItem> = Vec::new();
        for (other, vector) in self.vectors.iter().enumerate() {
            if other == position {
                continue;
            }
            let score = sparse_dot(query, vector);
            if score.is_nan() {
                return Err(RecommendError::Computation(format!(
                    "NaN synopsis similarity between items {} and {}",
                    item_id, self.items[other]
                )));
            }
            if score > 0.0 {
                ranked.push(ScoredItem {
                    item_id: self.items[other],
                    score,
                });
            }
        }

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(k);
        Ok(ranked)
    }

    fn name(&self) -> &'static str {
        "synopsis"
    }
}

/// Content similarity taken from the trained item embeddings
#[derive(Debug, Clone)]
pub struct EmbeddingContentIndex {
    items: Arc<EncodingTable<ItemId>>,
    weights: Arc<EmbeddingMatrix>,
}

impl EmbeddingContentIndex {
    pub fn new(items: Arc<EncodingTable<ItemId>>, weights: Arc<EmbeddingMatrix>) -> Self {
        Self { items, weights }
    }
}

impl ContentSimilarity for EmbeddingContentIndex {
    fn similar_items(&self, item_id: ItemId, k: usize) -> Result<Vec<ScoredItem>, RecommendError> {
        if !self.items.contains(&item_id) {
            return Ok(Vec::new());
        }
        find_similar_items(item_id, &self.items, &self.weights, k)
    }

    fn name(&self) -> &'static str {
        "embedding"
    }
}

/// Looks up content neighbours for every seed and merges them into one ranking
///
/// A candidate reached from several seeds keeps its best similarity. Seeds and
/// `exclude` never appear in the output.
pub fn content_candidates(
    source: &dyn ContentSimilarity,
    seeds: &[ItemId],
    exclude: &HashSet<ItemId>,
    per_seed: usize,
) -> Result<Vec<ScoredItem>, RecommendError> {
    let mut board = ScoreBoard::default();

    for seed in seeds {
        for neighbour in source.similar_items(*seed, per_seed)? {
            if neighbour.item_id == *seed
                || seeds.contains(&neighbour.item_id)
                || exclude.contains(&neighbour.item_id)
            {
                continue;
            }
            board.keep_max(neighbour.item_id, neighbour.score);
        }
    }

    let ranked = board.into_ranked();

    tracing::debug!(
        source = source.name(),
        seeds = seeds.len(),
        candidates = ranked.len(),
        "Collected content candidates"
    );

    Ok(ranked)
}
