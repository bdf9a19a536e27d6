pub mod artifacts;
pub mod collaborative;
pub mod content;
pub mod hybrid;
pub mod preferences;
pub mod ratings;
pub mod recommender;
pub mod similarity;

pub use artifacts::Artifacts;
pub use content::ContentSimilarity;
pub use hybrid::BlendWeights;
pub use preferences::RatingFloor;
pub use recommender::{ContentSource, Recommender, ScoringConfig};
