use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize};

use crate::models::{EmbeddingMatrix, EncodingTable, Item, ItemId, Rating, UserId};

pub const USER_ENCODING_FILE: &str = "user_encoding.json";
pub const ITEM_ENCODING_FILE: &str = "item_encoding.json";
pub const USER_WEIGHTS_FILE: &str = "user_weights.json";
pub const ITEM_WEIGHTS_FILE: &str = "item_weights.json";
pub const RATINGS_FILE: &str = "ratings.csv";
pub const CATALOG_FILE: &str = "anime.csv";

/// Everything the training and processing stages hand over to inference
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub users: EncodingTable<UserId>,
    pub items: EncodingTable<ItemId>,
    pub user_weights: EmbeddingMatrix,
    pub item_weights: EmbeddingMatrix,
    pub ratings: Vec<Rating>,
    pub catalog: Vec<Item>,
}

/// Row of the anime catalog export
#[derive(Debug, Deserialize)]
struct CatalogRow {
    anime_id: u64,
    name: String,
    #[serde(default)]
    genres: Option<String>,
    #[serde(default)]
    synopsis: Option<String>,
}

impl From<CatalogRow> for Item {
    fn from(row: CatalogRow) -> Self {
        let genres = row
            .genres
            .map(|g| {
                g.split(',')
                    .map(str::trim)
                    .filter(|genre| !genre.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Item {
            id: ItemId(row.anime_id),
            name: row.name,
            genres,
            synopsis: row.synopsis.filter(|s| !s.trim().is_empty()),
        }
    }
}

impl Artifacts {
    /// Loads the artifact set from `dir`
    ///
    /// The catalog is optional; without it recommendations carry no names and
    /// the synopsis content source has nothing to index.
    pub fn load(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        tracing::info!(dir = %dir.display(), "Loading artifacts");

        let user_ids: Vec<UserId> = read_json(&dir.join(USER_ENCODING_FILE))?;
        let item_ids: Vec<ItemId> = read_json(&dir.join(ITEM_ENCODING_FILE))?;
        let users = EncodingTable::new("user", user_ids)?;
        let items = EncodingTable::new("item", item_ids)?;

        let user_weights =
            EmbeddingMatrix::from_rows("user", read_json(&dir.join(USER_WEIGHTS_FILE))?)?;
        let item_weights =
            EmbeddingMatrix::from_rows("item", read_json(&dir.join(ITEM_WEIGHTS_FILE))?)?;

        let ratings: Vec<Rating> = read_csv(&dir.join(RATINGS_FILE))?;

        let catalog_path = dir.join(CATALOG_FILE);
        let catalog: Vec<Item> = if catalog_path.exists() {
            read_csv::<CatalogRow>(&catalog_path)?
                .into_iter()
                .map(Item::from)
                .collect()
        } else {
            tracing::warn!(path = %catalog_path.display(), "Anime catalog not found, continuing without it");
            Vec::new()
        };

        tracing::info!(
            users = users.len(),
            items = items.len(),
            embedding_dim = user_weights.dim(),
            ratings = ratings.len(),
            catalog = catalog.len(),
            "Artifacts loaded"
        );

        Ok(Self {
            users,
            items,
            user_weights,
            item_weights,
            ratings,
            catalog,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    reader
        .deserialize()
        .enumerate()
        .map(|(line, record)| {
            record.with_context(|| format!("Invalid record {} in {}", line + 1, path.display()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_fixture(dir: &Path) {
        fs::write(dir.join(USER_ENCODING_FILE), "[11880, 7]").unwrap();
        fs::write(dir.join(ITEM_ENCODING_FILE), "[1, 5]").unwrap();
        fs::write(dir.join(USER_WEIGHTS_FILE), "[[3.0, 4.0], [1.0, 0.0]]").unwrap();
        fs::write(dir.join(ITEM_WEIGHTS_FILE), "[[0.0, 2.0], [1.0, 1.0]]").unwrap();
        fs::write(
            dir.join(RATINGS_FILE),
            "user_id,anime_id,rating,watching_status\n11880,1,9,2\n7,5,6,2\n",
        )
        .unwrap();
    }

    #[test]
    fn test_load_without_catalog() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());

        let artifacts = Artifacts::load(dir.path()).unwrap();
        assert_eq!(artifacts.users.encode(&UserId(7)), Some(1));
        assert_eq!(artifacts.items.len(), 2);
        assert_eq!(artifacts.ratings, vec![Rating::new(11880, 1, 9.0), Rating::new(7, 5, 6.0)]);
        assert!((artifacts.user_weights.row(0).unwrap()[0] - 0.6).abs() < 1e-6);
        assert!(artifacts.catalog.is_empty());
    }

    #[test]
    fn test_load_catalog_splits_genres() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        fs::write(
            dir.path().join(CATALOG_FILE),
            "anime_id,name,genres,synopsis\n1,Cowboy Bebop,\"Action, Sci-Fi, Space\",Bounty hunters in space\n5,Trigun,Action,\n",
        )
        .unwrap();

        let artifacts = Artifacts::load(dir.path()).unwrap();
        assert_eq!(artifacts.catalog.len(), 2);
        assert_eq!(artifacts.catalog[0].genres, vec!["Action", "Sci-Fi", "Space"]);
        assert_eq!(
            artifacts.catalog[0].synopsis.as_deref(),
            Some("Bounty hunters in space")
        );
        assert_eq!(artifacts.catalog[1].synopsis, None);
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Artifacts::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains(USER_ENCODING_FILE));
    }

    #[test]
    fn test_duplicate_encoding_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        fs::write(dir.path().join(USER_ENCODING_FILE), "[7, 7]").unwrap();
        assert!(Artifacts::load(dir.path()).is_err());
    }
}
