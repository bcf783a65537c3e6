use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::models::{PriceObservation, Product};
use crate::utils::error::Result;

const PRODUCTS_FILE: &str = "products.csv";
const HISTORY_DIR: &str = "price_history";

/// Flat-file persistence for the product table and per-product histories.
///
/// The store owns the on-disk representation exclusively; callers keep an
/// in-memory working copy and go through `save_products` on every mutation.
/// There is no locking; the target workload is single-user/local, with at
/// most one writer at a time.
pub struct ProductStore {
    data_dir: PathBuf,
}

impl ProductStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load the tracked-products table. A missing file is an empty table,
    /// never an error.
    pub fn load_products(&self) -> Result<Vec<Product>> {
        let path = self.products_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let mut products = Vec::new();
        for row in reader.deserialize() {
            products.push(row?);
        }
        Ok(products)
    }

    /// Overwrite the whole table with the current in-memory copy.
    pub fn save_products(&self, products: &[Product]) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;

        let mut writer = csv::Writer::from_path(self.products_path())?;
        for product in products {
            writer.serialize(product)?;
        }
        writer.flush()?;

        tracing::debug!("Saved {} products", products.len());
        Ok(())
    }

    /// Load the price history for a URL, oldest first. A missing history
    /// file is an empty history.
    pub fn load_history(&self, url: &str) -> Result<Vec<PriceObservation>> {
        let path = self.history_path(url);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let mut observations = Vec::new();
        for row in reader.deserialize() {
            observations.push(row?);
        }
        Ok(observations)
    }

    /// Append one observation to a URL's history: read the existing rows
    /// (or start empty), add the new one, rewrite the file. Existing rows
    /// are never edited or dropped.
    pub fn append_observation(&self, url: &str, observation: &PriceObservation) -> Result<()> {
        let mut history = self.load_history(url)?;
        history.push(observation.clone());

        fs::create_dir_all(self.history_dir())?;
        let mut writer = csv::Writer::from_path(self.history_path(url))?;
        for row in &history {
            writer.serialize(row)?;
        }
        writer.flush()?;

        tracing::debug!("History for {} now has {} rows", url, history.len());
        Ok(())
    }

    /// Whether a history file exists for this URL. Removing a product keeps
    /// its history file around, so orphans are expected.
    pub fn history_exists(&self, url: &str) -> bool {
        self.history_path(url).exists()
    }

    fn products_path(&self) -> PathBuf {
        self.data_dir.join(PRODUCTS_FILE)
    }

    fn history_dir(&self) -> PathBuf {
        self.data_dir.join(HISTORY_DIR)
    }

    /// History filenames derive deterministically from the URL: a UUIDv5
    /// over the URL namespace is filesystem-safe and collision-resistant,
    /// so two distinct URLs never share a file.
    fn history_path(&self, url: &str) -> PathBuf {
        let id = Uuid::new_v5(&Uuid::NAMESPACE_URL, url.as_bytes()).simple();
        self.history_dir().join(format!("{}.csv", id))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
