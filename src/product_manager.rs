use url::Url;

use crate::config::AppConfig;
use crate::models::{PriceObservation, Product};
use crate::scraper::{Extraction, PriceExtractor};
use crate::store::ProductStore;
use crate::utils::error::{AppError, Result};

/// Orchestrates the add/update/remove flows over an explicit in-memory
/// product table. The table is threaded through every operation by the
/// caller; the manager itself holds no product state between calls.
pub struct ProductManager {
    store: ProductStore,
    extractor: PriceExtractor,
    allowed_domains: Vec<String>,
}

impl ProductManager {
    pub fn new(store: ProductStore, extractor: PriceExtractor, config: &AppConfig) -> Self {
        Self {
            store,
            extractor,
            allowed_domains: config.scraper.allowed_domains.clone(),
        }
    }

    /// Scheme and allow-list check. Runs before any network call; a URL
    /// outside the supported domains never reaches the extractor.
    pub fn validate_url(&self, url: &str) -> Result<()> {
        let parsed = Url::parse(url)
            .map_err(|_| AppError::InvalidUrl("URL must start with http:// or https://".into()))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| AppError::InvalidUrl("URL has no host".into()))?;

        if !self
            .allowed_domains
            .iter()
            .any(|domain| host.contains(domain.as_str()))
        {
            return Err(AppError::InvalidUrl("unsupported domain".into()));
        }

        Ok(())
    }

    /// Add flow: validate, extract, then append a row, persist the table
    /// and write the first history observation. `Ok(None)` means the page
    /// had no recognizable price; the table is left untouched on every
    /// failure path.
    pub async fn add_product(
        &self,
        table: &mut Vec<Product>,
        url: &str,
    ) -> Result<Option<Product>> {
        self.validate_url(url)?;

        if table.iter().any(|p| p.url == url) {
            return Err(AppError::AlreadyTracked(url.to_string()));
        }

        let Some(extraction) = self.extractor.extract(url).await? else {
            tracing::warn!("No price found on {}", url);
            return Ok(None);
        };

        let product = Product::new(
            extraction.url.clone(),
            extraction.product_name.clone(),
            extraction.price,
            extraction.date,
        );

        table.push(product.clone());
        self.persist(table, &extraction)?;

        tracing::info!("Tracking {} at {}", product.product_name, product.last_price);
        Ok(Some(product))
    }

    /// Update flow: re-extract the tracked URL and overwrite the row's
    /// last_price/last_check in place. Prior state survives any failure.
    pub async fn refresh_product(
        &self,
        table: &mut Vec<Product>,
        url: &str,
    ) -> Result<Option<Product>> {
        let index = table
            .iter()
            .position(|p| p.url == url)
            .ok_or_else(|| AppError::NotFound {
                resource: format!("product {}", url),
            })?;

        let Some(extraction) = self.extractor.extract(url).await? else {
            tracing::warn!("No price found on {}", url);
            return Ok(None);
        };

        table[index].record_check(extraction.price, extraction.date);
        let updated = table[index].clone();

        self.persist(table, &extraction)?;

        tracing::info!(
            "Refreshed {} to {}",
            updated.product_name,
            updated.last_price
        );
        Ok(Some(updated))
    }

    /// Remove flow: drop the row and persist the table. The history file
    /// is left on disk as an orphan, not an error condition.
    pub fn remove_product(&self, table: &mut Vec<Product>, url: &str) -> Result<Product> {
        let index = table
            .iter()
            .position(|p| p.url == url)
            .ok_or_else(|| AppError::NotFound {
                resource: format!("product {}", url),
            })?;

        let removed = table.remove(index);
        self.store.save_products(table)?;

        tracing::info!("Stopped tracking {}", removed.product_name);
        Ok(removed)
    }

    fn persist(&self, table: &[Product], extraction: &Extraction) -> Result<()> {
        self.store.save_products(table)?;
        self.store.append_observation(
            &extraction.url,
            &PriceObservation::new(extraction.date, extraction.price),
        )
    }

    pub fn store(&self) -> &ProductStore {
        &self.store
    }
}
