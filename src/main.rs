use anyhow::Result;
use tracing::info;

use vigia::config::AppConfig;
use vigia::product_manager::ProductManager;
use vigia::scraper::PriceExtractor;
use vigia::store::ProductStore;
use vigia::web::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vigia=debug".parse()?),
        )
        .init();

    let config = AppConfig::from_env()?;

    let store = ProductStore::new(&config.storage.data_dir);
    let products = store.load_products()?;
    info!("Loaded {} tracked products", products.len());

    let extractor = PriceExtractor::new(&config.scraper)?;
    let manager = ProductManager::new(store, extractor, &config);
    let state = AppState::new(manager, products);

    let app = create_router(state);
    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!(
        "Dashboard listening on http://{}:{}",
        config.server.host, config.server.port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
