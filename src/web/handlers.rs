use axum::{extract::State, Form};
use serde::Deserialize;

use super::views::{product_view, DashboardTemplate, Flash, ProductView};
use super::AppState;
use crate::utils::error::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct UrlForm {
    pub url: String,
}

/// GET / - the dashboard: add form plus one card per tracked product.
pub async fn dashboard_page(State(state): State<AppState>) -> Result<DashboardTemplate> {
    render_dashboard(&state, None).await
}

/// POST /products - track a new URL. Every failure becomes a flash message
/// on the re-rendered dashboard; the table only changes on success.
pub async fn add_product(
    State(state): State<AppState>,
    Form(form): Form<UrlForm>,
) -> Result<DashboardTemplate> {
    let url = form.url.trim().to_string();

    let flash = {
        let mut table = state.products.lock().await;
        match state.manager.add_product(&mut table, &url).await {
            Ok(Some(product)) => Flash::success(format!(
                "Produto adicionado com sucesso: {}",
                product.product_name
            )),
            Ok(None) => Flash::error("Não foi possível encontrar o preço do produto."),
            Err(e) => {
                tracing::error!("Add failed for {}: {}", url, e);
                Flash::error(format!("Erro ao adicionar produto: {}", e))
            }
        }
    };

    render_dashboard(&state, Some(flash)).await
}

/// POST /products/update - re-check one product's price.
pub async fn refresh_product(
    State(state): State<AppState>,
    Form(form): Form<UrlForm>,
) -> Result<DashboardTemplate> {
    let flash = {
        let mut table = state.products.lock().await;
        match state.manager.refresh_product(&mut table, &form.url).await {
            Ok(Some(_)) => Flash::success("Preço atualizado!"),
            Ok(None) => Flash::error("Não foi possível encontrar o preço do produto."),
            Err(e) => {
                tracing::error!("Refresh failed for {}: {}", form.url, e);
                Flash::error(format!("Erro ao atualizar preço: {}", e))
            }
        }
    };

    render_dashboard(&state, Some(flash)).await
}

/// POST /products/remove - stop tracking. The history file stays on disk.
pub async fn remove_product(
    State(state): State<AppState>,
    Form(form): Form<UrlForm>,
) -> Result<DashboardTemplate> {
    let flash = {
        let mut table = state.products.lock().await;
        match state.manager.remove_product(&mut table, &form.url) {
            Ok(_) => Flash::success("Produto removido!"),
            Err(e) => {
                tracing::error!("Remove failed for {}: {}", form.url, e);
                Flash::error(format!("Erro ao remover produto: {}", e))
            }
        }
    };

    render_dashboard(&state, Some(flash)).await
}

async fn render_dashboard(
    state: &AppState,
    flash: Option<Flash>,
) -> Result<DashboardTemplate> {
    let table = state.products.lock().await;

    let mut products: Vec<ProductView> = Vec::with_capacity(table.len());
    for product in table.iter() {
        let history = state
            .manager
            .store()
            .load_history(&product.url)
            .map_err(|e| AppError::Internal(format!("Failed to load history: {}", e)))?;
        products.push(product_view(product, &history));
    }

    Ok(DashboardTemplate { flash, products })
}
