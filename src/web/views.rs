use askama::Template;
use rust_decimal::prelude::ToPrimitive;

use crate::models::{timestamp_format, PriceObservation, Product};
use crate::utils::format::format_price;

const CHART_WIDTH: f64 = 560.0;
const CHART_HEIGHT: f64 = 140.0;
const CHART_MARGIN: f64 = 10.0;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub flash: Option<Flash>,
    pub products: Vec<ProductView>,
}

pub struct Flash {
    pub kind: &'static str,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: "success",
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: "error",
            message: message.into(),
        }
    }
}

pub struct ProductView {
    pub url: String,
    pub name: String,
    pub price_display: String,
    pub last_check_display: String,
    pub chart: Option<ChartView>,
}

/// An inline SVG line chart of a product's full history. Not rendered at
/// all when the history is empty.
pub struct ChartView {
    pub points: String,
    pub min_label: String,
    pub max_label: String,
    pub first_date: String,
    pub last_date: String,
}

pub fn product_view(product: &Product, history: &[PriceObservation]) -> ProductView {
    ProductView {
        url: product.url.clone(),
        name: product.product_name.clone(),
        price_display: format_price(product.last_price),
        last_check_display: product
            .last_check
            .format(timestamp_format::FORMAT)
            .to_string(),
        chart: chart_view(history),
    }
}

fn chart_view(history: &[PriceObservation]) -> Option<ChartView> {
    if history.is_empty() {
        return None;
    }

    let prices: Vec<f64> = history
        .iter()
        .map(|o| o.price.to_f64().unwrap_or(0.0))
        .collect();
    let min = prices.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = if max > min { max - min } else { 1.0 };

    let inner_width = CHART_WIDTH - 2.0 * CHART_MARGIN;
    let inner_height = CHART_HEIGHT - 2.0 * CHART_MARGIN;
    let step = if prices.len() > 1 {
        inner_width / (prices.len() - 1) as f64
    } else {
        0.0
    };

    let mut points = Vec::with_capacity(prices.len().max(2));
    for (i, price) in prices.iter().enumerate() {
        let x = CHART_MARGIN + step * i as f64;
        let y = CHART_MARGIN + (max - price) / span * inner_height;
        points.push(format!("{:.1},{:.1}", x, y));
    }
    if prices.len() == 1 {
        // A single observation still draws as a flat line across the chart
        let y = points[0].split(',').nth(1).unwrap_or("70.0").to_string();
        points.push(format!("{:.1},{}", CHART_WIDTH - CHART_MARGIN, y));
    }

    let first = history.first()?;
    let last = history.last()?;
    Some(ChartView {
        points: points.join(" "),
        min_label: format_price(history.iter().map(|o| o.price).min()?),
        max_label: format_price(history.iter().map(|o| o.price).max()?),
        first_date: first.date.format("%d/%m/%Y").to_string(),
        last_date: last.date.format("%d/%m/%Y").to_string(),
    })
}
