use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use regex::Regex;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, USER_AGENT,
};
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

use crate::config::ScraperConfig;
use crate::utils::error::{AppError, Result};

/// Price selectors tried in order. Update this list when a supported store
/// changes its page structure.
static PRICE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        ".product-price .price",
        ".productPrice",
        ".skuBestPrice",
        ".valor-por",
        ".price-current",
        r#"[data-testid="price"]"#,
        ".price",
        ".product-page-price",
        ".instant-price",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

/// Title selectors tried in order once a price has been found.
static TITLE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "h1.product-name",
        ".productName",
        ".product-title",
        r#"[data-testid="product-title"]"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

static NON_PRICE_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\d,]").unwrap());

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
];

/// What a product page yielded. Ephemeral: immediately folded into the
/// product table and a history row, never persisted as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub price: Decimal,
    pub product_name: String,
    pub url: String,
    pub date: DateTime<Utc>,
    pub timestamp: i64,
}

/// Per-selector outcome. A match whose text fails numeric parsing is kept
/// distinct from no match at all; the chain continues past both.
#[derive(Debug, PartialEq)]
enum SelectorOutcome {
    NoMatch,
    Unparsable,
    Price(Decimal),
}

pub struct PriceExtractor {
    client: reqwest::Client,
}

impl PriceExtractor {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch a product page and try to read its price and name.
    ///
    /// `Ok(None)` means the page was fetched but no selector yielded a
    /// numeric price, which is a user-facing condition rather than an
    /// error. Timeouts and other network/HTTP failures come back as
    /// `AppError::FetchTimeout` and `AppError::Fetch`. Each call is a
    /// fresh fetch; there are no retries and failures are not cached.
    pub async fn extract(&self, url: &str) -> Result<Option<Extraction>> {
        tracing::debug!("Fetching product page: {}", url);

        let response = self
            .client
            .get(url)
            .headers(request_headers())
            .send()
            .await
            .map_err(AppError::from_fetch)?
            .error_for_status()
            .map_err(AppError::from_fetch)?;

        let body = response.text().await.map_err(AppError::from_fetch)?;
        Ok(parse_page(&body, url))
    }
}

fn parse_page(body: &str, url: &str) -> Option<Extraction> {
    let document = Html::parse_document(body);

    let price = find_price(&document)?;
    let product_name = find_title(&document).unwrap_or_else(|| name_from_url(url));
    let date = Utc::now();

    Some(Extraction {
        price,
        product_name,
        url: url.to_string(),
        timestamp: date.timestamp(),
        date,
    })
}

fn find_price(document: &Html) -> Option<Decimal> {
    for selector in PRICE_SELECTORS.iter() {
        match try_price_selector(document, selector) {
            SelectorOutcome::Price(price) => return Some(price),
            // Both a missing element and a malformed match move on to the
            // next selector in the list.
            SelectorOutcome::NoMatch | SelectorOutcome::Unparsable => continue,
        }
    }
    None
}

fn try_price_selector(document: &Html, selector: &Selector) -> SelectorOutcome {
    let Some(element) = document.select(selector).next() else {
        return SelectorOutcome::NoMatch;
    };

    let text = element.text().collect::<Vec<_>>().join(" ");
    match normalize_price(text.trim()) {
        Some(price) => SelectorOutcome::Price(price),
        None => SelectorOutcome::Unparsable,
    }
}

fn find_title(document: &Html) -> Option<String> {
    for selector in TITLE_SELECTORS.iter() {
        if let Some(element) = document.select(selector).next() {
            let text = element
                .text()
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Reduce a price string to a decimal: drop everything that is not a digit
/// or a comma, then treat the comma as the decimal separator.
/// `"R$ 1.234,56"` becomes `1234.56`. Returns `None` when nothing numeric
/// remains or the residue does not parse.
pub fn normalize_price(text: &str) -> Option<Decimal> {
    let cleaned = NON_PRICE_CHARS.replace_all(text, "").replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Synthesize a product name from the URL's last path segment when no title
/// selector matches: hyphens become spaces, words are title-cased.
pub fn name_from_url(url: &str) -> String {
    let slug = Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(String::from))
                .or_else(|| parsed.host_str().map(String::from))
        })
        .unwrap_or_else(|| url.to_string());

    title_case(&slug)
}

fn title_case(slug: &str) -> String {
    slug.split(['-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn request_headers() -> HeaderMap {
    let mut rng = rand::thread_rng();
    let agent = USER_AGENTS.choose(&mut rng).copied().unwrap_or(USER_AGENTS[0]);

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(agent));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        "Upgrade-Insecure-Requests",
        HeaderValue::from_static("1"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn decimal(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[rstest]
    #[case("R$ 1.234,56", "1234.56")]
    #[case("99,90", "99.90")]
    #[case("R$ 49,00", "49.00")]
    #[case("Por: R$ 2.199,99 à vista", "2199.99")]
    #[case("1500", "1500")]
    fn test_normalize_price(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_price(input), Some(decimal(expected)));
    }

    #[rstest]
    #[case("Consulte")]
    #[case("")]
    #[case("R$ --")]
    fn test_normalize_price_rejects_non_numeric(#[case] input: &str) {
        assert_eq!(normalize_price(input), None);
    }

    #[test]
    fn test_normalize_price_rejects_multiple_commas() {
        // "1,234,56" cleans to "1.234.56", which is not a number
        assert_eq!(normalize_price("1,234,56"), None);
    }

    #[test]
    fn test_fallback_continues_past_unparsable_matches() {
        // First two selectors match non-numeric text; the third holds the price
        let html = r#"
            <html><body>
                <div class="product-price"><span class="price">Consulte</span></div>
                <div class="productPrice">Indisponível</div>
                <div class="skuBestPrice">99,90</div>
            </body></html>
        "#;

        let extraction = parse_page(html, "https://loja.example.com.br/produto-teste").unwrap();
        assert_eq!(extraction.price, decimal("99.90"));
    }

    #[test]
    fn test_no_matching_selector_yields_none() {
        let html = r#"
            <html><body>
                <div class="unrelated">R$ 10,00</div>
            </body></html>
        "#;

        assert!(parse_page(html, "https://loja.example.com.br/produto").is_none());
    }

    #[test]
    fn test_title_taken_from_first_matching_selector() {
        let html = r#"
            <html><body>
                <div class="price">R$ 59,90</div>
                <h1 class="product-name">  Cafeteira Elétrica 127V  </h1>
                <div class="product-title">Ignored</div>
            </body></html>
        "#;

        let extraction = parse_page(html, "https://loja.example.com.br/cafeteira").unwrap();
        assert_eq!(extraction.product_name, "Cafeteira Elétrica 127V");
        assert_eq!(extraction.price, decimal("59.90"));
    }

    #[test]
    fn test_title_synthesized_from_url_when_no_selector_matches() {
        let html = r#"<html><body><div class="price">199,00</div></body></html>"#;

        let url = "https://loja.example.com.br/categoria/tenis-corrida-azul";
        let extraction = parse_page(html, url).unwrap();
        assert_eq!(extraction.product_name, "Tenis Corrida Azul");
        assert_eq!(extraction.url, url);
        assert_eq!(extraction.timestamp, extraction.date.timestamp());
    }

    #[rstest]
    #[case("https://loja.example.com.br/tenis-corrida-azul", "Tenis Corrida Azul")]
    #[case("https://loja.example.com.br/categoria/panela-inox/", "Panela Inox")]
    #[case("https://loja.example.com.br/", "Loja.example.com.br")]
    fn test_name_from_url(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(name_from_url(url), expected);
    }

    #[test]
    fn test_request_headers_look_like_a_browser() {
        let headers = request_headers();

        let agent = headers.get(USER_AGENT).unwrap().to_str().unwrap();
        assert!(USER_AGENTS.contains(&agent));
        assert!(headers
            .get(ACCEPT_LANGUAGE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("pt-BR"));
        assert_eq!(headers.get("Upgrade-Insecure-Requests").unwrap(), "1");
    }

    #[test]
    fn test_selector_outcomes_are_distinct() {
        let html = r#"
            <html><body>
                <div class="skuBestPrice">sob consulta</div>
            </body></html>
        "#;
        let document = Html::parse_document(html);

        assert_eq!(
            try_price_selector(&document, &PRICE_SELECTORS[2]),
            SelectorOutcome::Unparsable
        );
        assert_eq!(
            try_price_selector(&document, &PRICE_SELECTORS[0]),
            SelectorOutcome::NoMatch
        );
    }
}
