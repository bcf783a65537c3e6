use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::timestamp_format;

/// One row of the tracked-products table. The URL is the unique key;
/// `last_price` and `last_check` are overwritten in place on every
/// successful refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub url: String,
    pub product_name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub last_price: Decimal,
    #[serde(with = "timestamp_format")]
    pub last_check: DateTime<Utc>,
}

impl Product {
    pub fn new(
        url: String,
        product_name: String,
        last_price: Decimal,
        last_check: DateTime<Utc>,
    ) -> Self {
        Self {
            url,
            product_name,
            last_price,
            last_check,
        }
    }

    /// Fold a fresh price reading into the row. The name is kept as first
    /// seen; only price and check time move.
    pub fn record_check(&mut self, price: Decimal, checked_at: DateTime<Utc>) {
        self.last_price = price;
        self.last_check = checked_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn sample() -> Product {
        Product::new(
            "https://loja.example.com.br/tenis-corrida-azul".to_string(),
            "Tenis Corrida Azul".to_string(),
            Decimal::from_str("249.90").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_record_check_overwrites_price_and_time() {
        let mut product = sample();
        let later = Utc.with_ymd_and_hms(2024, 3, 11, 9, 30, 0).unwrap();

        product.record_check(Decimal::from_str("199.90").unwrap(), later);

        assert_eq!(product.last_price, Decimal::from_str("199.90").unwrap());
        assert_eq!(product.last_check, later);
        // Name never changes on refresh
        assert_eq!(product.product_name, "Tenis Corrida Azul");
    }

    #[test]
    fn test_csv_roundtrip() {
        let product = sample();

        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(&product).unwrap();
        let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert!(data.starts_with("url,product_name,last_price,last_check"));

        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let back: Product = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(back, product);
    }
}
