use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::timestamp_format;

/// One row of a per-product history file. Histories are append-only:
/// a row is never edited or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceObservation {
    #[serde(with = "timestamp_format")]
    pub date: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

impl PriceObservation {
    pub fn new(date: DateTime<Utc>, price: Decimal) -> Self {
        Self { date, price }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    #[test]
    fn test_csv_roundtrip() {
        let observation = PriceObservation::new(
            Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap(),
            Decimal::from_str("1234.56").unwrap(),
        );

        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(&observation).unwrap();
        let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert!(data.starts_with("date,price"));
        assert!(data.contains("2024-03-10 12:00:00,1234.56"));

        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let back: PriceObservation = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(back, observation);
    }
}
