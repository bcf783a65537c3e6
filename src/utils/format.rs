use rust_decimal::Decimal;

/// Format a price for display using the Brazilian convention:
/// thousands separated by dots, decimals by a comma, e.g. `R$ 1.234,56`.
/// Stored values are never formatted this way; this is display only.
pub fn format_price(price: Decimal) -> String {
    let rounded = price.round_dp(2);
    let as_text = format!("{:.2}", rounded);
    let (integer, fraction) = as_text.split_once('.').unwrap_or((as_text.as_str(), "00"));

    let mut grouped = String::new();
    let digits: Vec<char> = integer.chars().collect();
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*digit);
    }

    format!("R$ {},{}", grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn price(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_small_price() {
        assert_eq!(format_price(price("99.90")), "R$ 99,90");
    }

    #[test]
    fn test_format_with_thousands() {
        assert_eq!(format_price(price("1234.56")), "R$ 1.234,56");
    }

    #[test]
    fn test_format_with_millions() {
        assert_eq!(format_price(price("1234567.89")), "R$ 1.234.567,89");
    }

    #[test]
    fn test_format_pads_cents() {
        assert_eq!(format_price(price("10")), "R$ 10,00");
        assert_eq!(format_price(price("10.5")), "R$ 10,50");
    }

    #[test]
    fn test_format_rounds_to_cents() {
        assert_eq!(format_price(price("19.999")), "R$ 20,00");
    }
}
