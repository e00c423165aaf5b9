/// CoinGecko response types
use crate::errors::PriceError;
use crate::pricing::types::Quote;
use std::collections::HashMap;

/// `/simple/price` body: `{"bitcoin": {"usd": 50000.0, "usd_24h_change": 2.5}}`
///
/// Field names depend on the requested currency, so each coin decodes into a
/// loose map. CoinGecko sends `null` for unknown changes.
pub type SimplePriceResponse = HashMap<String, HashMap<String, Option<f64>>>;

/// Decode a `/simple/price` body into quotes for `vs_currency`.
///
/// Coins without a usable price field are skipped; a missing 24h change
/// decodes as `0.0`.
pub fn parse_simple_price(body: &str, vs_currency: &str) -> Result<HashMap<String, Quote>, PriceError> {
    let response: SimplePriceResponse = serde_json::from_str(body)
        .map_err(|e| PriceError::MalformedUpstreamResponse(e.to_string()))?;

    let change_key = format!("{}_24h_change", vs_currency);

    let quotes = response
        .into_iter()
        .filter_map(|(id, fields)| {
            let price = fields.get(vs_currency).copied().flatten()?;
            if !price.is_finite() || price < 0.0 {
                return None;
            }
            let change = fields
                .get(&change_key)
                .copied()
                .flatten()
                .filter(|c| c.is_finite())
                .unwrap_or(0.0);
            Some((id, Quote::new(price, change)))
        })
        .collect();

    Ok(quotes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let body = r#"{
            "bitcoin": {"usd": 50000.00, "usd_24h_change": 2.5},
            "ethereum": {"usd": 3000.00, "usd_24h_change": -1.2}
        }"#;

        let quotes = parse_simple_price(body, "usd").unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes["bitcoin"], Quote::new(50000.0, 2.5));
        assert_eq!(quotes["ethereum"], Quote::new(3000.0, -1.2));
    }

    #[test]
    fn test_parse_skips_missing_price_and_defaults_change() {
        let body = r#"{
            "bitcoin": {"usd": 50000.0},
            "ethereum": {"eur": 2800.0, "eur_24h_change": 1.0},
            "solana": {"usd": 150.0, "usd_24h_change": null}
        }"#;

        let quotes = parse_simple_price(body, "usd").unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes["bitcoin"].change_24h_pct, 0.0);
        assert_eq!(quotes["solana"], Quote::new(150.0, 0.0));
        assert!(!quotes.contains_key("ethereum"));
    }

    #[test]
    fn test_parse_other_currency() {
        let body = r#"{"bitcoin": {"eur": 46000.0, "eur_24h_change": 1.1}}"#;
        let quotes = parse_simple_price(body, "eur").unwrap();
        assert_eq!(quotes["bitcoin"], Quote::new(46000.0, 1.1));
    }

    #[test]
    fn test_parse_malformed() {
        let err = parse_simple_price("<html>rate limited</html>", "usd").unwrap_err();
        assert!(matches!(err, PriceError::MalformedUpstreamResponse(_)));

        let err = parse_simple_price(r#"["bitcoin"]"#, "usd").unwrap_err();
        assert!(matches!(err, PriceError::MalformedUpstreamResponse(_)));
    }

    #[test]
    fn test_parse_empty_object() {
        assert!(parse_simple_price("{}", "usd").unwrap().is_empty());
    }
}
