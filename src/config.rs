use std::collections::HashMap;
use std::fs::File;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_quote_currency() -> String {
    "EUR".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Currency all prices and PnL figures are denominated in.
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,
    /// API keys by provider name, e.g. `coinapi`.
    #[serde(default)]
    pub api_key: HashMap<String, String>,
    /// Prices pinned by hand; these win over anything the price source
    /// fetches or has cached.
    #[serde(default)]
    pub manual_prices: HashMap<String, f64>,
}

impl Config {
    pub fn new(config_path: &str) -> Result<Config> {
        let file = File::open(config_path)
            .with_context(|| format!("unable to open config file \"{}\"", config_path))?;
        let config: Config = serde_yaml::from_reader(file)
            .with_context(|| format!("unable to parse config file \"{}\"", config_path))?;
        Ok(config.normalized())
    }

    // manual price keys follow the same upper-case symbol convention as the
    // transaction store
    fn normalized(mut self) -> Config {
        self.manual_prices = self
            .manual_prices
            .into_iter()
            .map(|(asset, price)| (asset.to_uppercase(), price))
            .collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: Config = serde_yaml::from_str("quote_currency: USD").unwrap();
        assert_eq!(config.quote_currency, "USD");
        assert!(config.api_key.is_empty());
        assert!(config.manual_prices.is_empty());

        let config: Config = serde_yaml::from_str("api_key:\n  coinapi: abc").unwrap();
        assert_eq!(config.quote_currency, "EUR");
        assert_eq!(config.api_key["coinapi"], "abc");
    }

    #[test]
    fn manual_price_symbols_are_upper_cased() {
        let config: Config = serde_yaml::from_str("manual_prices:\n  btc: 100.5").unwrap();
        let config = config.normalized();
        assert_eq!(config.manual_prices["BTC"], 100.5);
    }
}
