use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, Result};
use log::{debug, warn};
use serde::Deserialize;

const CACHE_FILE_PATH: &str = "data/.price_cache";

#[derive(Deserialize, Debug)]
struct ExchangeRateRecord {
    rate: f64,
}

/// Supplies current prices per asset symbol, quoted in the configured
/// currency. Lookups go: manual override, then local cache, then CoinAPI.
/// Symbols that cannot be resolved are simply left out of the returned map;
/// a lookup failure never propagates to the caller.
pub struct PriceSource {
    price_cache: HashMap<String, f64>,
    api_keys: HashMap<String, String>,
    quote_currency: String,
}

impl PriceSource {
    pub fn new(api_keys: HashMap<String, String>, quote_currency: String) -> PriceSource {
        let mut source = PriceSource {
            price_cache: HashMap::new(),
            api_keys,
            quote_currency,
        };
        if let Err(err) = source.load() {
            debug!("starting with an empty price cache: {}", err);
        }
        source
    }

    pub fn clear(&mut self) {
        self.price_cache.clear();
    }

    /// Resolves a price for each symbol. Overrides take precedence over
    /// cached and fetched values; the result may be partial.
    pub fn fetch(
        &mut self,
        symbols: &[String],
        overrides: &HashMap<String, f64>,
    ) -> HashMap<String, f64> {
        let mut prices = HashMap::new();
        let mut fetched_any = false;

        for symbol in symbols {
            if prices.contains_key(symbol) {
                continue;
            }
            if let Some(price) = overrides.get(symbol) {
                prices.insert(symbol.clone(), *price);
                continue;
            }
            if let Some(price) = self.price_cache.get(symbol) {
                prices.insert(symbol.clone(), *price);
                continue;
            }
            match self.query(symbol) {
                Ok(price) => {
                    self.price_cache.insert(symbol.clone(), price);
                    prices.insert(symbol.clone(), price);
                    fetched_any = true;
                }
                Err(err) => {
                    warn!("price lookup failed for {}: {}", symbol, err);
                }
            }
        }

        if fetched_any {
            if let Err(err) = self.save() {
                warn!("could not save price cache: {}", err);
            }
        }

        prices
    }

    fn query(&self, symbol: &str) -> Result<f64> {
        let api_key = self
            .api_keys
            .get("coinapi")
            .ok_or_else(|| anyhow!("no API key configured for coinapi"))?;

        let url = format!(
            "https://rest.coinapi.io/v1/exchangerate/{asset_id_base}/{asset_id_quote}",
            asset_id_base = symbol,
            asset_id_quote = self.quote_currency
        );

        debug!("running price query: {}/{}", symbol, self.quote_currency);

        let response: ExchangeRateRecord = reqwest::blocking::Client::new()
            .get(&url)
            .header("X-CoinAPI-Key", api_key)
            .send()?
            .error_for_status()?
            .json()?;

        Ok(response.rate)
    }

    fn load(&mut self) -> Result<()> {
        let file = File::open(CACHE_FILE_PATH)?;
        self.price_cache = serde_yaml::from_reader(file)?;
        Ok(())
    }

    fn save(&self) -> Result<()> {
        if let Some(dir) = Path::new(CACHE_FILE_PATH).parent() {
            std::fs::create_dir_all(dir)?;
        }
        serde_yaml::to_writer(&File::create(CACHE_FILE_PATH)?, &self.price_cache)?;
        Ok(())
    }
}
