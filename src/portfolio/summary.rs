use std::collections::HashMap;

use serde::Serialize;

use crate::portfolio::ledger::Ledger;
use crate::portfolio::Transaction;

/// Snapshot of a single asset's position after replaying all transactions,
/// valued at the current price.
#[derive(Clone, Debug, Serialize)]
pub struct AssetSummary {
    pub quantity: f64,
    pub invested: f64,
    pub current_price: f64,
    pub value: f64,
    pub realised: f64,
    pub unrealised: f64,
    pub pnl: f64,
    pub cost_avg: f64,
    /// `None` when nothing is invested; a return percentage has no meaning
    /// without a cost basis, and callers must render it as "not applicable".
    pub pnl_percent: Option<f64>,
}

/// Derives one summary per asset that appears in the transaction set. Assets
/// missing from the price map are valued at zero. Pure; never fails.
pub fn compute_summary(
    transactions: &[Transaction],
    prices: &HashMap<String, f64>,
) -> HashMap<String, AssetSummary> {
    let ledger = Ledger::replay(transactions);

    let mut summary = HashMap::new();
    for (asset, book) in ledger.books() {
        let quantity = book.open_quantity();
        let invested = book.invested();
        let current_price = prices.get(asset).copied().unwrap_or(0f64);
        let value = current_price * quantity;
        let realised = book.realised();
        let unrealised = value - invested;
        let pnl = realised + unrealised;
        let cost_avg = match quantity > 0f64 {
            true => invested / quantity,
            false => 0f64,
        };
        let pnl_percent = match invested > 0f64 {
            true => Some(pnl / invested * 100f64),
            false => None,
        };

        summary.insert(
            asset.clone(),
            AssetSummary {
                quantity,
                invested,
                current_price,
                value,
                realised,
                unrealised,
                pnl,
                cost_avg,
                pnl_percent,
            },
        );
    }

    summary
}

/// Element-wise sum over all per-asset summaries.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PortfolioTotals {
    pub invested: f64,
    pub value: f64,
    pub realised: f64,
    pub unrealised: f64,
    pub pnl: f64,
}

pub fn compute_totals(summary: &HashMap<String, AssetSummary>) -> PortfolioTotals {
    let mut totals = PortfolioTotals::default();
    for entry in summary.values() {
        totals.invested += entry.invested;
        totals.value += entry.value;
        totals.realised += entry.realised;
        totals.unrealised += entry.unrealised;
        totals.pnl += entry.pnl;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::{Ledger, TxKind};

    fn tx(date: &str, asset: &str, kind: TxKind, price: f64, quantity: f64) -> Transaction {
        Transaction {
            date: date.parse().unwrap(),
            asset: asset.to_string(),
            kind,
            price,
            quantity,
        }
    }

    fn prices(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries
            .iter()
            .map(|(asset, price)| (asset.to_string(), *price))
            .collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn fully_sold_position_keeps_its_realised_history() {
        let transactions = vec![
            tx("2024-01-01", "BTC", TxKind::Buy, 100.0, 1.0),
            tx("2024-02-01", "BTC", TxKind::Sell, 150.0, 1.0),
        ];
        let summary = compute_summary(&transactions, &prices(&[("BTC", 150.0)]));
        let btc = &summary["BTC"];

        assert_close(btc.quantity, 0.0);
        assert_close(btc.invested, 0.0);
        assert_close(btc.value, 0.0);
        assert_close(btc.realised, 50.0);
        assert_close(btc.unrealised, 0.0);
        assert_close(btc.pnl, 50.0);
        assert_close(btc.cost_avg, 0.0);
        assert!(btc.pnl_percent.is_none());
    }

    #[test]
    fn open_position_combines_realised_and_unrealised() {
        let transactions = vec![
            tx("2024-01-01", "BTC", TxKind::Buy, 100.0, 2.0),
            tx("2024-01-15", "BTC", TxKind::Sell, 200.0, 1.0),
        ];
        let summary = compute_summary(&transactions, &prices(&[("BTC", 200.0)]));
        let btc = &summary["BTC"];

        assert_close(btc.quantity, 1.0);
        assert_close(btc.invested, 100.0);
        assert_close(btc.current_price, 200.0);
        assert_close(btc.value, 200.0);
        assert_close(btc.realised, 100.0);
        assert_close(btc.unrealised, 100.0);
        assert_close(btc.pnl, 200.0);
        assert_close(btc.cost_avg, 100.0);
        assert_close(btc.pnl_percent.unwrap(), 200.0);
    }

    #[test]
    fn missing_price_values_the_position_at_zero() {
        let transactions = vec![tx("2024-01-01", "DOGE", TxKind::Buy, 0.1, 1000.0)];
        let summary = compute_summary(&transactions, &HashMap::new());
        let doge = &summary["DOGE"];

        assert_close(doge.current_price, 0.0);
        assert_close(doge.value, 0.0);
        assert_close(doge.invested, 100.0);
        assert_close(doge.unrealised, -100.0);
    }

    #[test]
    fn invested_matches_an_independent_walk_of_the_open_lots() {
        let transactions = vec![
            tx("2024-01-01", "BTC", TxKind::Buy, 100.0, 2.0),
            tx("2024-01-10", "BTC", TxKind::Buy, 120.0, 1.0),
            tx("2024-02-01", "BTC", TxKind::Sell, 150.0, 1.5),
        ];
        let summary = compute_summary(&transactions, &prices(&[("BTC", 150.0)]));

        let ledger = Ledger::replay(&transactions);
        let recomputed: f64 = ledger.books()["BTC"]
            .lots()
            .map(|lot| lot.quantity * lot.price)
            .sum();

        assert_close(summary["BTC"].invested, recomputed);
    }

    #[test]
    fn empty_inputs_produce_an_empty_summary_and_zero_totals() {
        let summary = compute_summary(&[], &HashMap::new());
        assert!(summary.is_empty());

        let totals = compute_totals(&summary);
        assert_close(totals.invested, 0.0);
        assert_close(totals.value, 0.0);
        assert_close(totals.realised, 0.0);
        assert_close(totals.unrealised, 0.0);
        assert_close(totals.pnl, 0.0);
    }

    #[test]
    fn totals_add_up_across_assets() {
        let transactions = vec![
            tx("2024-01-01", "BTC", TxKind::Buy, 100.0, 1.0),
            tx("2024-01-02", "ETH", TxKind::Buy, 10.0, 5.0),
            tx("2024-02-01", "BTC", TxKind::Sell, 150.0, 0.5),
        ];
        let price_map = prices(&[("BTC", 150.0), ("ETH", 8.0)]);
        let summary = compute_summary(&transactions, &price_map);
        let totals = compute_totals(&summary);

        let invested: f64 = summary.values().map(|s| s.invested).sum();
        let value: f64 = summary.values().map(|s| s.value).sum();
        let pnl: f64 = summary.values().map(|s| s.pnl).sum();
        assert_close(totals.invested, invested);
        assert_close(totals.value, value);
        assert_close(totals.pnl, pnl);
    }

    #[test]
    fn summary_is_a_pure_function_of_its_inputs() {
        let transactions = vec![
            tx("2024-01-01", "BTC", TxKind::Buy, 100.0, 1.0),
            tx("2024-02-01", "BTC", TxKind::Sell, 150.0, 0.25),
        ];
        let price_map = prices(&[("BTC", 120.0)]);

        let first = compute_summary(&transactions, &price_map);
        let second = compute_summary(&transactions, &price_map);

        assert_eq!(first.len(), second.len());
        for (asset, a) in &first {
            let b = &second[asset];
            assert_close(a.quantity, b.quantity);
            assert_close(a.invested, b.invested);
            assert_close(a.realised, b.realised);
            assert_close(a.pnl, b.pnl);
        }
    }
}
