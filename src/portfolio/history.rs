use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::portfolio::summary::{compute_summary, compute_totals};
use crate::portfolio::Transaction;

/// Portfolio state as of the end of one calendar month, valued at today's
/// prices. Using present-day prices for past months is a deliberate
/// approximation; the history answers "how did my position grow", not "what
/// was it worth back then".
#[derive(Clone, Debug, Serialize)]
pub struct MonthlyRecord {
    pub month: String,
    pub invested: f64,
    pub value: f64,
    pub realised: f64,
    pub unrealised: f64,
    pub pnl: f64,
    /// Estimated period return in percent, adjusted for cost basis added or
    /// removed during the month. Zero for the first month and whenever the
    /// prior portfolio value was zero.
    #[serde(rename = "return")]
    pub return_pct: f64,
}

fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Builds one record per distinct month in the transaction set, ascending.
/// Each month replays the cumulative transaction subset from scratch against
/// the current price map.
pub fn compute_monthly_history(
    transactions: &[Transaction],
    prices: &HashMap<String, f64>,
) -> Vec<MonthlyRecord> {
    // lexicographic order of YYYY-MM keys is chronological order
    let mut months: Vec<String> = transactions.iter().map(|tx| month_key(tx.date)).collect();
    months.sort();
    months.dedup();

    let mut history = Vec::with_capacity(months.len());
    let mut prev_portfolio_value = 0f64;
    let mut prev_invested = 0f64;

    for month in months {
        let subset: Vec<Transaction> = transactions
            .iter()
            .filter(|tx| month_key(tx.date) <= month)
            .cloned()
            .collect();

        let summary = compute_summary(&subset, prices);
        let totals = compute_totals(&summary);

        // open position market value plus profit already locked in
        let portfolio_value = totals.value + totals.realised;

        // net new cost basis this month; goes negative when sells shrink the
        // open position
        let new_contrib = totals.invested - prev_invested;

        let return_pct = match prev_portfolio_value > 0f64 {
            true => {
                (portfolio_value - prev_portfolio_value - new_contrib) / prev_portfolio_value
                    * 100f64
            }
            false => 0f64,
        };

        history.push(MonthlyRecord {
            month,
            invested: totals.invested,
            value: totals.value,
            realised: totals.realised,
            unrealised: totals.unrealised,
            pnl: totals.pnl,
            return_pct,
        });

        prev_portfolio_value = portfolio_value;
        prev_invested = totals.invested;
    }

    history
}
