pub mod history;
pub mod ledger;
pub mod summary;

pub use history::{compute_monthly_history, MonthlyRecord};
pub use ledger::{Ledger, Lot};
pub use summary::{compute_summary, compute_totals, AssetSummary, PortfolioTotals};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Remaining lot quantities at or below this are treated as zero, so that
/// floating-point residue from partial sells does not keep dead lots alive.
pub const QUANTITY_EPSILON: f64 = 1e-8;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxKind {
    Buy,
    Sell,
}

/// A single buy or sell, as supplied by the transaction store. Processing
/// order is determined by `date` alone; same-day transactions keep their
/// original input order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub asset: String,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub price: f64,
    pub quantity: f64,
}
