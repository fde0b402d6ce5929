use std::collections::{HashMap, VecDeque};

use crate::portfolio::{Transaction, TxKind, QUANTITY_EPSILON};

/// An open purchase layer. `quantity` is what is left of the original buy
/// after earlier sells consumed the front of the queue; `price` is the unit
/// cost at acquisition and never changes.
#[derive(Copy, Clone, Debug)]
pub struct Lot {
    pub quantity: f64,
    pub price: f64,
}

/// Per-asset lot queue plus the realized PnL accumulated by sells so far.
pub struct AssetBook {
    lots: VecDeque<Lot>,
    realised: f64,
}

impl AssetBook {
    fn new() -> AssetBook {
        AssetBook {
            lots: VecDeque::new(),
            realised: 0f64,
        }
    }

    fn deposit(&mut self, quantity: f64, price: f64) {
        // newest lot goes to the back; sells consume from the front (FIFO)
        self.lots.push_back(Lot { quantity, price });
    }

    fn withdraw(&mut self, quantity: f64, price: f64) {
        let mut remaining = quantity;
        while remaining > 0f64 {
            let layer = match self.lots.front_mut() {
                Some(layer) => layer,
                // queue ran dry; the unmatched sell quantity is dropped
                None => break,
            };

            // see how much we can take from this layer
            let consumed = remaining.min(layer.quantity);
            self.realised += consumed * (price - layer.price);

            // subtract amount from layer, remove layer if empty
            layer.quantity -= consumed;
            if layer.quantity <= QUANTITY_EPSILON {
                self.lots.pop_front();
            }

            remaining -= consumed;
        }
    }

    /// Units still held across all open lots.
    pub fn open_quantity(&self) -> f64 {
        self.lots.iter().map(|lot| lot.quantity).sum()
    }

    /// Cost basis of the open position: remaining quantity times acquisition
    /// price, summed over all open lots.
    pub fn invested(&self) -> f64 {
        self.lots.iter().map(|lot| lot.quantity * lot.price).sum()
    }

    pub fn realised(&self) -> f64 {
        self.realised
    }

    pub fn lots(&self) -> impl Iterator<Item = &Lot> {
        self.lots.iter()
    }
}

/// End state of a FIFO replay: one book per asset encountered in the
/// transaction set.
pub struct Ledger {
    books: HashMap<String, AssetBook>,
}

impl Ledger {
    /// Replays a transaction set in chronological order. The sort is stable,
    /// so same-day transactions are processed in their original input order.
    pub fn replay(transactions: &[Transaction]) -> Ledger {
        let mut ordered: Vec<&Transaction> = transactions.iter().collect();
        ordered.sort_by_key(|tx| tx.date);

        let mut books: HashMap<String, AssetBook> = HashMap::new();
        for tx in ordered {
            let book = books
                .entry(tx.asset.clone())
                .or_insert_with(AssetBook::new);
            match tx.kind {
                TxKind::Buy => book.deposit(tx.quantity, tx.price),
                TxKind::Sell => book.withdraw(tx.quantity, tx.price),
            }
        }

        Ledger { books }
    }

    pub fn books(&self) -> &HashMap<String, AssetBook> {
        &self.books
    }
}
