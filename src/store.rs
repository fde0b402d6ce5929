use std::io;

use anyhow::{Context, Result};
use csv::{Reader, Writer};

use crate::portfolio::Transaction;

/// Reads the transaction list from a CSV file with the columns
/// `date,asset,type,price,quantity`. Shape and number validation happens
/// here, at the input boundary; the calculation core trusts what it is
/// handed. Asset symbols are normalized to upper-case.
pub fn load(path: &str) -> Result<Vec<Transaction>> {
    let reader = Reader::from_path(path)
        .with_context(|| format!("unable to open transaction file \"{}\"", path))?;
    read_records(reader).with_context(|| format!("malformed transaction file \"{}\"", path))
}

fn read_records<R: io::Read>(mut reader: Reader<R>) -> Result<Vec<Transaction>> {
    let mut transactions = Vec::new();
    for record in reader.deserialize::<Transaction>() {
        let mut tx = record?;
        tx.asset = tx.asset.to_uppercase();
        transactions.push(tx);
    }
    Ok(transactions)
}

/// Writes the transaction list back out in the same format `load` reads.
pub fn save(path: &str, transactions: &[Transaction]) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("unable to write transaction file \"{}\"", path))?;
    for tx in transactions {
        writer.serialize(tx)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::TxKind;

    fn read(data: &str) -> Result<Vec<Transaction>> {
        read_records(Reader::from_reader(data.as_bytes()))
    }

    #[test]
    fn parses_rows_and_upper_cases_symbols() {
        let data = "\
date,asset,type,price,quantity
2024-01-01,btc,BUY,100.0,1.5
2024-02-01,BTC,SELL,150.0,0.5
";
        let transactions = read(data).unwrap();
        assert_eq!(transactions.len(), 2);

        assert_eq!(transactions[0].asset, "BTC");
        assert_eq!(transactions[0].kind, TxKind::Buy);
        assert_eq!(transactions[0].date, "2024-01-01".parse().unwrap());
        assert!((transactions[0].price - 100.0).abs() < 1e-9);
        assert!((transactions[0].quantity - 1.5).abs() < 1e-9);

        assert_eq!(transactions[1].kind, TxKind::Sell);
    }

    #[test]
    fn an_empty_sheet_is_an_empty_list() {
        let transactions = read("date,asset,type,price,quantity\n").unwrap();
        assert!(transactions.is_empty());
    }

    #[test]
    fn a_non_numeric_price_is_rejected_at_the_boundary() {
        let data = "\
date,asset,type,price,quantity
2024-01-01,BTC,BUY,not-a-number,1.0
";
        assert!(read(data).is_err());
    }

    #[test]
    fn an_unknown_transaction_type_is_rejected() {
        let data = "\
date,asset,type,price,quantity
2024-01-01,BTC,TRANSFER,100.0,1.0
";
        assert!(read(data).is_err());
    }

    #[test]
    fn rows_round_trip_through_the_writer() {
        let original = "\
date,asset,type,price,quantity
2024-01-01,BTC,BUY,100.0,1.5
";
        let transactions = read(original).unwrap();

        let mut writer = Writer::from_writer(Vec::new());
        for tx in &transactions {
            writer.serialize(tx).unwrap();
        }
        let written = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        let reparsed = read(&written).unwrap();
        assert_eq!(reparsed.len(), 1);
        assert_eq!(reparsed[0].asset, "BTC");
        assert_eq!(reparsed[0].kind, TxKind::Buy);
    }
}
