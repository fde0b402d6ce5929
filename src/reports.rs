use std::collections::HashMap;

use anyhow::{Context, Result};
use csv::Writer;
use serde::Serialize;

use crate::portfolio::{AssetSummary, MonthlyRecord, PortfolioTotals};

/// One exported summary row; same figures as `AssetSummary` with the asset
/// symbol pulled in front so the sheet is self-describing.
#[derive(Debug, Serialize)]
struct SummaryRecord<'a> {
    asset: &'a str,
    quantity: f64,
    invested: f64,
    current_price: f64,
    value: f64,
    realised: f64,
    unrealised: f64,
    pnl: f64,
    cost_avg: f64,
    pnl_percent: Option<f64>,
}

fn summary_rows(summary: &HashMap<String, AssetSummary>) -> Vec<SummaryRecord> {
    let mut assets: Vec<&String> = summary.keys().collect();
    assets.sort();

    assets
        .into_iter()
        .map(|asset| {
            let entry = &summary[asset];
            SummaryRecord {
                asset,
                quantity: entry.quantity,
                invested: entry.invested,
                current_price: entry.current_price,
                value: entry.value,
                realised: entry.realised,
                unrealised: entry.unrealised,
                pnl: entry.pnl,
                cost_avg: entry.cost_avg,
                pnl_percent: entry.pnl_percent,
            }
        })
        .collect()
}

fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{:.2}", value),
        None => "n/a".to_string(),
    }
}

pub fn print_summary(summary: &HashMap<String, AssetSummary>, totals: &PortfolioTotals) {
    println!(
        "{:<8} {:>16} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>10}",
        "asset", "quantity", "invested", "price", "value", "realised", "unrealised", "pnl", "pnl %"
    );
    for row in summary_rows(summary) {
        println!(
            "{:<8} {:>16.8} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>10}",
            row.asset,
            row.quantity,
            row.invested,
            row.current_price,
            row.value,
            row.realised,
            row.unrealised,
            row.pnl,
            format_percent(row.pnl_percent),
        );
    }
    println!(
        "{:<8} {:>16} {:>12.2} {:>12} {:>12.2} {:>12.2} {:>12.2} {:>12.2}",
        "total", "", totals.invested, "", totals.value, totals.realised, totals.unrealised,
        totals.pnl,
    );
}

pub fn print_history(history: &[MonthlyRecord]) {
    println!(
        "{:<8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>10}",
        "month", "invested", "value", "realised", "unrealised", "pnl", "return %"
    );
    for entry in history {
        println!(
            "{:<8} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>10.2}",
            entry.month,
            entry.invested,
            entry.value,
            entry.realised,
            entry.unrealised,
            entry.pnl,
            entry.return_pct,
        );
    }
}

pub fn write_summary(path: &str, summary: &HashMap<String, AssetSummary>) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("unable to write summary file \"{}\"", path))?;
    for row in summary_rows(summary) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_history(path: &str, history: &[MonthlyRecord]) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("unable to write history file \"{}\"", path))?;
    for entry in history {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    Ok(())
}
