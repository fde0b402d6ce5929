use std::process;

use clap::{App, Arg};

use coinfolio::config::Config;
use coinfolio::portfolio::{compute_monthly_history, compute_summary, compute_totals};
use coinfolio::prices::PriceSource;
use coinfolio::{reports, store};

fn main() {
    env_logger::init();

    let matches = App::new("coinfolio")
        .version("0.1.0")
        .about("Tracks crypto buys and sells and derives portfolio analytics")
        .arg(Arg::with_name("input_path")
            .short("i")
            .long("input")
            .takes_value(true)
            .help("Transaction file to process"))
        .arg(Arg::with_name("config_path")
            .short("c")
            .long("config")
            .takes_value(true)
            .help("Config file"))
        .arg(Arg::with_name("summary_path")
            .short("o")
            .long("output")
            .takes_value(true)
            .help("Writes the per-asset summary to this CSV file"))
        .arg(Arg::with_name("history")
            .long("history")
            .takes_value(false)
            .help("Prints the monthly performance history"))
        .arg(Arg::with_name("history_path")
            .long("history-output")
            .takes_value(true)
            .help("Writes the monthly history to this CSV file"))
        .arg(Arg::with_name("clear")
            .long("clear")
            .takes_value(false)
            .help("Clears the price cache"))
        .get_matches();

    let input_path = matches.value_of("input_path").unwrap_or("transactions.csv");
    let conf_path = matches.value_of("config_path").unwrap_or("config.yaml");

    let config = Config::new(conf_path).unwrap_or_else(|err| {
        eprintln!("{:#}", err);
        process::exit(1);
    });

    let transactions = store::load(input_path).unwrap_or_else(|err| {
        eprintln!("{:#}", err);
        process::exit(1);
    });

    let mut symbols: Vec<String> = transactions.iter().map(|tx| tx.asset.clone()).collect();
    symbols.sort();
    symbols.dedup();

    let mut price_source = PriceSource::new(config.api_key.clone(), config.quote_currency.clone());
    if matches.is_present("clear") {
        price_source.clear();
    }
    let prices = price_source.fetch(&symbols, &config.manual_prices);

    let summary = compute_summary(&transactions, &prices);
    let totals = compute_totals(&summary);

    reports::print_summary(&summary, &totals);
    if let Some(path) = matches.value_of("summary_path") {
        if let Err(err) = reports::write_summary(path, &summary) {
            eprintln!("{:#}", err);
            process::exit(1);
        }
    }

    if matches.is_present("history") || matches.is_present("history_path") {
        let history = compute_monthly_history(&transactions, &prices);
        if matches.is_present("history") {
            println!();
            reports::print_history(&history);
        }
        if let Some(path) = matches.value_of("history_path") {
            if let Err(err) = reports::write_history(path, &history) {
                eprintln!("{:#}", err);
                process::exit(1);
            }
        }
    }
}
