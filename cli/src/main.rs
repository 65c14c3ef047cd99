//! Tradebook CLI
//!
//! Quote and book currency trades against a rates-by-base JSON snapshot.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tradebook_booking::{BookingConfig, BookingSession, InMemoryTradeStore};
use rust_decimal::Decimal;
use tradebook_common::{format_fixed, BookedTrade, Currency};
use tradebook_fx::StaticRateProvider;

/// Tradebook CLI
#[derive(Parser, Debug)]
#[command(name = "tradebook")]
#[command(about = "Quote and book currency trades")]
struct Cli {
    /// Rates-by-base snapshot, e.g. {"USD": {"EUR": 0.85}}
    #[arg(short, long)]
    rates: PathBuf,

    /// Base currency to request rates for
    #[arg(short, long)]
    base: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every known currency
    Currencies,
    /// List the rates quoted from a currency
    Rates {
        #[arg(long)]
        from: String,
    },
    /// Derive the missing amount of a trade
    Quote(TradeArgs),
    /// Derive the missing amount and book the trade
    Book(TradeArgs),
}

#[derive(Args, Debug)]
struct TradeArgs {
    /// Currency to sell
    #[arg(long)]
    sell: String,

    /// Currency to buy
    #[arg(long)]
    buy: String,

    #[command(flatten)]
    amount: AmountArgs,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct AmountArgs {
    /// Amount to sell; the buy amount is derived
    #[arg(long)]
    sell_amount: Option<String>,

    /// Amount to buy; the sell amount is derived
    #[arg(long)]
    buy_amount: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = BookingConfig::from_env();
    if let Some(base) = &cli.base {
        config.base_currency = base.clone();
    }
    config.validate()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(cli.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    let json = std::fs::read_to_string(&cli.rates)
        .with_context(|| format!("reading rates from {}", cli.rates.display()))?;
    let provider = Arc::new(StaticRateProvider::from_json(&json)?);
    let store = Arc::new(InMemoryTradeStore::new());

    let mut session = BookingSession::new(provider, store, config.clone())?;
    session.reload_rates().await?;
    info!(base = %session.base_currency(), currencies = session.currencies().len(), "Rates loaded");

    match cli.command {
        Command::Currencies => {
            for currency in session.currencies() {
                println!("{}", currency);
            }
        }
        Command::Rates { from } => {
            let from = Currency::parse(&from)?;
            session.engine_mut().set_sell_currency(from.clone());
            for quote in session.available_rates() {
                println!(
                    "{}/{}  {}",
                    from,
                    quote.currency,
                    fixed(quote.rate, config.rate_decimal_places)
                );
            }
        }
        Command::Quote(args) => {
            fill_form(&mut session, &args)?;
            print_quote(&session);
        }
        Command::Book(args) => {
            fill_form(&mut session, &args)?;
            print_quote(&session);

            let booked = session.submit().await?;
            println!("Booked {}", booked.id);
            for trade in session.trades_newest_first() {
                print_trade(&trade, &config);
            }
        }
    }

    for notification in session.take_notifications() {
        info!(level = ?notification.level, title = %notification.title, "{}", notification.message);
    }

    Ok(())
}

fn fill_form(session: &mut BookingSession, args: &TradeArgs) -> anyhow::Result<()> {
    let sell = Currency::parse(&args.sell)?;
    let buy = Currency::parse(&args.buy)?;

    let engine = session.engine_mut();
    engine.set_sell_currency(sell.clone());
    engine.set_buy_currency(buy.clone());

    if !engine.state().rate_resolved() {
        anyhow::bail!("No rate available for {}/{}", sell, buy);
    }

    match (&args.amount.sell_amount, &args.amount.buy_amount) {
        (Some(amount), _) => engine.set_sell_amount(amount.as_str()),
        (None, Some(amount)) => engine.set_buy_amount(amount.as_str()),
        (None, None) => anyhow::bail!("Either --sell-amount or --buy-amount is required"),
    }

    Ok(())
}

fn print_quote(session: &BookingSession) {
    let state = session.state();
    println!(
        "Sell {} {}  Buy {} {}  Rate {}",
        state.sell_amount.as_deref().unwrap_or("-"),
        state.sell_currency.as_ref().map(Currency::code).unwrap_or("-"),
        state.buy_amount.as_deref().unwrap_or("-"),
        state.buy_currency.as_ref().map(Currency::code).unwrap_or("-"),
        state.active_rate,
    );
}

fn print_trade(trade: &BookedTrade, config: &BookingConfig) {
    println!(
        "{}  {} {}  {} {}  {}  {}",
        trade.id,
        trade.sell_currency,
        fixed(trade.sell_amount, config.amount_decimal_places),
        trade.buy_currency,
        fixed(trade.buy_amount, config.amount_decimal_places),
        fixed(trade.rate, config.rate_decimal_places),
        trade.booked_at.format("%Y/%m/%d %H:%M:%S"),
    );
}

fn fixed(value: Decimal, dp: u32) -> String {
    format_fixed(value, dp).unwrap_or_else(|| value.to_string())
}
