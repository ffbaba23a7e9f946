//! Broker connection check.

use anyhow::{Context, Result};

use cadence_broker::AlpacaBroker;
use cadence_core::traits::Broker;

pub async fn run() -> Result<()> {
    let broker = AlpacaBroker::from_env().context("Alpaca credentials")?;

    let mode = if broker.is_paper() { "paper" } else { "live" };
    println!("Using Alpaca {mode} trading.");

    let snapshot = broker.account_snapshot().await?;
    println!("{}", snapshot.summary());
    Ok(())
}
