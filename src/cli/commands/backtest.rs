//! Offline backtest command.

use std::path::Path;

use anyhow::{Context, Result};

use cadence_backtest::{load_bars_csv, run_backtest};
use cadence_config::load_config;

use crate::cli::BacktestArgs;

pub async fn run(args: BacktestArgs, config_path: &Path) -> Result<()> {
    let settings = load_config(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    settings.validate()?;

    let fast = args.fast.unwrap_or(settings.bot.fast_period);
    let slow = args.slow.unwrap_or(settings.bot.slow_period);

    let series = load_bars_csv(&args.data, &args.symbol)
        .with_context(|| format!("loading {}", args.data.display()))?;
    let report = run_backtest(&series, fast, slow, args.capital)?;

    println!("{report}");
    Ok(())
}
