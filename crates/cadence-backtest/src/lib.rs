//! Offline replay of the crossover strategy over historical daily bars.
//!
//! Long-only, full-notional entries, fills at the signal bar's close.
//! This is a sanity check for window choices, not a profitability study.

use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use cadence_core::error::{BotError, DataError};
use cadence_core::types::{Bar, PriceSeries, Signal};
use cadence_signal::Crossover;

/// One CSV row. Extra columns are ignored; capitalized headers from
/// common export tools are accepted.
#[derive(Debug, Deserialize)]
struct CsvBar {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Close")]
    close: f64,
}

/// Load daily bars for one symbol from a CSV file with `date,close`
/// columns.
pub fn load_bars_csv(path: &Path, symbol: &str) -> Result<PriceSeries, DataError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| DataError::Parse(e.to_string()))?;
    let mut bars = Vec::new();
    for row in reader.deserialize() {
        let row: CsvBar = row.map_err(|e| DataError::Parse(e.to_string()))?;
        bars.push(Bar::new(row.date, row.close));
    }
    if bars.is_empty() {
        return Err(DataError::NoData(symbol.to_string()));
    }
    debug!(symbol, bars = bars.len(), "loaded CSV bars");
    Ok(PriceSeries::from_bars(symbol, bars))
}

/// Replay summary.
#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub symbol: String,
    pub bars: usize,
    pub orders: usize,
    pub initial_capital: f64,
    pub final_equity: f64,
    pub total_return_pct: f64,
    pub buy_hold_return_pct: f64,
}

impl fmt::Display for BacktestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Backtest: {}", self.symbol)?;
        writeln!(f, "  Bars:          {}", self.bars)?;
        writeln!(f, "  Orders:        {}", self.orders)?;
        writeln!(f, "  Initial:       ${:.2}", self.initial_capital)?;
        writeln!(f, "  Final equity:  ${:.2}", self.final_equity)?;
        writeln!(f, "  Return:        {:+.2}%", self.total_return_pct)?;
        write!(f, "  Buy & hold:    {:+.2}%", self.buy_hold_return_pct)
    }
}

/// Replay the crossover signals over a series.
pub fn run_backtest(
    series: &PriceSeries,
    fast: usize,
    slow: usize,
    initial_capital: f64,
) -> Result<BacktestReport, BotError> {
    let engine = Crossover::new(fast, slow)?;
    engine.latest(series)?; // enough history up front, or fail now

    let bars = series.bars();
    let mut cash = initial_capital;
    let mut shares = 0.0_f64;
    let mut orders = 0usize;

    // signals() yields one entry per bar from index slow - 1
    for ((_, signal), bar) in engine.signals(series).zip(&bars[slow - 1..]) {
        match signal {
            Signal::Buy if shares == 0.0 && bar.close > 0.0 => {
                shares = cash / bar.close;
                cash = 0.0;
                orders += 1;
            }
            Signal::Sell if shares > 0.0 => {
                cash = shares * bar.close;
                shares = 0.0;
                orders += 1;
            }
            _ => {}
        }
    }

    let last_close = bars.last().map(|b| b.close).unwrap_or(0.0);
    let first_close = bars.first().map(|b| b.close).unwrap_or(0.0);
    let final_equity = cash + shares * last_close;

    Ok(BacktestReport {
        symbol: series.symbol.clone(),
        bars: bars.len(),
        orders,
        initial_capital,
        final_equity,
        total_return_pct: (final_equity / initial_capital - 1.0) * 100.0,
        buy_hold_return_pct: if first_close > 0.0 {
            (last_close / first_close - 1.0) * 100.0
        } else {
            0.0
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use std::io::Write;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar::new(start + Days::new(i as u64), close))
            .collect();
        PriceSeries::from_bars("TEST", bars)
    }

    #[test]
    fn test_round_trip_replay() {
        // Buy once the fast SMA crosses above, sell when it crosses
        // back below: entry at close 20, exit at close 5.
        let s = series(&[10.0, 10.0, 10.0, 10.0, 20.0, 20.0, 20.0, 5.0, 5.0, 5.0]);
        let report = run_backtest(&s, 2, 3, 1_000.0).unwrap();

        assert_eq!(report.orders, 2);
        assert!((report.final_equity - 250.0).abs() < 1e-9);
        assert!((report.total_return_pct - -75.0).abs() < 1e-9);
        assert!((report.buy_hold_return_pct - -50.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_series_never_trades() {
        let s = series(&[10.0; 50]);
        let report = run_backtest(&s, 10, 30, 1_000.0).unwrap();
        assert_eq!(report.orders, 0);
        assert!((report.final_equity - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_insufficient_history_fails() {
        let s = series(&[10.0; 20]);
        assert!(run_backtest(&s, 10, 30, 1_000.0).is_err());
    }

    #[test]
    fn test_load_bars_csv() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bars.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "date,close,volume").unwrap();
        writeln!(file, "2024-01-03,101.5,1000").unwrap();
        writeln!(file, "2024-01-02,100.0,900").unwrap();
        drop(file);

        let series = load_bars_csv(&path, "SPY").unwrap();
        assert_eq!(series.len(), 2);
        // Rows are sorted into date order on load
        assert_eq!(series.get(0).unwrap().close, 100.0);
        assert_eq!(series.last().unwrap().close, 101.5);
    }

    #[test]
    fn test_load_bars_csv_empty_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bars.csv");
        std::fs::write(&path, "date,close\n").unwrap();
        assert!(matches!(
            load_bars_csv(&path, "SPY"),
            Err(DataError::NoData(_))
        ));
    }
}
