//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cadence")]
#[command(author, version, about = "Scheduled moving-average trading bot")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the decision cycle loop (continuous by default)
    Run(RunArgs),
    /// Replay the strategy over CSV daily bars
    Backtest(BacktestArgs),
    /// Check broker connectivity and print the account snapshot
    Account,
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Run exactly one cycle and exit (e.g. for cron)
    #[arg(long)]
    pub once: bool,
}

#[derive(clap::Args)]
pub struct BacktestArgs {
    /// CSV file with date,close columns
    #[arg(long)]
    pub data: PathBuf,

    /// Symbol label for the report
    #[arg(short = 'S', long, default_value = "SPY")]
    pub symbol: String,

    /// Fast moving average period (defaults to the configured value)
    #[arg(long)]
    pub fast: Option<usize>,

    /// Slow moving average period (defaults to the configured value)
    #[arg(long)]
    pub slow: Option<usize>,

    /// Initial capital
    #[arg(long, default_value = "100000")]
    pub capital: f64,
}
