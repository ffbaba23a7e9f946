//! Configuration validation command.

use std::path::Path;

use anyhow::{Context, Result};

use cadence_config::load_config;

pub async fn run(config_path: &Path) -> Result<()> {
    let settings = load_config(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    settings.validate()?;

    println!("Configuration OK: {}", config_path.display());
    println!("  symbols:  {}", settings.symbols().join(", "));
    println!(
        "  windows:  fast {} / slow {}",
        settings.bot.fast_period, settings.bot.slow_period
    );
    println!("  interval: {} min", settings.bot.interval_minutes);
    println!(
        "  sizing:   shares={:?} notional={:?}",
        settings.sizing.shares, settings.sizing.notional
    );
    println!("  paper:    {}", settings.broker.paper);
    println!("  dedup:    {}", settings.dedup.enabled);
    println!(
        "  advisory: {} ({:?}, {})",
        settings.advisory.enabled, settings.advisory.news_mode, settings.advisory.model
    );
    println!(
        "  session:  {} - {} UTC",
        settings.session.open, settings.session.close
    );
    Ok(())
}
