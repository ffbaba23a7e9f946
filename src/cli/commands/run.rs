//! Decision cycle loop command.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use cadence_advisory::{AdvisoryGateway, GeminiJudge, TavilyNews};
use cadence_broker::{AlpacaBroker, AlpacaConfig};
use cadence_config::load_config;
use cadence_core::traits::{Broker, Notifier};
use cadence_engine::{Dispatcher, PositionSize, Scheduler, SchedulerConfig, SessionWindow};
use cadence_notify::{NoopNotifier, TelegramNotifier};
use cadence_signal::Crossover;
use cadence_state::DedupStore;

use crate::cli::RunArgs;

pub async fn run(args: RunArgs, config_path: &Path) -> Result<()> {
    let settings = load_config(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    settings.validate()?;

    // Notify before broker construction, so a broken broker setup still
    // produces a visible startup probe.
    let notifier: Arc<dyn Notifier> = match TelegramNotifier::from_env() {
        Some(telegram) => Arc::new(telegram),
        None => {
            info!("Telegram not configured (missing TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID)");
            Arc::new(NoopNotifier)
        }
    };
    if let Err(e) = notifier.send_startup("cadence bot starting…").await {
        warn!(error = %e, "startup notification failed");
    }

    // Credentials from the environment; the paper/live switch from the
    // settings file.
    let mut alpaca = AlpacaConfig::from_env().context("Alpaca credentials")?;
    alpaca.paper = settings.broker.paper;
    let broker: Arc<dyn Broker> = Arc::new(AlpacaBroker::new(alpaca)?);

    let crossover = Crossover::new(settings.bot.fast_period, settings.bot.slow_period)?;
    let size = PositionSize::from_options(settings.sizing.shares, settings.sizing.notional)
        .context("no position size configured")?;
    let (open, close) = settings.session.parse()?;

    let config = SchedulerConfig {
        symbols: settings.symbols(),
        interval: Duration::from_secs(settings.bot.interval_minutes * 60),
        lookback_days: settings.bot.slow_period as u32 + settings.broker.lookback_buffer_days,
        session: SessionWindow::new(open, close),
    };

    let mut scheduler = Scheduler::new(
        config,
        crossover,
        Dispatcher::new(size),
        broker.clone(),
        notifier.clone(),
    );

    if settings.dedup.enabled {
        scheduler = scheduler.with_dedup(DedupStore::open(&settings.dedup.state_dir)?);
    }

    if settings.advisory.enabled {
        let news = TavilyNews::from_env().context("advisory enabled")?;
        let judge = GeminiJudge::from_env(&settings.advisory.model).context("advisory enabled")?;
        scheduler = scheduler.with_advisory(AdvisoryGateway::new(
            Arc::new(news),
            Arc::new(judge),
            settings.advisory.news_mode,
        ));
    }

    let mode = if settings.broker.paper { "paper" } else { "live" };
    info!(
        mode,
        symbols = ?settings.symbols(),
        fast = settings.bot.fast_period,
        slow = settings.bot.slow_period,
        interval_min = settings.bot.interval_minutes,
        once = args.once,
        "bot started"
    );

    let started = format!(
        "cadence bot started ({mode}) | {} | interval {} min",
        settings.symbols().join(", "),
        settings.bot.interval_minutes
    );
    if let Err(e) = notifier.send_startup(&started).await {
        warn!(error = %e, "started notification failed");
    }
    match broker.account_snapshot().await {
        Ok(snapshot) => {
            if let Err(e) = notifier
                .send_startup(&format!("📊 Account\n\n{}", snapshot.summary()))
                .await
            {
                warn!(error = %e, "account notification failed");
            }
        }
        Err(e) => warn!(error = %e, "account snapshot failed at startup"),
    }

    scheduler.run(args.once).await?;
    Ok(())
}
