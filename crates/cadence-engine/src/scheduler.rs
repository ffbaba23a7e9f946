//! The top-level decision cycle loop.
//!
//! One logical thread of control: symbols are processed strictly
//! sequentially within a cycle, all collaborator calls are awaited in
//! place, and cycles never overlap. The inter-cycle sleep is the sole
//! cancellable wait point; a termination signal finishes any in-flight
//! cycle first.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::signal;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use cadence_advisory::{AdviceRequest, AdvisoryGateway, GeneralNewsCache};
use cadence_core::error::BotError;
use cadence_core::traits::{Broker, Notifier};
use cadence_core::types::{AdvisoryResult, Side, Signal, TradeNote};
use cadence_signal::Crossover;
use cadence_state::DedupStore;

use crate::dispatch::Dispatcher;
use crate::hours::SessionWindow;

/// Context for one scheduler iteration.
///
/// Owned solely by the scheduler and dropped when the cycle ends; the
/// general-news cache inside it is what bounds the general query to one
/// execution per cycle.
pub struct CycleContext {
    pub now: DateTime<Utc>,
    pub news: GeneralNewsCache,
}

impl CycleContext {
    /// Create a context for a cycle starting at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            news: GeneralNewsCache::new(),
        }
    }
}

/// Scheduler configuration distilled from the settings file.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Symbols processed each cycle, in order
    pub symbols: Vec<String>,
    /// Sleep between cycles
    pub interval: Duration,
    /// Calendar days of history requested per fetch
    pub lookback_days: u32,
    /// Regular session window
    pub session: SessionWindow,
}

/// The decision cycle engine.
pub struct Scheduler {
    config: SchedulerConfig,
    crossover: Crossover,
    dispatcher: Dispatcher,
    broker: Arc<dyn Broker>,
    notifier: Arc<dyn Notifier>,
    advisory: Option<AdvisoryGateway>,
    dedup: Option<DedupStore>,
}

impl Scheduler {
    /// Create a scheduler with advisory and dedup disabled.
    pub fn new(
        config: SchedulerConfig,
        crossover: Crossover,
        dispatcher: Dispatcher,
        broker: Arc<dyn Broker>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            crossover,
            dispatcher,
            broker,
            notifier,
            advisory: None,
            dedup: None,
        }
    }

    /// Enable the advisory gateway.
    pub fn with_advisory(mut self, gateway: AdvisoryGateway) -> Self {
        self.advisory = Some(gateway);
        self
    }

    /// Enable the duplicate-action guard.
    pub fn with_dedup(mut self, store: DedupStore) -> Self {
        self.dedup = Some(store);
        self
    }

    /// The dedup store, when enabled.
    pub fn dedup(&self) -> Option<&DedupStore> {
        self.dedup.as_ref()
    }

    /// Run cycles until terminated. In one-shot mode a single cycle
    /// runs and the loop exits.
    pub async fn run(&mut self, once: bool) -> Result<(), BotError> {
        loop {
            self.run_cycle().await;

            if once {
                info!("one-shot mode, terminating");
                break;
            }

            debug!(seconds = self.config.interval.as_secs(), "sleeping");
            tokio::select! {
                _ = sleep(self.config.interval) => {}
                _ = signal::ctrl_c() => {
                    info!("termination signal received");
                    break;
                }
            }
        }
        Ok(())
    }

    /// One full cycle over all configured symbols, stamped with the
    /// current wall clock.
    pub async fn run_cycle(&mut self) {
        self.run_cycle_with(CycleContext::new(Utc::now())).await;
    }

    /// One full cycle with an injected context.
    ///
    /// The market-hours gate is checked once here, before any
    /// per-symbol work; outside the session the cycle is a pure no-op.
    /// A failure for one symbol is reported and the cycle continues
    /// with the next.
    pub async fn run_cycle_with(&mut self, mut ctx: CycleContext) {
        if !self.config.session.contains(ctx.now) {
            debug!(now = %ctx.now, "outside market hours, skipping cycle");
            return;
        }

        let symbols = self.config.symbols.clone();
        for symbol in &symbols {
            if let Err(e) = self.process_symbol(symbol, &mut ctx).await {
                warn!(symbol = %symbol, error = %e, "symbol failed this cycle");
                if let Err(ne) = self.notifier.send_error(symbol, &e.to_string()).await {
                    debug!(error = %ne, "error notification failed");
                }
            }
        }
    }

    async fn process_symbol(&mut self, symbol: &str, ctx: &mut CycleContext) -> Result<(), BotError> {
        let series = self
            .broker
            .fetch_daily_bars(symbol, self.config.lookback_days)
            .await?;
        let signal = self.crossover.latest(&series)?;
        let last_bar = *series
            .last()
            .ok_or_else(|| BotError::Internal("empty series after signal".into()))?;

        if !signal.is_actionable() {
            info!(symbol, %signal, "no crossover, no trade");
            return Ok(());
        }

        let position = self.broker.position(symbol).await?;
        let held = position.as_ref().map(|p| p.qty).unwrap_or(Decimal::ZERO);

        // Buy only when flat, sell only when long.
        let side = match signal {
            Signal::Buy if held == Decimal::ZERO => Side::Buy,
            Signal::Sell if held > Decimal::ZERO => Side::Sell,
            _ => {
                info!(symbol, %signal, %held, "signal not eligible for current position");
                return Ok(());
            }
        };

        if let Some(store) = &self.dedup {
            if !store.should_act(symbol, last_bar.date, signal) {
                info!(symbol, %signal, date = %last_bar.date, "already acted on this bar");
                return Ok(());
            }
        }

        let mut multiplier = Decimal::ONE;
        let mut advisory: Option<AdvisoryResult> = None;
        if let Some(gateway) = &self.advisory {
            let request = AdviceRequest {
                symbol: symbol.to_string(),
                signal,
                last_close: last_bar.close,
                position_qty: held,
            };
            let result = gateway.advise(&request, &mut ctx.news).await;
            info!(symbol, action = %result.action, reason = %result.reason, "advisory resolved");
            if !result.action.permits_order() {
                return Ok(());
            }
            multiplier = result.action.size_multiplier();
            advisory = Some(result);
        }

        let qty = match side {
            Side::Buy => self.dispatcher.buy_quantity(last_bar.close, multiplier),
            Side::Sell => self.dispatcher.sell_quantity(held, multiplier),
        };

        let receipt = match self
            .dispatcher
            .submit(self.broker.as_ref(), symbol, side, qty)
            .await?
        {
            Some(receipt) => receipt,
            None => {
                info!(symbol, %side, "sized to zero shares, nothing to do");
                return Ok(());
            }
        };

        // The order went through; only now does the bar count as acted
        // upon. A submission failure above leaves the guard open so the
        // next cycle can retry the same bar.
        if let Some(store) = &mut self.dedup {
            store.record_action(symbol, last_bar.date, signal)?;
        }

        info!(symbol, %side, %qty, order_id = %receipt.id, "order submitted");

        // Everything past the submission is best-effort notification.
        let pnl_dollars = match side {
            Side::Sell => position.as_ref().and_then(|p| {
                if p.qty > Decimal::ZERO {
                    Some(p.unrealized_pnl / p.qty * qty)
                } else {
                    None
                }
            }),
            Side::Buy => None,
        };

        let account = match self.broker.account_snapshot().await {
            Ok(snapshot) => Some(snapshot.summary()),
            Err(e) => {
                debug!(error = %e, "account snapshot failed");
                None
            }
        };

        let note = TradeNote {
            symbol: symbol.to_string(),
            side,
            qty,
            order_id: receipt.id,
            paper: self.broker.is_paper(),
            reason: advisory.as_ref().map(|a| a.reason.clone()),
            news: advisory
                .as_ref()
                .map(|a| a.news.clone())
                .unwrap_or_default(),
            usage: advisory.as_ref().and_then(|a| a.usage),
            pnl_dollars,
            account,
        };
        if let Err(e) = self.notifier.send_trade(&note).await {
            debug!(error = %e, "trade notification failed");
        }

        Ok(())
    }
}
