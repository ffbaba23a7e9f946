//! Fast/slow SMA crossover detection.

use chrono::NaiveDate;

use cadence_core::error::SignalError;
use cadence_core::types::{PriceSeries, Signal};

use crate::sma;

/// Crossover signal engine for one fast/slow window pair.
///
/// Generates buy signals when the fast SMA crosses above the slow SMA,
/// and sell signals when it crosses below. Equality belongs to the prior
/// state: only a strict flip between consecutive bars is a crossing, so
/// two equal averages never act on their own bar.
#[derive(Debug, Clone)]
pub struct Crossover {
    fast: usize,
    slow: usize,
}

impl Crossover {
    /// Create a crossover engine. Fails unless `0 < fast < slow`.
    pub fn new(fast: usize, slow: usize) -> Result<Self, SignalError> {
        if fast == 0 {
            return Err(SignalError::InvalidWindows(
                "fast period must be greater than 0".into(),
            ));
        }
        if fast >= slow {
            return Err(SignalError::InvalidWindows(format!(
                "fast period ({fast}) must be less than slow period ({slow})"
            )));
        }
        Ok(Self { fast, slow })
    }

    /// Bars required for a signal on the latest bar: the slow window plus
    /// the preceding comparison point.
    pub fn required_bars(&self) -> usize {
        self.slow + 1
    }

    /// Fast window length.
    pub fn fast_period(&self) -> usize {
        self.fast
    }

    /// Slow window length.
    pub fn slow_period(&self) -> usize {
        self.slow
    }

    fn classify(prev_fast: f64, prev_slow: f64, cur_fast: f64, cur_slow: f64) -> Signal {
        if prev_fast <= prev_slow && cur_fast > cur_slow {
            Signal::Buy
        } else if prev_fast >= prev_slow && cur_fast < cur_slow {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    /// Signal for the most recent bar of the series.
    pub fn latest(&self, series: &PriceSeries) -> Result<Signal, SignalError> {
        let available = series.len();
        let required = self.required_bars();
        if available < required {
            return Err(SignalError::InsufficientData {
                required,
                available,
            });
        }

        let closes = series.closes();
        let fast_ma = sma(&closes, self.fast);
        let slow_ma = sma(&closes, self.slow);

        // The average at close index j lives at ma[j + 1 - period].
        let j = available - 1;
        Ok(Self::classify(
            fast_ma[j - self.fast],
            slow_ma[j - self.slow],
            fast_ma[j + 1 - self.fast],
            slow_ma[j + 1 - self.slow],
        ))
    }

    /// Full `(date, signal)` sequence, one entry per bar once both
    /// averages are defined. The first defined bar has no comparison
    /// point and reports `Hold`.
    ///
    /// Recomputed from the series on each call; nothing is retained
    /// between calls, so the sequence is restartable.
    pub fn signals(&self, series: &PriceSeries) -> impl Iterator<Item = (NaiveDate, Signal)> {
        let closes = series.closes();
        let dates = series.dates();
        let fast_ma = sma(&closes, self.fast);
        let slow_ma = sma(&closes, self.slow);
        let fast = self.fast;
        let slow = self.slow;

        let n = closes.len();
        let start = (slow - 1).min(n);
        (start..n).map(move |j| {
            let signal = if j == slow - 1 {
                Signal::Hold
            } else {
                Self::classify(
                    fast_ma[j - fast],
                    slow_ma[j - slow],
                    fast_ma[j + 1 - fast],
                    slow_ma[j + 1 - slow],
                )
            };
            (dates[j], signal)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::types::Bar;

    fn series(closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Days::new(i as u64);
                Bar::new(date, close)
            })
            .collect();
        PriceSeries::from_bars("TEST", bars)
    }

    #[test]
    fn test_invalid_windows() {
        assert!(Crossover::new(0, 5).is_err());
        assert!(Crossover::new(5, 5).is_err());
        assert!(Crossover::new(10, 5).is_err());
        assert!(Crossover::new(3, 5).is_ok());
    }

    #[test]
    fn test_insufficient_data() {
        let engine = Crossover::new(3, 5).unwrap();
        let err = engine.latest(&series(&[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap_err();
        match err {
            SignalError::InsufficientData {
                required,
                available,
            } => {
                assert_eq!(required, 6);
                assert_eq!(available, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bullish_crossover_at_last_bar() {
        let engine = Crossover::new(3, 5).unwrap();
        // Downtrend, then a reversal strong enough to flip the fast SMA
        // above the slow SMA exactly on the final bar.
        let s = series(&[10.0, 9.0, 8.0, 7.0, 6.0, 7.0, 9.0, 12.0]);
        assert_eq!(engine.latest(&s).unwrap(), Signal::Buy);
    }

    #[test]
    fn test_bearish_crossover_at_last_bar() {
        let engine = Crossover::new(3, 5).unwrap();
        let s = series(&[6.0, 7.0, 8.0, 9.0, 10.0, 9.0, 7.0, 4.0]);
        assert_eq!(engine.latest(&s).unwrap(), Signal::Sell);
    }

    #[test]
    fn test_no_crossover_is_hold() {
        let engine = Crossover::new(3, 5).unwrap();
        let s = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(engine.latest(&s).unwrap(), Signal::Hold);
    }

    #[test]
    fn test_equality_then_above_is_buy() {
        let engine = Crossover::new(3, 5).unwrap();
        // Averages are exactly equal on the penultimate bar; a strict
        // move above on the last bar counts as a crossing.
        let s = series(&[5.0, 5.0, 5.0, 5.0, 5.0, 6.0]);
        assert_eq!(engine.latest(&s).unwrap(), Signal::Buy);
    }

    #[test]
    fn test_equality_at_current_bar_is_hold() {
        let engine = Crossover::new(3, 5).unwrap();
        let s = series(&[5.0, 5.0, 5.0, 5.0, 5.0, 5.0]);
        assert_eq!(engine.latest(&s).unwrap(), Signal::Hold);
    }

    #[test]
    fn test_signal_series_shape() {
        let engine = Crossover::new(3, 5).unwrap();
        let closes = [10.0, 9.0, 8.0, 7.0, 6.0, 7.0, 9.0, 12.0];
        let s = series(&closes);

        let all: Vec<_> = engine.signals(&s).collect();
        // One entry per bar from the first index where the slow SMA is
        // defined.
        assert_eq!(all.len(), closes.len() - 5 + 1);
        assert_eq!(all[0].1, Signal::Hold);
        assert_eq!(all.last().unwrap().1, Signal::Buy);
    }

    #[test]
    fn test_signal_series_restartable() {
        let engine = Crossover::new(3, 5).unwrap();
        let s = series(&[10.0, 9.0, 8.0, 7.0, 6.0, 7.0, 9.0, 12.0]);

        let first: Vec<_> = engine.signals(&s).collect();
        let second: Vec<_> = engine.signals(&s).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_signal_series_short_input_is_empty() {
        let engine = Crossover::new(3, 5).unwrap();
        let s = series(&[1.0, 2.0, 3.0]);
        assert_eq!(engine.signals(&s).count(), 0);
    }

    #[test]
    fn test_latest_matches_series_tail() {
        let engine = Crossover::new(3, 5).unwrap();
        let s = series(&[6.0, 7.0, 8.0, 9.0, 10.0, 9.0, 7.0, 4.0]);

        let tail = engine.signals(&s).last().unwrap();
        assert_eq!(engine.latest(&s).unwrap(), tail.1);
    }
}
