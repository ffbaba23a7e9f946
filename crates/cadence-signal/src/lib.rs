//! Moving-average crossover signal engine.
//!
//! The engine is stateless: every call recomputes from the series it is
//! given, so the same series always yields the same signals.

mod crossover;
mod sma;

pub use crossover::Crossover;
pub use sma::sma;
