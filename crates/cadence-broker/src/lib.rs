//! Brokerage collaborator.

mod alpaca;

pub use alpaca::{AlpacaBroker, AlpacaConfig};
