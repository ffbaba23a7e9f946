//! The decision cycle engine: market-hours gate, per-symbol
//! orchestration, order sizing, and the scheduler loop.

mod dispatch;
mod hours;
mod scheduler;

pub use dispatch::{Dispatcher, PositionSize};
pub use hours::SessionWindow;
pub use scheduler::{CycleContext, Scheduler, SchedulerConfig};
