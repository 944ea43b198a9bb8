//! Slot reconciliation loop.
//!
//! The watcher polls `getEpochInfo` on a fixed cadence and attributes every
//! slot between the previous and the current position to its scheduled
//! leader, as either produced (present in `getConfirmedBlocks`) or skipped.
//!
//! - [`config::WatcherConfig`]: tick interval and commitment level,
//! - [`schedule::LeaderSchedule`]: the single-epoch offset -> leader cache,
//! - [`engine::SlotWatcher`]: the loop and its cross-tick state,
//! - [`error::WatchError`]: the only condition that stops the loop.

pub mod config;
pub mod engine;
pub mod error;
pub mod schedule;

pub use config::WatcherConfig;
pub use engine::{AbortReason, SlotWatcher, TickOutcome};
pub use error::WatchError;
pub use schedule::LeaderSchedule;
