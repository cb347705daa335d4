//! `farm_core`: deterministic grid simulation and session scheduling.
//!
//! No IO beyond the metrics CSV writer. All randomness via the passed-in Rng;
//! all time advances are explicit calls to `FarmSession::step`.

mod crop_model;
mod engine;
mod error;
mod grid;
mod journal;
pub mod metrics;
mod scheduler;
mod session;
pub mod tasks;
mod types;
mod unit;
mod weather;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use crop_model::{WaterBalanceFactory, WaterBalanceModel};
pub use engine::{CropEngine, EngineFactory};
pub use error::FarmError;
pub use grid::{AdvanceOutcome, SectorGridManager};
pub use journal::JournalLedger;
pub use metrics::{compute_metrics, MetricsFileWriter, SessionMetrics};
pub use scheduler::SessionScheduler;
pub use session::{FarmSession, SessionReport, SharedFarm};
pub use tasks::{describe_task, task_cost, TaskQueue};
pub use types::*;
pub use unit::SimulationUnit;
pub use weather::WeatherSeries;

#[cfg(test)]
mod tests;
