use thiserror::Error;

use crate::{SectorId, TaskId};

/// Rejections raised by the core. None of them leaves partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FarmError {
    #[error("not enough activity points: task costs {cost} AP, {used}/{max} AP already used")]
    BudgetExceeded { cost: u32, used: u32, max: u32 },

    #[error("no pending task with id {0}")]
    NotFound(TaskId),

    #[error("malformed command: {0}")]
    MalformedCommand(String),

    #[error("sector {0} is not part of the farm")]
    UnknownSector(SectorId),

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("task cost must be at least 1 AP")]
    InvalidCost,
}
