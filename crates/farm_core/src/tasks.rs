use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{FarmError, JournalLedger, SessionScheduler, Task, TaskId, TaskKind};

pub const INVESTIGATE_COST: u32 = 1;
pub const IRRIGATE_COST: u32 = 2;
pub const PESTICIDE_COST: u32 = 1;

/// Activity points a task of this kind consumes.
pub fn task_cost(kind: &TaskKind) -> u32 {
    match kind {
        TaskKind::Investigate { .. } => INVESTIGATE_COST,
        TaskKind::Irrigate { .. } => IRRIGATE_COST,
        TaskKind::Pesticide { .. } => PESTICIDE_COST,
    }
}

pub fn task_kind_label(kind: &TaskKind) -> &'static str {
    match kind {
        TaskKind::Investigate { .. } => "Investigate",
        TaskKind::Irrigate { .. } => "Irrigate",
        TaskKind::Pesticide { .. } => "Pesticide",
    }
}

/// Journal text for a task, e.g. `Irrigate ALL 20mm`.
pub fn describe_task(kind: &TaskKind) -> String {
    let label = task_kind_label(kind);
    match kind {
        TaskKind::Investigate { sector } => format!("{label} {sector}"),
        TaskKind::Irrigate { target, depth_mm } => format!("{label} {target} {depth_mm}mm"),
        TaskKind::Pesticide { target } => format!("{label} {target}"),
    }
}

/// Pending budgeted actions, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskQueue {
    pending: Vec<Task>,
    /// Never reset; ids are not reused after removal or commit.
    next_id: u64,
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 1,
        }
    }

    /// Queue a task if the scheduler's budget admits `cost`.
    pub fn add(
        &mut self,
        description: impl Into<String>,
        kind: TaskKind,
        cost: u32,
        scheduler: &mut SessionScheduler,
    ) -> Result<TaskId, FarmError> {
        if cost == 0 {
            return Err(FarmError::InvalidCost);
        }
        scheduler.charge(cost)?;

        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(Task {
            id,
            description: description.into(),
            cost,
            kind,
            created_session_date: scheduler.current_session_date(),
        });
        Ok(id)
    }

    /// Drop a pending task and refund its cost.
    pub fn remove(
        &mut self,
        id: TaskId,
        scheduler: &mut SessionScheduler,
    ) -> Result<Task, FarmError> {
        let pos = self
            .pending
            .iter()
            .position(|t| t.id == id)
            .ok_or(FarmError::NotFound(id))?;
        let task = self.pending.remove(pos);
        scheduler.refund(task.cost);
        Ok(task)
    }

    /// Journal every pending task, one entry per creation date, then empty the queue.
    ///
    /// Returns the committed tasks in insertion order.
    pub fn commit_and_clear(&mut self, journal: &mut JournalLedger) -> Vec<Task> {
        let committed = std::mem::take(&mut self.pending);

        let mut dates = Vec::new();
        for task in &committed {
            if !dates.contains(&task.created_session_date) {
                dates.push(task.created_session_date);
            }
        }
        for date in dates {
            let descriptions: Vec<String> = committed
                .iter()
                .filter(|t| t.created_session_date == date)
                .map(|t| t.description.clone())
                .collect();
            info!(%date, tasks = descriptions.len(), "tasks committed to journal");
            journal.append(date, descriptions);
        }
        committed
    }

    pub fn pending(&self) -> &[Task] {
        &self.pending
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.pending.iter().find(|t| t.id == id)
    }

    pub fn total_cost(&self) -> u32 {
        self.pending.iter().map(|t| t.cost).sum()
    }

    pub fn next_id(&self) -> TaskId {
        TaskId(self.next_id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
