//! One farm: grid, scheduler, task queue and journal advanced together.
//!
//! Order of operations for a `/step`:
//! 1. Apply pending irrigation to the targeted units.
//! 2. Advance the grid by `session_days` days.
//! 3. Update session/season identity from the grid's clock and reset the budget.
//! 4. Commit pending tasks to the journal and clear the queue.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::tasks::{describe_task, task_cost};
use crate::{
    Constants, FarmError, JournalLedger, SectorGridManager, SessionScheduler, Task, TaskId,
    TaskKind, TaskQueue, WeatherMode, WeatherSummary,
};

/// What a `/step` did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_number: u32,
    pub previous_date: NaiveDate,
    pub date: NaiveDate,
    pub season_index: u32,
    pub season_changed: bool,
    pub days_run: u32,
    pub committed_tasks: usize,
    /// True once every unit has reached the end of its simulation.
    pub finished: bool,
}

pub struct FarmSession {
    grid: SectorGridManager,
    scheduler: SessionScheduler,
    queue: TaskQueue,
    journal: JournalLedger,
    constants: Constants,
}

impl FarmSession {
    pub fn new(grid: SectorGridManager, constants: Constants) -> Self {
        let grid = grid.with_taw_penalty(constants.taw_penalty);
        let scheduler = SessionScheduler::new(grid.clock(), constants.max_activity_points);
        Self {
            grid,
            scheduler,
            queue: TaskQueue::new(),
            journal: JournalLedger::new(),
            constants,
        }
    }

    /// Run one session: modifiers, lockstep advance, identity update, commit.
    pub fn step(&mut self) -> SessionReport {
        self.apply_irrigation();

        let previous_date = self.scheduler.current_session_date();
        let outcome = self.grid.advance_session(self.constants.session_days);
        self.scheduler.on_session_advanced(outcome.clock);
        let committed = self.queue.commit_and_clear(&mut self.journal);

        let season_changed = self.scheduler.season_changed();
        if season_changed {
            info!(
                from = self.scheduler.previous_season_index(),
                to = self.scheduler.current_season_index(),
                "season boundary crossed"
            );
        }

        SessionReport {
            session_number: self.scheduler.session_number(),
            previous_date,
            date: outcome.clock.date,
            season_index: outcome.clock.season_index,
            season_changed,
            days_run: outcome.days_run,
            committed_tasks: committed.len(),
            finished: self.grid.is_finished(),
        }
    }

    fn apply_irrigation(&mut self) {
        for task in self.queue.pending() {
            if let TaskKind::Irrigate { target, depth_mm } = task.kind {
                // Targets were checked when the task was queued.
                if let Err(err) = self.grid.apply_water(target, depth_mm) {
                    tracing::warn!(task = %task.id, %err, "irrigation skipped");
                }
            }
        }
    }

    /// Queue a task, priced from the cost table.
    pub fn add_task(&mut self, kind: TaskKind) -> Result<TaskId, FarmError> {
        match &kind {
            TaskKind::Investigate { sector } => {
                if !self.grid.contains(*sector) {
                    return Err(FarmError::UnknownSector(*sector));
                }
            }
            TaskKind::Irrigate { target, depth_mm } => {
                self.grid.check_target(*target)?;
                if !(depth_mm.is_finite() && *depth_mm > 0.0) {
                    return Err(FarmError::MalformedCommand(format!(
                        "irrigation depth must be positive, got {depth_mm}"
                    )));
                }
            }
            TaskKind::Pesticide { target } => self.grid.check_target(*target)?,
        }
        let description = describe_task(&kind);
        let cost = task_cost(&kind);
        self.queue.add(description, kind, cost, &mut self.scheduler)
    }

    pub fn remove_task(&mut self, id: TaskId) -> Result<Task, FarmError> {
        self.queue.remove(id, &mut self.scheduler)
    }

    /// Actual weather over `[previous session, current session)`.
    ///
    /// `None` before the first advance or when no record covers the window.
    pub fn previous_session_weather(&self) -> Option<WeatherSummary> {
        let from = self.scheduler.previous_session_date()?;
        self.grid.weather_window(
            from,
            self.scheduler.current_session_date(),
            WeatherMode::Actual,
        )
    }

    /// Forecast for the coming session.
    pub fn next_session_forecast(&self) -> Option<WeatherSummary> {
        let from = self.scheduler.current_session_date();
        let to = from.checked_add_days(Days::new(u64::from(self.constants.session_days)))?;
        self.grid.weather_window(from, to, WeatherMode::Forecast)
    }

    pub fn grid(&self) -> &SectorGridManager {
        &self.grid
    }

    pub fn scheduler(&self) -> &SessionScheduler {
        &self.scheduler
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub fn journal(&self) -> &JournalLedger {
        &self.journal
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }
}

/// A `FarmSession` behind one lock, for callers on several threads.
///
/// Budget and id invariants span the scheduler, the queue and the grid, so
/// every mutation takes the same lock.
#[derive(Clone)]
pub struct SharedFarm {
    inner: Arc<Mutex<FarmSession>>,
}

impl SharedFarm {
    pub fn new(session: FarmSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn step(&self) -> SessionReport {
        self.inner.lock().step()
    }

    pub fn add_task(&self, kind: TaskKind) -> Result<TaskId, FarmError> {
        self.inner.lock().add_task(kind)
    }

    pub fn remove_task(&self, id: TaskId) -> Result<Task, FarmError> {
        self.inner.lock().remove_task(id)
    }

    /// Run `f` with the lock held.
    pub fn with<R>(&self, f: impl FnOnce(&mut FarmSession) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
