use std::collections::VecDeque;

use farm_core::tasks::IRRIGATE_COST;
use farm_core::{FarmSession, Metric, SectorId};

use crate::CommandSource;

/// Plays the farm unattended, one session at a time:
/// 1. Irrigate the driest sectors whose stored water is below the threshold,
///    driest first, while the session's budget allows.
/// 2. `/step`.
///
/// Stops once every sector has finished.
#[derive(Debug, Clone)]
pub struct IrrigationAutopilot {
    threshold_mm: f64,
    depth_mm: f64,
    planned: VecDeque<String>,
}

impl IrrigationAutopilot {
    pub fn new(threshold_mm: f64, depth_mm: f64) -> Self {
        Self {
            threshold_mm,
            depth_mm,
            planned: VecDeque::new(),
        }
    }

    fn plan_session(&self, session: &FarmSession) -> VecDeque<String> {
        let slots = session.scheduler().remaining_points() / IRRIGATE_COST;

        let mut dry: Vec<(SectorId, f64)> = session
            .grid()
            .aggregate(Metric::SoilWater)
            .into_iter()
            .filter(|(_, water)| *water < self.threshold_mm)
            .collect();
        dry.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        let mut lines: VecDeque<String> = dry
            .into_iter()
            .take(slots as usize)
            .map(|(id, _)| format!("/task add irrigate {id} {}mm", self.depth_mm))
            .collect();
        lines.push_back("/step".to_string());
        lines
    }
}

impl Default for IrrigationAutopilot {
    fn default() -> Self {
        Self::new(100.0, 20.0)
    }
}

impl CommandSource for IrrigationAutopilot {
    fn next_line(&mut self, session: &FarmSession) -> Option<String> {
        if self.planned.is_empty() {
            if session.grid().is_finished() {
                return None;
            }
            self.planned = self.plan_session(session);
        }
        self.planned.pop_front()
    }
}
