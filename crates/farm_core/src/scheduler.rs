//! Session and season identity plus the per-session activity-point budget.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{ClockReading, FarmError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionScheduler {
    current_session_date: NaiveDate,
    /// `None` until the first advance.
    previous_session_date: Option<NaiveDate>,
    current_season_index: u32,
    previous_season_index: u32,
    /// Advances seen so far.
    session_number: u32,
    activity_points_used: u32,
    max_activity_points: u32,
}

impl SessionScheduler {
    /// Start from the grid's clock before any advance.
    pub fn new(clock: ClockReading, max_activity_points: u32) -> Self {
        Self {
            current_session_date: clock.date,
            previous_session_date: None,
            current_season_index: clock.season_index,
            previous_season_index: clock.season_index,
            session_number: 0,
            activity_points_used: 0,
            max_activity_points,
        }
    }

    /// Shift identity forward to the grid's new clock and reset the budget.
    pub fn on_session_advanced(&mut self, clock: ClockReading) {
        self.previous_session_date = Some(self.current_session_date);
        self.current_session_date = clock.date;
        self.previous_season_index = self.current_season_index;
        self.current_season_index = clock.season_index;
        self.session_number += 1;
        self.activity_points_used = 0;
    }

    pub fn season_changed(&self) -> bool {
        self.current_season_index != self.previous_season_index
    }

    pub fn can_admit(&self, cost: u32) -> bool {
        self.activity_points_used
            .checked_add(cost)
            .is_some_and(|total| total <= self.max_activity_points)
    }

    /// Spend `cost` points. Rejected without change when it would overrun the budget.
    pub fn charge(&mut self, cost: u32) -> Result<(), FarmError> {
        if !self.can_admit(cost) {
            return Err(FarmError::BudgetExceeded {
                cost,
                used: self.activity_points_used,
                max: self.max_activity_points,
            });
        }
        self.activity_points_used += cost;
        Ok(())
    }

    /// Return `cost` points, clamping at zero.
    pub fn refund(&mut self, cost: u32) {
        if cost > self.activity_points_used {
            error!(
                cost,
                used = self.activity_points_used,
                "activity point refund exceeds points in use; clamping to zero"
            );
        }
        self.activity_points_used = self.activity_points_used.saturating_sub(cost);
    }

    pub fn current_session_date(&self) -> NaiveDate {
        self.current_session_date
    }

    pub fn previous_session_date(&self) -> Option<NaiveDate> {
        self.previous_session_date
    }

    pub fn current_season_index(&self) -> u32 {
        self.current_season_index
    }

    pub fn previous_season_index(&self) -> u32 {
        self.previous_season_index
    }

    pub fn session_number(&self) -> u32 {
        self.session_number
    }

    pub fn activity_points_used(&self) -> u32 {
        self.activity_points_used
    }

    pub fn max_activity_points(&self) -> u32 {
        self.max_activity_points
    }

    pub fn remaining_points(&self) -> u32 {
        self.max_activity_points - self.activity_points_used
    }
}
