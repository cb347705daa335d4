//! The sector grid: lockstep advancement of every unit plus read-only views.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use rand::Rng;
use tracing::{debug, info};

use crate::{
    ClockReading, Constants, EngineFactory, EngineSetup, FarmError, Metric, SectorId,
    SimulationUnit, TaskTarget, WeatherMode, WeatherSeries, WeatherSummary, MAX_ROWS,
};

/// Days between debug canopy samples during an advance.
const CANOPY_LOG_INTERVAL_DAYS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// Days on which at least one unit was still running.
    pub days_run: u32,
    pub clock: ClockReading,
}

pub struct SectorGridManager {
    /// Row-major: `units[row][col]`.
    units: Vec<Vec<SimulationUnit>>,
    cols: usize,
    weather: Arc<WeatherSeries>,
    /// Reported as the clock while the grid has no units.
    start_date: NaiveDate,
    taw_penalty: f64,
}

impl SectorGridManager {
    /// Build a `rows` × `cols` grid with `penalty_count` degraded-soil cells
    /// drawn from `rng`.
    pub fn initialize(
        rows: usize,
        cols: usize,
        penalty_count: usize,
        setup: &EngineSetup,
        factory: &impl EngineFactory,
        rng: &mut impl Rng,
    ) -> Result<Self, FarmError> {
        if rows > MAX_ROWS {
            return Err(FarmError::InvalidGrid(format!(
                "{rows} rows requested, at most {MAX_ROWS} are labelled"
            )));
        }
        let total = rows * cols;
        if penalty_count > total {
            return Err(FarmError::InvalidGrid(format!(
                "{penalty_count} penalty cells requested for {total} cells"
            )));
        }

        let penalised: HashSet<usize> = if penalty_count == 0 {
            HashSet::new()
        } else {
            rand::seq::index::sample(rng, total, penalty_count)
                .into_iter()
                .collect()
        };

        let degraded_setup = EngineSetup {
            soil: setup.degraded_soil.clone(),
            ..setup.clone()
        };

        let mut units = Vec::with_capacity(rows);
        for row in 0..rows {
            let mut row_units = Vec::with_capacity(cols);
            for col in 0..cols {
                let id = SectorId::from_indices(row, col).ok_or_else(|| {
                    FarmError::InvalidGrid(format!("column {} cannot be labelled", col + 1))
                })?;
                let has_penalty = penalised.contains(&(row * cols + col));
                let engine = if has_penalty {
                    factory.construct(&degraded_setup)
                } else {
                    factory.construct(setup)
                };
                row_units.push(SimulationUnit::new(id, engine, has_penalty));
            }
            units.push(row_units);
        }

        let weather = units
            .iter()
            .flatten()
            .next()
            .map_or_else(Arc::default, |unit| unit.engine().weather_series());

        let grid = Self {
            units,
            cols,
            weather,
            start_date: setup.start_date,
            taw_penalty: Constants::default().taw_penalty,
        };

        info!(
            rows,
            cols,
            penalty_sectors = ?grid.penalty_sectors(),
            "farm initialized - initial canopy cover: {}",
            format_readings(&grid.aggregate(Metric::CanopyCover)),
        );
        Ok(grid)
    }

    pub fn with_taw_penalty(mut self, taw_penalty: f64) -> Self {
        self.taw_penalty = taw_penalty;
        self
    }

    pub fn taw_penalty(&self) -> f64 {
        self.taw_penalty
    }

    /// Advance every unfinished unit by up to `days` days in lockstep.
    ///
    /// Finished units are skipped, so once every unit is done this leaves all
    /// histories untouched.
    pub fn advance_session(&mut self, days: u32) -> AdvanceOutcome {
        let taw_penalty = self.taw_penalty;
        let mut days_run = 0;

        for day in 0..days {
            let mut advanced = 0usize;
            for unit in self.units.iter_mut().flatten() {
                if unit.advance_day(taw_penalty) {
                    advanced += 1;
                }
            }
            if advanced == 0 {
                break;
            }
            days_run += 1;

            if day % CANOPY_LOG_INTERVAL_DAYS == 0 {
                debug!(
                    day = day + 1,
                    advanced,
                    mean_canopy_cover = self.mean(Metric::CanopyCover),
                    "session day complete"
                );
            }
        }

        let clock = self.clock();
        info!(
            days_requested = days,
            days_run,
            date = %clock.date,
            season = clock.season_index,
            "session advanced - canopy cover: {}",
            format_readings(&self.aggregate(Metric::CanopyCover)),
        );
        AdvanceOutcome { days_run, clock }
    }

    /// Date and season shared by all units, or the start date and season 0
    /// when the grid holds no units.
    pub fn clock(&self) -> ClockReading {
        self.units().next().map_or(
            ClockReading {
                date: self.start_date,
                season_index: 0,
            },
            |unit| ClockReading {
                date: unit.engine().current_date(),
                season_index: unit.engine().season_index(),
            },
        )
    }

    pub fn current_date(&self) -> NaiveDate {
        self.clock().date
    }

    pub fn season_index(&self) -> u32 {
        self.clock().season_index
    }

    pub fn aggregate(&self, metric: Metric) -> BTreeMap<SectorId, f64> {
        self.units()
            .map(|unit| (unit.id(), unit.reading(metric)))
            .collect()
    }

    /// Mean of `metric` across units; 0.0 for an empty grid.
    pub fn mean(&self, metric: Metric) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.units().map(|u| u.reading(metric)).sum::<f64>() / self.len() as f64
    }

    pub fn canopy_histories(&self) -> BTreeMap<SectorId, &[f64]> {
        self.units().map(|unit| (unit.id(), unit.history())).collect()
    }

    pub fn weather(&self) -> &Arc<WeatherSeries> {
        &self.weather
    }

    pub fn weather_window(
        &self,
        from: NaiveDate,
        to_exclusive: NaiveDate,
        mode: WeatherMode,
    ) -> Option<WeatherSummary> {
        self.weather.window(from, to_exclusive, mode)
    }

    /// Add `mm` of water to the stored soil water of every targeted unit.
    pub fn apply_water(&mut self, target: TaskTarget, mm: f64) -> Result<(), FarmError> {
        match target {
            TaskTarget::All => {
                for unit in self.units.iter_mut().flatten() {
                    unit.add_water(mm);
                }
            }
            TaskTarget::Sector(id) => {
                let unit = self.unit_mut(id).ok_or(FarmError::UnknownSector(id))?;
                unit.add_water(mm);
            }
        }
        Ok(())
    }

    pub fn check_target(&self, target: TaskTarget) -> Result<(), FarmError> {
        match target {
            TaskTarget::Sector(id) if !self.contains(id) => Err(FarmError::UnknownSector(id)),
            TaskTarget::Sector(_) | TaskTarget::All => Ok(()),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.units().all(SimulationUnit::is_finished)
    }

    pub fn unit(&self, id: SectorId) -> Option<&SimulationUnit> {
        self.units.get(id.row_index())?.get(id.col_index())
    }

    fn unit_mut(&mut self, id: SectorId) -> Option<&mut SimulationUnit> {
        self.units.get_mut(id.row_index())?.get_mut(id.col_index())
    }

    pub fn contains(&self, id: SectorId) -> bool {
        self.unit(id).is_some()
    }

    /// Units in row-major order.
    pub fn units(&self) -> impl Iterator<Item = &SimulationUnit> {
        self.units.iter().flatten()
    }

    pub fn sector_ids(&self) -> Vec<SectorId> {
        self.units().map(SimulationUnit::id).collect()
    }

    pub fn penalty_sectors(&self) -> Vec<SectorId> {
        self.units()
            .filter(|u| u.has_soil_penalty())
            .map(SimulationUnit::id)
            .collect()
    }

    pub fn rows(&self) -> usize {
        self.units.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.rows() * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn format_readings(readings: &BTreeMap<SectorId, f64>) -> String {
    readings
        .iter()
        .map(|(id, value)| format!("{id}={value:.3}"))
        .collect::<Vec<_>>()
        .join(" ")
}
