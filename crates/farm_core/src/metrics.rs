//! Snapshot metrics computed from a `FarmSession`.
//!
//! `compute_metrics` samples the session after each step for time-series
//! analysis. No state mutation. The CSV helpers are the only IO in the crate.

use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{FarmSession, Metric, SimulationUnit};

/// Bumped whenever a column is added, removed or reordered.
const METRICS_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionMetrics {
    pub session: u32,
    pub metrics_version: u32,
    pub date: NaiveDate,
    pub season_index: u32,

    // Crop state across all sectors
    pub mean_canopy_cover: f64,
    pub max_canopy_cover: f64,
    pub mean_biomass: f64,
    pub mean_soil_water: f64,
    /// Mean over soil-penalty sectors only; 0.0 when there are none.
    pub penalty_mean_canopy_cover: f64,

    pub sectors: u32,
    pub penalty_sectors: u32,
    pub finished_sectors: u32,

    // Scheduling
    pub activity_points_used: u32,
    pub pending_tasks: u32,
    pub journal_entries: u32,
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

pub fn compute_metrics(session: &FarmSession) -> SessionMetrics {
    let grid = session.grid();
    let scheduler = session.scheduler();

    let penalised: Vec<&SimulationUnit> = grid.units().filter(|u| u.has_soil_penalty()).collect();
    let penalty_mean_canopy_cover = if penalised.is_empty() {
        0.0
    } else {
        penalised
            .iter()
            .map(|u| u.reading(Metric::CanopyCover))
            .sum::<f64>()
            / penalised.len() as f64
    };

    SessionMetrics {
        session: scheduler.session_number(),
        metrics_version: METRICS_VERSION,
        date: scheduler.current_session_date(),
        season_index: scheduler.current_season_index(),
        mean_canopy_cover: grid.mean(Metric::CanopyCover),
        max_canopy_cover: grid
            .units()
            .map(|u| u.reading(Metric::CanopyCover))
            .fold(0.0, f64::max),
        mean_biomass: grid.mean(Metric::Biomass),
        mean_soil_water: grid.mean(Metric::SoilWater),
        penalty_mean_canopy_cover,
        sectors: count_u32(grid.len()),
        penalty_sectors: count_u32(penalised.len()),
        finished_sectors: count_u32(grid.units().filter(|u| u.is_finished()).count()),
        activity_points_used: scheduler.activity_points_used(),
        pending_tasks: count_u32(session.queue().len()),
        journal_entries: count_u32(session.journal().len()),
    }
}

/// Write the CSV header row for metrics.
pub fn write_metrics_header(writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(
        writer,
        "session,metrics_version,date,season_index,\
         mean_canopy_cover,max_canopy_cover,mean_biomass,mean_soil_water,penalty_mean_canopy_cover,\
         sectors,penalty_sectors,finished_sectors,\
         activity_points_used,pending_tasks,journal_entries"
    )
}

/// Append a single metrics snapshot as a CSV row.
pub fn append_metrics_row(
    writer: &mut impl Write,
    snapshot: &SessionMetrics,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "{},{},{},{},{:.4},{:.4},{:.4},{:.2},{:.4},{},{},{},{},{},{}",
        snapshot.session,
        snapshot.metrics_version,
        snapshot.date,
        snapshot.season_index,
        snapshot.mean_canopy_cover,
        snapshot.max_canopy_cover,
        snapshot.mean_biomass,
        snapshot.mean_soil_water,
        snapshot.penalty_mean_canopy_cover,
        snapshot.sectors,
        snapshot.penalty_sectors,
        snapshot.finished_sectors,
        snapshot.activity_points_used,
        snapshot.pending_tasks,
        snapshot.journal_entries,
    )
}

/// Streams one row per session to `metrics.csv` inside a run directory.
pub struct MetricsFileWriter {
    writer: std::io::BufWriter<std::fs::File>,
}

impl MetricsFileWriter {
    /// Create `metrics.csv` in `run_dir` and write the header row.
    pub fn new(run_dir: &std::path::Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(run_dir.join("metrics.csv"))?;
        let mut writer = std::io::BufWriter::new(file);
        write_metrics_header(&mut writer)?;
        Ok(Self { writer })
    }

    pub fn write_row(&mut self, snapshot: &SessionMetrics) -> std::io::Result<()> {
        append_metrics_row(&mut self.writer, snapshot)?;
        self.writer.flush()
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}
