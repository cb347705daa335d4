//! Type definitions for `farm_core`.
//!
//! Identifiers, weather records, task and journal values, engine setup
//! profiles, and the tunable constants shared by every component.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::FarmError;

// ---------------------------------------------------------------------------
// Sector identifiers
// ---------------------------------------------------------------------------

const ROW_LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Maximum grid rows: one per row letter.
pub const MAX_ROWS: usize = ROW_LETTERS.len();

/// Grid cell label: row letter plus 1-based column, e.g. `B3`.
///
/// Ordered row-major so `B10` sorts after `B2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SectorId {
    row: u8,
    col: u16,
}

impl SectorId {
    /// Build from zero-based row and column indices.
    ///
    /// Returns `None` when the row has no letter.
    pub fn from_indices(row: usize, col: usize) -> Option<Self> {
        if row >= MAX_ROWS {
            return None;
        }
        let col = u16::try_from(col.checked_add(1)?).ok()?;
        #[allow(clippy::cast_possible_truncation)]
        Some(Self {
            row: row as u8,
            col,
        })
    }

    /// Zero-based row index.
    pub fn row_index(self) -> usize {
        usize::from(self.row)
    }

    /// Zero-based column index.
    pub fn col_index(self) -> usize {
        usize::from(self.col) - 1
    }

    pub fn row_letter(self) -> char {
        char::from(ROW_LETTERS[self.row_index()])
    }
}

impl fmt::Display for SectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_letter(), self.col)
    }
}

impl FromStr for SectorId {
    type Err = FarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || FarmError::MalformedCommand(format!("'{s}' is not a sector label"));
        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(malformed)?.to_ascii_uppercase();
        let row = ROW_LETTERS
            .iter()
            .position(|l| char::from(*l) == letter)
            .ok_or_else(malformed)?;
        let col: usize = chars.as_str().parse().map_err(|_| malformed())?;
        if col == 0 {
            return Err(malformed());
        }
        Self::from_indices(row, col - 1).ok_or_else(malformed)
    }
}

impl TryFrom<String> for SectorId {
    type Error = FarmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SectorId> for String {
    fn from(id: SectorId) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// One day of climate input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub date: NaiveDate,
    pub min_temp: f64,
    pub max_temp: f64,
    /// mm
    pub precipitation: f64,
    /// Reference evapotranspiration, mm.
    pub reference_et: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherMode {
    /// Observed extremes and total rainfall.
    Actual,
    /// Averages, with rainfall scaled to the window length.
    Forecast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    pub mode: WeatherMode,
    pub min_temp: f64,
    pub max_temp: f64,
    pub precipitation: f64,
    /// Records that fell inside the window.
    pub days: usize,
}

// ---------------------------------------------------------------------------
// Grid readings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    CanopyCover,
    Biomass,
    SoilWater,
}

/// The grid's shared clock as read after an advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReading {
    pub date: NaiveDate,
    pub season_index: u32,
}

// ---------------------------------------------------------------------------
// Tasks and journal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskTarget {
    Sector(SectorId),
    All,
}

impl fmt::Display for TaskTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskTarget::Sector(id) => id.fmt(f),
            TaskTarget::All => f.write_str("ALL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskKind {
    Investigate { sector: SectorId },
    Irrigate { target: TaskTarget, depth_mm: f64 },
    Pesticide { target: TaskTarget },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub cost: u32,
    pub kind: TaskKind,
    pub created_session_date: NaiveDate,
}

/// Committed task descriptions for one session date. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub session_date: NaiveDate,
    pub descriptions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Engine setup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilProfile {
    pub name: String,
    pub field_capacity_mm: f64,
    pub wilting_point_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    pub name: String,
    pub planting_month: u32,
    pub planting_day: u32,
    pub season_length_days: u32,
    /// Days after planting when canopy decline starts.
    pub senescence_start_days: u32,
    pub initial_canopy_cover: f64,
    pub max_canopy_cover: f64,
    /// Fractional canopy growth per day under no stress.
    pub canopy_growth_coefficient: f64,
    /// Fractional canopy loss per day after senescence starts.
    pub canopy_decline_coefficient: f64,
    /// Tonnes/ha of biomass per mm of transpired water.
    pub water_productivity: f64,
    pub base_temp: f64,
    pub optimum_temp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InitialWaterContent {
    FieldCapacity,
    WiltingPoint,
    /// Fraction of the way from wilting point to field capacity.
    Fraction(f64),
}

impl InitialWaterContent {
    pub fn resolve(self, soil: &SoilProfile) -> f64 {
        match self {
            InitialWaterContent::FieldCapacity => soil.field_capacity_mm,
            InitialWaterContent::WiltingPoint => soil.wilting_point_mm,
            InitialWaterContent::Fraction(fraction) => {
                let fraction = fraction.clamp(0.0, 1.0);
                soil.wilting_point_mm + fraction * (soil.field_capacity_mm - soil.wilting_point_mm)
            }
        }
    }
}

/// Parameters handed to an engine factory for one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSetup {
    pub soil: SoilProfile,
    /// Profile used instead of `soil` for soil-penalty units.
    pub degraded_soil: SoilProfile,
    pub crop: CropProfile,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_water: InitialWaterContent,
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    #[serde(default = "default_session_days")]
    pub session_days: u32,
    #[serde(default = "default_max_activity_points")]
    pub max_activity_points: u32,
    /// Fraction of stored soil water lost each day on penalty units.
    #[serde(default = "default_taw_penalty")]
    pub taw_penalty: f64,
}

fn default_session_days() -> u32 {
    30
}

fn default_max_activity_points() -> u32 {
    4
}

fn default_taw_penalty() -> f64 {
    0.03
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            session_days: default_session_days(),
            max_activity_points: default_max_activity_points(),
            taw_penalty: default_taw_penalty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sector_id_round_trips_through_label() {
        let id: SectorId = "c4".parse().unwrap();
        assert_eq!(id.row_index(), 2);
        assert_eq!(id.col_index(), 3);
        assert_eq!(id.to_string(), "C4");
    }

    #[test]
    fn sector_id_rejects_bad_labels() {
        for label in ["", "4", "A", "A0", "AA1", "é1", "B-2"] {
            assert!(
                matches!(label.parse::<SectorId>(), Err(FarmError::MalformedCommand(_))),
                "{label} should not parse"
            );
        }
    }

    #[test]
    fn sector_ids_order_by_row_then_column() {
        let mut ids: Vec<SectorId> = ["B10", "A2", "B2", "A1"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        ids.sort();
        let labels: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["A1", "A2", "B2", "B10"]);
    }

    #[test]
    fn sector_id_serializes_as_label() {
        let id = SectorId::from_indices(3, 0).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"D1\"");
        let back: SectorId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn initial_water_fraction_interpolates() {
        let soil = SoilProfile {
            name: "test".to_string(),
            field_capacity_mm: 200.0,
            wilting_point_mm: 100.0,
        };
        let water = InitialWaterContent::Fraction(0.25).resolve(&soil);
        assert!((water - 125.0).abs() < 1e-9);
    }

    #[test]
    fn constants_fill_defaults_when_omitted() {
        let constants: Constants = serde_json::from_str("{}").unwrap();
        assert_eq!(constants, Constants::default());
        assert_eq!(constants.max_activity_points, 4);
    }
}
