use std::sync::Arc;

use chrono::NaiveDate;

use crate::{EngineSetup, WeatherSeries};

/// Narrow capability surface of a per-unit crop simulation.
///
/// The grid only ever talks to an engine through this trait, so any daily
/// agronomic model can sit behind it.
pub trait CropEngine: Send {
    fn is_finished(&self) -> bool;

    /// Advance one simulated day. Callers must check `is_finished` first.
    fn advance_one_day(&mut self);

    /// Fraction of ground covered by canopy, 0..=1.
    fn canopy_cover(&self) -> f64;

    /// Above-ground biomass, tonnes/ha.
    fn biomass(&self) -> f64;

    /// Stored soil water, mm.
    fn soil_water(&self) -> f64;

    fn set_soil_water(&mut self, mm: f64);

    /// Date of the next day to be simulated.
    fn current_date(&self) -> NaiveDate;

    /// Crop-cycle counter maintained by the engine.
    fn season_index(&self) -> u32;

    fn weather_series(&self) -> Arc<WeatherSeries>;
}

/// Builds engine handles for grid units.
pub trait EngineFactory {
    fn construct(&self, setup: &EngineSetup) -> Box<dyn CropEngine>;
}
