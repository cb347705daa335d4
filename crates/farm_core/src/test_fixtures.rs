//! Shared test fixtures for farm_core and downstream crates.
//!
//! `RecordingFactory` builds deterministic engines that log the stored soil
//! water they see at the start of every day, so tests can check what the grid
//! did to a unit before the engine ran. `base_setup()` and `mild_weather()`
//! give a wheat-on-sandy-loam configuration for the reference engine.

use crate::{
    Constants, CropEngine, CropProfile, EngineFactory, EngineSetup, FarmSession,
    InitialWaterContent, SectorGridManager, SoilProfile, WeatherRecord, WeatherSeries,
};
use chrono::NaiveDate;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

pub fn sandy_loam() -> SoilProfile {
    SoilProfile {
        name: "SandyLoam".to_string(),
        field_capacity_mm: 160.0,
        wilting_point_mm: 60.0,
    }
}

pub fn degraded_sandy_loam() -> SoilProfile {
    SoilProfile {
        name: "SandyLoam (degraded)".to_string(),
        field_capacity_mm: 130.0,
        wilting_point_mm: 60.0,
    }
}

pub fn wheat() -> CropProfile {
    CropProfile {
        name: "Wheat".to_string(),
        planting_month: 10,
        planting_day: 1,
        season_length_days: 200,
        senescence_start_days: 150,
        initial_canopy_cover: 0.05,
        max_canopy_cover: 0.9,
        canopy_growth_coefficient: 0.08,
        canopy_decline_coefficient: 0.02,
        water_productivity: 0.015,
        base_temp: 0.0,
        optimum_temp: 20.0,
    }
}

/// Wheat planted on the start date; the run ends 2 years later.
pub fn base_setup() -> EngineSetup {
    EngineSetup {
        soil: sandy_loam(),
        degraded_soil: degraded_sandy_loam(),
        crop: wheat(),
        start_date: date(1979, 10, 1),
        end_date: date(1981, 9, 30),
        initial_water: InitialWaterContent::FieldCapacity,
    }
}

/// `days` identical mild days starting at `start`: 8–20°C, 2mm rain, 3mm ET0.
pub fn mild_weather(start: NaiveDate, days: u64) -> WeatherSeries {
    WeatherSeries::new(
        start
            .iter_days()
            .take(usize::try_from(days).expect("fixture length fits usize"))
            .map(|d| WeatherRecord {
                date: d,
                min_temp: 8.0,
                max_temp: 20.0,
                precipitation: 2.0,
                reference_et: 3.0,
            })
            .collect(),
    )
}

/// Weather covering the whole of `base_setup()`.
pub fn base_weather() -> Arc<WeatherSeries> {
    Arc::new(mild_weather(date(1979, 10, 1), 731))
}

// ---------------------------------------------------------------------------
// Recording engine
// ---------------------------------------------------------------------------

/// Stored water each engine consumes per day.
pub const RECORDING_DAILY_USE_MM: f64 = 1.0;

pub type WaterLog = Arc<Mutex<Vec<f64>>>;

/// Deterministic engine: canopy +0.01/day, biomass +0.1/day, water −1mm/day,
/// season index +1 every `season_length` days.
pub struct RecordingEngine {
    date: NaiveDate,
    end_date: NaiveDate,
    soil_water: f64,
    canopy_cover: f64,
    biomass: f64,
    season_index: u32,
    season_length: u32,
    days_in_season: u32,
    weather: Arc<WeatherSeries>,
    water_log: WaterLog,
}

impl CropEngine for RecordingEngine {
    fn is_finished(&self) -> bool {
        self.date > self.end_date
    }

    fn advance_one_day(&mut self) {
        assert!(!self.is_finished(), "advanced a finished engine");
        self.water_log.lock().push(self.soil_water);
        self.soil_water = (self.soil_water - RECORDING_DAILY_USE_MM).max(0.0);
        self.canopy_cover = (self.canopy_cover + 0.01).min(1.0);
        self.biomass += 0.1;
        self.days_in_season += 1;
        if self.days_in_season >= self.season_length {
            self.days_in_season = 0;
            self.season_index += 1;
        }
        self.date = self.date.succ_opt().expect("fixture date in range");
    }

    fn canopy_cover(&self) -> f64 {
        self.canopy_cover
    }

    fn biomass(&self) -> f64 {
        self.biomass
    }

    fn soil_water(&self) -> f64 {
        self.soil_water
    }

    fn set_soil_water(&mut self, mm: f64) {
        self.soil_water = mm;
    }

    fn current_date(&self) -> NaiveDate {
        self.date
    }

    fn season_index(&self) -> u32 {
        self.season_index
    }

    fn weather_series(&self) -> Arc<WeatherSeries> {
        Arc::clone(&self.weather)
    }
}

/// Builds `RecordingEngine`s and keeps each one's water log in construction
/// (row-major) order.
pub struct RecordingFactory {
    weather: Arc<WeatherSeries>,
    season_length: u32,
    logs: Mutex<Vec<WaterLog>>,
}

impl RecordingFactory {
    pub fn new(weather: Arc<WeatherSeries>) -> Self {
        Self {
            weather,
            season_length: 45,
            logs: Mutex::new(Vec::new()),
        }
    }

    pub fn with_season_length(mut self, days: u32) -> Self {
        self.season_length = days;
        self
    }

    /// Water readings seen at the start of each day by the `index`-th engine built.
    pub fn water_log(&self, index: usize) -> Vec<f64> {
        self.logs.lock()[index].lock().clone()
    }
}

impl EngineFactory for RecordingFactory {
    fn construct(&self, setup: &EngineSetup) -> Box<dyn CropEngine> {
        let water_log = WaterLog::default();
        self.logs.lock().push(Arc::clone(&water_log));
        Box::new(RecordingEngine {
            date: setup.start_date,
            end_date: setup.end_date,
            soil_water: setup.initial_water.resolve(&setup.soil),
            canopy_cover: 0.0,
            biomass: 0.0,
            season_index: 0,
            season_length: self.season_length,
            days_in_season: 0,
            weather: Arc::clone(&self.weather),
            water_log,
        })
    }
}

/// Setup whose run is exactly `days` days long.
pub fn short_setup(days: u64) -> EngineSetup {
    let mut setup = base_setup();
    setup.end_date = setup.start_date + chrono::Days::new(days - 1);
    setup
}

/// A recording-engine grid of `rows` × `cols` with `penalty_count` degraded cells.
pub fn recording_grid(
    rows: usize,
    cols: usize,
    penalty_count: usize,
    setup: &EngineSetup,
) -> (SectorGridManager, RecordingFactory) {
    let factory = RecordingFactory::new(base_weather());
    let grid = SectorGridManager::initialize(
        rows,
        cols,
        penalty_count,
        setup,
        &factory,
        &mut make_rng(),
    )
    .expect("fixture grid is valid");
    (grid, factory)
}

/// 4×4 recording-engine farm with 2 penalty cells and default constants.
pub fn base_session() -> FarmSession {
    let (grid, _) = recording_grid(4, 4, 2, &base_setup());
    FarmSession::new(grid, Constants::default())
}
