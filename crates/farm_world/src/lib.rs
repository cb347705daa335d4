//! Content loading and farm construction shared by the CLI and tests.

mod climate;

pub use climate::{load_climate, parse_climate, synthesize_weather};

use std::path::Path;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use chrono::NaiveDate;
use farm_core::{
    Constants, CropProfile, EngineSetup, FarmSession, InitialWaterContent, SectorGridManager,
    SoilProfile, WaterBalanceFactory, WeatherSeries, MAX_ROWS,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    /// Cells drawn at random to carry the degraded soil.
    pub penalty_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Everything in `farm.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmConfig {
    pub content_version: String,
    pub grid: GridConfig,
    pub simulation: SimulationWindow,
    pub soil: SoilProfile,
    pub degraded_soil: SoilProfile,
    pub crop: CropProfile,
    pub initial_water: InitialWaterContent,
    /// AquaCrop climate file, relative to the content directory. Weather is
    /// synthesized from the seed when absent.
    #[serde(default)]
    pub weather_file: Option<String>,
    #[serde(default)]
    pub constants: Constants,
}

impl FarmConfig {
    pub fn engine_setup(&self) -> EngineSetup {
        EngineSetup {
            soil: self.soil.clone(),
            degraded_soil: self.degraded_soil.clone(),
            crop: self.crop.clone(),
            start_date: self.simulation.start_date,
            end_date: self.simulation.end_date,
            initial_water: self.initial_water,
        }
    }
}

fn validate_soil(soil: &SoilProfile) {
    assert!(
        soil.wilting_point_mm >= 0.0,
        "soil '{}' has a negative wilting point",
        soil.name,
    );
    assert!(
        soil.wilting_point_mm < soil.field_capacity_mm,
        "soil '{}' wilting point {} is not below field capacity {}",
        soil.name,
        soil.wilting_point_mm,
        soil.field_capacity_mm,
    );
}

/// Checks `farm.json` for authoring errors, panicking on the first one found.
pub fn validate_config(config: &FarmConfig) {
    let grid = &config.grid;
    assert!(
        grid.rows >= 1 && grid.cols >= 1,
        "grid must have at least one row and one column",
    );
    assert!(
        grid.rows <= MAX_ROWS,
        "grid has {} rows but only {MAX_ROWS} row letters exist",
        grid.rows,
    );
    assert!(
        grid.penalty_count <= grid.rows * grid.cols,
        "penalty_count {} exceeds the {} grid cells",
        grid.penalty_count,
        grid.rows * grid.cols,
    );

    assert!(
        config.simulation.start_date <= config.simulation.end_date,
        "simulation start {} is after end {}",
        config.simulation.start_date,
        config.simulation.end_date,
    );

    validate_soil(&config.soil);
    validate_soil(&config.degraded_soil);

    let crop = &config.crop;
    assert!(
        NaiveDate::from_ymd_opt(2000, crop.planting_month, crop.planting_day).is_some(),
        "crop '{}' planting date {}/{} is not a calendar day",
        crop.name,
        crop.planting_day,
        crop.planting_month,
    );
    assert!(
        crop.season_length_days > 0,
        "crop '{}' has a zero-length season",
        crop.name,
    );
    assert!(
        crop.senescence_start_days <= crop.season_length_days,
        "crop '{}' senescence starts after harvest",
        crop.name,
    );
    assert!(
        0.0 < crop.initial_canopy_cover && crop.initial_canopy_cover <= crop.max_canopy_cover,
        "crop '{}' initial canopy cover must be positive and at most the maximum",
        crop.name,
    );
    assert!(
        crop.max_canopy_cover <= 1.0,
        "crop '{}' maximum canopy cover exceeds 1.0",
        crop.name,
    );
    assert!(
        crop.base_temp < crop.optimum_temp,
        "crop '{}' base temperature is not below its optimum",
        crop.name,
    );

    if let InitialWaterContent::Fraction(fraction) = config.initial_water {
        assert!(
            (0.0..=1.0).contains(&fraction),
            "initial water fraction {fraction} is outside 0..=1",
        );
    }

    let c = &config.constants;
    assert!(c.session_days > 0, "session_days must be positive");
    assert!(c.max_activity_points > 0, "max_activity_points must be positive");
    assert!(
        (0.0..1.0).contains(&c.taw_penalty),
        "taw_penalty {} is outside 0..1",
        c.taw_penalty,
    );
}

pub fn load_config(content_dir: &str) -> Result<FarmConfig> {
    let dir = Path::new(content_dir);
    let config: FarmConfig = serde_json::from_str(
        &std::fs::read_to_string(dir.join("farm.json")).context("reading farm.json")?,
    )
    .context("parsing farm.json")?;
    validate_config(&config);
    Ok(config)
}

/// The configured climate file, or seeded synthetic weather over the run.
pub fn load_weather(
    config: &FarmConfig,
    content_dir: &str,
    rng: &mut impl Rng,
) -> Result<WeatherSeries> {
    let weather = match &config.weather_file {
        Some(file) => load_climate(&Path::new(content_dir).join(file))?,
        None => synthesize_weather(
            config.simulation.start_date,
            config.simulation.end_date,
            rng,
        ),
    };
    ensure!(
        weather.first_date() <= Some(config.simulation.start_date)
            && weather.last_date() >= Some(config.simulation.end_date),
        "weather covers {:?}..={:?} but the simulation runs {}..={}",
        weather.first_date(),
        weather.last_date(),
        config.simulation.start_date,
        config.simulation.end_date,
    );
    Ok(weather)
}

pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Build the initial session: reference engines on every cell, penalty cells
/// drawn from `rng`.
pub fn build_farm(
    config: &FarmConfig,
    weather: WeatherSeries,
    rng: &mut impl Rng,
) -> Result<FarmSession> {
    let factory = WaterBalanceFactory::new(Arc::new(weather));
    let grid = SectorGridManager::initialize(
        config.grid.rows,
        config.grid.cols,
        config.grid.penalty_count,
        &config.engine_setup(),
        &factory,
        rng,
    )
    .context("initializing sector grid")?;
    Ok(FarmSession::new(grid, config.constants.clone()))
}

/// Load content, weather and grid from `content_dir` with one seeded rng.
pub fn load_farm(content_dir: &str, seed: u64) -> Result<(FarmConfig, FarmSession)> {
    let config = load_config(content_dir)?;
    let mut rng = seeded_rng(seed);
    let weather = load_weather(&config, content_dir, &mut rng)?;
    let session = build_farm(&config, weather, &mut rng)?;
    Ok((config, session))
}
