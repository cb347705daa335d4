//! Reference daily crop engine.
//!
//! A single-bucket soil water balance drives a logistic canopy and a
//! water-productivity biomass model. Coarse next to a full agronomic
//! simulator, but it honours the `CropEngine` contract: a shared daily clock,
//! a settable soil-water state, and a season counter bumped at harvest.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use crate::{CropEngine, CropProfile, EngineFactory, EngineSetup, SoilProfile, WeatherSeries};

/// Share of reference ET drawn from bare soil when the canopy is absent.
const BARE_SOIL_EVAPORATION: f64 = 0.3;

pub struct WaterBalanceModel {
    soil: SoilProfile,
    crop: CropProfile,
    end_date: NaiveDate,
    weather: Arc<WeatherSeries>,
    date: NaiveDate,
    finished: bool,
    soil_water: f64,
    canopy_cover: f64,
    biomass: f64,
    season_index: u32,
    /// `None` while the field lies fallow.
    days_after_planting: Option<u32>,
    last_harvest: Option<f64>,
}

impl WaterBalanceModel {
    pub fn new(setup: &EngineSetup, weather: Arc<WeatherSeries>) -> Self {
        Self {
            soil: setup.soil.clone(),
            crop: setup.crop.clone(),
            end_date: setup.end_date,
            weather,
            date: setup.start_date,
            finished: setup.start_date > setup.end_date,
            soil_water: setup.initial_water.resolve(&setup.soil),
            canopy_cover: 0.0,
            biomass: 0.0,
            season_index: 0,
            days_after_planting: None,
            last_harvest: None,
        }
    }

    /// Biomass at the most recent harvest.
    pub fn last_harvest(&self) -> Option<f64> {
        self.last_harvest
    }

    pub fn is_growing(&self) -> bool {
        self.days_after_planting.is_some()
    }

    /// 1.0 at field capacity, 0.0 at or below wilting point.
    fn water_stress_factor(&self) -> f64 {
        let span = (self.soil.field_capacity_mm - self.soil.wilting_point_mm).max(f64::EPSILON);
        ((self.soil_water - self.soil.wilting_point_mm) / span).clamp(0.0, 1.0)
    }

    fn thermal_factor(&self, mean_temp: f64) -> f64 {
        let span = (self.crop.optimum_temp - self.crop.base_temp).max(f64::EPSILON);
        ((mean_temp - self.crop.base_temp) / span).clamp(0.0, 1.0)
    }

    fn is_planting_day(&self) -> bool {
        self.date.month() == self.crop.planting_month && self.date.day() == self.crop.planting_day
    }

    fn grow_canopy(&mut self, days_after_planting: u32, stress: f64, thermal: f64) {
        let ccx = self.crop.max_canopy_cover;
        if days_after_planting < self.crop.senescence_start_days {
            let growth = self.crop.canopy_growth_coefficient
                * self.canopy_cover
                * (1.0 - self.canopy_cover / ccx)
                * stress
                * thermal;
            self.canopy_cover = (self.canopy_cover + growth).clamp(0.0, ccx);
        } else {
            self.canopy_cover *= 1.0 - self.crop.canopy_decline_coefficient;
        }
    }

    fn harvest(&mut self) {
        self.last_harvest = Some(self.biomass);
        self.season_index += 1;
        self.days_after_planting = None;
        self.canopy_cover = 0.0;
        self.biomass = 0.0;
    }
}

impl CropEngine for WaterBalanceModel {
    fn is_finished(&self) -> bool {
        self.finished
    }

    fn advance_one_day(&mut self) {
        if self.finished {
            return;
        }

        if self.days_after_planting.is_none() && self.is_planting_day() {
            self.days_after_planting = Some(0);
            self.canopy_cover = self.crop.initial_canopy_cover;
            self.biomass = 0.0;
        }

        // Days without a record bring no rain and no evaporative demand.
        let (mean_temp, rain, et0) = self.weather.get(self.date).map_or((0.0, 0.0, 0.0), |r| {
            ((r.min_temp + r.max_temp) / 2.0, r.precipitation, r.reference_et)
        });

        self.soil_water += rain;
        let stress = self.water_stress_factor();
        let cover_share = BARE_SOIL_EVAPORATION + (1.0 - BARE_SOIL_EVAPORATION) * self.canopy_cover;
        let loss = et0 * cover_share * stress;
        // Water above field capacity drains out of the root zone.
        self.soil_water = (self.soil_water - loss).clamp(0.0, self.soil.field_capacity_mm);

        if let Some(dap) = self.days_after_planting {
            let thermal = self.thermal_factor(mean_temp);
            self.grow_canopy(dap, stress, thermal);
            let transpiration = et0 * self.canopy_cover * stress;
            self.biomass += self.crop.water_productivity * transpiration;

            let dap = dap + 1;
            self.days_after_planting = Some(dap);
            if dap >= self.crop.season_length_days {
                self.harvest();
            }
        }

        match self.date.succ_opt() {
            Some(next) => self.date = next,
            None => self.finished = true,
        }
        if self.date > self.end_date {
            self.finished = true;
        }
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
        self.soil_water = mm.max(0.0);
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

/// Builds `WaterBalanceModel`s that all read the same weather series.
pub struct WaterBalanceFactory {
    weather: Arc<WeatherSeries>,
}

impl WaterBalanceFactory {
    pub fn new(weather: Arc<WeatherSeries>) -> Self {
        Self { weather }
    }
}

impl EngineFactory for WaterBalanceFactory {
    fn construct(&self, setup: &EngineSetup) -> Box<dyn CropEngine> {
        Box::new(WaterBalanceModel::new(setup, Arc::clone(&self.weather)))
    }
}
