use crate::{CropEngine, Metric, SectorId};

/// One grid cell: an engine handle, its modifier flags, and its canopy history.
pub struct SimulationUnit {
    id: SectorId,
    engine: Box<dyn CropEngine>,
    has_soil_penalty: bool,
    /// One canopy-cover reading per advanced day.
    history: Vec<f64>,
}

impl SimulationUnit {
    pub fn new(id: SectorId, engine: Box<dyn CropEngine>, has_soil_penalty: bool) -> Self {
        Self {
            id,
            engine,
            has_soil_penalty,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> SectorId {
        self.id
    }

    pub fn has_soil_penalty(&self) -> bool {
        self.has_soil_penalty
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn engine(&self) -> &dyn CropEngine {
        self.engine.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.engine.is_finished()
    }

    pub fn reading(&self, metric: Metric) -> f64 {
        match metric {
            Metric::CanopyCover => self.engine.canopy_cover(),
            Metric::Biomass => self.engine.biomass(),
            Metric::SoilWater => self.engine.soil_water(),
        }
    }

    /// Run one day: soil damage first, then the engine's own step.
    ///
    /// Returns `false` without touching anything once the engine has finished.
    pub(crate) fn advance_day(&mut self, taw_penalty: f64) -> bool {
        if self.engine.is_finished() {
            return false;
        }
        if self.has_soil_penalty {
            let stored = self.engine.soil_water();
            self.engine.set_soil_water(stored * (1.0 - taw_penalty));
        }
        self.engine.advance_one_day();
        self.history.push(self.engine.canopy_cover());
        true
    }

    pub(crate) fn add_water(&mut self, mm: f64) {
        let stored = self.engine.soil_water();
        self.engine.set_soil_water(stored + mm);
    }
}
