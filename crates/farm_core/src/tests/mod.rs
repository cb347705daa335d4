use super::*;
use crate::test_fixtures::{
    base_session, base_setup, base_weather, date, make_rng, recording_grid, short_setup,
    RecordingFactory,
};

mod grid;
mod metrics;
mod tasks;

// --- Shared test helpers ------------------------------------------------

fn scheduler_at(max_points: u32) -> SessionScheduler {
    SessionScheduler::new(
        ClockReading {
            date: date(1979, 10, 1),
            season_index: 0,
        },
        max_points,
    )
}

fn sector(label: &str) -> SectorId {
    label.parse().unwrap()
}

fn irrigate(label: &str, depth_mm: f64) -> TaskKind {
    TaskKind::Irrigate {
        target: TaskTarget::Sector(sector(label)),
        depth_mm,
    }
}

fn investigate(label: &str) -> TaskKind {
    TaskKind::Investigate {
        sector: sector(label),
    }
}

fn pesticide(label: &str) -> TaskKind {
    TaskKind::Pesticide {
        target: TaskTarget::Sector(sector(label)),
    }
}
