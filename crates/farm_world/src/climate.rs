//! Daily weather input: AquaCrop climate files and a seeded synthetic climate.

use std::f64::consts::TAU;

use anyhow::{bail, ensure, Context, Result};
use chrono::{Datelike, NaiveDate};
use farm_core::{WeatherRecord, WeatherSeries};
use rand::Rng;

/// Parse an AquaCrop climate text file.
///
/// One day per line: `Day Month Year Tmin(C) Tmax(C) Prcp(mm) Et0(mm)`,
/// whitespace separated. Lines that do not start with a number (the header)
/// are skipped.
pub fn parse_climate(text: &str) -> Result<WeatherSeries> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some(first) = fields.first() else {
            continue;
        };
        if first.parse::<u32>().is_err() {
            continue;
        }
        let record =
            parse_climate_row(&fields).with_context(|| format!("climate line {line_no}"))?;
        records.push(record);
    }
    ensure!(!records.is_empty(), "climate file holds no daily records");
    Ok(WeatherSeries::new(records))
}

fn parse_climate_row(fields: &[&str]) -> Result<WeatherRecord> {
    let [day, month, year, tmin, tmax, prcp, et0] = fields else {
        bail!("expected 7 columns, found {}", fields.len());
    };
    let date = NaiveDate::from_ymd_opt(
        year.parse().context("year")?,
        month.parse().context("month")?,
        day.parse().context("day")?,
    )
    .with_context(|| format!("{day}/{month}/{year} is not a calendar date"))?;

    let record = WeatherRecord {
        date,
        min_temp: tmin.parse().context("Tmin")?,
        max_temp: tmax.parse().context("Tmax")?,
        precipitation: prcp.parse().context("Prcp")?,
        reference_et: et0.parse().context("Et0")?,
    };
    ensure!(
        record.min_temp <= record.max_temp,
        "Tmin {} above Tmax {}",
        record.min_temp,
        record.max_temp
    );
    ensure!(
        record.precipitation >= 0.0 && record.reference_et >= 0.0,
        "negative rainfall or ET0"
    );
    Ok(record)
}

/// Load and parse a climate file.
pub fn load_climate(path: &std::path::Path) -> Result<WeatherSeries> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading climate file {}", path.display()))?;
    parse_climate(&text).with_context(|| format!("parsing climate file {}", path.display()))
}

/// Mediterranean-style synthetic climate for `[start, end]`, one record per day.
///
/// Warm dry summers, mild wet winters. Deterministic for a given `rng` state.
pub fn synthesize_weather(start: NaiveDate, end: NaiveDate, rng: &mut impl Rng) -> WeatherSeries {
    let records = start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| synthetic_day(date, rng))
        .collect();
    WeatherSeries::new(records)
}

fn synthetic_day(date: NaiveDate, rng: &mut impl Rng) -> WeatherRecord {
    // Fraction of the year, peaking in late July.
    let phase = TAU * (f64::from(date.ordinal()) - 105.0) / 365.0;
    let seasonal = phase.sin();

    let mean_temp = 18.0 + 8.0 * seasonal + rng.gen_range(-2.5..2.5);
    let half_range = 5.0 + rng.gen_range(0.0..2.0);
    let min_temp = mean_temp - half_range;
    let max_temp = mean_temp + half_range;

    let wet_chance = (0.22 - 0.18 * seasonal).clamp(0.02, 0.5);
    let precipitation = if rng.gen_bool(wet_chance) {
        rng.gen_range(0.5..18.0)
    } else {
        0.0
    };

    // Hargreaves with a seasonal extraterrestrial radiation term (MJ/m²/day).
    let radiation = 28.0 + 12.0 * seasonal;
    let reference_et =
        (0.0023 * 0.408 * radiation * (mean_temp + 17.8) * (2.0 * half_range).sqrt()).max(0.3);

    WeatherRecord {
        date,
        min_temp,
        max_temp,
        precipitation,
        reference_et,
    }
}
