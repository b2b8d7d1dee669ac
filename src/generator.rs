//! Synthetic well data generation
//!
//! Produces the deterministic minute-cadence dataset served by the API:
//! - Exponential production decline curves
//! - Seasonal modulation and multiplicative sensor noise
//! - Random multi-day maintenance shutdowns on flow metrics
//! - Correlated channels (gas follows oil, pressures track depletion)
//!
//! Every random stream is derived from a per-well, per-metric sub-seed,
//! so a given base seed reproduces the identical dataset no matter what
//! order the series are generated in.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use rand::prelude::*;
use rand_distr::StandardNormal;
use std::f64::consts::PI;

use crate::types::{DataType, Metric, QualityFlag, Well, WellType};

// ============================================================================
// Generation Constants
// ============================================================================

/// Default number of synthetic wells
pub const DEFAULT_NUM_WELLS: usize = 3;
/// Default generator seed
pub const DEFAULT_SEED: u64 = 42;
/// Initial oil production range (bbl/day)
const INITIAL_PRODUCTION_RANGE: (f64, f64) = (200.0, 500.0);
/// Exponential decline rate range (per day)
const DECLINE_RATE_RANGE: (f64, f64) = (0.00015, 0.00045);
/// Seasonal modulation amplitude (fraction of base value)
const SEASONAL_AMPLITUDE: f64 = 0.1;
/// Multiplicative noise standard deviation (fraction of base value)
const NOISE_AMPLITUDE: f64 = 0.05;
/// Daily probability that a maintenance shutdown begins
const MAINTENANCE_PROBABILITY: f64 = 0.015;
/// Maintenance window duration range (days, inclusive)
const MAINTENANCE_DURATION_DAYS: (i64, i64) = (2, 7);
/// Quiet period after a maintenance window before the next can start (days)
const MAINTENANCE_SKIP_DAYS: i64 = 30;
/// Residual flow fraction while a well is shut in
const MAINTENANCE_RESIDUAL: f64 = 0.001;
/// Gas-oil ratio range (mcf gas per bbl oil)
const GOR_RANGE: (f64, f64) = (3.0, 5.0);
/// Initial wellhead pressure range (psi)
const WELLHEAD_PRESSURE_RANGE: (f64, f64) = (1500.0, 2500.0);
/// Initial tubing pressure range (psi)
const TUBING_PRESSURE_RANGE: (f64, f64) = (1200.0, 2200.0);
/// Pressure declines at half the production decline rate
const PRESSURE_DECLINE_FACTOR: f64 = 0.5;
/// Steady gas injection range for injector wells (mcf/day)
const GAS_INJECTION_RANGE: (f64, f64) = (500.0, 1200.0);
/// Quality flag distribution: good, then suspect; bad takes the remainder
const P_GOOD: f64 = 0.98;
const P_SUSPECT: f64 = 0.015;
/// Spud date offset before the data window opens (days, inclusive)
const SPUD_OFFSET_DAYS: (i64, i64) = (180, 730);
/// Surface coordinate box (onshore Texas gulf coast)
const LATITUDE_RANGE: (f64, f64) = (28.0, 32.0);
const LONGITUDE_RANGE: (f64, f64) = (-97.0, -93.0);

const FIELDS: [&str; 3] = ["North Field", "South Field", "East Field"];
const OPERATORS: [&str; 3] = ["Demo Energy Corp", "Example Oil LLC", "Test Petroleum Inc"];
const WELL_TYPES: [WellType; 3] = [WellType::Producer, WellType::Injector, WellType::Observation];

/// Metric catalog: wire name, display name, unit, typical range.
const METRIC_CATALOG: [(&str, &str, &str, f64, f64); 5] = [
    ("oil_production_rate", "Oil Production Rate", "bbl/day", 0.0, 500.0),
    ("gas_production_rate", "Gas Production Rate", "mcf/day", 0.0, 2000.0),
    ("wellhead_pressure", "Wellhead Pressure", "psi", 100.0, 3000.0),
    ("tubing_pressure", "Tubing Pressure", "psi", 50.0, 2500.0),
    ("gas_injection_rate", "Gas Injection Rate", "mcf/day", 0.0, 1500.0),
];

// ============================================================================
// Configuration
// ============================================================================

/// Knobs for the synthetic dataset. The defaults describe the shipped
/// demo dataset: 3 wells with one year of minute-cadence data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub num_wells: usize,
    pub seed: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_wells: DEFAULT_NUM_WELLS,
            seed: DEFAULT_SEED,
            start_date: NaiveDate::from_ymd_opt(2024, 12, 9).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 9).unwrap_or_default(),
        }
    }
}

/// Values and quality flags for one (well, metric) series, index-aligned
/// with the shared [`timeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesData {
    pub values: Vec<f64>,
    pub flags: Vec<QualityFlag>,
}

/// Production character drawn once per well and shared by every metric
/// of that well, so gas tracks oil and pressures track depletion.
#[derive(Debug, Clone, Copy)]
struct WellProfile {
    initial_oil_rate: f64,
    decline_rate: f64,
}

// ============================================================================
// Sub-seeded RNG streams
// ============================================================================

const LANE_PROFILE: u64 = 1;
const LANE_MAINTENANCE: u64 = 2;
const LANE_SERIES_BASE: u64 = 16;

/// SplitMix64 finalizer. Decorrelates sub-seeds derived from the base
/// seed so each stream is independent of generation order.
fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

fn sub_rng(seed: u64, well_idx: usize, lane: u64) -> StdRng {
    let key = seed
        .wrapping_add(mix((well_idx as u64).wrapping_add(1)))
        .wrapping_add(mix(lane));
    StdRng::seed_from_u64(mix(key))
}

fn pick<'a>(rng: &mut StdRng, pool: &[&'a str]) -> &'a str {
    pool.choose(rng).copied().unwrap_or_default()
}

// ============================================================================
// Registry generation
// ============================================================================

/// Generates the well registry: ids `WELL-001..`, coordinates in the
/// gulf coast box, and a spud date 180-730 days before the data window.
pub fn generate_wells(config: &GeneratorConfig) -> Vec<Well> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    (0..config.num_wells)
        .map(|i| {
            let letter = char::from(b'A' + (i % 26) as u8);
            let spud_offset = rng.gen_range(SPUD_OFFSET_DAYS.0..=SPUD_OFFSET_DAYS.1);
            Well {
                well_id: format!("WELL-{:03}", i + 1),
                well_name: format!("{} {} {}", pick(&mut rng, &FIELDS), letter, i + 1),
                latitude: round4(rng.gen_range(LATITUDE_RANGE.0..LATITUDE_RANGE.1)),
                longitude: round4(rng.gen_range(LONGITUDE_RANGE.0..LONGITUDE_RANGE.1)),
                operator: pick(&mut rng, &OPERATORS).to_string(),
                field_name: pick(&mut rng, &FIELDS).to_string(),
                well_type: WELL_TYPES.choose(&mut rng).copied().unwrap_or(WellType::Producer),
                spud_date: config.start_date - Duration::days(spud_offset),
                data_start_date: config.start_date,
                data_end_date: config.end_date,
            }
        })
        .collect()
}

/// Builds the five-channel metric catalog.
pub fn metric_catalog() -> Vec<Metric> {
    METRIC_CATALOG
        .iter()
        .map(|(name, display, unit, min, max)| Metric {
            metric_name: (*name).to_string(),
            display_name: (*display).to_string(),
            description: format!("Synthetic {} measurements", display.to_lowercase()),
            unit_of_measurement: (*unit).to_string(),
            data_type: DataType::Numeric,
            typical_min: Some(*min),
            typical_max: Some(*max),
        })
        .collect()
}

/// Flow metrics shut in during maintenance and clamp at zero.
pub fn is_flow_metric(metric_name: &str) -> bool {
    matches!(
        metric_name,
        "oil_production_rate" | "gas_production_rate" | "gas_injection_rate"
    )
}

// ============================================================================
// Time-series generation
// ============================================================================

/// The shared minute grid covering `[start_date, end_date]` midnight to
/// midnight, both endpoints included.
pub fn timeline(config: &GeneratorConfig) -> Vec<DateTime<Utc>> {
    let start = config.start_date.and_time(NaiveTime::MIN).and_utc();
    let end = config.end_date.and_time(NaiveTime::MIN).and_utc();
    let minutes = (end - start).num_minutes().max(0);
    let mut points = Vec::with_capacity(minutes as usize + 1);
    let mut t = start;
    while t <= end {
        points.push(t);
        t += Duration::minutes(1);
    }
    points
}

/// Generates the value and quality flag series for one (well, metric)
/// pair over the shared timeline.
///
/// Base value, seasonality, noise, and shutdowns compose as:
/// `value(t) = base(t) * (1 + 0.1 * sin(2pi * doy / 365)) * noise`,
/// with flow metrics cut to 0.1% inside maintenance windows and clamped
/// at zero afterwards.
pub fn generate_series(
    config: &GeneratorConfig,
    timeline: &[DateTime<Utc>],
    well: &Well,
    well_idx: usize,
    metric_idx: usize,
    metric_name: &str,
) -> SeriesData {
    let Some(start) = timeline.first().copied() else {
        return SeriesData { values: Vec::new(), flags: Vec::new() };
    };

    let profile = well_profile(config, well_idx);
    let windows = maintenance_windows(config, well_idx);
    let mut rng = sub_rng(config.seed, well_idx, LANE_SERIES_BASE + metric_idx as u64);

    // Per-series character is drawn once, before the sample loop.
    let base = match metric_name {
        "oil_production_rate" => BaseCurve::Decline {
            initial: profile.initial_oil_rate,
            rate: profile.decline_rate,
        },
        "gas_production_rate" => BaseCurve::Decline {
            initial: profile.initial_oil_rate * rng.gen_range(GOR_RANGE.0..GOR_RANGE.1),
            rate: profile.decline_rate,
        },
        "wellhead_pressure" => BaseCurve::Decline {
            initial: rng.gen_range(WELLHEAD_PRESSURE_RANGE.0..WELLHEAD_PRESSURE_RANGE.1),
            rate: profile.decline_rate * PRESSURE_DECLINE_FACTOR,
        },
        "tubing_pressure" => BaseCurve::Decline {
            initial: rng.gen_range(TUBING_PRESSURE_RANGE.0..TUBING_PRESSURE_RANGE.1),
            rate: profile.decline_rate * PRESSURE_DECLINE_FACTOR,
        },
        "gas_injection_rate" => {
            if well.well_type == WellType::Injector {
                BaseCurve::Constant(rng.gen_range(GAS_INJECTION_RANGE.0..GAS_INJECTION_RANGE.1))
            } else {
                BaseCurve::Constant(0.0)
            }
        }
        _ => BaseCurve::Constant(100.0),
    };

    let flow = is_flow_metric(metric_name);
    let mut values = Vec::with_capacity(timeline.len());
    let mut flags = Vec::with_capacity(timeline.len());

    for ts in timeline {
        let days = (*ts - start).num_days() as f64;
        let mut value = base.at(days);

        let day_of_year = f64::from(ts.ordinal());
        value *= 1.0 + SEASONAL_AMPLITUDE * (2.0 * PI * day_of_year / 365.0).sin();

        let z: f64 = rng.sample(StandardNormal);
        value *= 1.0 + NOISE_AMPLITUDE * z;

        if flow {
            if windows.iter().any(|(s, e)| ts >= s && ts <= e) {
                value *= MAINTENANCE_RESIDUAL;
            }
            value = value.max(0.0);
        }

        values.push(value);
        flags.push(draw_flag(&mut rng));
    }

    SeriesData { values, flags }
}

#[derive(Debug, Clone, Copy)]
enum BaseCurve {
    Decline { initial: f64, rate: f64 },
    Constant(f64),
}

impl BaseCurve {
    fn at(self, days: f64) -> f64 {
        match self {
            Self::Decline { initial, rate } => initial * (-rate * days).exp(),
            Self::Constant(v) => v,
        }
    }
}

fn well_profile(config: &GeneratorConfig, well_idx: usize) -> WellProfile {
    let mut rng = sub_rng(config.seed, well_idx, LANE_PROFILE);
    WellProfile {
        initial_oil_rate: rng.gen_range(INITIAL_PRODUCTION_RANGE.0..INITIAL_PRODUCTION_RANGE.1),
        decline_rate: rng.gen_range(DECLINE_RATE_RANGE.0..DECLINE_RATE_RANGE.1),
    }
}

/// Walks the data window day by day. Each day has a small chance to
/// open a 2-7 day shutdown; after one closes, the next 30 days stay
/// quiet. Windows are shared by all flow metrics of the well.
fn maintenance_windows(
    config: &GeneratorConfig,
    well_idx: usize,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut rng = sub_rng(config.seed, well_idx, LANE_MAINTENANCE);
    let start = config.start_date.and_time(NaiveTime::MIN).and_utc();
    let end = config.end_date.and_time(NaiveTime::MIN).and_utc();

    let mut windows = Vec::new();
    let mut cursor = start;
    while cursor < end {
        if rng.gen::<f64>() < MAINTENANCE_PROBABILITY {
            let duration =
                Duration::days(rng.gen_range(MAINTENANCE_DURATION_DAYS.0..=MAINTENANCE_DURATION_DAYS.1));
            let window_end = cursor + duration;
            windows.push((cursor, window_end));
            cursor = window_end + Duration::days(MAINTENANCE_SKIP_DAYS);
        } else {
            cursor += Duration::days(1);
        }
    }
    windows
}

fn draw_flag(rng: &mut StdRng) -> QualityFlag {
    let roll: f64 = rng.gen();
    if roll < P_GOOD {
        QualityFlag::Good
    } else if roll < P_GOOD + P_SUSPECT {
        QualityFlag::Suspect
    } else {
        QualityFlag::Bad
    }
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}
