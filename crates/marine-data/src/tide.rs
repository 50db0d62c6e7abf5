//! Harmonic tide prediction from pre-extracted constituent constants.

use async_trait::async_trait;
use marine_core::error::{ComputeError, FetchError, MarineError, MarineResult};
use marine_core::traits::{SeriesFetcher, TideModel};
use marine_core::types::{FieldKind, HourlyField, Location, RawSeries, Source, TimeWindow, Unit};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// J2000.0 epoch (2000-01-01T12:00:00Z) in Unix seconds.
const J2000_UNIX: f64 = 946_728_000.0;

/// Furthest the prediction point may be from the extracted constants.
const MAX_LOCATION_DRIFT_DEG: f64 = 0.5;

/// Minimum usable constituents for a model to be considered ready.
const READY_CONSTITUENTS: usize = 8;

/// Doodson numbers `(τ, s, h, p, N', p₁)`, phase offset in degrees and
/// nodal correction family.
const DOODSON: &[(&str, [f64; 6], f64, Nodal)] = &[
    ("m2", [2.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0.0, Nodal::M2(1.0)),
    ("s2", [2.0, 2.0, -2.0, 0.0, 0.0, 0.0], 0.0, Nodal::Solar),
    ("n2", [2.0, -1.0, 0.0, 1.0, 0.0, 0.0], 0.0, Nodal::M2(1.0)),
    ("k2", [2.0, 2.0, 0.0, 0.0, 0.0, 0.0], 0.0, Nodal::K2),
    ("2n2", [2.0, -2.0, 0.0, 2.0, 0.0, 0.0], 0.0, Nodal::M2(1.0)),
    ("mu2", [2.0, -2.0, 2.0, 0.0, 0.0, 0.0], 0.0, Nodal::M2(1.0)),
    ("nu2", [2.0, -1.0, 2.0, -1.0, 0.0, 0.0], 0.0, Nodal::M2(1.0)),
    ("l2", [2.0, 1.0, 0.0, -1.0, 0.0, 0.0], 180.0, Nodal::M2(1.0)),
    ("t2", [2.0, 2.0, -3.0, 0.0, 0.0, 1.0], 0.0, Nodal::Solar),
    ("r2", [2.0, 2.0, -1.0, 0.0, 0.0, -1.0], 180.0, Nodal::Solar),
    ("lambda2", [2.0, 1.0, -2.0, 1.0, 0.0, 0.0], 180.0, Nodal::M2(1.0)),
    ("eps2", [2.0, -3.0, 2.0, 1.0, 0.0, 0.0], 0.0, Nodal::M2(1.0)),
    ("mks2", [2.0, 4.0, -2.0, 0.0, 0.0, 0.0], 0.0, Nodal::M2(1.0)),
    ("k1", [1.0, 1.0, 0.0, 0.0, 0.0, 0.0], 90.0, Nodal::K1),
    ("o1", [1.0, -1.0, 0.0, 0.0, 0.0, 0.0], -90.0, Nodal::O1),
    ("p1", [1.0, 1.0, -2.0, 0.0, 0.0, 0.0], -90.0, Nodal::Solar),
    ("q1", [1.0, -2.0, 0.0, 1.0, 0.0, 0.0], -90.0, Nodal::O1),
    ("s1", [1.0, 1.0, -1.0, 0.0, 0.0, 0.0], 180.0, Nodal::Solar),
    ("j1", [1.0, 2.0, 0.0, -1.0, 0.0, 0.0], 90.0, Nodal::J1),
    ("m3", [3.0, 0.0, 0.0, 0.0, 0.0, 0.0], 180.0, Nodal::M2(1.5)),
    ("m4", [4.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0.0, Nodal::M2(2.0)),
    ("ms4", [4.0, 2.0, -2.0, 0.0, 0.0, 0.0], 0.0, Nodal::M2(1.0)),
    ("mn4", [4.0, -1.0, 0.0, 1.0, 0.0, 0.0], 0.0, Nodal::M2(2.0)),
    ("n4", [4.0, -2.0, 0.0, 2.0, 0.0, 0.0], 0.0, Nodal::M2(2.0)),
    ("s4", [4.0, 4.0, -4.0, 0.0, 0.0, 0.0], 0.0, Nodal::Solar),
    ("m6", [6.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0.0, Nodal::M2(3.0)),
    ("m8", [8.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0.0, Nodal::M2(4.0)),
    ("mf", [0.0, 2.0, 0.0, 0.0, 0.0, 0.0], 0.0, Nodal::Mf),
    ("mm", [0.0, 1.0, 0.0, -1.0, 0.0, 0.0], 0.0, Nodal::Mm),
    ("msf", [0.0, 2.0, -2.0, 0.0, 0.0, 0.0], 0.0, Nodal::M2(-1.0)),
    ("mtm", [0.0, 3.0, 0.0, -1.0, 0.0, 0.0], 0.0, Nodal::Mf),
    ("msqm", [0.0, 4.0, -2.0, 0.0, 0.0, 0.0], 0.0, Nodal::Mf),
    ("sa", [0.0, 0.0, 1.0, 0.0, 0.0, 0.0], 0.0, Nodal::Solar),
    ("ssa", [0.0, 0.0, 2.0, 0.0, 0.0, 0.0], 0.0, Nodal::Solar),
];

/// Lunar nodal modulation of a constituent's amplitude and phase.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Nodal {
    Solar,
    /// M2 correction raised to a power; negative for constituents that run
    /// opposite to M2
    M2(f64),
    O1,
    K1,
    J1,
    K2,
    Mf,
    Mm,
}

impl Nodal {
    /// Amplitude factor `f` and phase correction `u` in degrees at lunar
    /// node longitude `node_deg`.
    fn factors(self, node_deg: f64) -> (f64, f64) {
        let n = node_deg.to_radians();
        let (c1, c2, c3) = (n.cos(), (2.0 * n).cos(), (3.0 * n).cos());
        let (s1, s2, s3) = (n.sin(), (2.0 * n).sin(), (3.0 * n).sin());
        match self {
            Nodal::Solar => (1.0, 0.0),
            Nodal::M2(power) => {
                let f = 1.0004 - 0.0373 * c1 + 0.0002 * c2;
                let u = -2.14 * s1;
                (f.powf(power.abs()), u * power)
            }
            Nodal::O1 => (
                1.0089 + 0.1871 * c1 - 0.0147 * c2 + 0.0014 * c3,
                10.80 * s1 - 1.34 * s2 + 0.19 * s3,
            ),
            Nodal::K1 => (
                1.0060 + 0.1150 * c1 - 0.0088 * c2 + 0.0006 * c3,
                -8.86 * s1 + 0.68 * s2 - 0.07 * s3,
            ),
            Nodal::J1 => (
                1.0129 + 0.1676 * c1 - 0.0170 * c2 + 0.0016 * c3,
                -12.94 * s1 + 1.34 * s2 - 0.19 * s3,
            ),
            Nodal::K2 => (
                1.0241 + 0.2863 * c1 + 0.0083 * c2 - 0.0015 * c3,
                -17.74 * s1 + 0.68 * s2 - 0.04 * s3,
            ),
            Nodal::Mf => (1.043 + 0.414 * c1, -23.74 * s1 + 2.68 * s2 - 0.38 * s3),
            Nodal::Mm => (1.0 - 0.130 * c1, 0.0),
        }
    }
}

/// Harmonic constants extracted for a single point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonicConstants {
    pub latitude: f64,
    pub longitude: f64,
    pub constituents: Vec<String>,
    /// Amplitudes in metres
    pub amplitude: Vec<f64>,
    /// Greenwich phase lags in degrees
    pub phase: Vec<f64>,
}

#[derive(Debug, Clone)]
struct Constituent {
    doodson: [f64; 6],
    phase_offset: f64,
    nodal: Nodal,
    amplitude_m: f64,
    phase_lag_deg: f64,
}

/// Readiness report for a loaded constants file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TideReadiness {
    pub latitude: f64,
    pub longitude: f64,
    pub constituents: usize,
    pub usable: usize,
    pub ready: bool,
}

/// Tide model summing nodally corrected harmonic constituents.
#[derive(Debug, Clone)]
pub struct HarmonicTideModel {
    latitude: f64,
    longitude: f64,
    declared: usize,
    constituents: Vec<Constituent>,
    datum_offset_cm: i32,
}

impl HarmonicTideModel {
    /// Build a model from extracted constants.
    pub fn from_constants(
        constants: HarmonicConstants,
        datum_offset_cm: i32,
    ) -> Result<Self, ComputeError> {
        let n = constants.constituents.len();
        if constants.amplitude.len() != n || constants.phase.len() != n {
            return Err(ComputeError::InvalidConstants(format!(
                "{} constituents, {} amplitudes, {} phases",
                n,
                constants.amplitude.len(),
                constants.phase.len()
            )));
        }

        let mut constituents = Vec::with_capacity(n);
        for ((name, amplitude), phase) in constants
            .constituents
            .iter()
            .zip(&constants.amplitude)
            .zip(&constants.phase)
        {
            let key = name.to_lowercase();
            match DOODSON.iter().find(|(n, _, _, _)| *n == key) {
                Some((_, doodson, offset, nodal)) if amplitude.is_finite() && phase.is_finite() => {
                    constituents.push(Constituent {
                        doodson: *doodson,
                        phase_offset: *offset,
                        nodal: *nodal,
                        amplitude_m: *amplitude,
                        phase_lag_deg: *phase,
                    });
                }
                Some(_) => {
                    warn!(constituent = %name, "Skipping constituent with non-finite constants")
                }
                None => debug!(constituent = %name, "Skipping unknown constituent"),
            }
        }

        if constituents.is_empty() {
            return Err(ComputeError::NoConstituents);
        }

        Ok(Self {
            latitude: constants.latitude,
            longitude: constants.longitude,
            declared: n,
            constituents,
            datum_offset_cm,
        })
    }

    /// Load constants from a JSON file.
    pub fn from_file(path: &Path, datum_offset_cm: i32) -> MarineResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let constants: HarmonicConstants = serde_json::from_str(&raw)
            .map_err(|e| MarineError::Config(format!("{}: {}", path.display(), e)))?;

        let model = Self::from_constants(constants, datum_offset_cm)?;
        info!(
            path = %path.display(),
            usable = model.constituents.len(),
            declared = model.declared,
            lat = model.latitude,
            lon = model.longitude,
            "Loaded harmonic tide constants"
        );
        Ok(model)
    }

    /// Report how complete the loaded constants are.
    pub fn readiness(&self) -> TideReadiness {
        TideReadiness {
            latitude: self.latitude,
            longitude: self.longitude,
            constituents: self.declared,
            usable: self.constituents.len(),
            ready: self.constituents.len() >= READY_CONSTITUENTS,
        }
    }

    /// Height above mean sea level in metres at an epoch second.
    fn height_m(&self, epoch: i64) -> f64 {
        let args = astronomical_arguments(epoch);
        let node = -args[4];
        self.constituents
            .iter()
            .map(|c| {
                let (f, u) = c.nodal.factors(node);
                let v: f64 = c
                    .doodson
                    .iter()
                    .zip(args.iter())
                    .map(|(k, a)| k * a)
                    .sum::<f64>()
                    + c.phase_offset;
                f * c.amplitude_m * (v + u - c.phase_lag_deg).to_radians().cos()
            })
            .sum()
    }
}

/// Mean astronomical arguments `(τ, s, h, p, N', p₁)` in degrees.
fn astronomical_arguments(epoch: i64) -> [f64; 6] {
    let d = (epoch as f64 - J2000_UNIX) / 86_400.0;
    let s = 218.316_447_7 + 13.176_396_48 * d;
    let h = 280.466_46 + 0.985_647_36 * d;
    let p = 83.353_246_5 + 0.111_403_53 * d;
    let n = 125.044_52 - 0.052_953_77 * d;
    let p1 = 282.937_35 + 0.000_047_068_4 * d;

    let ut_hours = epoch.rem_euclid(86_400) as f64 / 3600.0;
    let tau = 15.0 * ut_hours + 180.0 + h - s;

    [tau, s, h, p, -n, p1]
}

impl TideModel for HarmonicTideModel {
    fn compute_heights(
        &self,
        location: &Location,
        epochs: &[i64],
    ) -> Result<Vec<i32>, ComputeError> {
        let drift = (location.latitude - self.latitude)
            .abs()
            .max((location.longitude - self.longitude).abs());
        if drift > MAX_LOCATION_DRIFT_DEG {
            return Err(ComputeError::Extrapolation {
                lat: location.latitude,
                lon: location.longitude,
                reason: format!(
                    "constants were extracted at ({:.4}, {:.4})",
                    self.latitude, self.longitude
                ),
            });
        }

        epochs
            .iter()
            .map(|&epoch| {
                let cm = (self.height_m(epoch) * 100.0).round();
                if cm.is_finite() {
                    Ok(cm as i32 + self.datum_offset_cm)
                } else {
                    Err(ComputeError::Internal(format!("non-finite height at {}", epoch)))
                }
            })
            .collect()
    }

    fn name(&self) -> &str {
        "harmonic"
    }
}

/// Adapts a [`TideModel`] to the fetcher interface.
pub struct TideFetcher<M> {
    model: Arc<M>,
    location: Location,
}

impl<M: TideModel + 'static> TideFetcher<M> {
    pub fn new(model: Arc<M>, location: Location) -> Self {
        Self { model, location }
    }
}

#[async_trait]
impl<M: TideModel + 'static> SeriesFetcher for TideFetcher<M> {
    async fn fetch(&self, window: &TimeWindow) -> Result<RawSeries, FetchError> {
        let epochs = window.hourly_epochs();
        let model = Arc::clone(&self.model);
        let location = self.location.clone();
        let points = epochs.clone();

        let heights = tokio::task::spawn_blocking(move || model.compute_heights(&location, &points))
            .await
            .map_err(|e| FetchError::Failure(format!("tide task failed: {}", e)))??;

        if let (Some(min), Some(max)) = (heights.iter().min(), heights.iter().max()) {
            debug!(values = heights.len(), min, max, "Computed tide heights");
        }

        let values = heights.into_iter().map(|h| Some(f64::from(h))).collect();
        Ok(RawSeries::new(Source::Tide, epochs).with_field(
            FieldKind::Hourly(HourlyField::Tide),
            Unit::Centimeters,
            values,
        ))
    }

    fn source(&self) -> Source {
        Source::Tide
    }

    fn name(&self) -> &str {
        self.model.name()
    }
}
