//! Actual vapor pressure and the ordered choice of its input files

use super::constants::T_FREEZE;
use crate::errors::{ClmPostError, Result};
use ndarray::{Array3, Zip};
use std::path::Path;

/// Way of deriving actual vapor pressure from the available input pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaporPressureSource {
    /// Surface pressure [Pa] and 2 m specific humidity [kg/kg]
    PressureHumidity,
    /// 2 m temperature [K] and 2 m relative humidity [%]
    TemperatureRelHumidity,
}

/// One entry of the resolution order
#[derive(Debug, Clone, Copy)]
pub struct VaporPressureCandidate {
    pub source: VaporPressureSource,
    /// Input files, in the argument order of [`VaporPressureSource::actual_vapor_pressure`]
    pub files: [&'static str; 2],
    /// Variable inside each file
    pub variables: [&'static str; 2],
}

/// Candidates in resolution order. The first one with both files present wins.
pub const VAPOR_PRESSURE_CANDIDATES: [VaporPressureCandidate; 2] = [
    VaporPressureCandidate {
        source: VaporPressureSource::PressureHumidity,
        files: ["APS_ts.nc", "AQV_2M_ts.nc"],
        variables: ["APS", "AQV_2M"],
    },
    VaporPressureCandidate {
        source: VaporPressureSource::TemperatureRelHumidity,
        files: ["AT_2M_ts.nc", "ARELHUM_2M_ts.nc"],
        variables: ["AT_2M", "ARELHUM_2M"],
    },
];

impl VaporPressureSource {
    /// Actual vapor pressure [Pa] for one cell.
    #[inline]
    #[must_use]
    pub fn actual_vapor_pressure(self, first: f64, second: f64) -> f64 {
        match self {
            Self::PressureHumidity => vapor_pressure_from_ps_qv(first, second),
            Self::TemperatureRelHumidity => vapor_pressure_from_t_rh(first, second),
        }
    }

    /// Actual vapor pressure [Pa] over a whole grid.
    pub fn actual_vapor_pressure_field(self, first: &Array3<f64>, second: &Array3<f64>) -> Array3<f64> {
        let mut e_a = Array3::<f64>::zeros(first.raw_dim());
        Zip::from(&mut e_a)
            .and(first)
            .and(second)
            .par_for_each(|e, &a, &b| *e = self.actual_vapor_pressure(a, b));
        e_a
    }
}

/// `e_a = q·p / (0.622 + 0.378·q)`, same unit as `ps`.
#[inline]
#[must_use]
pub fn vapor_pressure_from_ps_qv(ps: f64, qv: f64) -> f64 {
    qv * ps / (0.622 + 0.378 * qv)
}

/// Magnus form over water (`T >= 0 °C`) or ice, `rh` in percent, result in Pa.
///
/// The denominators are taken against the Kelvin temperature: `T - 30.03`
/// is `T_C + 243.12` and `T - 0.53` is `T_C + 272.62`.
#[inline]
#[must_use]
pub fn vapor_pressure_from_t_rh(t_k: f64, rh: f64) -> f64 {
    if t_k >= T_FREEZE {
        6.112 * rh * (17.62 * (t_k - T_FREEZE) / (t_k - 30.03)).exp()
    } else {
        6.112 * rh * (22.46 * (t_k - T_FREEZE) / (t_k - 0.53)).exp()
    }
}

/// Pick the first candidate whose files are all present in `dir`.
///
/// # Errors
///
/// Returns [`ClmPostError::MissingInput`] if no candidate is complete.
pub fn resolve_vapor_pressure_input(dir: &Path) -> Result<VaporPressureCandidate> {
    resolve_with(dir, |p| p.is_file())
}

/// [`resolve_vapor_pressure_input`] with a custom availability check.
pub fn resolve_with<F>(dir: &Path, available: F) -> Result<VaporPressureCandidate>
where
    F: Fn(&Path) -> bool,
{
    VAPOR_PRESSURE_CANDIDATES
        .iter()
        .find(|c| c.files.iter().all(|f| available(&dir.join(f))))
        .copied()
        .ok_or_else(|| ClmPostError::MissingInput {
            dir: dir.to_path_buf(),
            candidates: VAPOR_PRESSURE_CANDIDATES
                .iter()
                .map(|c| c.files.join(" + "))
                .collect(),
        })
}
