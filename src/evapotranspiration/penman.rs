//! Hourly FAO-56 Penman-Monteith equation
//!
//! Allen et al. (2005) hourly reference formulation with the short crop
//! coefficients of Singer et al. (2021). All per-cell work goes through
//! [`PenmanMonteith::evaluate`]; the grid version only maps it in parallel.

use super::constants::{
    hourly_constants, ReferenceSurface, TimeOfDay, ALTITUDE, C_D, C_N, EPSILON, LATENT_HEAT,
    SPECIFIC_HEAT_AIR, T_FREEZE, UNIT_HOURLY, WIND_HEIGHT,
};
use ndarray::{Array3, Zip};

/// Atmospheric pressure [kPa] at altitude `z` [m].
#[inline]
#[must_use]
pub fn atmospheric_pressure(z: f64) -> f64 {
    101.3 * ((293.0 - 0.0065 * z) / 293.0).powf(5.26)
}

/// Psychrometric constant [kPa °C-1] for a pressure in kPa.
#[inline]
#[must_use]
pub fn psychrometric_constant(pressure: f64) -> f64 {
    SPECIFIC_HEAT_AIR * pressure / (EPSILON * LATENT_HEAT)
}

/// Saturation vapor pressure [kPa] at `t_c` [°C].
#[inline]
#[must_use]
pub fn saturation_vapor_pressure(t_c: f64) -> f64 {
    0.6108 * (17.27 * t_c / (t_c + 237.3)).exp()
}

/// Slope of the saturation vapor pressure curve [kPa °C-1].
#[inline]
#[must_use]
pub fn saturation_slope(t_c: f64) -> f64 {
    4098.0 * saturation_vapor_pressure(t_c) / (t_c + 237.3).powi(2)
}

/// Factor taking a wind speed measured at `height` [m] down to 2 m.
#[inline]
#[must_use]
pub fn wind_profile_factor(height: f64) -> f64 {
    4.87 / (67.8 * height - 5.42).ln()
}

/// Soil heat flux [MJ m-2 h-1], night fraction when `r_ns <= 0`.
#[inline]
#[must_use]
pub fn soil_heat_flux(reference: ReferenceSurface, r_ns: f64, r_n: f64) -> f64 {
    r_n * hourly_constants(reference, TimeOfDay::from_shortwave(r_ns)).soil_heat_fraction
}

/// Input fields of one run, all on the same (time, y, x) grid.
#[derive(Debug, Clone, Copy)]
pub struct MeteoFields<'a> {
    /// 2 m temperature [K]
    pub temperature: &'a Array3<f64>,
    /// 10 m wind speed [m s-1]
    pub wind_speed: &'a Array3<f64>,
    /// Net shortwave radiation [W m-2]
    pub shortwave: &'a Array3<f64>,
    /// Net longwave radiation [W m-2]
    pub longwave: &'a Array3<f64>,
    /// Actual vapor pressure [Pa]
    pub vapor_pressure: &'a Array3<f64>,
}

/// Evaluator with the grid-independent terms precomputed
#[derive(Debug, Clone, Copy)]
pub struct PenmanMonteith {
    pub reference: ReferenceSurface,
    /// Psychrometric constant [kPa °C-1]
    pub gamma: f64,
    /// 10 m to 2 m wind factor
    pub wind_factor: f64,
}

impl PenmanMonteith {
    #[must_use]
    pub fn new(reference: ReferenceSurface) -> Self {
        Self {
            reference,
            gamma: psychrometric_constant(atmospheric_pressure(ALTITUDE)),
            wind_factor: wind_profile_factor(WIND_HEIGHT),
        }
    }

    /// Hourly PET [kg m-2] for one cell.
    ///
    /// Radiation is given in W m-2 and vapor pressure in Pa, as they come
    /// out of the model files. The result can be negative for strongly
    /// negative net radiation; it is not clipped.
    #[must_use]
    pub fn evaluate(&self, t_k: f64, u10: f64, sw_flux: f64, lw_flux: f64, e_a_pa: f64) -> f64 {
        let t_c = t_k - T_FREEZE;
        let e_a = e_a_pa / 1000.0;

        let e_sat = saturation_vapor_pressure(t_c);
        let e_deficit = e_sat - e_a;
        let delta = saturation_slope(t_c);
        let u2 = u10 * self.wind_factor;

        let r_ns = sw_flux * UNIT_HOURLY;
        let r_nl = lw_flux * UNIT_HOURLY;
        let r_n = r_ns - r_nl;
        let g = soil_heat_flux(self.reference, r_ns, r_n);

        let numerator =
            0.408 * delta * (r_n - g) + self.gamma * (C_N / (t_c + 273.0)) * u2 * e_deficit;
        let denominator = delta + self.gamma * (1.0 + C_D * u2);
        numerator / denominator
    }

    /// Hourly PET over the whole grid. Shapes must already agree.
    #[must_use]
    pub fn evaluate_field(&self, fields: &MeteoFields<'_>) -> Array3<f64> {
        let mut pet = Array3::<f64>::zeros(fields.temperature.raw_dim());
        Zip::from(&mut pet)
            .and(fields.temperature)
            .and(fields.wind_speed)
            .and(fields.shortwave)
            .and(fields.longwave)
            .and(fields.vapor_pressure)
            .par_for_each(|out, &t, &u, &sw, &lw, &e_a| {
                *out = self.evaluate(t, u, sw, lw, e_a);
            });
        pet
    }
}
