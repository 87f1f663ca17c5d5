//! Repair of a malformed last value in a regularly spaced time coordinate
//!
//! Model output sometimes ends with a time stamp that breaks the otherwise
//! constant spacing. The last value is reset to `time[0] + (n - 1) * dt`
//! with `dt = time[1] - time[0]`, and the time bounds are adjusted to match.
//! A file whose axis is already consistent is never opened for writing.

use crate::errors::{ClmPostError, Result};
use crate::metadata::string_attribute;
use crate::netcdf_io::{open_input, require_variable};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Name of the time coordinate
pub const TIME: &str = "time";
/// Fallback name of the bounds variable when `time:bounds` is absent
pub const TIME_BOUNDS: &str = "time_bnds";

/// Relative tolerance, in units of `dt`, for treating the last value as correct
const TOLERANCE: f64 = 1e-9;

/// CF encoded time units, `"<unit> since <epoch>"`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CfTimeUnits {
    /// Length of one unit in seconds
    pub unit_seconds: f64,
    pub epoch: NaiveDateTime,
}

impl CfTimeUnits {
    /// Parses strings like `"hours since 1979-01-01 00:00:00"`.
    pub fn parse(units: &str) -> Option<Self> {
        let (unit, epoch) = units.split_once(" since ")?;
        let unit_seconds = match unit.trim().to_lowercase().as_str() {
            "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
            "minutes" | "minute" | "mins" | "min" => 60.0,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3600.0,
            "days" | "day" | "d" => 86400.0,
            _ => return None,
        };
        Some(Self {
            unit_seconds,
            epoch: parse_epoch(epoch)?,
        })
    }

    /// Calendar time of an encoded value, proleptic Gregorian.
    pub fn decode(&self, value: f64) -> Option<NaiveDateTime> {
        let millis = (value * self.unit_seconds * 1000.0).round();
        if !millis.is_finite() {
            return None;
        }
        let delta = TimeDelta::try_milliseconds(millis as i64)?;
        self.epoch.checked_add_signed(delta)
    }
}

fn parse_epoch(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_end_matches("UTC").trim_end_matches('Z').trim();
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Expected spacing and last value of a regular axis, `None` below two steps.
pub fn expected_last(time: &[f64]) -> Option<(f64, f64)> {
    if time.len() < 2 {
        return None;
    }
    let dt = time[1] - time[0];
    Some((dt, time[0] + dt * (time.len() - 1) as f64))
}

/// Whether `last` matches `expected` up to rounding.
pub fn is_consistent(last: f64, expected: f64, dt: f64) -> bool {
    (last - expected).abs() <= TOLERANCE * dt.abs().max(f64::MIN_POSITIVE)
}

/// What happened to the time bounds
#[derive(Debug, Clone, PartialEq)]
pub enum BoundsUpdate {
    /// The file has no bounds variable
    NoBounds,
    /// Entries equal to the old last value were replaced
    Replaced(usize),
    /// No entry matched; the last row was set to `[expected - dt, expected]`
    LastRowRewritten,
    /// Bounds were left as they were
    Unchanged(String),
}

/// Adjusts flat `(n, k)` bounds for a last value moved from `old` to `new`.
pub fn correct_bounds(bounds: &mut [f64], shape: &[usize], n_time: usize, old: f64, new: f64, dt: f64) -> BoundsUpdate {
    let mut replaced = 0;
    for b in bounds.iter_mut().filter(|b| **b == old) {
        *b = new;
        replaced += 1;
    }
    if replaced > 0 {
        return BoundsUpdate::Replaced(replaced);
    }

    match shape {
        [rows, cols] if *rows == n_time && *cols >= 2 => {
            let last_row = (rows - 1) * cols;
            bounds[last_row] = new - dt;
            bounds[last_row + 1] = new;
            BoundsUpdate::LastRowRewritten
        }
        _ => BoundsUpdate::Unchanged(format!(
            "bounds shape {:?} does not match {} time steps",
            shape, n_time
        )),
    }
}

/// Outcome of [`fix_last_timestamp`]
#[derive(Debug, Clone, PartialEq)]
pub enum TimeFixOutcome {
    Corrected {
        old: f64,
        new: f64,
        bounds: BoundsUpdate,
    },
    AlreadyConsistent,
    TooFewSteps,
    /// No CF `units` on the time variable
    NotCfTime,
}

impl fmt::Display for TimeFixOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrected { old, new, .. } => {
                write!(f, "Corrected last time value: {} -> {}", old, new)
            }
            Self::AlreadyConsistent => write!(f, "No correction needed."),
            Self::TooFewSteps => write!(f, "Not enough time steps to check."),
            Self::NotCfTime => write!(f, "Time variable has no CF time units."),
        }
    }
}

fn describe(value: f64, units: Option<&CfTimeUnits>) -> String {
    match units.and_then(|u| u.decode(value)) {
        Some(t) => format!("{} ({})", value, t),
        None => value.to_string(),
    }
}

/// Checks the time axis of `path` and repairs its last value in place.
///
/// # Errors
///
/// Fails if the file or its `time` variable cannot be read or written.
/// Problems with the bounds only produce a warning.
pub fn fix_last_timestamp(path: &Path) -> Result<TimeFixOutcome> {
    let (time, units, calendar, bounds_name) = {
        let file = open_input(path)?;
        let var = require_variable(&file, TIME, path)?;
        let time = var.get_values::<f64, _>(..)?;
        let bounds_name = string_attribute(&var, "bounds")
            .filter(|name| file.variable(name).is_some())
            .or_else(|| file.variable(TIME_BOUNDS).map(|_| TIME_BOUNDS.to_string()));
        (
            time,
            string_attribute(&var, "units"),
            string_attribute(&var, "calendar"),
            bounds_name,
        )
    };

    let Some(cf_units) = units.as_deref().and_then(CfTimeUnits::parse) else {
        info!(path = %path.display(), "time variable has no CF time units, nothing to do");
        return Ok(TimeFixOutcome::NotCfTime);
    };
    // Decoding is only used for log output; other calendars are shown raw.
    let decodable = matches!(
        calendar.as_deref(),
        None | Some("standard" | "gregorian" | "proleptic_gregorian")
    )
    .then_some(&cf_units);

    let Some((dt, expected)) = expected_last(&time) else {
        info!(path = %path.display(), "not enough time steps to check");
        return Ok(TimeFixOutcome::TooFewSteps);
    };

    let n = time.len();
    let old = time[n - 1];
    if is_consistent(old, expected, dt) {
        info!(path = %path.display(), "no correction needed");
        return Ok(TimeFixOutcome::AlreadyConsistent);
    }

    info!(
        old = %describe(old, decodable),
        new = %describe(expected, decodable),
        "correcting last time value"
    );

    let mut file = netcdf::append(path)?;
    {
        let mut var = file
            .variable_mut(TIME)
            .ok_or_else(|| ClmPostError::InvalidTimeAxis(format!("'{}' vanished from {}", TIME, path.display())))?;
        var.put_values(&[expected], n - 1..n)?;
    }

    let bounds = match bounds_name {
        None => BoundsUpdate::NoBounds,
        Some(name) => match update_bounds(&mut file, &name, n, old, expected, dt) {
            Ok(update) => update,
            Err(e) => BoundsUpdate::Unchanged(format!("could not adjust '{}': {}", name, e)),
        },
    };
    if let BoundsUpdate::Unchanged(reason) = &bounds {
        warn!(reason = %reason, "time bounds left unchanged, time coordinate was corrected");
    }

    info!(path = %path.display(), ?bounds, "overwrote file");
    Ok(TimeFixOutcome::Corrected {
        old,
        new: expected,
        bounds,
    })
}

fn update_bounds(
    file: &mut netcdf::FileMut,
    name: &str,
    n_time: usize,
    old: f64,
    new: f64,
    dt: f64,
) -> Result<BoundsUpdate> {
    let mut var = file
        .variable_mut(name)
        .ok_or_else(|| ClmPostError::InvalidTimeAxis(format!("bounds variable '{}' not found", name)))?;
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let mut bounds = var.get_values::<f64, _>(..)?;

    let update = correct_bounds(&mut bounds, &shape, n_time, old, new, dt);
    if matches!(update, BoundsUpdate::Replaced(_) | BoundsUpdate::LastRowRewritten) {
        var.put_values(bounds.as_slice(), ..)?;
    }
    Ok(update)
}
