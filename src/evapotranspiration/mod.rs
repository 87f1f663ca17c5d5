//! Hourly potential evapotranspiration from climate model output
//!
//! # Organization
//!
//! - [`constants`]: natural constants and the reference-surface lookup
//! - [`vapor`]: actual vapor pressure and the ordered choice of its inputs
//! - [`penman`]: the FAO-56 Penman-Monteith equation, per cell and per grid
//!
//! [`compute_potevap`] ties them together for one input directory.

pub mod constants;
pub mod penman;
pub mod vapor;

pub use constants::{hourly_constants, hourly_constants_by_name, HourlyConstants, ReferenceSurface, TimeOfDay};
pub use penman::{MeteoFields, PenmanMonteith};
pub use vapor::{
    resolve_vapor_pressure_input, VaporPressureCandidate, VaporPressureSource,
    VAPOR_PRESSURE_CANDIDATES,
};

use crate::errors::Result;
use crate::netcdf_io::{load_grid_field, open_input, read_grid_field, GridField, NetCDFWriter, OutputField};
use netcdf::AttributeValue;
use std::path::{Path, PathBuf};
use tracing::info;

/// A fixed input file and the variable read from it
#[derive(Debug, Clone, Copy)]
pub struct InputFile {
    pub file: &'static str,
    pub variable: &'static str,
}

pub const TEMPERATURE: InputFile = InputFile {
    file: "AT_2M_ts.nc",
    variable: "AT_2M",
};
pub const WIND_SPEED: InputFile = InputFile {
    file: "ASP_10M_ts.nc",
    variable: "ASP_10M",
};
pub const SHORTWAVE: InputFile = InputFile {
    file: "ASOB_S_ts.nc",
    variable: "ASOB_S",
};
pub const LONGWAVE: InputFile = InputFile {
    file: "ATHB_S_ts.nc",
    variable: "ATHB_S",
};

pub const OUTPUT_FILE: &str = "APOTEVAP_S_ts.nc";
pub const OUTPUT_VARIABLE: &str = "APOTEVAP_S";
pub const OUTPUT_FILL_VALUE: f32 = -1.0e20;
pub const HISTORY: &str =
    "FAO56 Penman-Monteith equation, Allen (2005), Singer (2021) Nature, based hourly PET";

/// Variables carried over from the temperature file when present
pub const PASSTHROUGH_VARIABLES: [&str; 8] = [
    "time",
    "rlat",
    "rlon",
    "lon",
    "lon_bnds",
    "lat",
    "lat_bnds",
    "rotated_pole",
];

/// Fixed metadata of the output variable.
pub fn output_attributes() -> Vec<(&'static str, AttributeValue)> {
    vec![
        ("long_name", AttributeValue::Str("Potential evapotranspiration".to_string())),
        (
            "standard_name",
            AttributeValue::Str("water_potential_evapotranspiration_amount".to_string()),
        ),
        ("units", AttributeValue::Str("kg m-2".to_string())),
        ("grid_mapping", AttributeValue::Str("rotated_pole".to_string())),
        ("cell_methods", AttributeValue::Str("time: sum".to_string())),
    ]
}

/// Reads both vapor-pressure inputs of `candidate` and returns `e_a` [Pa].
fn load_vapor_pressure(
    dir: &Path,
    candidate: &VaporPressureCandidate,
    grid: &GridField,
) -> Result<GridField> {
    let first = load_grid_field(&dir.join(candidate.files[0]), candidate.variables[0])?;
    let second = load_grid_field(&dir.join(candidate.files[1]), candidate.variables[1])?;
    grid.ensure_same_grid(&first)?;
    grid.ensure_same_grid(&second)?;

    Ok(GridField {
        name: "e_a".to_string(),
        dims: grid.dims.clone(),
        coordinates: grid.coordinates.clone(),
        data: candidate
            .source
            .actual_vapor_pressure_field(&first.data, &second.data),
    })
}

/// Computes hourly PET for the files in `dir` and writes [`OUTPUT_FILE`] there.
///
/// The vapor-pressure input pair is resolved before anything is read, so a
/// directory lacking both pairs fails without creating output.
///
/// # Errors
///
/// [`crate::ClmPostError::MissingInput`] when neither vapor-pressure pair is
/// complete, a grid mismatch between inputs, or any NetCDF/I/O failure.
pub fn compute_potevap(dir: &Path, reference: ReferenceSurface) -> Result<PathBuf> {
    info!(dir = %dir.display(), "checking input files for actual vapor pressure");
    let candidate = resolve_vapor_pressure_input(dir)?;
    info!(source = ?candidate.source, files = ?candidate.files, "selected vapor pressure input");

    info!("loading input datasets");
    let temperature_path = dir.join(TEMPERATURE.file);
    let temperature_file = open_input(&temperature_path)?;
    let temperature = read_grid_field(&temperature_file, TEMPERATURE.variable, &temperature_path)?;

    let mut others = Vec::with_capacity(3);
    for input in [WIND_SPEED, SHORTWAVE, LONGWAVE] {
        let field = load_grid_field(&dir.join(input.file), input.variable)?;
        temperature.ensure_same_grid(&field)?;
        others.push(field);
    }
    let vapor_pressure = load_vapor_pressure(dir, &candidate, &temperature)?;

    info!(shape = ?temperature.shape(), threads = rayon::current_num_threads(), "performing calculations");
    let pm = PenmanMonteith::new(reference);
    let pet = pm.evaluate_field(&MeteoFields {
        temperature: &temperature.data,
        wind_speed: &others[0].data,
        shortwave: &others[1].data,
        longwave: &others[2].data,
        vapor_pressure: &vapor_pressure.data,
    });

    let output_path = dir.join(OUTPUT_FILE);
    let writer = NetCDFWriter::new(&temperature_file, &temperature_path, &output_path);
    writer.write_field(
        &OutputField {
            name: OUTPUT_VARIABLE,
            dims: &temperature.dims,
            data: &pet,
            attributes: output_attributes(),
            fill_value: OUTPUT_FILL_VALUE,
        },
        &PASSTHROUGH_VARIABLES,
        &["time"],
        HISTORY,
    )?;

    Ok(output_path)
}
