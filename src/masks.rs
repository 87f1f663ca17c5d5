//! Land/sea mask files for model initialisation
//!
//! Two files are written into the INI directory: the `LSM` field of a
//! post-processed input renamed to `FR_LAND`, and the `FR_LAND` field of an
//! external parameter file with a leading one-step `time` axis.

use crate::errors::Result;
use crate::metadata::string_attribute;
use crate::netcdf_io::{copy_variable, open_input, require_variable, CopyOptions};
use netcdf::{create, File};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const LSM: &str = "LSM";
pub const FR_LAND: &str = "FR_LAND";
pub const INPUT_MASK_FILE: &str = "input_FR_LAND.nc";
pub const OUTPUT_MASK_FILE: &str = "output_FR_LAND.nc";

/// Paths of the two written mask files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskFiles {
    pub input_mask: PathBuf,
    pub output_mask: PathBuf,
}

/// Variables that travel with `name`: coordinate variables of its dimensions,
/// those listed in its `coordinates` attribute, and its grid mapping.
fn companion_variables(file: &File, name: &str, path: &Path) -> Result<Vec<String>> {
    let var = require_variable(file, name, path)?;
    let mut names = BTreeSet::new();

    for dim in var.dimensions() {
        names.insert(dim.name().to_string());
    }
    if let Some(coords) = string_attribute(&var, "coordinates") {
        names.extend(coords.split_whitespace().map(str::to_string));
    }
    if let Some(mapping) = string_attribute(&var, "grid_mapping") {
        names.insert(mapping);
    }

    Ok(names
        .into_iter()
        .filter(|n| n != name && file.variable(n).is_some())
        .collect())
}

/// Writes `name` from `src` as `rename` into a new file at `dst_path`.
fn write_mask(
    src: &File,
    src_path: &Path,
    name: &str,
    rename: &str,
    with_time: bool,
    dst_path: &Path,
) -> Result<()> {
    let companions = companion_variables(src, name, src_path)?;

    if dst_path.exists() {
        fs::remove_file(dst_path)?;
    }
    let mut dst = create(dst_path)?;

    let leading_dimension = with_time.then_some("time");
    if with_time {
        dst.add_dimension("time", 1)?;
        let mut time = dst.add_variable::<i32>("time", &["time"])?;
        time.put_values(&[0i32], ..)?;
    }

    for companion in companions {
        debug!(variable = %companion, "carrying along");
        copy_variable(src, src_path, &mut dst, &companion, CopyOptions::default())?;
    }

    copy_variable(
        src,
        src_path,
        &mut dst,
        name,
        CopyOptions {
            rename: Some(rename),
            keep_fill_value: true,
            leading_dimension,
            ..CopyOptions::default()
        },
    )?;

    info!(path = %dst_path.display(), "file written");
    Ok(())
}

/// Writes `input_FR_LAND.nc` and `output_FR_LAND.nc` into `inidir`.
///
/// # Errors
///
/// Fails if either source file or its mask variable is missing, or on any
/// NetCDF write error.
pub fn create_masks(
    input_path: &Path,
    inidir: &Path,
    input_file: &str,
    extpar_file: &Path,
) -> Result<MaskFiles> {
    let lsm_path = input_path.join(input_file);
    let files = MaskFiles {
        input_mask: inidir.join(INPUT_MASK_FILE),
        output_mask: inidir.join(OUTPUT_MASK_FILE),
    };

    let lsm = open_input(&lsm_path)?;
    let extpar = open_input(extpar_file)?;

    write_mask(&lsm, &lsm_path, LSM, FR_LAND, false, &files.input_mask)?;
    write_mask(&extpar, extpar_file, FR_LAND, FR_LAND, true, &files.output_mask)?;

    Ok(files)
}
