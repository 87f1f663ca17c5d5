//! Synthetic NetCDF inputs shared by the integration tests

#![allow(dead_code)]

use clm_post::netcdf_io::NcChar;
use ndarray::{Array1, Array2, Array3};
use netcdf::create;
use std::path::Path;

pub const NT: usize = 3;
pub const NY: usize = 2;
pub const NX: usize = 3;

/// Writes a model-style file holding one constant (time, rlat, rlon) field.
pub fn write_constant_field(dir: &Path, file_name: &str, var_name: &str, value: f64) {
    write_field(dir, file_name, var_name, &Array3::from_elem((NT, NY, NX), value));
}

/// Variations on the fixture file layout
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldLayout {
    /// Added to every time value
    pub time_offset: f64,
    /// Store `rotated_pole` as a `char` scalar instead of an `int`
    pub char_grid_mapping: bool,
}

/// Writes a model-style file holding `data` on (time, rlat, rlon) with the
/// usual rotated-pole coordinates.
pub fn write_field(dir: &Path, file_name: &str, var_name: &str, data: &Array3<f64>) {
    write_field_with(dir, file_name, var_name, data, FieldLayout::default());
}

pub fn write_field_with(
    dir: &Path,
    file_name: &str,
    var_name: &str,
    data: &Array3<f64>,
    layout: FieldLayout,
) {
    let (nt, ny, nx) = data.dim();
    let path = dir.join(file_name);
    let mut file = create(&path).expect("Failed to create NetCDF file");

    file.add_attribute("title", "synthetic test data")
        .expect("Failed to add title");
    file.add_attribute("history", "created by test")
        .expect("Failed to add history");

    file.add_dimension("time", nt).expect("Failed to add time");
    file.add_dimension("rlat", ny).expect("Failed to add rlat");
    file.add_dimension("rlon", nx).expect("Failed to add rlon");

    {
        let mut time = file
            .add_variable::<f64>("time", &["time"])
            .expect("Failed to add time variable");
        time.put_attribute("units", "hours since 2000-01-01 00:00:00")
            .expect("Failed to add units");
        time.put_attribute("calendar", "proleptic_gregorian")
            .expect("Failed to add calendar");
        let values = Array1::from_iter((0..nt).map(|i| i as f64 + 0.5 + layout.time_offset));
        time.put(values.view(), ..).expect("Failed to write time");
    }
    {
        let mut rlat = file
            .add_variable::<f64>("rlat", &["rlat"])
            .expect("Failed to add rlat");
        rlat.put_attribute("standard_name", "grid_latitude")
            .expect("Failed to add standard_name");
        let values = Array1::from_iter((0..ny).map(|i| -1.0 + i as f64 * 0.11));
        rlat.put(values.view(), ..).expect("Failed to write rlat");
    }
    {
        let mut rlon = file
            .add_variable::<f64>("rlon", &["rlon"])
            .expect("Failed to add rlon");
        rlon.put_attribute("standard_name", "grid_longitude")
            .expect("Failed to add standard_name");
        let values = Array1::from_iter((0..nx).map(|i| 2.0 + i as f64 * 0.11));
        rlon.put(values.view(), ..).expect("Failed to write rlon");
    }
    {
        let mut lat = file
            .add_variable::<f64>("lat", &["rlat", "rlon"])
            .expect("Failed to add lat");
        lat.put_attribute("units", "degrees_north")
            .expect("Failed to add units");
        let values = Array2::from_shape_fn((ny, nx), |(j, i)| 50.0 + j as f64 + 0.01 * i as f64);
        lat.put(values.view(), ..).expect("Failed to write lat");
    }
    {
        let mut lon = file
            .add_variable::<f64>("lon", &["rlat", "rlon"])
            .expect("Failed to add lon");
        lon.put_attribute("units", "degrees_east")
            .expect("Failed to add units");
        let values = Array2::from_shape_fn((ny, nx), |(j, i)| 10.0 + i as f64 + 0.01 * j as f64);
        lon.put(values.view(), ..).expect("Failed to write lon");
    }
    {
        let mut pole = if layout.char_grid_mapping {
            let mut pole = file
                .add_variable::<NcChar>("rotated_pole", &[])
                .expect("Failed to add rotated_pole");
            pole.put_values(&[NcChar(b'c' as i8)], ..)
                .expect("Failed to write rotated_pole");
            pole
        } else {
            file.add_variable::<i32>("rotated_pole", &[])
                .expect("Failed to add rotated_pole")
        };
        pole.put_attribute("grid_mapping_name", "rotated_latitude_longitude")
            .expect("Failed to add grid_mapping_name");
        pole.put_attribute("grid_north_pole_latitude", 39.25f64)
            .expect("Failed to add pole latitude");
        pole.put_attribute("grid_north_pole_longitude", -162.0f64)
            .expect("Failed to add pole longitude");
    }
    {
        let mut var = file
            .add_variable::<f64>(var_name, &["time", "rlat", "rlon"])
            .expect("Failed to add data variable");
        var.put_attribute("grid_mapping", "rotated_pole")
            .expect("Failed to add grid_mapping");
        var.put_attribute("coordinates", "lat lon")
            .expect("Failed to add coordinates");
        var.put(data.view(), ..).expect("Failed to write data");
    }
}

/// Writes the four inputs every PET run needs.
pub fn write_base_inputs(dir: &Path, t_k: f64, wind: f64, sw: f64, lw: f64) {
    write_constant_field(dir, "AT_2M_ts.nc", "AT_2M", t_k);
    write_constant_field(dir, "ASP_10M_ts.nc", "ASP_10M", wind);
    write_constant_field(dir, "ASOB_S_ts.nc", "ASOB_S", sw);
    write_constant_field(dir, "ATHB_S_ts.nc", "ATHB_S", lw);
}

pub fn assert_close(actual: f64, expected: f64, rel_tol: f64) {
    let scale = expected.abs().max(1e-12);
    assert!(
        ((actual - expected) / scale).abs() <= rel_tol,
        "expected {} got {} (relative tolerance {})",
        expected,
        actual,
        rel_tol
    );
}
