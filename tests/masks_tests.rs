//! Tests of the FR_LAND mask file creation

mod common;

use clm_post::errors::{ClmPostError, Result};
use clm_post::masks::{create_masks, INPUT_MASK_FILE, OUTPUT_MASK_FILE};
use common::{write_field, NX, NY};
use ndarray::{Array1, Array2, Array3};
use netcdf::{create, open, AttributeValue};
use tempfile::tempdir;

fn write_extpar(path: &std::path::Path, fr_land: &Array2<f64>) -> Result<()> {
    let (ny, nx) = fr_land.dim();
    let mut file = create(path)?;
    file.add_dimension("rlat", ny)?;
    file.add_dimension("rlon", nx)?;
    {
        let mut rlat = file.add_variable::<f64>("rlat", &["rlat"])?;
        rlat.put(Array1::from_iter((0..ny).map(|i| i as f64)).view(), ..)?;
    }
    {
        let mut rlon = file.add_variable::<f64>("rlon", &["rlon"])?;
        rlon.put(Array1::from_iter((0..nx).map(|i| i as f64)).view(), ..)?;
    }
    {
        let mut var = file.add_variable::<f32>("FR_LAND", &["rlat", "rlon"])?;
        var.put_attribute("long_name", "Fraction land")?;
        var.put(fr_land.mapv(|v| v as f32).view(), ..)?;
    }
    {
        let mut other = file.add_variable::<f32>("SOILTYP", &["rlat", "rlon"])?;
        other.put(Array2::<f32>::zeros((ny, nx)).view(), ..)?;
    }
    Ok(())
}

#[test]
fn test_masks_are_written() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let input_path = temp_dir.path().join("post");
    let inidir = temp_dir.path().join("ini");
    std::fs::create_dir_all(&input_path)?;
    std::fs::create_dir_all(&inidir)?;

    // LSM as (time=1, rlat, rlon), as a selection from model output would be
    let lsm = Array3::from_shape_fn((1, NY, NX), |(_, j, i)| if (i + j) % 2 == 0 { 1.0 } else { 0.0 });
    write_field(&input_path, "lsm.nc", "LSM", &lsm);

    let fr_land = Array2::from_shape_fn((NY, NX), |(j, i)| 0.25 * (i + j) as f64);
    let extpar = temp_dir.path().join("extpar.nc");
    write_extpar(&extpar, &fr_land)?;

    let files = create_masks(&input_path, &inidir, "lsm.nc", &extpar)?;
    assert_eq!(files.input_mask, inidir.join(INPUT_MASK_FILE));
    assert_eq!(files.output_mask, inidir.join(OUTPUT_MASK_FILE));

    // input_FR_LAND: LSM renamed, coordinates carried along
    let file = open(&files.input_mask)?;
    assert!(file.variable("LSM").is_none());
    let var = file.variable("FR_LAND").expect("FR_LAND missing");
    assert_eq!(var.get_values::<f64, _>(..)?, lsm.iter().copied().collect::<Vec<_>>());
    assert_eq!(
        var.attribute("grid_mapping").and_then(|a| a.value().ok()),
        Some(AttributeValue::Str("rotated_pole".to_string()))
    );
    for name in ["lat", "lon", "rlat", "rlon", "time", "rotated_pole"] {
        assert!(file.variable(name).is_some(), "{} not carried along", name);
    }

    // output_FR_LAND: extpar field with a leading one-step time axis
    let file = open(&files.output_mask)?;
    let var = file.variable("FR_LAND").expect("FR_LAND missing");
    let dims: Vec<(String, usize)> = var
        .dimensions()
        .iter()
        .map(|d| (d.name().to_string(), d.len()))
        .collect();
    assert_eq!(
        dims,
        vec![
            ("time".to_string(), 1),
            ("rlat".to_string(), NY),
            ("rlon".to_string(), NX)
        ]
    );
    assert_eq!(var.get_values::<f64, _>(..)?, fr_land.iter().copied().collect::<Vec<_>>());
    let time = file.variable("time").expect("time missing");
    assert_eq!(time.get_values::<i32, _>(..)?, vec![0]);
    assert!(file.variable("SOILTYP").is_none());

    Ok(())
}

#[test]
fn test_missing_lsm_variable() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let dir = temp_dir.path();

    write_field(dir, "lsm.nc", "NOT_LSM", &Array3::zeros((1, NY, NX)));
    let extpar = dir.join("extpar.nc");
    write_extpar(&extpar, &Array2::zeros((NY, NX)))?;

    match create_masks(dir, dir, "lsm.nc", &extpar) {
        Err(ClmPostError::VariableNotFound { var, .. }) => assert_eq!(var, "LSM"),
        other => panic!("Expected VariableNotFound error, got {:?}", other),
    }
    assert!(!dir.join(INPUT_MASK_FILE).exists());

    Ok(())
}
