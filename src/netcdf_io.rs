//! NetCDF I/O: reading (time, y, x) fields and writing derived files
//!
//! Inputs are read as `f64` regardless of their stored type. Outputs are
//! assembled from a computed field plus variables copied from an input file
//! with their dimensions and attributes.

use crate::errors::{ClmPostError, Result};
use crate::metadata::{copy_global_attributes, copy_variable_attributes, fill_value, FILL_VALUE};
use ndarray::{Array3, ArrayD, Axis, Ix3};
use netcdf::types::{FloatType, NcVariableType};
use netcdf::{create, AttributeValue, File, FileMut, NcTypeDescriptor, Variable};
use std::{fs, path::Path};
use tracing::{debug, info};

/// Dimension names that are never dropped when squeezing singleton axes
const SPATIAL_DIMS: [&str; 6] = ["rlat", "rlon", "lat", "lon", "y", "x"];

/// Relative tolerance for coordinate values stored at different precisions
const COORDINATE_TOLERANCE: f64 = 1e-6;

/// A (time, y, x) field read from one input file
#[derive(Debug, Clone)]
pub struct GridField {
    pub name: String,
    /// Dimension names of the three kept axes
    pub dims: Vec<String>,
    /// Values of the coordinate variable of each kept axis, if the file has one
    pub coordinates: Vec<Option<Vec<f64>>>,
    pub data: Array3<f64>,
}

impl GridField {
    /// Builds a field from flat data, dropping singleton axes after the first.
    ///
    /// Extra length-1 axes (for example a `height_2m` level) are removed until
    /// three remain. Non-spatial axes go first, searched from the last axis
    /// backwards; the time axis is never dropped.
    pub fn from_flat(
        name: &str,
        dims: Vec<String>,
        shape: Vec<usize>,
        data: Vec<f64>,
    ) -> Result<Self> {
        let mut dims = dims;
        let mut array = ArrayD::from_shape_vec(shape.clone(), data)?;

        while array.ndim() > 3 {
            let singletons: Vec<usize> = (1..array.ndim())
                .rev()
                .filter(|&i| array.len_of(Axis(i)) == 1)
                .collect();
            let axis = singletons
                .iter()
                .copied()
                .find(|&i| !dims.get(i).is_some_and(|d| SPATIAL_DIMS.contains(&d.as_str())))
                .or_else(|| singletons.first().copied());
            match axis {
                Some(axis) => {
                    array = array.index_axis_move(Axis(axis), 0);
                    if axis < dims.len() {
                        dims.remove(axis);
                    }
                }
                None => break,
            }
        }

        let data = array
            .into_dimensionality::<Ix3>()
            .map_err(|_| ClmPostError::ShapeMismatch {
                var: name.to_string(),
                shape,
            })?;

        Ok(Self {
            name: name.to_string(),
            coordinates: vec![None; dims.len()],
            dims,
            data,
        })
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Fails unless `other` lies on exactly the same grid.
    ///
    /// Shapes must agree, and so must the coordinate values of every axis for
    /// which both fields carry a coordinate variable.
    pub fn ensure_same_grid(&self, other: &GridField) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(ClmPostError::GridMismatch {
                var: other.name.clone(),
                expected: self.shape().to_vec(),
                got: other.shape().to_vec(),
            });
        }

        let axes = self.dims.iter().zip(&self.coordinates).zip(&other.coordinates);
        for ((dim, ours), theirs) in axes {
            if let (Some(ours), Some(theirs)) = (ours, theirs) {
                if !coordinates_match(ours, theirs) {
                    return Err(ClmPostError::CoordinateMismatch {
                        var: other.name.clone(),
                        dim: dim.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn coordinates_match(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            let scale = x.abs().max(y.abs()).max(1.0);
            (x - y).abs() <= COORDINATE_TOLERANCE * scale
        })
}

/// Values of the 1-D coordinate variable named after `dim`, if present.
fn read_coordinate(file: &File, dim: &str, len: usize) -> Result<Option<Vec<f64>>> {
    let Some(var) = file.variable(dim) else {
        return Ok(None);
    };
    let dims = var.dimensions();
    if dims.len() != 1 || dims[0].name() != dim || dims[0].len() != len {
        return Ok(None);
    }
    Ok(Some(var.get_values::<f64, _>(..)?))
}

/// Opens an input file, reporting a missing path as an I/O "not found" error.
pub fn open_input(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(ClmPostError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input file {} does not exist", path.display()),
        )));
    }
    Ok(netcdf::open(path)?)
}

/// Looks up a variable, naming the file in the error.
pub fn require_variable<'f>(file: &'f File, name: &str, path: &Path) -> Result<Variable<'f>> {
    file.variable(name)
        .ok_or_else(|| ClmPostError::VariableNotFound {
            var: name.to_string(),
            path: path.to_path_buf(),
        })
}

/// Reads `var_name` from an open file as a [`GridField`].
pub fn read_grid_field(file: &File, var_name: &str, path: &Path) -> Result<GridField> {
    let var = require_variable(file, var_name, path)?;

    let dims: Vec<String> = var
        .dimensions()
        .iter()
        .map(|d| d.name().to_string())
        .collect();
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let mut values = var.get_values::<f64, _>(..)?;

    // Fill values become NaN so they stay missing through the arithmetic.
    if let Some(fv) = fill_value(&var) {
        for v in values.iter_mut().filter(|v| **v == fv) {
            *v = f64::NAN;
        }
    }

    debug!(variable = var_name, ?shape, "read field");
    let mut field = GridField::from_flat(var_name, dims, shape, values)?;
    field.coordinates = field
        .dims
        .iter()
        .zip(field.data.shape())
        .map(|(dim, &len)| read_coordinate(file, dim, len))
        .collect::<Result<_>>()?;
    Ok(field)
}

/// Opens `path` and reads one field from it.
pub fn load_grid_field(path: &Path, var_name: &str) -> Result<GridField> {
    let file = open_input(path)?;
    read_grid_field(&file, var_name, path)
}

/// NetCDF `char`, as used for scalar grid-mapping variables
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NcChar(pub i8);

unsafe impl NcTypeDescriptor for NcChar {
    fn type_descriptor() -> NcVariableType {
        NcVariableType::Char
    }
}

/// How a stored variable is copied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StorageKind {
    Double,
    Float,
    Integer,
    Char,
    /// Strings and user-defined types; only attributes are carried over
    Opaque,
}

impl StorageKind {
    fn of(var: &Variable) -> Self {
        match var.vartype() {
            NcVariableType::Float(FloatType::F64) => Self::Double,
            NcVariableType::Float(FloatType::F32) => Self::Float,
            NcVariableType::Int(_) => Self::Integer,
            NcVariableType::Char => Self::Char,
            _ => Self::Opaque,
        }
    }
}

/// Options for [`copy_variable`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyOptions<'a> {
    /// Output name, defaults to the input name
    pub rename: Option<&'a str>,
    /// Keep the input's `_FillValue`
    pub keep_fill_value: bool,
    /// Store as `f64` whatever the input type
    pub force_double: bool,
    /// Prepend a new length-1 dimension with this name
    pub leading_dimension: Option<&'a str>,
}

/// Adds dimension `name` unless present; a present one must have length `len`.
pub fn ensure_dimension(dst: &mut FileMut, name: &str, len: usize) -> Result<()> {
    match dst.dimension(name) {
        Some(existing) if existing.len() != len => Err(ClmPostError::Generic(format!(
            "Dimension '{}' already defined with length {}, cannot redefine with length {}",
            name,
            existing.len(),
            len
        ))),
        Some(_) => Ok(()),
        None => {
            dst.add_dimension(name, len)?;
            Ok(())
        }
    }
}

/// Copies variable `name` from `src` into `dst`, creating its dimensions.
pub fn copy_variable(
    src: &File,
    src_path: &Path,
    dst: &mut FileMut,
    name: &str,
    options: CopyOptions<'_>,
) -> Result<()> {
    let var = require_variable(src, name, src_path)?;
    let out_name = options.rename.unwrap_or(name);

    let mut dims: Vec<String> = Vec::new();
    if let Some(lead) = options.leading_dimension {
        ensure_dimension(dst, lead, 1)?;
        dims.push(lead.to_string());
    }
    for dim in var.dimensions() {
        ensure_dimension(dst, &dim.name(), dim.len())?;
        dims.push(dim.name().to_string());
    }
    let dim_refs: Vec<&str> = dims.iter().map(|s| s.as_str()).collect();

    let fill = if options.keep_fill_value {
        fill_value(&var)
    } else {
        None
    };
    let kind = if options.force_double {
        StorageKind::Double
    } else {
        StorageKind::of(&var)
    };

    match kind {
        StorageKind::Double => {
            let values = var.get_values::<f64, _>(..)?;
            let mut out = dst.add_variable::<f64>(out_name, &dim_refs)?;
            if let Some(fv) = fill {
                out.put_attribute(FILL_VALUE, fv)?;
            }
            copy_variable_attributes(&var, &mut out, &[FILL_VALUE])?;
            out.put_values(values.as_slice(), ..)?;
        }
        StorageKind::Float => {
            let values = var.get_values::<f32, _>(..)?;
            let mut out = dst.add_variable::<f32>(out_name, &dim_refs)?;
            if let Some(fv) = fill {
                out.put_attribute(FILL_VALUE, fv as f32)?;
            }
            copy_variable_attributes(&var, &mut out, &[FILL_VALUE])?;
            out.put_values(values.as_slice(), ..)?;
        }
        StorageKind::Integer => {
            let values = var.get_values::<i32, _>(..)?;
            let mut out = dst.add_variable::<i32>(out_name, &dim_refs)?;
            if let Some(fv) = fill {
                out.put_attribute(FILL_VALUE, fv as i32)?;
            }
            copy_variable_attributes(&var, &mut out, &[FILL_VALUE])?;
            out.put_values(values.as_slice(), ..)?;
        }
        StorageKind::Char => {
            let values = var.get_values::<NcChar, _>(..)?;
            let mut out = dst.add_variable::<NcChar>(out_name, &dim_refs)?;
            copy_variable_attributes(&var, &mut out, &[FILL_VALUE])?;
            out.put_values(values.as_slice(), ..)?;
        }
        StorageKind::Opaque => {
            debug!(variable = name, "non-numeric variable, copying attributes only");
            let mut out = dst.add_variable::<i32>(out_name, &dim_refs)?;
            copy_variable_attributes(&var, &mut out, &[FILL_VALUE])?;
        }
    }

    debug!(variable = name, output = out_name, ?kind, "copied variable");
    Ok(())
}

/// A computed field ready to be written
#[derive(Debug)]
pub struct OutputField<'a> {
    pub name: &'a str,
    pub dims: &'a [String],
    pub data: &'a Array3<f64>,
    pub attributes: Vec<(&'a str, AttributeValue)>,
    pub fill_value: f32,
}

/// Writes a derived field next to passthrough variables of its source file
pub struct NetCDFWriter<'a> {
    input_file: &'a File,
    input_path: &'a Path,
    output_path: &'a Path,
}

impl<'a> NetCDFWriter<'a> {
    pub fn new(input_file: &'a File, input_path: &'a Path, output_path: &'a Path) -> Self {
        Self {
            input_file,
            input_path,
            output_path,
        }
    }

    /// Writes `field` as `f32`, copies the `passthrough` variables present in
    /// the input file, and the input's global attributes with `history` replaced.
    ///
    /// `double_vars` are passthrough variables forced to `f64` storage.
    pub fn write_field(
        &self,
        field: &OutputField<'_>,
        passthrough: &[&str],
        double_vars: &[&str],
        history: &str,
    ) -> Result<()> {
        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        }

        let mut file = create(self.output_path)?;
        copy_global_attributes(self.input_file, &mut file, &["history"])?;
        file.add_attribute("history", history)?;

        for (dim_name, &dim_len) in field.dims.iter().zip(field.data.shape()) {
            ensure_dimension(&mut file, dim_name, dim_len)?;
        }

        for &name in passthrough {
            if self.input_file.variable(name).is_none() {
                debug!(variable = name, "not in input, skipping passthrough");
                continue;
            }
            let options = CopyOptions {
                force_double: double_vars.contains(&name),
                ..CopyOptions::default()
            };
            copy_variable(self.input_file, self.input_path, &mut file, name, options)?;
        }

        let dim_refs: Vec<&str> = field.dims.iter().map(|s| s.as_str()).collect();
        let mut var = file.add_variable::<f32>(field.name, &dim_refs)?;
        var.put_attribute(FILL_VALUE, field.fill_value)?;
        for (name, value) in &field.attributes {
            var.put_attribute(name, value.clone())?;
        }

        let data = field
            .data
            .mapv(|v| if v.is_finite() { v as f32 } else { field.fill_value });
        var.put(data.view(), ..)?;

        info!(path = %self.output_path.display(), variable = field.name, "wrote output");
        Ok(())
    }
}
