//! NetCDF attribute helpers
//!
//! Reading single attributes and carrying attribute sets from an input
//! variable or file over to an output one.

use crate::errors::Result;
use netcdf::{AttributeValue, FileMut, Variable, VariableMut};
use tracing::debug;

/// Name of the CF fill value attribute
pub const FILL_VALUE: &str = "_FillValue";

/// Returns a string attribute of a variable, if present and textual.
pub fn string_attribute(var: &Variable, name: &str) -> Option<String> {
    match var.attribute(name)?.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// Returns the `_FillValue` of a variable as `f64`, whatever its stored type.
pub fn fill_value(var: &Variable) -> Option<f64> {
    var.attribute(FILL_VALUE)
        .and_then(|attr| match attr.value().ok()? {
            AttributeValue::Float(v) => Some(f64::from(v)),
            AttributeValue::Double(v) => Some(v),
            AttributeValue::Short(v) => Some(f64::from(v)),
            AttributeValue::Int(v) => Some(f64::from(v)),
            _ => None,
        })
}

/// Copies all attributes of `src` onto `dst`, except those listed in `skip`.
pub fn copy_variable_attributes(src: &Variable, dst: &mut VariableMut, skip: &[&str]) -> Result<()> {
    for attr in src.attributes() {
        let name = attr.name();
        if skip.contains(&name) {
            debug!(variable = %src.name(), attribute = name, "skipping attribute");
            continue;
        }
        dst.put_attribute(name, attr.value()?)?;
    }
    Ok(())
}

/// Copies the global attributes of `src` onto `dst`, except those listed in `skip`.
pub fn copy_global_attributes(src: &netcdf::File, dst: &mut FileMut, skip: &[&str]) -> Result<()> {
    for attr in src.attributes() {
        let name = attr.name();
        if skip.contains(&name) {
            continue;
        }
        dst.add_attribute(name, attr.value()?)?;
    }
    Ok(())
}
