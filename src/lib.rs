//! clm_post: post-processing of regional climate model NetCDF output
//!
//! Batch tools for data produced by a regional climate model chain:
//!
//! - **Potential evapotranspiration**: hourly FAO-56 Penman-Monteith PET from
//!   temperature, wind, radiation and humidity time series
//! - **Time axis repair**: fix a malformed last time stamp in place
//! - **Land/sea masks**: `FR_LAND` files from a land-sea mask and external parameters
//!
//! ## Module Organization
//!
//! - [`evapotranspiration`]: constants, vapor pressure and the Penman-Monteith equation
//! - [`time_fix`]: last-timestamp correction
//! - [`masks`]: mask file creation
//! - [`netcdf_io`]: reading grid fields and writing derived files
//! - [`metadata`]: attribute helpers
//! - [`parallel`]: thread pool configuration
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use clm_post::prelude::*;
//! use std::path::Path;
//!
//! let output = compute_potevap(Path::new("/data/ts"), ReferenceSurface::Short).unwrap();
//! println!("PET written to {}", output.display());
//! ```

pub mod cli;
pub mod errors;
pub mod evapotranspiration;
pub mod masks;
pub mod metadata;
pub mod netcdf_io;
pub mod parallel;
pub mod time_fix;

pub use errors::*;

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::errors::{ClmPostError, Result};
    pub use crate::evapotranspiration::{compute_potevap, PenmanMonteith, ReferenceSurface, VaporPressureSource};
    pub use crate::masks::create_masks;
    pub use crate::parallel::ParallelConfig;
    pub use crate::time_fix::{fix_last_timestamp, TimeFixOutcome};
}
