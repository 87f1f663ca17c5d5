//! Defines command-line interface options using `clap` for the clmpost binary.

use crate::evapotranspiration::ReferenceSurface;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Post-processing tools for climate model NetCDF output
#[derive(Parser, Debug)]
#[command(
    version,
    name = "clmpost",
    about = "Post-processing tools for climate model NetCDF output"
)]
pub struct Args {
    /// Enable verbose (debug level) logging. RUST_LOG takes precedence when set.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long, global = true)]
    pub threads: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute hourly potential evapotranspiration (FAO-56 Penman-Monteith)
    Potevap {
        /// Directory holding the *_ts.nc input files; the output is written here too
        dir: PathBuf,

        /// Reference surface for the soil heat flux constants
        #[arg(long, default_value = "short", value_parser = parse_reference)]
        reference: ReferenceSurface,
    },

    /// Correct a malformed last value of the time coordinate in place
    FixTimeLast {
        /// NetCDF file to check and repair
        file: PathBuf,
    },

    /// Write FR_LAND mask files from a land-sea mask and an external parameter file
    CreateMasks {
        /// Input directory path
        #[arg(long)]
        input_path: PathBuf,

        /// INI directory path
        #[arg(long)]
        inidir: PathBuf,

        /// Input file name (inside input_path) holding LSM
        #[arg(long)]
        input_file: String,

        /// External parameters file holding FR_LAND
        #[arg(long)]
        extpar_file: PathBuf,
    },
}

fn parse_reference(s: &str) -> Result<ReferenceSurface, String> {
    s.parse::<ReferenceSurface>().map_err(|e| e.to_string())
}
