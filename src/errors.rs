//! Centralized error handling for clm_post
//!
//! Every operation in the crate returns [`Result`], so a failure anywhere in a
//! run surfaces as one [`ClmPostError`] at the binary's top level.

use std::fmt;
use std::path::PathBuf;

/// Main error type for clm_post operations
#[derive(Debug)]
pub enum ClmPostError {
    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// Variable not found in NetCDF file
    VariableNotFound { var: String, path: PathBuf },


    /// None of the vapor-pressure input pairs is available
    MissingInput { dir: PathBuf, candidates: Vec<String> },

    /// Reference surface name with no constant set
    InvalidReference { value: String },

    /// Two input fields are not on the same grid
    GridMismatch {
        var: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// Two input fields share a shape but not the coordinate values along `dim`
    CoordinateMismatch { var: String, dim: String },

    /// A variable cannot be brought into (time, y, x) form
    ShapeMismatch { var: String, shape: Vec<usize> },

    /// Time coordinate cannot be interpreted
    InvalidTimeAxis(String),

    /// Thread pool configuration error
    ThreadPoolError(String),

    /// Catch-all for one-off failures
    Generic(String),
}

impl fmt::Display for ClmPostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClmPostError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            ClmPostError::IoError(e) => write!(f, "I/O error: {}", e),
            ClmPostError::ArrayError(e) => write!(f, "Array error: {}", e),
            ClmPostError::VariableNotFound { var, path } => {
                write!(f, "Variable '{}' not found in {}", var, path.display())
            }
            ClmPostError::MissingInput { dir, candidates } => write!(
                f,
                "Input files for calculation of actual vapor pressure are missing in {} (expected one of: {})",
                dir.display(),
                candidates.join("; ")
            ),
            ClmPostError::InvalidReference { value } => write!(
                f,
                "Reference '{}' not defined. Select from 'short'.",
                value
            ),
            ClmPostError::GridMismatch { var, expected, got } => write!(
                f,
                "Variable '{}' has shape {:?}, expected {:?}",
                var, got, expected
            ),
            ClmPostError::CoordinateMismatch { var, dim } => write!(
                f,
                "Variable '{}' has '{}' coordinate values that differ from the reference grid",
                var, dim
            ),
            ClmPostError::ShapeMismatch { var, shape } => write!(
                f,
                "Variable '{}' with shape {:?} cannot be read as a (time, y, x) field",
                var, shape
            ),
            ClmPostError::InvalidTimeAxis(msg) => write!(f, "Invalid time axis: {}", msg),
            ClmPostError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
            ClmPostError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ClmPostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClmPostError::NetCDFError(e) => Some(e),
            ClmPostError::IoError(e) => Some(e),
            ClmPostError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for ClmPostError {
    fn from(error: netcdf::Error) -> Self {
        ClmPostError::NetCDFError(error)
    }
}

impl From<std::io::Error> for ClmPostError {
    fn from(error: std::io::Error) -> Self {
        ClmPostError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for ClmPostError {
    fn from(error: ndarray::ShapeError) -> Self {
        ClmPostError::ArrayError(error)
    }
}

/// Result type alias for clm_post operations
pub type Result<T> = std::result::Result<T, ClmPostError>;
