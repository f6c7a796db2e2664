//! The `fmi-cosim` crate drives a single FMI 1.0 Co-Simulation FMU (Functional Mockup Unit)
//! through its lifecycle: extraction and loading, instantiation, initialization, fixed-size
//! stepping, named scalar access and teardown. See <http://www.fmi-standard.org/>
//!
//! ## Examples
//!
//! ```rust,no_run
//! use fmi_cosim::{ModelUnit, ScalarValue, StepDriver};
//!
//! let mut unit = ModelUnit::open("path/to/model.fmu", "inst1").unwrap();
//! unit.instantiate().unwrap();
//! unit.set("e", ScalarValue::Real(0.7)).unwrap();
//! unit.initialize(0.0, 3.0).unwrap();
//!
//! let stats = StepDriver::new(0.0, 3.0, 0.01)
//!     .unwrap()
//!     .run(&mut unit, &mut ())
//!     .unwrap();
//! println!("{} steps, h = {}", stats.num_steps, unit.get("h").unwrap());
//!
//! unit.unload().unwrap();
//! ```
#![deny(clippy::all)]

// Re-export the fmi-schema crate
pub use fmi_schema as schema;

pub mod binding;
pub mod descriptor;
pub mod diagnostics;
pub mod driver;
pub mod import;
pub mod library;
mod logger;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod registry;
pub mod status;
pub mod unit;

pub use binding::{Binding, Component};
pub use descriptor::{ModelDescriptor, ScalarType, ScalarValue, VariableEntry};
pub use driver::{RunError, SimStats, StepDriver, StepSink};
pub use import::{FmuImporter, Importer};
pub use library::Library;
pub use registry::{VariableDescriptor, VariableRegistry};
pub use status::Fmi1Status;
pub use unit::{InstantiateOptions, ModelUnit, UnitState};

pub mod built_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to extract FMU archive {path:?}")]
    ExtractionFailed {
        path: std::path::PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to load shared library {path:?}")]
    LoadFailed {
        path: std::path::PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("No model description at {0:?}")]
    MissingModelDescription(std::path::PathBuf),

    #[error("FMU rejected instantiation of '{0}'")]
    InstantiationRejected(String),

    #[error("Initialization failed with status {0}")]
    InitializationFailed(Fmi1Status),

    #[error("Step from t={time} failed with status {status}")]
    StepFailed { time: f64, status: Fmi1Status },

    #[error("Operation '{operation}' is not permitted in state {state}")]
    InvalidState {
        operation: &'static str,
        state: UnitState,
    },

    #[error("Unknown variable: {0}")]
    VariableNotFound(String),

    #[error("Variable '{name}' is of type {expected}, got a {found} value")]
    TypeMismatch {
        name: String,
        expected: ScalarType,
        found: ScalarType,
    },

    #[error("Variable '{0}' has no supported scalar type")]
    UnsupportedType(String),

    #[error("Unsupported FMI version: {0}")]
    UnsupportedFmiVersion(String),

    #[error("Model type {0} not supported by this FMU")]
    UnsupportedFmuType(String),

    #[error("Unsupported platform {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("No model description is loaded")]
    NotLoaded,

    #[error("Step size must be positive, got {0}")]
    InvalidStepSize(f64),

    #[error("Invalid simulation interval [{start}, {end}]")]
    InvalidInterval { start: f64, end: f64 },

    #[error("Step ending at t={end} would move time backwards from {cursor}")]
    NonMonotonicStep { end: f64, cursor: f64 },

    #[error("Access to variable '{name}' returned status {status}")]
    VariableAccess { name: String, status: Fmi1Status },

    #[error("Value {value} for variable '{name}' does not fit a 32-bit integer")]
    IntegerOutOfRange { name: String, value: i64 },

    #[error("Cannot parse '{text}' as a {scalar_type} value")]
    InvalidValue {
        scalar_type: ScalarType,
        text: String,
    },

    #[error("Termination failed with status {0}")]
    TerminationFailed(Fmi1Status),

    #[error("Reset failed with status {0}")]
    ResetFailed(Fmi1Status),

    #[error("Status query failed with status {0}")]
    StatusQueryFailed(Fmi1Status),

    #[error("Setting debug logging failed with status {0}")]
    DebugLoggingFailed(Fmi1Status),

    #[error("FMI version of loaded API ({found}) doesn't match expected ({expected})")]
    VersionMismatch { found: String, expected: String },

    #[error("TypesPlatform of loaded API ({0}) doesn't match expected (standard32)")]
    TypesPlatformMismatch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Schema(#[from] fmi_schema::Error),

    #[error(transparent)]
    Nul(#[from] std::ffi::NulError),
}
