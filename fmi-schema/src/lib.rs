#![doc=include_str!( "../README.md")]
#![deny(unsafe_code)]
#![deny(clippy::all)]

use std::fmt::Display;

use thiserror::Error;

pub mod fmi1;
pub mod minimal;
pub mod traits;
pub mod variable_counts;

/// The major version of the FMI standard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MajorVersion {
    FMI1,
    FMI2,
    FMI3,
}

impl Display for MajorVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MajorVersion::FMI1 => write!(f, "1.0"),
            MajorVersion::FMI2 => write!(f, "2.0"),
            MajorVersion::FMI3 => write!(f, "3.0"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Variable {0} not found")]
    VariableNotFound(String),

    #[error(transparent)]
    Semver(#[from] lenient_semver::parser::OwnedError),

    #[error("Unknown FMI major version {0}")]
    UnknownMajorVersion(u64),

    #[error("Error parsing XML: {0}")]
    XmlParse(String),

    #[error("Error in model: {0}")]
    Model(String),
}

impl From<hard_xml::XmlError> for Error {
    fn from(err: hard_xml::XmlError) -> Self {
        Error::XmlParse(err.to_string())
    }
}
