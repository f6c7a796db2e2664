//! Minimal FMI definitions for determining FMI version.

use std::str::FromStr;

use hard_xml::XmlRead;

use crate::traits::FmiModelDescription;

/// A minimal model description that only contains the FMI version and model name.
///
/// Unknown attributes and child elements are skipped, so any FMI version parses.
#[derive(Default, PartialEq, Debug, XmlRead)]
#[xml(tag = "fmiModelDescription")]
pub struct MinModelDescription {
    #[xml(attr = "fmiVersion")]
    pub fmi_version: String,
    #[xml(attr = "modelName")]
    pub model_name: String,
}

impl FmiModelDescription for MinModelDescription {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn version_string(&self) -> &str {
        &self.fmi_version
    }
}

impl FromStr for MinModelDescription {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as XmlRead<'_>>::from_str(s).map_err(crate::Error::from)
    }
}
