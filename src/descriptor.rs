//! The read-only view of a model description that the driver works against.

use std::{fmt::Display, sync::Arc};

use fmi_schema::{
    fmi1::{Causality, Fmi1ModelDescription, ScalarVariable, ScalarVariableElement, Variability},
    traits::DefaultExperiment as _,
};

use crate::Error;

/// The scalar type declared for a variable in the model description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Real,
    Integer,
    Boolean,
    String,
    Enumeration,
}

impl ScalarType {
    /// Tag letter used for value references in log messages, e.g. `#r12#`.
    ///
    /// Enumerations share the integer tag because they share the integer accessors.
    pub fn tag(self) -> char {
        match self {
            ScalarType::Real => 'r',
            ScalarType::Integer | ScalarType::Enumeration => 'i',
            ScalarType::Boolean => 'b',
            ScalarType::String => 's',
        }
    }
}

impl Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScalarType::Real => "Real",
            ScalarType::Integer => "Integer",
            ScalarType::Boolean => "Boolean",
            ScalarType::String => "String",
            ScalarType::Enumeration => "Enumeration",
        };
        write!(f, "{s}")
    }
}

impl From<ScalarVariableElement<'_>> for ScalarType {
    fn from(elem: ScalarVariableElement<'_>) -> Self {
        match elem {
            ScalarVariableElement::Real(_) => ScalarType::Real,
            ScalarVariableElement::Integer(_) => ScalarType::Integer,
            ScalarVariableElement::Boolean(_) => ScalarType::Boolean,
            ScalarVariableElement::String(_) => ScalarType::String,
            ScalarVariableElement::Enumeration(_) => ScalarType::Enumeration,
        }
    }
}

/// A scalar value exchanged with the FMU. The tag is the type; there is no separate type field
/// to keep in sync.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Real(f64),
    /// Also carries enumeration values.
    Integer(i64),
    Boolean(bool),
    String(String),
}

impl ScalarValue {
    /// The type this value naturally belongs to. Integer values report [`ScalarType::Integer`].
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            ScalarValue::Real(_) => ScalarType::Real,
            ScalarValue::Integer(_) => ScalarType::Integer,
            ScalarValue::Boolean(_) => ScalarType::Boolean,
            ScalarValue::String(_) => ScalarType::String,
        }
    }

    /// Parse a textual value, e.g. from the command line or a `start` attribute.
    ///
    /// Booleans accept `true`/`false`/`1`/`0`; surrounding double quotes are stripped from
    /// strings.
    pub fn parse(scalar_type: ScalarType, text: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidValue {
            scalar_type,
            text: text.to_owned(),
        };
        let trimmed = text.trim();
        match scalar_type {
            ScalarType::Real => trimmed
                .parse()
                .map(ScalarValue::Real)
                .map_err(|_| invalid()),
            ScalarType::Integer | ScalarType::Enumeration => trimmed
                .parse()
                .map(ScalarValue::Integer)
                .map_err(|_| invalid()),
            ScalarType::Boolean => match trimmed {
                "true" | "1" => Ok(ScalarValue::Boolean(true)),
                "false" | "0" => Ok(ScalarValue::Boolean(false)),
                _ => Err(invalid()),
            },
            ScalarType::String => {
                let unquoted = text
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
                    .unwrap_or(text);
                Ok(ScalarValue::String(unquoted.to_owned()))
            }
        }
    }
}

impl Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::Real(v) => write!(f, "{v}"),
            ScalarValue::Integer(v) => write!(f, "{v}"),
            ScalarValue::Boolean(v) => write!(f, "{v}"),
            ScalarValue::String(v) => write!(f, "{v}"),
        }
    }
}

/// One scalar variable of the model.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableEntry {
    pub name: String,
    pub value_reference: u32,
    /// `None` when the description carries no type element for the variable.
    pub scalar_type: Option<ScalarType>,
    pub causality: Causality,
    pub variability: Variability,
    pub description: Option<String>,
}

impl VariableEntry {
    pub fn new(name: impl Into<String>, value_reference: u32, scalar_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            value_reference,
            scalar_type: Some(scalar_type),
            causality: Causality::default(),
            variability: Variability::default(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_causality(mut self, causality: Causality) -> Self {
        self.causality = causality;
        self
    }
}

impl From<&ScalarVariable> for VariableEntry {
    fn from(sv: &ScalarVariable) -> Self {
        Self {
            name: sv.name.clone(),
            value_reference: sv.value_reference,
            scalar_type: sv.elem().map(ScalarType::from),
            causality: sv.causality(),
            variability: sv.variability(),
            description: sv.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DefaultExperiment {
    pub start_time: Option<f64>,
    pub stop_time: Option<f64>,
    pub tolerance: Option<f64>,
}

/// Model metadata and variable list, immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    pub fmi_version: String,
    pub model_name: String,
    pub model_identifier: String,
    pub guid: String,
    pub default_experiment: Option<DefaultExperiment>,
    /// Variables in declaration order. Shared read-only with the logger callback.
    pub variables: Arc<[VariableEntry]>,
}

impl ModelDescriptor {
    /// Variables with causality `output`
    pub fn outputs(&self) -> impl Iterator<Item = &VariableEntry> {
        self.variables
            .iter()
            .filter(|var| var.causality == Causality::Output)
    }
}

impl From<&Fmi1ModelDescription> for ModelDescriptor {
    fn from(md: &Fmi1ModelDescription) -> Self {
        Self {
            fmi_version: md.fmi_version.clone(),
            model_name: md.model_name.clone(),
            model_identifier: md.model_identifier.clone(),
            guid: md.guid.clone(),
            default_experiment: md.default_experiment.as_ref().map(|de| DefaultExperiment {
                start_time: de.start_time(),
                stop_time: de.stop_time(),
                tolerance: de.tolerance(),
            }),
            variables: md.model_variables().iter().map(VariableEntry::from).collect(),
        }
    }
}
