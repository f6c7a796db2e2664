use std::{fmt::Display, str::FromStr};

/// Defines how the variable is visible from the outside of the model.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub enum Causality {
    Input,
    Output,
    /// Not visible from the outside; may be inspected for debugging.
    #[default]
    Internal,
    /// Does not influence the model equations, e.g. an auxiliary counter.
    None,
}

impl FromStr for Causality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(Causality::Input),
            "output" => Ok(Causality::Output),
            "internal" => Ok(Causality::Internal),
            "none" => Ok(Causality::None),
            _ => Err(format!("Invalid Causality: {}", s)),
        }
    }
}

impl Display for Causality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Causality::Input => "input",
            Causality::Output => "output",
            Causality::Internal => "internal",
            Causality::None => "none",
        };
        write!(f, "{}", s)
    }
}

/// Time instants at which the variable may change its value.
///
/// The default is [`Variability::Continuous`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub enum Variability {
    /// The value never changes.
    Constant,
    /// The value does not change after initialization.
    Parameter,
    /// The value only changes at communication points.
    Discrete,
    #[default]
    Continuous,
}

impl FromStr for Variability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constant" => Ok(Variability::Constant),
            "parameter" => Ok(Variability::Parameter),
            "discrete" => Ok(Variability::Discrete),
            "continuous" => Ok(Variability::Continuous),
            _ => Err(format!("Invalid Variability: {}", s)),
        }
    }
}

impl Display for Variability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Variability::Constant => "constant",
            Variability::Parameter => "parameter",
            Variability::Discrete => "discrete",
            Variability::Continuous => "continuous",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub enum Alias {
    #[default]
    NoAlias,
    Alias,
    NegatedAlias,
}

impl FromStr for Alias {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "noAlias" => Ok(Alias::NoAlias),
            "alias" => Ok(Alias::Alias),
            "negatedAlias" => Ok(Alias::NegatedAlias),
            _ => Err(format!("Invalid Alias: {}", s)),
        }
    }
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead)]
#[xml(tag = "Real")]
pub struct Real {
    /// If present, name of type defined with TypeDefinitions / Type providing defaults.
    #[xml(attr = "declaredType")]
    pub declared_type: Option<String>,
    #[xml(attr = "unit")]
    pub unit: Option<String>,
    #[xml(attr = "start")]
    pub start: Option<f64>,
    /// If true, `start` is the initial value; otherwise it is a guess value.
    #[xml(attr = "fixed")]
    pub fixed: Option<bool>,
    #[xml(attr = "min")]
    pub min: Option<f64>,
    #[xml(attr = "max")]
    pub max: Option<f64>,
    #[xml(attr = "nominal")]
    pub nominal: Option<f64>,
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead)]
#[xml(tag = "Integer")]
pub struct Integer {
    #[xml(attr = "declaredType")]
    pub declared_type: Option<String>,
    #[xml(attr = "start")]
    pub start: Option<i32>,
    #[xml(attr = "fixed")]
    pub fixed: Option<bool>,
    #[xml(attr = "min")]
    pub min: Option<i32>,
    #[xml(attr = "max")]
    pub max: Option<i32>,
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead)]
#[xml(tag = "Boolean")]
pub struct Boolean {
    #[xml(attr = "declaredType")]
    pub declared_type: Option<String>,
    #[xml(attr = "start")]
    pub start: Option<bool>,
    #[xml(attr = "fixed")]
    pub fixed: Option<bool>,
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead)]
#[xml(tag = "String")]
pub struct StringType {
    #[xml(attr = "declaredType")]
    pub declared_type: Option<String>,
    #[xml(attr = "start")]
    pub start: Option<String>,
    #[xml(attr = "fixed")]
    pub fixed: Option<bool>,
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead)]
#[xml(tag = "Enumeration")]
pub struct Enumeration {
    /// Name of the enumeration type defined in TypeDefinitions.
    #[xml(attr = "declaredType")]
    pub declared_type: Option<String>,
    #[xml(attr = "start")]
    pub start: Option<i32>,
    #[xml(attr = "fixed")]
    pub fixed: Option<bool>,
    #[xml(attr = "min")]
    pub min: Option<i32>,
    #[xml(attr = "max")]
    pub max: Option<i32>,
}

/// The type element of a [`ScalarVariable`]; exactly one is present in a valid description.
#[derive(Clone, PartialEq, Debug)]
pub enum ScalarVariableElement<'a> {
    Real(&'a Real),
    Integer(&'a Integer),
    Boolean(&'a Boolean),
    String(&'a StringType),
    Enumeration(&'a Enumeration),
}

#[derive(Clone, Default, PartialEq, Debug, hard_xml::XmlRead)]
#[xml(tag = "ScalarVariable")]
pub struct ScalarVariable {
    /// The full, unique name of the variable.
    #[xml(attr = "name")]
    pub name: String,

    /// A handle of the variable to efficiently identify the variable value in the model
    /// interface. Aliased variables share the same value reference.
    #[xml(attr = "valueReference")]
    pub value_reference: u32,

    #[xml(attr = "description")]
    pub description: Option<String>,

    #[xml(attr = "variability")]
    pub variability: Option<Variability>,

    #[xml(attr = "causality")]
    pub causality: Option<Causality>,

    #[xml(attr = "alias")]
    pub alias: Option<Alias>,

    #[xml(child = "Real")]
    pub real: Option<Real>,
    #[xml(child = "Integer")]
    pub integer: Option<Integer>,
    #[xml(child = "Boolean")]
    pub boolean: Option<Boolean>,
    #[xml(child = "String")]
    pub string: Option<StringType>,
    #[xml(child = "Enumeration")]
    pub enumeration: Option<Enumeration>,
}

impl ScalarVariable {
    pub fn causality(&self) -> Causality {
        self.causality.unwrap_or_default()
    }

    pub fn variability(&self) -> Variability {
        self.variability.unwrap_or_default()
    }

    pub fn alias(&self) -> Alias {
        self.alias.unwrap_or_default()
    }

    /// The declared type element, or `None` if the variable carries no type child.
    pub fn elem(&self) -> Option<ScalarVariableElement<'_>> {
        if let Some(real) = &self.real {
            Some(ScalarVariableElement::Real(real))
        } else if let Some(integer) = &self.integer {
            Some(ScalarVariableElement::Integer(integer))
        } else if let Some(boolean) = &self.boolean {
            Some(ScalarVariableElement::Boolean(boolean))
        } else if let Some(string) = &self.string {
            Some(ScalarVariableElement::String(string))
        } else {
            self.enumeration
                .as_ref()
                .map(ScalarVariableElement::Enumeration)
        }
    }

    /// The `start` attribute of the type element rendered as text, if any.
    pub fn start_text(&self) -> Option<String> {
        match self.elem()? {
            ScalarVariableElement::Real(r) => r.start.map(|v| v.to_string()),
            ScalarVariableElement::Integer(i) => i.start.map(|v| v.to_string()),
            ScalarVariableElement::Boolean(b) => b.start.map(|v| v.to_string()),
            ScalarVariableElement::String(s) => s.start.clone(),
            ScalarVariableElement::Enumeration(e) => e.start.map(|v| v.to_string()),
        }
    }
}
