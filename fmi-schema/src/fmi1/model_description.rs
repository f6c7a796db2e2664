use std::str::FromStr;

use hard_xml::XmlRead;

use super::{Causality, ScalarVariable, ScalarVariableElement, Variability};
use crate::{
    traits::{DefaultExperiment, FmiModelDescription},
    variable_counts::{Counts, VariableCounts},
};

#[derive(Default, PartialEq, Debug, XmlRead)]
#[xml(tag = "fmiModelDescription")]
pub struct Fmi1ModelDescription {
    /// Version of FMI that was used to generate the XML file, "1.0" for every revision.
    #[xml(attr = "fmiVersion")]
    pub fmi_version: String,

    /// The name of the model as used in the modeling environment that generated the XML file.
    #[xml(attr = "modelName")]
    pub model_name: String,

    /// Short class name according to C syntax. Every exported C function of the FMU is prefixed
    /// with it, and the shared library carries it as file name.
    #[xml(attr = "modelIdentifier")]
    pub model_identifier: String,

    /// Fingerprint of the XML file content, passed back to the FMU on instantiation.
    #[xml(attr = "guid")]
    pub guid: String,

    #[xml(attr = "description")]
    pub description: Option<String>,

    #[xml(attr = "author")]
    pub author: Option<String>,

    /// Version of the model, e.g. "1.4.1"
    #[xml(attr = "version")]
    pub version: Option<String>,

    #[xml(attr = "generationTool")]
    pub generation_tool: Option<String>,

    #[xml(attr = "generationDateAndTime")]
    pub generation_date_and_time: Option<String>,

    #[xml(attr = "variableNamingConvention")]
    pub variable_naming_convention: Option<String>,

    #[xml(attr = "numberOfContinuousStates")]
    pub number_of_continuous_states: Option<u32>,

    #[xml(attr = "numberOfEventIndicators")]
    pub number_of_event_indicators: Option<u32>,

    #[xml(child = "DefaultExperiment")]
    pub default_experiment: Option<Fmi1DefaultExperiment>,

    #[xml(child = "ModelVariables")]
    pub model_variables: Option<ModelVariables>,

    /// Present only for Co-Simulation FMUs.
    #[xml(child = "Implementation")]
    pub implementation: Option<Implementation>,
}

#[derive(Default, PartialEq, Debug, XmlRead)]
#[xml(tag = "DefaultExperiment")]
pub struct Fmi1DefaultExperiment {
    #[xml(attr = "startTime")]
    pub start_time: Option<f64>,
    #[xml(attr = "stopTime")]
    pub stop_time: Option<f64>,
    #[xml(attr = "tolerance")]
    pub tolerance: Option<f64>,
}

impl DefaultExperiment for Fmi1DefaultExperiment {
    fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    fn stop_time(&self) -> Option<f64> {
        self.stop_time
    }

    fn tolerance(&self) -> Option<f64> {
        self.tolerance
    }
}

#[derive(Default, PartialEq, Debug, XmlRead)]
#[xml(tag = "ModelVariables")]
pub struct ModelVariables {
    #[xml(child = "ScalarVariable")]
    pub variables: Vec<ScalarVariable>,
}

#[derive(Default, PartialEq, Debug, XmlRead)]
#[xml(tag = "Implementation")]
pub struct Implementation {
    #[xml(child = "CoSimulation_StandAlone")]
    pub co_simulation_stand_alone: Option<CoSimulationStandAlone>,
    #[xml(child = "CoSimulation_Tool")]
    pub co_simulation_tool: Option<CoSimulationTool>,
}

/// The FMU ships its own solver in the shared library.
#[derive(Default, PartialEq, Debug, XmlRead)]
#[xml(tag = "CoSimulation_StandAlone")]
pub struct CoSimulationStandAlone {
    #[xml(child = "Capabilities")]
    pub capabilities: Option<Capabilities>,
}

/// The FMU wraps an external simulation tool.
#[derive(Default, PartialEq, Debug, XmlRead)]
#[xml(tag = "CoSimulation_Tool")]
pub struct CoSimulationTool {
    #[xml(child = "Capabilities")]
    pub capabilities: Option<Capabilities>,
}

#[derive(Clone, Default, PartialEq, Debug, XmlRead)]
#[xml(tag = "Capabilities")]
pub struct Capabilities {
    #[xml(attr = "canHandleVariableCommunicationStepSize")]
    pub can_handle_variable_communication_step_size: Option<bool>,
    #[xml(attr = "canHandleEvents")]
    pub can_handle_events: Option<bool>,
    #[xml(attr = "canRejectSteps")]
    pub can_reject_steps: Option<bool>,
    #[xml(attr = "canInterpolateInputs")]
    pub can_interpolate_inputs: Option<bool>,
    #[xml(attr = "maxOutputDerivativeOrder")]
    pub max_output_derivative_order: Option<u32>,
    #[xml(attr = "canRunAsynchronuously")]
    pub can_run_asynchronuously: Option<bool>,
    #[xml(attr = "canSignalEvents")]
    pub can_signal_events: Option<bool>,
    #[xml(attr = "canBeInstantiatedOnlyOncePerProcess")]
    pub can_be_instantiated_only_once_per_process: Option<bool>,
    #[xml(attr = "canNotUseMemoryManagementFunctions")]
    pub can_not_use_memory_management_functions: Option<bool>,
}

impl Fmi1ModelDescription {
    /// A model description without an `<Implementation>` element is a Model Exchange FMU.
    pub fn is_co_simulation(&self) -> bool {
        self.implementation.as_ref().is_some_and(|imp| {
            imp.co_simulation_stand_alone.is_some() || imp.co_simulation_tool.is_some()
        })
    }

    pub fn capabilities(&self) -> Option<&Capabilities> {
        let imp = self.implementation.as_ref()?;
        imp.co_simulation_stand_alone
            .as_ref()
            .and_then(|sa| sa.capabilities.as_ref())
            .or_else(|| {
                imp.co_simulation_tool
                    .as_ref()
                    .and_then(|tool| tool.capabilities.as_ref())
            })
    }

    /// All scalar variables in declaration order.
    pub fn model_variables(&self) -> &[ScalarVariable] {
        self.model_variables
            .as_ref()
            .map(|mv| mv.variables.as_slice())
            .unwrap_or_default()
    }

    /// Get a reference to the variable with the given name
    pub fn model_variable_by_name(&self, name: &str) -> Result<&ScalarVariable, crate::Error> {
        self.model_variables()
            .iter()
            .find(|var| var.name == name)
            .ok_or_else(|| crate::Error::VariableNotFound(name.to_owned()))
    }

    /// Variables with causality `output`
    pub fn outputs(&self) -> impl Iterator<Item = &ScalarVariable> {
        self.model_variables()
            .iter()
            .filter(|var| var.causality() == Causality::Output)
    }
}

impl FmiModelDescription for Fmi1ModelDescription {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn version_string(&self) -> &str {
        &self.fmi_version
    }
}

impl VariableCounts for Fmi1ModelDescription {
    fn model_counts(&self) -> Counts {
        self.model_variables()
            .iter()
            .fold(Counts::default(), |mut cts, sv| {
                match sv.variability() {
                    Variability::Constant => cts.num_constants += 1,
                    Variability::Parameter => cts.num_parameters += 1,
                    Variability::Discrete => cts.num_discrete += 1,
                    Variability::Continuous => cts.num_continuous += 1,
                }
                match sv.causality() {
                    Causality::Input => cts.num_inputs += 1,
                    Causality::Output => cts.num_outputs += 1,
                    Causality::Internal => cts.num_internal += 1,
                    Causality::None => cts.num_none += 1,
                }
                match sv.elem() {
                    Some(ScalarVariableElement::Real(_)) => cts.num_real_vars += 1,
                    Some(ScalarVariableElement::Integer(_)) => cts.num_integer_vars += 1,
                    Some(ScalarVariableElement::Enumeration(_)) => cts.num_enum_vars += 1,
                    Some(ScalarVariableElement::Boolean(_)) => cts.num_bool_vars += 1,
                    Some(ScalarVariableElement::String(_)) => cts.num_string_vars += 1,
                    None => {}
                }
                cts
            })
    }
}

impl FromStr for Fmi1ModelDescription {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as XmlRead<'_>>::from_str(s).map_err(crate::Error::from)
    }
}
