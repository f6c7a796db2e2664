//! In-memory stand-ins for a loaded FMU, used to exercise [`crate::ModelUnit`] and
//! [`crate::StepDriver`] without a shared library.
//!
//! The mock models a single integrator: every successful step adds `k * h` to `x` and increments
//! `n`. Statuses of every call can be scripted through [`MockBinding::state_mut`].

use std::{
    cell::{Ref, RefCell, RefMut},
    collections::HashMap,
    ffi::CStr,
    path::Path,
    ptr::NonNull,
    rc::Rc,
    sync::Arc,
};

use fmi_schema::fmi1::{Causality, Variability};

use crate::{
    binding::{Binding, Component, InstantiateParams, StatusKind, ValueReference},
    descriptor::{DefaultExperiment, ModelDescriptor, ScalarType, VariableEntry},
    Error, Fmi1Status, Importer,
};

/// Value reference of the integrated state `x`
pub const VR_X: ValueReference = 0;
/// Value reference of the rate `k`
pub const VR_K: ValueReference = 1;
/// Value reference of the step counter `n`
pub const VR_N: ValueReference = 0;

/// Scripted behaviour and recorded calls of a [`MockBinding`].
#[derive(Debug, Clone)]
pub struct MockState {
    pub version: String,
    pub types_platform: String,
    pub reject_instantiate: bool,
    pub init_status: Fmi1Status,
    pub terminate_status: Fmi1Status,
    pub reset_status: Fmi1Status,
    /// Returned by every getter and setter
    pub access_status: Fmi1Status,
    /// Status of the n-th `do_step` call, counted from 1. Unlisted steps return `OK`.
    pub step_failures: HashMap<usize, Fmi1Status>,
    pub last_successful_time: f64,

    pub reals: HashMap<ValueReference, f64>,
    pub integers: HashMap<ValueReference, i32>,
    pub booleans: HashMap<ValueReference, bool>,
    pub strings: HashMap<ValueReference, String>,

    /// `(instance_name, guid, fmu_location)` of the last instantiation
    pub instantiated_with: Option<(String, String, String)>,
    pub initialized_with: Option<(f64, Option<f64>)>,
    /// `(t, h)` of every `do_step` call, including failed ones
    pub steps: Vec<(f64, f64)>,
    pub debug_logging: Option<bool>,
    pub accessor_calls: usize,
    pub terminated: usize,
    pub resets: usize,
    pub freed: usize,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            version: "1.0".to_owned(),
            types_platform: "standard32".to_owned(),
            reject_instantiate: false,
            init_status: Fmi1Status::OK,
            terminate_status: Fmi1Status::OK,
            reset_status: Fmi1Status::OK,
            access_status: Fmi1Status::OK,
            step_failures: HashMap::new(),
            last_successful_time: 0.0,
            reals: HashMap::new(),
            integers: HashMap::new(),
            booleans: HashMap::new(),
            strings: HashMap::new(),
            instantiated_with: None,
            initialized_with: None,
            steps: Vec::new(),
            debug_logging: None,
            accessor_calls: 0,
            terminated: 0,
            resets: 0,
            freed: 0,
        }
    }
}

/// A [`Binding`] backed by [`MockState`]. Clones share the same state, so a test can keep one
/// handle while the unit owns another.
#[derive(Debug, Clone, Default)]
pub struct MockBinding(Rc<RefCell<MockState>>);

impl MockBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `step`-th call to `do_step` return `status`.
    #[must_use]
    pub fn fail_step(self, step: usize, status: Fmi1Status) -> Self {
        self.state_mut().step_failures.insert(step, status);
        self
    }

    /// The handle handed out by `instantiate_slave`. Never dereferenced.
    pub fn component(&self) -> Component {
        Component::new(NonNull::dangling())
    }

    pub fn state(&self) -> Ref<'_, MockState> {
        self.0.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, MockState> {
        self.0.borrow_mut()
    }

    fn access(&self) -> RefMut<'_, MockState> {
        let mut state = self.state_mut();
        state.accessor_calls += 1;
        state
    }
}

impl Binding for MockBinding {
    fn get_version(&self) -> String {
        self.state().version.clone()
    }

    fn get_types_platform(&self) -> String {
        self.state().types_platform.clone()
    }

    fn instantiate_slave(&self, params: &InstantiateParams<'_>) -> Option<Component> {
        let mut state = self.state_mut();
        if state.reject_instantiate {
            return None;
        }
        state.instantiated_with = Some((
            params.instance_name.to_string_lossy().into_owned(),
            params.guid.to_string_lossy().into_owned(),
            params.fmu_location.to_string_lossy().into_owned(),
        ));
        Some(self.component())
    }

    fn set_debug_logging(&self, _component: Component, logging_on: bool) -> Fmi1Status {
        self.state_mut().debug_logging = Some(logging_on);
        Fmi1Status::OK
    }

    fn initialize_slave(
        &self,
        _component: Component,
        t_start: f64,
        stop_time: Option<f64>,
    ) -> Fmi1Status {
        let mut state = self.state_mut();
        state.initialized_with = Some((t_start, stop_time));
        state.init_status
    }

    fn do_step(
        &self,
        _component: Component,
        current_communication_point: f64,
        communication_step_size: f64,
        _new_step: bool,
    ) -> Fmi1Status {
        let mut state = self.state_mut();
        state
            .steps
            .push((current_communication_point, communication_step_size));
        let status = state
            .step_failures
            .get(&state.steps.len())
            .copied()
            .unwrap_or(Fmi1Status::OK);

        if !status.is_failure() {
            let k = state.reals.get(&VR_K).copied().unwrap_or(1.0);
            *state.reals.entry(VR_X).or_default() += k * communication_step_size;
            *state.integers.entry(VR_N).or_default() += 1;
            state.last_successful_time = current_communication_point + communication_step_size;
        }
        status
    }

    fn terminate_slave(&self, _component: Component) -> Fmi1Status {
        let mut state = self.state_mut();
        state.terminated += 1;
        state.terminate_status
    }

    fn reset_slave(&self, _component: Component) -> Fmi1Status {
        let mut state = self.state_mut();
        state.resets += 1;
        state.reset_status
    }

    fn free_slave_instance(&self, _component: Component) {
        self.state_mut().freed += 1;
    }

    fn get_real(
        &self,
        _component: Component,
        vrs: &[ValueReference],
        values: &mut [f64],
    ) -> Fmi1Status {
        let state = self.access();
        for (vr, value) in vrs.iter().zip(values.iter_mut()) {
            *value = state.reals.get(vr).copied().unwrap_or_default();
        }
        state.access_status
    }

    fn get_integer(
        &self,
        _component: Component,
        vrs: &[ValueReference],
        values: &mut [i32],
    ) -> Fmi1Status {
        let state = self.access();
        for (vr, value) in vrs.iter().zip(values.iter_mut()) {
            *value = state.integers.get(vr).copied().unwrap_or_default();
        }
        state.access_status
    }

    fn get_boolean(
        &self,
        _component: Component,
        vrs: &[ValueReference],
        values: &mut [bool],
    ) -> Fmi1Status {
        let state = self.access();
        for (vr, value) in vrs.iter().zip(values.iter_mut()) {
            *value = state.booleans.get(vr).copied().unwrap_or_default();
        }
        state.access_status
    }

    fn get_string(
        &self,
        _component: Component,
        vrs: &[ValueReference],
        values: &mut [String],
    ) -> Fmi1Status {
        let state = self.access();
        for (vr, value) in vrs.iter().zip(values.iter_mut()) {
            *value = state.strings.get(vr).cloned().unwrap_or_default();
        }
        state.access_status
    }

    fn set_real(
        &self,
        _component: Component,
        vrs: &[ValueReference],
        values: &[f64],
    ) -> Fmi1Status {
        let mut state = self.access();
        let status = state.access_status;
        if !status.is_failure() {
            state.reals.extend(vrs.iter().copied().zip(values.iter().copied()));
        }
        status
    }

    fn set_integer(
        &self,
        _component: Component,
        vrs: &[ValueReference],
        values: &[i32],
    ) -> Fmi1Status {
        let mut state = self.access();
        let status = state.access_status;
        if !status.is_failure() {
            state
                .integers
                .extend(vrs.iter().copied().zip(values.iter().copied()));
        }
        status
    }

    fn set_boolean(
        &self,
        _component: Component,
        vrs: &[ValueReference],
        values: &[bool],
    ) -> Fmi1Status {
        let mut state = self.access();
        let status = state.access_status;
        if !status.is_failure() {
            state
                .booleans
                .extend(vrs.iter().copied().zip(values.iter().copied()));
        }
        status
    }

    fn set_string(
        &self,
        _component: Component,
        vrs: &[ValueReference],
        values: &[&CStr],
    ) -> Fmi1Status {
        let mut state = self.access();
        let status = state.access_status;
        if !status.is_failure() {
            let values = values.iter().map(|s| s.to_string_lossy().into_owned());
            state.strings.extend(vrs.iter().copied().zip(values));
        }
        status
    }

    fn get_real_status(
        &self,
        _component: Component,
        kind: StatusKind,
        value: &mut f64,
    ) -> Fmi1Status {
        match kind {
            StatusKind::LastSuccessfulTime => {
                *value = self.state().last_successful_time;
                Fmi1Status::OK
            }
            _ => Fmi1Status::Discard,
        }
    }
}

/// Descriptor of the integrator model simulated by [`MockBinding`].
pub fn descriptor() -> ModelDescriptor {
    let parameter = |entry: VariableEntry| VariableEntry {
        variability: Variability::Parameter,
        ..entry
    };
    let variables: Arc<[VariableEntry]> = vec![
        VariableEntry::new("x", VR_X, ScalarType::Real).with_causality(Causality::Output),
        parameter(VariableEntry::new("k", VR_K, ScalarType::Real).with_causality(Causality::Input)),
        VariableEntry::new("n", VR_N, ScalarType::Integer).with_causality(Causality::Output),
        VariableEntry::new("mode", 1, ScalarType::Enumeration),
        VariableEntry::new("active", 0, ScalarType::Boolean),
        VariableEntry::new("label", 0, ScalarType::String),
    ]
    .into();

    ModelDescriptor {
        fmi_version: "1.0".to_owned(),
        model_name: "integrator".to_owned(),
        model_identifier: "integrator".to_owned(),
        guid: "{8c4e810f-3df3-4a00-8276-176fa3c9f000}".to_owned(),
        default_experiment: Some(DefaultExperiment {
            start_time: Some(0.0),
            stop_time: Some(10.0),
            tolerance: None,
        }),
        variables,
    }
}

/// An [`Importer`] that hands out a fixed descriptor and a [`MockBinding`].
///
/// `extract` creates a real, empty temporary directory so that working directory cleanup can be
/// observed.
#[derive(Debug, Clone)]
pub struct MockImporter {
    descriptor: ModelDescriptor,
    binding: MockBinding,
    fail_extract: bool,
    fail_load: bool,
}

impl MockImporter {
    pub fn new(descriptor: ModelDescriptor, binding: MockBinding) -> Self {
        Self {
            descriptor,
            binding,
            fail_extract: false,
            fail_load: false,
        }
    }

    #[must_use]
    pub fn failing_extract(mut self) -> Self {
        self.fail_extract = true;
        self
    }

    #[must_use]
    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }
}

impl Importer for MockImporter {
    type Binding = MockBinding;

    fn extract(&self, archive: &Path) -> Result<tempfile::TempDir, Error> {
        if self.fail_extract {
            return Err(Error::ExtractionFailed {
                path: archive.to_owned(),
                source: zip::result::ZipError::FileNotFound,
            });
        }
        Ok(tempfile::Builder::new().prefix("fmi-cosim-mock").tempdir()?)
    }

    fn parse(&self, _dir: &Path) -> Result<ModelDescriptor, Error> {
        Ok(self.descriptor.clone())
    }

    fn load(&self, dir: &Path, model_identifier: &str) -> Result<MockBinding, Error> {
        if self.fail_load {
            return Err(Error::LoadFailed {
                path: dir.join(model_identifier),
                source: libloading::Error::DlOpenUnknown,
            });
        }
        Ok(self.binding.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrates() {
        let mock = MockBinding::new().fail_step(2, Fmi1Status::Discard);
        let c = mock.component();
        mock.set_real(c, &[VR_K], &[2.0]);

        assert_eq!(mock.do_step(c, 0.0, 0.5, true), Fmi1Status::OK);
        assert_eq!(mock.do_step(c, 0.5, 0.5, true), Fmi1Status::Discard);

        let mut x = [0.0];
        mock.get_real(c, &[VR_X], &mut x);
        assert_eq!(x, [1.0]);
        assert_eq!(mock.state().last_successful_time, 0.5);
        assert_eq!(mock.state().steps, vec![(0.0, 0.5), (0.5, 0.5)]);
        assert_eq!(mock.state().accessor_calls, 2);
    }
}
