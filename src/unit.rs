//! Lifecycle of a single FMU instance.

use std::{ffi::CString, fmt::Display, path::Path};

use crate::{
    binding::{check_consistency, Binding, Component, InstantiateParams, StatusKind},
    descriptor::{ModelDescriptor, ScalarValue},
    diagnostics::{self, Formatted},
    import::{FmuImporter, Importer},
    library::Library,
    logger::Route,
    registry::VariableRegistry,
    Error, Fmi1Status,
};

/// Lifecycle state of a [`ModelUnit`].
///
/// ```text
/// Unloaded -build-> Loaded -instantiate-> Instantiated -initialize-> Initialized -step-> Stepping
///                                               ^                         |                 |
///                                               +--------- reset ---------+--- terminate ---+--> Terminated
/// ```
///
/// `unload` returns to `Unloaded` from every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitState {
    Unloaded,
    Loaded,
    Instantiated,
    Initialized,
    Stepping,
    Terminated,
}

impl Display for UnitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Arguments passed to `fmiInstantiateSlave`.
#[derive(Debug, Clone, PartialEq)]
pub struct InstantiateOptions {
    /// Wait period in milliseconds for tool coupling, 0 for unlimited. Advisory only.
    pub timeout: f64,
    /// Show the simulator user interface
    pub visible: bool,
    /// Run the simulation with user interaction
    pub interactive: bool,
    pub logging_on: bool,
    /// Denotes the tool in case of tool coupling
    pub mime_type: String,
}

impl Default for InstantiateOptions {
    fn default() -> Self {
        Self {
            timeout: 1000.0,
            visible: false,
            interactive: false,
            logging_on: true,
            mime_type: "application/x-fmu-sharedlibrary".to_owned(),
        }
    }
}

/// Exclusive owner of one loaded FMU: its working directory, shared library and instance.
///
/// Every resource is released by [`ModelUnit::unload`], which also runs on drop.
pub struct ModelUnit<B: Binding = Library> {
    name: String,
    state: UnitState,
    working_dir: Option<tempfile::TempDir>,
    descriptor: Option<ModelDescriptor>,
    binding: Option<B>,
    instance: Option<Component>,
    route: Option<Route>,
    registry: VariableRegistry,
    time: f64,
}

impl<B: Binding> std::fmt::Debug for ModelUnit<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelUnit")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("working_dir", &self.working_directory())
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}

impl ModelUnit<Library> {
    /// Create a unit named `instance_name` and build it from the FMU at `path`.
    pub fn open(path: impl AsRef<Path>, instance_name: impl Into<String>) -> Result<Self, Error> {
        let mut unit = Self::new(instance_name);
        unit.build(path, &FmuImporter::new())?;
        Ok(unit)
    }
}

impl<B: Binding> ModelUnit<B> {
    pub fn new(instance_name: impl Into<String>) -> Self {
        Self {
            name: instance_name.into(),
            state: UnitState::Unloaded,
            working_dir: None,
            descriptor: None,
            binding: None,
            instance: None,
            route: None,
            registry: VariableRegistry::new(),
            time: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    /// Current simulation time
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn descriptor(&self) -> Option<&ModelDescriptor> {
        self.descriptor.as_ref()
    }

    /// The extracted FMU contents, present from `build` until `unload`
    pub fn working_directory(&self) -> Option<&Path> {
        self.working_dir.as_ref().map(|dir| dir.path())
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    fn expect_state(&self, operation: &'static str, allowed: &[UnitState]) -> Result<(), Error> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn instance(&self) -> Result<(&B, Component), Error> {
        match (&self.binding, self.instance) {
            (Some(binding), Some(component)) => Ok((binding, component)),
            _ => Err(Error::NotLoaded),
        }
    }

    /// Extract the archive at `path`, parse its description and load its library.
    ///
    /// On failure nothing is kept: the unit stays `Unloaded` and the extracted directory is
    /// removed.
    pub fn build<I>(&mut self, path: impl AsRef<Path>, importer: &I) -> Result<(), Error>
    where
        I: Importer<Binding = B>,
    {
        self.expect_state("build", &[UnitState::Unloaded])?;

        let dir = importer.extract(path.as_ref())?;
        let descriptor = importer.parse(dir.path())?;
        let binding = importer.load(dir.path(), &descriptor.model_identifier)?;

        log::debug!(
            "Loaded '{}' ({} variables) into {:?}",
            descriptor.model_identifier,
            descriptor.variables.len(),
            dir.path()
        );
        self.registry.attach(descriptor.variables.clone());
        self.working_dir = Some(dir);
        self.descriptor = Some(descriptor);
        self.binding = Some(binding);
        self.state = UnitState::Loaded;
        Ok(())
    }

    /// Instantiate with [`InstantiateOptions::default`].
    pub fn instantiate(&mut self) -> Result<(), Error> {
        self.instantiate_with(&InstantiateOptions::default())
    }

    pub fn instantiate_with(&mut self, options: &InstantiateOptions) -> Result<(), Error> {
        self.expect_state("instantiate", &[UnitState::Loaded])?;
        let (Some(binding), Some(descriptor), Some(dir)) =
            (&self.binding, &self.descriptor, &self.working_dir)
        else {
            return Err(Error::NotLoaded);
        };

        let location = fmu_location(dir.path());
        let instance_name = CString::new(self.name.as_str())?;
        let guid = CString::new(descriptor.guid.as_str())?;
        let fmu_location = CString::new(location)?;
        let mime_type = CString::new(options.mime_type.as_str())?;

        // The unit may log during instantiation already
        let route = Route::register(&self.name, descriptor.variables.clone());
        let component = binding
            .instantiate_slave(&InstantiateParams {
                instance_name: &instance_name,
                guid: &guid,
                fmu_location: &fmu_location,
                mime_type: &mime_type,
                timeout: options.timeout,
                visible: options.visible,
                interactive: options.interactive,
                logging_on: options.logging_on,
            })
            .ok_or_else(|| Error::InstantiationRejected(self.name.clone()))?;

        if let Err(err) = check_consistency(binding, descriptor) {
            log::warn!("{err}");
        }

        log::debug!("Instantiated '{}'", self.name);
        self.instance = Some(component);
        self.route = Some(route);
        self.state = UnitState::Instantiated;
        Ok(())
    }

    /// Compare the FMI version and types platform reported by the library with the description.
    pub fn check_consistency(&self) -> Result<(), Error> {
        match (&self.binding, &self.descriptor) {
            (Some(binding), Some(descriptor)) => check_consistency(binding, descriptor),
            _ => Err(Error::NotLoaded),
        }
    }

    pub fn set_debug_logging(&mut self, logging_on: bool) -> Result<Fmi1Status, Error> {
        self.expect_state(
            "set_debug_logging",
            &[
                UnitState::Instantiated,
                UnitState::Initialized,
                UnitState::Stepping,
                UnitState::Terminated,
            ],
        )?;
        let (binding, component) = self.instance()?;
        binding
            .set_debug_logging(component, logging_on)
            .ok()
            .map_err(Error::DebugLoggingFailed)
    }

    /// Initialize the slave for the interval `[t_start, t_stop]`.
    pub fn initialize(&mut self, t_start: f64, t_stop: f64) -> Result<Fmi1Status, Error> {
        self.expect_state("initialize", &[UnitState::Instantiated])?;
        if !(t_stop > t_start) {
            return Err(Error::InvalidInterval {
                start: t_start,
                end: t_stop,
            });
        }

        let (binding, component) = self.instance()?;
        let status = binding.initialize_slave(component, t_start, Some(t_stop));
        if status.is_failure() {
            return Err(Error::InitializationFailed(status));
        }
        if status == Fmi1Status::Warning {
            log::warn!("Initialization of '{}' returned {status}", self.name);
        }

        log::debug!("Initialized '{}' at t={t_start}", self.name);
        self.time = t_start;
        self.state = UnitState::Initialized;
        Ok(status)
    }

    /// Advance the slave from `t` by `h`.
    ///
    /// On success the time cursor moves to `t + h`; on failure it is left unchanged.
    pub fn step(&mut self, t: f64, h: f64) -> Result<Fmi1Status, Error> {
        self.expect_state("step", &[UnitState::Initialized, UnitState::Stepping])?;
        if !(h > 0.0) {
            return Err(Error::InvalidStepSize(h));
        }
        let end = t + h;
        if end < self.time {
            return Err(Error::NonMonotonicStep {
                end,
                cursor: self.time,
            });
        }

        let (binding, component) = self.instance()?;
        let status = binding.do_step(component, t, h, true);
        if status.is_failure() {
            return Err(Error::StepFailed { time: t, status });
        }
        if status == Fmi1Status::Warning {
            log::warn!("Step from t={t} of '{}' returned {status}", self.name);
        }

        self.time = end;
        self.state = UnitState::Stepping;
        Ok(status)
    }

    /// Read a named scalar.
    pub fn get(&mut self, name: &str) -> Result<ScalarValue, Error> {
        self.expect_state(
            "get",
            &[
                UnitState::Instantiated,
                UnitState::Initialized,
                UnitState::Stepping,
            ],
        )?;
        let binding = self.binding.as_ref().ok_or(Error::NotLoaded)?;
        let component = self.instance.ok_or(Error::NotLoaded)?;
        self.registry.get(binding, component, name)
    }

    /// Write a named scalar. The value's variant must match the declared type.
    pub fn set(&mut self, name: &str, value: ScalarValue) -> Result<Fmi1Status, Error> {
        self.expect_state(
            "set",
            &[
                UnitState::Instantiated,
                UnitState::Initialized,
                UnitState::Stepping,
            ],
        )?;
        let binding = self.binding.as_ref().ok_or(Error::NotLoaded)?;
        let component = self.instance.ok_or(Error::NotLoaded)?;
        self.registry.set(binding, component, name, &value)
    }

    /// End time of the last successfully completed step, useful after a `Discard`.
    pub fn last_successful_time(&self) -> Result<f64, Error> {
        self.expect_state(
            "last_successful_time",
            &[UnitState::Initialized, UnitState::Stepping],
        )?;
        let (binding, component) = self.instance()?;
        let mut time = 0.0;
        binding
            .get_real_status(component, StatusKind::LastSuccessfulTime, &mut time)
            .ok()
            .map_err(Error::StatusQueryFailed)?;
        Ok(time)
    }

    /// Terminate the simulation run. The unit moves to `Terminated` even if the slave reports a
    /// failure.
    pub fn terminate(&mut self) -> Result<Fmi1Status, Error> {
        self.expect_state("terminate", &[UnitState::Initialized, UnitState::Stepping])?;
        let (binding, component) = self.instance()?;
        let status = binding.terminate_slave(component);
        self.state = UnitState::Terminated;
        log::debug!("Terminated '{}' at t={}", self.name, self.time);
        status.ok().map_err(Error::TerminationFailed)
    }

    /// Reset the slave to the state right after instantiation, keeping resolved variables.
    pub fn reset(&mut self) -> Result<Fmi1Status, Error> {
        self.expect_state(
            "reset",
            &[
                UnitState::Initialized,
                UnitState::Stepping,
                UnitState::Terminated,
            ],
        )?;
        let (binding, component) = self.instance()?;
        let status = binding
            .reset_slave(component)
            .ok()
            .map_err(Error::ResetFailed)?;

        log::debug!("Reset '{}'", self.name);
        self.time = 0.0;
        self.state = UnitState::Instantiated;
        Ok(status)
    }

    /// Expand value references in `message` against this unit's variables.
    pub fn format_diagnostic(&self, message: &str) -> Formatted {
        let variables = self.registry.variables().map(|v| &v[..]).unwrap_or_default();
        diagnostics::format(message, variables)
    }

    /// Release the instance, the library and the working directory, in that order.
    ///
    /// Failures of the native calls are logged and do not stop the release. Calling this on an
    /// `Unloaded` unit does nothing.
    pub fn unload(&mut self) -> Result<(), Error> {
        if self.state == UnitState::Unloaded {
            return Ok(());
        }

        if let (Some(binding), Some(component)) = (&self.binding, self.instance.take()) {
            if matches!(self.state, UnitState::Initialized | UnitState::Stepping) {
                let status = binding.terminate_slave(component);
                if status.is_failure() {
                    log::warn!("Terminating '{}' during unload returned {status}", self.name);
                }
            }
            binding.free_slave_instance(component);
        }

        self.route = None;
        self.binding = None;
        self.registry.detach();
        self.descriptor = None;
        self.time = 0.0;
        self.state = UnitState::Unloaded;

        let removed = match self.working_dir.take() {
            Some(dir) => {
                let path = dir.path().to_owned();
                dir.close().map_err(|err| {
                    log::warn!("Failed to remove working directory {path:?}: {err}");
                    Error::Io(err)
                })
            }
            None => Ok(()),
        };
        log::debug!("Unloaded '{}'", self.name);
        removed
    }
}

/// `file://` URL of the extracted FMU, or an empty location if `dir` has no URL form.
fn fmu_location(dir: &Path) -> String {
    match url::Url::from_directory_path(dir) {
        Ok(url) => url.into(),
        Err(()) => {
            log::warn!("Cannot express {dir:?} as a URL, passing an empty fmuLocation");
            String::new()
        }
    }
}

impl<B: Binding> Drop for ModelUnit<B> {
    fn drop(&mut self) {
        // Errors are already logged by unload
        let _ = self.unload();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        descriptor::ScalarType,
        mock::{self, MockBinding, MockImporter},
    };

    fn built(binding: &MockBinding) -> ModelUnit<MockBinding> {
        let mut unit = ModelUnit::new("unit");
        unit.build("model.fmu", &MockImporter::new(mock::descriptor(), binding.clone()))
            .unwrap();
        unit
    }

    #[test]
    fn test_lifecycle() {
        let binding = MockBinding::new();
        let mut unit = built(&binding);
        assert_eq!(unit.state(), UnitState::Loaded);
        assert!(unit.working_directory().unwrap().exists());

        unit.instantiate().unwrap();
        assert_eq!(unit.state(), UnitState::Instantiated);
        {
            let state = binding.state();
            let (name, guid, location) = state.instantiated_with.clone().unwrap();
            assert_eq!(name, "unit");
            assert_eq!(guid, mock::descriptor().guid);
            assert!(location.starts_with("file://"));
        }

        unit.initialize(0.0, 1.0).unwrap();
        assert_eq!(unit.state(), UnitState::Initialized);
        assert_eq!(binding.state().initialized_with, Some((0.0, Some(1.0))));

        unit.step(0.0, 0.5).unwrap();
        assert_eq!(unit.state(), UnitState::Stepping);
        assert_eq!(unit.time(), 0.5);

        unit.terminate().unwrap();
        assert_eq!(unit.state(), UnitState::Terminated);

        unit.unload().unwrap();
        assert_eq!(unit.state(), UnitState::Unloaded);
        assert_eq!(binding.state().terminated, 1);
        assert_eq!(binding.state().freed, 1);
    }

    #[test]
    fn test_step_before_initialize() {
        let binding = MockBinding::new();
        let mut unit = built(&binding);

        assert!(matches!(
            unit.step(0.0, 0.1),
            Err(Error::InvalidState {
                operation: "step",
                state: UnitState::Loaded
            })
        ));
        assert_eq!(unit.time(), 0.0);
        assert!(binding.state().steps.is_empty());
    }

    #[test]
    fn test_get_set_need_instance() {
        let binding = MockBinding::new();
        let mut unit = ModelUnit::<MockBinding>::new("unit");
        assert!(matches!(
            unit.get("x"),
            Err(Error::InvalidState {
                state: UnitState::Unloaded,
                ..
            })
        ));

        let mut unit = built(&binding);
        assert!(matches!(
            unit.set("x", ScalarValue::Real(1.0)),
            Err(Error::InvalidState {
                state: UnitState::Loaded,
                ..
            })
        ));
        assert_eq!(binding.state().accessor_calls, 0);
        assert_eq!(unit.registry().scan_count(), 0);
    }

    #[test]
    fn test_rejected_instantiation() {
        let binding = MockBinding::new();
        binding.state_mut().reject_instantiate = true;
        let mut unit = built(&binding);

        assert!(matches!(
            unit.instantiate(),
            Err(Error::InstantiationRejected(name)) if name == "unit"
        ));
        assert_eq!(unit.state(), UnitState::Loaded);
    }

    #[test]
    fn test_initialization_failure() {
        let binding = MockBinding::new();
        binding.state_mut().init_status = Fmi1Status::Error;
        let mut unit = built(&binding);
        unit.instantiate().unwrap();

        assert!(matches!(
            unit.initialize(0.0, 1.0),
            Err(Error::InitializationFailed(Fmi1Status::Error))
        ));
        assert_eq!(unit.state(), UnitState::Instantiated);

        binding.state_mut().init_status = Fmi1Status::Warning;
        assert_eq!(unit.initialize(0.0, 1.0).unwrap(), Fmi1Status::Warning);
        assert_eq!(unit.state(), UnitState::Initialized);
    }

    #[test]
    fn test_step_validation() {
        let binding = MockBinding::new();
        let mut unit = built(&binding);
        unit.instantiate().unwrap();
        assert!(matches!(
            unit.initialize(1.0, 1.0),
            Err(Error::InvalidInterval { .. })
        ));
        unit.initialize(0.0, 1.0).unwrap();

        assert!(matches!(unit.step(0.0, 0.0), Err(Error::InvalidStepSize(_))));
        assert!(matches!(unit.step(0.0, -0.1), Err(Error::InvalidStepSize(_))));

        unit.step(0.0, 0.5).unwrap();
        assert!(matches!(
            unit.step(0.0, 0.25),
            Err(Error::NonMonotonicStep { .. })
        ));
        assert_eq!(unit.time(), 0.5);
        assert_eq!(binding.state().steps.len(), 1);
    }

    #[test]
    fn test_step_failure_keeps_cursor() {
        let binding = MockBinding::new().fail_step(2, Fmi1Status::Discard);
        let mut unit = built(&binding);
        unit.instantiate().unwrap();
        unit.initialize(0.0, 1.0).unwrap();
        unit.step(0.0, 0.1).unwrap();

        assert!(matches!(
            unit.step(0.1, 0.1),
            Err(Error::StepFailed {
                status: Fmi1Status::Discard,
                ..
            })
        ));
        assert_eq!(unit.time(), 0.1);

        binding.state_mut().last_successful_time = 0.15;
        assert_eq!(unit.last_successful_time().unwrap(), 0.15);
    }

    #[test]
    fn test_warning_step_is_advisory() {
        let binding = MockBinding::new().fail_step(1, Fmi1Status::Warning);
        let mut unit = built(&binding);
        unit.instantiate().unwrap();
        unit.initialize(0.0, 1.0).unwrap();
        assert_eq!(unit.step(0.0, 0.1).unwrap(), Fmi1Status::Warning);
        assert_eq!(unit.state(), UnitState::Stepping);
    }

    #[test]
    fn test_terminate_failure_still_terminates() {
        let binding = MockBinding::new();
        binding.state_mut().terminate_status = Fmi1Status::Error;
        let mut unit = built(&binding);
        unit.instantiate().unwrap();
        unit.initialize(0.0, 1.0).unwrap();

        assert!(matches!(
            unit.terminate(),
            Err(Error::TerminationFailed(Fmi1Status::Error))
        ));
        assert_eq!(unit.state(), UnitState::Terminated);
    }

    #[test]
    fn test_reset_keeps_cache() {
        let binding = MockBinding::new();
        let mut unit = built(&binding);
        unit.instantiate().unwrap();
        unit.set("x", ScalarValue::Real(2.0)).unwrap();
        unit.initialize(0.0, 1.0).unwrap();
        unit.step(0.0, 0.5).unwrap();

        unit.reset().unwrap();
        assert_eq!(unit.state(), UnitState::Instantiated);
        assert_eq!(unit.time(), 0.0);

        unit.get("x").unwrap();
        assert_eq!(unit.registry().scan_count(), 1);
        assert_eq!(binding.state().resets, 1);
    }

    #[test]
    fn test_unload_releases_everything() {
        let binding = MockBinding::new();
        let mut unit = built(&binding);
        unit.instantiate().unwrap();
        unit.initialize(0.0, 1.0).unwrap();
        unit.get("x").unwrap();
        let dir = unit.working_directory().unwrap().to_owned();

        unit.unload().unwrap();
        assert!(!dir.exists());
        assert!(unit.working_directory().is_none());
        assert!(unit.descriptor().is_none());
        assert!(unit.registry().descriptor("x").is_none());
        assert_eq!(binding.state().terminated, 1);
        assert_eq!(binding.state().freed, 1);

        // Idempotent
        unit.unload().unwrap();
        assert_eq!(binding.state().freed, 1);
    }

    #[test]
    fn test_unload_from_loaded_skips_native_calls() {
        let binding = MockBinding::new();
        let mut unit = built(&binding);
        unit.unload().unwrap();
        assert_eq!(binding.state().terminated, 0);
        assert_eq!(binding.state().freed, 0);
    }

    #[test]
    fn test_unload_after_failed_step() {
        let binding = MockBinding::new().fail_step(1, Fmi1Status::Fatal);
        binding.state_mut().terminate_status = Fmi1Status::Fatal;
        let mut unit = built(&binding);
        unit.instantiate().unwrap();
        unit.initialize(0.0, 1.0).unwrap();
        assert!(unit.step(0.0, 0.1).is_err());

        let dir = unit.working_directory().unwrap().to_owned();
        unit.unload().unwrap();
        assert!(!dir.exists());
        assert_eq!(binding.state().freed, 1);
    }

    #[test]
    fn test_drop_unloads() {
        let binding = MockBinding::new();
        let dir = {
            let mut unit = built(&binding);
            unit.instantiate().unwrap();
            unit.working_directory().unwrap().to_owned()
        };
        assert!(!dir.exists());
        assert_eq!(binding.state().freed, 1);
    }

    #[test]
    fn test_failed_build_leaves_nothing() {
        let binding = MockBinding::new();
        let importer = MockImporter::new(mock::descriptor(), binding.clone()).failing_load();
        let mut unit = ModelUnit::new("unit");
        assert!(matches!(
            unit.build("model.fmu", &importer),
            Err(Error::LoadFailed { .. })
        ));
        assert_eq!(unit.state(), UnitState::Unloaded);
        assert!(unit.working_directory().is_none());

        let importer = MockImporter::new(mock::descriptor(), binding).failing_extract();
        assert!(matches!(
            unit.build("model.fmu", &importer),
            Err(Error::ExtractionFailed { .. })
        ));
    }

    #[test]
    fn test_build_twice_is_invalid() {
        let binding = MockBinding::new();
        let mut unit = built(&binding);
        assert!(matches!(
            unit.build(
                "model.fmu",
                &MockImporter::new(mock::descriptor(), binding.clone())
            ),
            Err(Error::InvalidState {
                operation: "build",
                ..
            })
        ));
    }

    #[test]
    fn test_consistency_check() {
        let binding = MockBinding::new();
        let mut unit = built(&binding);
        unit.check_consistency().unwrap();

        binding.state_mut().types_platform = "default".to_owned();
        assert!(matches!(
            unit.check_consistency(),
            Err(Error::TypesPlatformMismatch(p)) if p == "default"
        ));

        // A mismatch is only a warning on instantiation
        unit.instantiate().unwrap();
    }

    #[test]
    fn test_format_diagnostic() {
        let binding = MockBinding::new();
        let unit = built(&binding);
        let x = mock::descriptor()
            .variables
            .iter()
            .find(|v| v.scalar_type == Some(ScalarType::Real))
            .cloned()
            .unwrap();
        let message = format!("#r{}# ## #r99#", x.value_reference);
        assert_eq!(
            unit.format_diagnostic(&message).text,
            format!("{} # ?", x.name)
        );
    }

    #[test]
    fn test_debug_logging() {
        let binding = MockBinding::new();
        let mut unit = built(&binding);
        assert!(unit.set_debug_logging(true).is_err());
        unit.instantiate().unwrap();
        unit.set_debug_logging(false).unwrap();
        assert_eq!(binding.state().debug_logging, Some(false));
    }

    #[test_log::test]
    fn test_fmu_location() {
        let dir = tempfile::tempdir().unwrap();
        let location = fmu_location(dir.path());
        assert!(location.starts_with("file://"));
        assert!(location.ends_with('/'));

        // Relative paths have no file URL
        assert_eq!(fmu_location(Path::new("relative/dir")), "");
    }
}
