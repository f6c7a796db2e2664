//! Safe view of the FMI 1.0 Co-Simulation function table.
//!
//! [`Binding`] is the seam between the driver and the native code: [`crate::Library`] implements
//! it over a loaded shared library, `MockBinding` (feature `mock`) implements it in memory.

use std::{ffi::CStr, os::raw::c_void, ptr::NonNull};

use fmi_sys::fmi1 as binding;

use crate::{descriptor::ModelDescriptor, Error, Fmi1Status};

pub type ValueReference = binding::fmiValueReference;

/// Opaque handle to an instantiated slave, never null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component(NonNull<c_void>);

impl Component {
    pub fn new(ptr: NonNull<c_void>) -> Self {
        Self(ptr)
    }

    /// Wrap a raw handle returned by `fmiInstantiateSlave`; `None` if it is null.
    pub fn from_raw(ptr: binding::fmiComponent) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    pub fn as_ptr(self) -> binding::fmiComponent {
        self.0.as_ptr()
    }
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Can be called when `fmiDoStep` returned `fmiPending`.
    DoStepStatus = binding::fmiStatusKind_fmiDoStepStatus,
    /// Informs about the currently running asynchronous step.
    PendingStatus = binding::fmiStatusKind_fmiPendingStatus,
    /// End time of the last successfully completed communication step. Can be called after
    /// `fmiDoStep` returned `fmiDiscard`.
    LastSuccessfulTime = binding::fmiStatusKind_fmiLastSuccessfulTime,
}

/// Arguments of `fmiInstantiateSlave`, already converted to C strings.
#[derive(Debug, Clone, Copy)]
pub struct InstantiateParams<'a> {
    pub instance_name: &'a CStr,
    pub guid: &'a CStr,
    /// URL of the extracted FMU directory
    pub fmu_location: &'a CStr,
    pub mime_type: &'a CStr,
    /// Advisory wait period in milliseconds, 0 for unlimited
    pub timeout: f64,
    pub visible: bool,
    pub interactive: bool,
    pub logging_on: bool,
}

pub trait Binding {
    /// The FMI-standard version string
    fn get_version(&self) -> String;

    /// The types platform the binary was compiled with; `"standard32"` for FMI 1.0.
    fn get_types_platform(&self) -> String;

    /// Returns `None` if the FMU rejected the instantiation.
    fn instantiate_slave(&self, params: &InstantiateParams<'_>) -> Option<Component>;

    fn set_debug_logging(&self, component: Component, logging_on: bool) -> Fmi1Status;

    /// `stop_time` is passed as `StopTimeDefined = fmiFalse` when `None`.
    fn initialize_slave(
        &self,
        component: Component,
        t_start: f64,
        stop_time: Option<f64>,
    ) -> Fmi1Status;

    fn do_step(
        &self,
        component: Component,
        current_communication_point: f64,
        communication_step_size: f64,
        new_step: bool,
    ) -> Fmi1Status;

    fn terminate_slave(&self, component: Component) -> Fmi1Status;

    fn reset_slave(&self, component: Component) -> Fmi1Status;

    fn free_slave_instance(&self, component: Component);

    fn get_real(&self, component: Component, vrs: &[ValueReference], values: &mut [f64])
        -> Fmi1Status;

    fn get_integer(
        &self,
        component: Component,
        vrs: &[ValueReference],
        values: &mut [i32],
    ) -> Fmi1Status;

    fn get_boolean(
        &self,
        component: Component,
        vrs: &[ValueReference],
        values: &mut [bool],
    ) -> Fmi1Status;

    /// Strings are copied out of FMU-owned memory.
    fn get_string(
        &self,
        component: Component,
        vrs: &[ValueReference],
        values: &mut [String],
    ) -> Fmi1Status;

    fn set_real(&self, component: Component, vrs: &[ValueReference], values: &[f64])
        -> Fmi1Status;

    fn set_integer(&self, component: Component, vrs: &[ValueReference], values: &[i32])
        -> Fmi1Status;

    fn set_boolean(&self, component: Component, vrs: &[ValueReference], values: &[bool])
        -> Fmi1Status;

    fn set_string(
        &self,
        component: Component,
        vrs: &[ValueReference],
        values: &[&CStr],
    ) -> Fmi1Status;

    fn get_real_status(&self, component: Component, kind: StatusKind, value: &mut f64)
        -> Fmi1Status;
}

/// Check the internal consistency of the FMU by comparing the FMI version and types platform
/// reported by the library with the model description.
pub fn check_consistency<B: Binding>(
    binding: &B,
    descriptor: &ModelDescriptor,
) -> Result<(), Error> {
    let version = binding.get_version();
    if version != descriptor.fmi_version {
        return Err(Error::VersionMismatch {
            found: version,
            expected: descriptor.fmi_version.clone(),
        });
    }

    let types_platform = binding.get_types_platform();
    if types_platform != binding::fmiPlatform {
        return Err(Error::TypesPlatformMismatch(types_platform));
    }

    Ok(())
}
