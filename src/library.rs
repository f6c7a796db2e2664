//! [`Binding`] implementation over a dynamically loaded FMU shared library.

use std::{ffi::CStr, os::raw::c_char, path::Path};

use fmi_sys::fmi1 as binding;

use crate::{
    binding::{Binding, Component, InstantiateParams, StatusKind, ValueReference},
    logger, Error, Fmi1Status,
};

/// A loaded FMI 1.0 Co-Simulation library. The library is closed when this is dropped.
#[derive(Debug)]
pub struct Library {
    binding: binding::Fmi1CoSimBinding,
}

impl Library {
    /// Open the shared library at `path` and resolve every `<model_identifier>_fmiXxx` entry
    /// point.
    pub fn load(path: &Path, model_identifier: &str) -> Result<Self, Error> {
        log::trace!("Loading shared library {path:?}");
        let binding = unsafe { binding::Fmi1CoSimBinding::new(path, model_identifier) }.map_err(
            |source| Error::LoadFailed {
                path: path.to_owned(),
                source,
            },
        )?;
        Ok(Self { binding })
    }
}

fn callback_functions() -> binding::fmiCallbackFunctions {
    binding::fmiCallbackFunctions {
        logger: Some(logger::callback_logger_handler as _),
        allocateMemory: Some(libc::calloc),
        freeMemory: Some(libc::free),
        // fmiDoStep is carried out synchronously
        stepFinished: None,
    }
}

fn to_fmi_boolean(value: bool) -> binding::fmiBoolean {
    if value {
        binding::fmiTrue
    } else {
        binding::fmiFalse
    }
}

/// Copy a string owned by the FMU; a null pointer reads as empty.
unsafe fn copy_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(ptr) }
            .to_string_lossy()
            .into_owned()
    }
}

impl Binding for Library {
    fn get_version(&self) -> String {
        unsafe { copy_string(self.binding.fmiGetVersion()) }
    }

    fn get_types_platform(&self) -> String {
        unsafe { copy_string(self.binding.fmiGetTypesPlatform()) }
    }

    fn instantiate_slave(&self, params: &InstantiateParams<'_>) -> Option<Component> {
        log::trace!(
            "fmiInstantiateSlave({:?}, {:?}, {:?})",
            params.instance_name,
            params.guid,
            params.fmu_location
        );
        let component = unsafe {
            self.binding.fmiInstantiateSlave(
                params.instance_name.as_ptr(),
                params.guid.as_ptr(),
                params.fmu_location.as_ptr(),
                params.mime_type.as_ptr(),
                params.timeout,
                to_fmi_boolean(params.visible),
                to_fmi_boolean(params.interactive),
                callback_functions(),
                to_fmi_boolean(params.logging_on),
            )
        };
        Component::from_raw(component)
    }

    fn set_debug_logging(&self, component: Component, logging_on: bool) -> Fmi1Status {
        unsafe {
            self.binding
                .fmiSetDebugLogging(component.as_ptr(), to_fmi_boolean(logging_on))
        }
        .into()
    }

    fn initialize_slave(
        &self,
        component: Component,
        t_start: f64,
        stop_time: Option<f64>,
    ) -> Fmi1Status {
        log::trace!("fmiInitializeSlave({t_start}, {stop_time:?})");
        unsafe {
            self.binding.fmiInitializeSlave(
                component.as_ptr(),
                t_start,
                to_fmi_boolean(stop_time.is_some()),
                stop_time.unwrap_or_default(),
            )
        }
        .into()
    }

    fn do_step(
        &self,
        component: Component,
        current_communication_point: f64,
        communication_step_size: f64,
        new_step: bool,
    ) -> Fmi1Status {
        log::trace!("fmiDoStep({current_communication_point}, {communication_step_size})");
        unsafe {
            self.binding.fmiDoStep(
                component.as_ptr(),
                current_communication_point,
                communication_step_size,
                to_fmi_boolean(new_step),
            )
        }
        .into()
    }

    fn terminate_slave(&self, component: Component) -> Fmi1Status {
        log::trace!("fmiTerminateSlave");
        unsafe { self.binding.fmiTerminateSlave(component.as_ptr()) }.into()
    }

    fn reset_slave(&self, component: Component) -> Fmi1Status {
        log::trace!("fmiResetSlave");
        unsafe { self.binding.fmiResetSlave(component.as_ptr()) }.into()
    }

    fn free_slave_instance(&self, component: Component) {
        log::trace!("Freeing component {:?}", component.as_ptr());
        unsafe { self.binding.fmiFreeSlaveInstance(component.as_ptr()) }
    }

    fn get_real(
        &self,
        component: Component,
        vrs: &[ValueReference],
        values: &mut [f64],
    ) -> Fmi1Status {
        assert_eq!(vrs.len(), values.len());
        unsafe {
            self.binding.fmiGetReal(
                component.as_ptr(),
                vrs.as_ptr(),
                vrs.len(),
                values.as_mut_ptr(),
            )
        }
        .into()
    }

    fn get_integer(
        &self,
        component: Component,
        vrs: &[ValueReference],
        values: &mut [i32],
    ) -> Fmi1Status {
        assert_eq!(vrs.len(), values.len());
        unsafe {
            self.binding.fmiGetInteger(
                component.as_ptr(),
                vrs.as_ptr(),
                vrs.len(),
                values.as_mut_ptr(),
            )
        }
        .into()
    }

    fn get_boolean(
        &self,
        component: Component,
        vrs: &[ValueReference],
        values: &mut [bool],
    ) -> Fmi1Status {
        assert_eq!(vrs.len(), values.len());
        let mut raw = vec![binding::fmiFalse; values.len()];
        let status: Fmi1Status = unsafe {
            self.binding.fmiGetBoolean(
                component.as_ptr(),
                vrs.as_ptr(),
                vrs.len(),
                raw.as_mut_ptr(),
            )
        }
        .into();
        for (value, raw) in values.iter_mut().zip(raw) {
            *value = raw != binding::fmiFalse;
        }
        status
    }

    fn get_string(
        &self,
        component: Component,
        vrs: &[ValueReference],
        values: &mut [String],
    ) -> Fmi1Status {
        assert_eq!(vrs.len(), values.len());
        let mut raw: Vec<binding::fmiString> = vec![std::ptr::null(); values.len()];
        let status: Fmi1Status = unsafe {
            self.binding.fmiGetString(
                component.as_ptr(),
                vrs.as_ptr(),
                vrs.len(),
                raw.as_mut_ptr(),
            )
        }
        .into();
        for (value, ptr) in values.iter_mut().zip(raw) {
            *value = unsafe { copy_string(ptr) };
        }
        status
    }

    fn set_real(&self, component: Component, vrs: &[ValueReference], values: &[f64]) -> Fmi1Status {
        assert_eq!(vrs.len(), values.len());
        unsafe {
            self.binding
                .fmiSetReal(component.as_ptr(), vrs.as_ptr(), vrs.len(), values.as_ptr())
        }
        .into()
    }

    fn set_integer(
        &self,
        component: Component,
        vrs: &[ValueReference],
        values: &[i32],
    ) -> Fmi1Status {
        assert_eq!(vrs.len(), values.len());
        unsafe {
            self.binding
                .fmiSetInteger(component.as_ptr(), vrs.as_ptr(), vrs.len(), values.as_ptr())
        }
        .into()
    }

    fn set_boolean(
        &self,
        component: Component,
        vrs: &[ValueReference],
        values: &[bool],
    ) -> Fmi1Status {
        assert_eq!(vrs.len(), values.len());
        let raw: Vec<binding::fmiBoolean> = values.iter().copied().map(to_fmi_boolean).collect();
        unsafe {
            self.binding
                .fmiSetBoolean(component.as_ptr(), vrs.as_ptr(), vrs.len(), raw.as_ptr())
        }
        .into()
    }

    fn set_string(
        &self,
        component: Component,
        vrs: &[ValueReference],
        values: &[&CStr],
    ) -> Fmi1Status {
        assert_eq!(vrs.len(), values.len());
        let raw: Vec<binding::fmiString> = values.iter().map(|s| s.as_ptr()).collect();
        unsafe {
            self.binding
                .fmiSetString(component.as_ptr(), vrs.as_ptr(), vrs.len(), raw.as_ptr())
        }
        .into()
    }

    fn get_real_status(
        &self,
        component: Component,
        kind: StatusKind,
        value: &mut f64,
    ) -> Fmi1Status {
        unsafe {
            self.binding
                .fmiGetRealStatus(component.as_ptr(), kind as binding::fmiStatusKind, value)
        }
        .into()
    }
}
