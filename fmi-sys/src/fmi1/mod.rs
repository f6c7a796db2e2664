//! FMI 1.0 for Co-Simulation types and function table.
#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(clippy::missing_safety_doc)]
#![allow(clippy::too_many_arguments)]

use std::{
    ffi::OsStr,
    os::raw::{c_char, c_double, c_int, c_uint, c_void},
};

pub type fmiComponent = *mut c_void;
pub type fmiValueReference = c_uint;
pub type fmiReal = c_double;
pub type fmiInteger = c_int;
pub type fmiBoolean = c_char;
pub type fmiString = *const c_char;

pub const fmiTrue: fmiBoolean = 1;
pub const fmiFalse: fmiBoolean = 0;
pub const fmiUndefinedValueReference: fmiValueReference = fmiValueReference::MAX;

/// Platform string every FMI 1.0 binary built against the standard headers reports
pub const fmiPlatform: &str = "standard32";
pub const fmiVersion: &str = "1.0";

pub type fmiStatus = c_uint;
pub const fmiStatus_fmiOK: fmiStatus = 0;
pub const fmiStatus_fmiWarning: fmiStatus = 1;
pub const fmiStatus_fmiDiscard: fmiStatus = 2;
pub const fmiStatus_fmiError: fmiStatus = 3;
pub const fmiStatus_fmiFatal: fmiStatus = 4;
pub const fmiStatus_fmiPending: fmiStatus = 5;

pub type fmiStatusKind = c_uint;
pub const fmiStatusKind_fmiDoStepStatus: fmiStatusKind = 0;
pub const fmiStatusKind_fmiPendingStatus: fmiStatusKind = 1;
pub const fmiStatusKind_fmiLastSuccessfulTime: fmiStatusKind = 2;

pub type fmiCallbackLogger = Option<
    unsafe extern "C" fn(
        c: fmiComponent,
        instanceName: fmiString,
        status: fmiStatus,
        category: fmiString,
        message: fmiString,
        ...
    ),
>;
pub type fmiCallbackAllocateMemory =
    Option<unsafe extern "C" fn(nobj: usize, size: usize) -> *mut c_void>;
pub type fmiCallbackFreeMemory = Option<unsafe extern "C" fn(obj: *mut c_void)>;
pub type fmiStepFinished = Option<unsafe extern "C" fn(c: fmiComponent, status: fmiStatus)>;

/// Passed by value to `fmiInstantiateSlave`.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct fmiCallbackFunctions {
    pub logger: fmiCallbackLogger,
    pub allocateMemory: fmiCallbackAllocateMemory,
    pub freeMemory: fmiCallbackFreeMemory,
    pub stepFinished: fmiStepFinished,
}

/// Name of the exported symbol for `function` in a unit with the given model identifier.
pub fn symbol_name(model_identifier: &str, function: &str) -> String {
    format!("{model_identifier}_{function}")
}

macro_rules! cosim_functions {
    ($($name:ident : fn($($arg:ident : $ty:ty),*) $(-> $ret:ty)?;)*) => {
        /// Function table of a loaded FMI 1.0 Co-Simulation library.
        ///
        /// Every entry point is resolved when the table is built; a missing symbol fails the
        /// whole load. The library stays open for as long as the table lives.
        pub struct Fmi1CoSimBinding {
            __library: ::libloading::Library,
            $(pub $name: unsafe extern "C" fn($($ty),*) $(-> $ret)?,)*
        }

        impl Fmi1CoSimBinding {
            /// Open the shared library at `path` and resolve the function table.
            pub unsafe fn new<P: AsRef<OsStr>>(
                path: P,
                model_identifier: &str,
            ) -> Result<Self, ::libloading::Error> {
                let library = unsafe { ::libloading::Library::new(path) }?;
                unsafe { Self::from_library(library, model_identifier) }
            }

            /// Resolve the function table from an already opened library.
            pub unsafe fn from_library(
                library: ::libloading::Library,
                model_identifier: &str,
            ) -> Result<Self, ::libloading::Error> {
                $(
                    let $name = unsafe {
                        let symbol = symbol_name(model_identifier, stringify!($name));
                        *library.get::<unsafe extern "C" fn($($ty),*) $(-> $ret)?>(
                            symbol.as_bytes(),
                        )?
                    };
                )*
                Ok(Self {
                    __library: library,
                    $($name,)*
                })
            }

            $(
                #[inline]
                pub unsafe fn $name(&self, $($arg: $ty),*) $(-> $ret)? {
                    unsafe { (self.$name)($($arg),*) }
                }
            )*
        }
    };
}

cosim_functions! {
    fmiGetTypesPlatform: fn() -> *const c_char;
    fmiGetVersion: fn() -> *const c_char;
    fmiSetDebugLogging: fn(c: fmiComponent, loggingOn: fmiBoolean) -> fmiStatus;
    fmiInstantiateSlave: fn(
        instanceName: fmiString,
        fmuGUID: fmiString,
        fmuLocation: fmiString,
        mimeType: fmiString,
        timeout: fmiReal,
        visible: fmiBoolean,
        interactive: fmiBoolean,
        functions: fmiCallbackFunctions,
        loggingOn: fmiBoolean
    ) -> fmiComponent;
    fmiInitializeSlave: fn(
        c: fmiComponent,
        tStart: fmiReal,
        StopTimeDefined: fmiBoolean,
        tStop: fmiReal
    ) -> fmiStatus;
    fmiTerminateSlave: fn(c: fmiComponent) -> fmiStatus;
    fmiResetSlave: fn(c: fmiComponent) -> fmiStatus;
    fmiFreeSlaveInstance: fn(c: fmiComponent);
    fmiDoStep: fn(
        c: fmiComponent,
        currentCommunicationPoint: fmiReal,
        communicationStepSize: fmiReal,
        newStep: fmiBoolean
    ) -> fmiStatus;
    fmiCancelStep: fn(c: fmiComponent) -> fmiStatus;
    fmiGetStatus: fn(c: fmiComponent, s: fmiStatusKind, value: *mut fmiStatus) -> fmiStatus;
    fmiGetRealStatus: fn(c: fmiComponent, s: fmiStatusKind, value: *mut fmiReal) -> fmiStatus;
    fmiGetIntegerStatus: fn(
        c: fmiComponent,
        s: fmiStatusKind,
        value: *mut fmiInteger
    ) -> fmiStatus;
    fmiGetBooleanStatus: fn(
        c: fmiComponent,
        s: fmiStatusKind,
        value: *mut fmiBoolean
    ) -> fmiStatus;
    fmiGetStringStatus: fn(c: fmiComponent, s: fmiStatusKind, value: *mut fmiString) -> fmiStatus;
    fmiSetReal: fn(
        c: fmiComponent,
        vr: *const fmiValueReference,
        nvr: usize,
        value: *const fmiReal
    ) -> fmiStatus;
    fmiSetInteger: fn(
        c: fmiComponent,
        vr: *const fmiValueReference,
        nvr: usize,
        value: *const fmiInteger
    ) -> fmiStatus;
    fmiSetBoolean: fn(
        c: fmiComponent,
        vr: *const fmiValueReference,
        nvr: usize,
        value: *const fmiBoolean
    ) -> fmiStatus;
    fmiSetString: fn(
        c: fmiComponent,
        vr: *const fmiValueReference,
        nvr: usize,
        value: *const fmiString
    ) -> fmiStatus;
    fmiGetReal: fn(
        c: fmiComponent,
        vr: *const fmiValueReference,
        nvr: usize,
        value: *mut fmiReal
    ) -> fmiStatus;
    fmiGetInteger: fn(
        c: fmiComponent,
        vr: *const fmiValueReference,
        nvr: usize,
        value: *mut fmiInteger
    ) -> fmiStatus;
    fmiGetBoolean: fn(
        c: fmiComponent,
        vr: *const fmiValueReference,
        nvr: usize,
        value: *mut fmiBoolean
    ) -> fmiStatus;
    fmiGetString: fn(
        c: fmiComponent,
        vr: *const fmiValueReference,
        nvr: usize,
        value: *mut fmiString
    ) -> fmiStatus;
}

impl std::fmt::Debug for Fmi1CoSimBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fmi1CoSimBinding")
            .field("library", &self.__library)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_name() {
        assert_eq!(
            symbol_name("BouncingBall", "fmiDoStep"),
            "BouncingBall_fmiDoStep"
        );
    }

    #[test]
    fn test_missing_library() {
        let result = unsafe { Fmi1CoSimBinding::new("/nonexistent/libmissing.so", "Missing") };
        assert!(result.is_err());
    }
}
