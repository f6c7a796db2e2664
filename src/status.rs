//! Status codes returned by every FMI 1.0 function.

use std::fmt::Display;

use fmi_sys::fmi1 as binding;

/// Outcome of a native call, ordered by severity.
///
/// Anything strictly worse than [`Fmi1Status::Warning`] is a failure. `Pending` sorts last: this
/// crate never supplies a `stepFinished` callback, so an asynchronous step is not something a
/// caller can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fmi1Status {
    /// All well
    OK,
    /// Things are not quite right, but the computation can continue. The logger was called with
    /// an explanation.
    Warning,
    /// The slave could not complete the request, e.g. a step was rejected. The master may decide
    /// to continue with the last successful time.
    Discard,
    /// The instance encountered an error and cannot continue.
    Error,
    /// The model computations are irreparably corrupted for all instances.
    Fatal,
    /// The slave executes `fmiDoStep` asynchronously.
    Pending,
}

impl Fmi1Status {
    /// `true` for every status worse than [`Fmi1Status::Warning`].
    #[inline]
    pub fn is_failure(self) -> bool {
        self > Fmi1Status::Warning
    }

    /// Convert to [`Result<Fmi1Status, Fmi1Status>`], keeping `OK` and `Warning` as success.
    #[inline]
    pub fn ok(self) -> Result<Fmi1Status, Fmi1Status> {
        if self.is_failure() {
            Err(self)
        } else {
            Ok(self)
        }
    }
}

impl From<binding::fmiStatus> for Fmi1Status {
    fn from(status: binding::fmiStatus) -> Self {
        match status {
            binding::fmiStatus_fmiOK => Fmi1Status::OK,
            binding::fmiStatus_fmiWarning => Fmi1Status::Warning,
            binding::fmiStatus_fmiDiscard => Fmi1Status::Discard,
            binding::fmiStatus_fmiError => Fmi1Status::Error,
            binding::fmiStatus_fmiFatal => Fmi1Status::Fatal,
            binding::fmiStatus_fmiPending => Fmi1Status::Pending,
            _ => {
                log::warn!("Unknown fmiStatus {status}, treating as Fatal");
                Fmi1Status::Fatal
            }
        }
    }
}

impl Display for Fmi1Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Fmi1Status::OK => "ok",
            Fmi1Status::Warning => "warning",
            Fmi1Status::Discard => "discard",
            Fmi1Status::Error => "error",
            Fmi1Status::Fatal => "fatal",
            Fmi1Status::Pending => "pending",
        };
        write!(f, "{s}")
    }
}
