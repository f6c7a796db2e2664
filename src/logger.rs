use std::{
    borrow::Cow,
    collections::HashMap,
    ffi::CStr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, LazyLock, Mutex, PoisonError,
    },
};

use fmi_sys::fmi1 as binding;

use crate::{
    descriptor::VariableEntry,
    diagnostics::{self, Formatted},
    Fmi1Status,
};

/// FMI 1.0 logger calls carry no user data, so messages are matched to the variable list of the
/// emitting unit by instance name.
type RouteTable = HashMap<String, Vec<(u64, Arc<[VariableEntry]>)>>;

static ROUTES: LazyLock<Mutex<RouteTable>> = LazyLock::new(Default::default);
static NEXT_ROUTE_ID: AtomicU64 = AtomicU64::new(0);

/// Registration of an instance name with the logger. Removed again on drop.
#[derive(Debug)]
pub(crate) struct Route {
    instance_name: String,
    id: u64,
}

impl Route {
    /// If two units share an instance name, the most recent registration wins.
    pub(crate) fn register(instance_name: &str, variables: Arc<[VariableEntry]>) -> Self {
        let id = NEXT_ROUTE_ID.fetch_add(1, Ordering::Relaxed);
        ROUTES
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(instance_name.to_owned())
            .or_default()
            .push((id, variables));
        Self {
            instance_name: instance_name.to_owned(),
            id,
        }
    }
}

impl Drop for Route {
    fn drop(&mut self) {
        let mut routes = ROUTES.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entries) = routes.get_mut(&self.instance_name) {
            entries.retain(|(id, _)| *id != self.id);
            if entries.is_empty() {
                routes.remove(&self.instance_name);
            }
        }
    }
}

fn lookup_route(instance_name: &str) -> Option<Arc<[VariableEntry]>> {
    ROUTES
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(instance_name)
        .and_then(|entries| entries.last())
        .map(|(_, variables)| variables.clone())
}

pub(crate) fn level(status: Fmi1Status) -> log::Level {
    match status {
        Fmi1Status::OK | Fmi1Status::Pending => log::Level::Info,
        Fmi1Status::Warning => log::Level::Warn,
        Fmi1Status::Discard => log::Level::Debug,
        Fmi1Status::Error | Fmi1Status::Fatal => log::Level::Error,
    }
}

/// Expand the message and prefix it with the category.
pub(crate) fn render(category: &str, message: &str, variables: &[VariableEntry]) -> Formatted {
    let Formatted { text, notes } = diagnostics::format(message, variables);
    Formatted {
        text: format!("{category}: {text}"),
        notes,
    }
}

/// Expand a message from `instance_name` against the variables of the unit registered under it.
/// Value references stay unresolved if no unit is registered.
pub(crate) fn expand(instance_name: &str, category: &str, message: &str) -> Formatted {
    let variables = lookup_route(instance_name);
    render(category, message, variables.as_deref().unwrap_or_default())
}

unsafe fn str_or_placeholder<'a>(ptr: binding::fmiString) -> Cow<'a, str> {
    if ptr.is_null() {
        Cow::Borrowed("?")
    } else {
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy()
    }
}

/// This function gets called from logger.c with the printf arguments already expanded
#[no_mangle]
extern "C" fn callback_log(
    _component: binding::fmiComponent,
    instance_name: binding::fmiString,
    status: binding::fmiStatus,
    category: binding::fmiString,
    message: binding::fmiString,
) {
    let instance_name = unsafe { str_or_placeholder(instance_name) };
    let category = unsafe { str_or_placeholder(category) };
    let message = if message.is_null() {
        Cow::Borrowed("")
    } else {
        unsafe { CStr::from_ptr(message) }.to_string_lossy()
    };

    let formatted = expand(&instance_name, &category, &message);

    for note in &formatted.notes {
        log::warn!(target: &*instance_name, "{note} in message '{message}'");
    }

    log::logger().log(
        &log::Record::builder()
            .args(format_args!("{}", formatted.text))
            .level(level(status.into()))
            .module_path(Some("logger"))
            .target(&instance_name)
            .build(),
    );
}

#[link(name = "logger", kind = "static")]
extern "C" {
    /// This function is implemented in logger.c
    /// Note: This can be re-implemented in pure Rust once the `c_variadics` feature stabilizes.
    /// See: https://doc.rust-lang.org/beta/unstable-book/language-features/c-variadic.html
    pub(crate) fn callback_logger_handler(
        c: binding::fmiComponent,
        instance_name: binding::fmiString,
        status: binding::fmiStatus,
        category: binding::fmiString,
        message: binding::fmiString,
        ...
    );
}
