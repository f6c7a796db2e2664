//! Name to value reference resolution with a per-unit cache.

use std::{collections::HashMap, ffi::CString, sync::Arc};

use crate::{
    binding::{Binding, Component, ValueReference},
    descriptor::{ScalarType, ScalarValue, VariableEntry},
    Error, Fmi1Status,
};

/// A resolved variable. Only exists in the cache once the name has been looked up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableDescriptor {
    pub value_reference: ValueReference,
    pub scalar_type: Option<ScalarType>,
    /// Status of the most recent native accessor call for this variable
    pub last_status: Option<Fmi1Status>,
}

/// Resolves variable names against the loaded model description, scanning at most once per
/// name, and dispatches reads and writes to the matching typed accessor.
///
/// The cache is dropped whenever a new variable list is attached, so resolutions never leak
/// from one loaded model into the next.
#[derive(Debug, Default)]
pub struct VariableRegistry {
    variables: Option<Arc<[VariableEntry]>>,
    cache: HashMap<String, VariableDescriptor>,
    scans: usize,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn attach(&mut self, variables: Arc<[VariableEntry]>) {
        self.variables = Some(variables);
        self.cache.clear();
    }

    pub(crate) fn detach(&mut self) {
        self.variables = None;
        self.cache.clear();
    }

    /// The attached variable list, if a model is loaded
    pub fn variables(&self) -> Option<&Arc<[VariableEntry]>> {
        self.variables.as_ref()
    }

    /// Number of linear scans of the variable list performed so far
    pub fn scan_count(&self) -> usize {
        self.scans
    }

    /// The cached descriptor for `name`, without resolving it.
    pub fn descriptor(&self, name: &str) -> Option<&VariableDescriptor> {
        self.cache.get(name)
    }

    /// Resolve `name`, scanning the variable list only on the first call for that name.
    pub fn resolve(&mut self, name: &str) -> Result<VariableDescriptor, Error> {
        if let Some(descriptor) = self.cache.get(name) {
            return Ok(*descriptor);
        }

        let variables = self.variables.as_ref().ok_or(Error::NotLoaded)?;
        self.scans += 1;
        let entry = variables
            .iter()
            .find(|var| var.name == name)
            .ok_or_else(|| Error::VariableNotFound(name.to_owned()))?;

        let descriptor = VariableDescriptor {
            value_reference: entry.value_reference,
            scalar_type: entry.scalar_type,
            last_status: None,
        };
        log::trace!(
            "Resolved '{name}' to {:?} #{}",
            descriptor.scalar_type,
            descriptor.value_reference
        );
        self.cache.insert(name.to_owned(), descriptor);
        Ok(descriptor)
    }

    /// Read the current value of `name` from the instance.
    pub fn get<B: Binding>(
        &mut self,
        binding: &B,
        component: Component,
        name: &str,
    ) -> Result<ScalarValue, Error> {
        let descriptor = self.resolve(name)?;
        let scalar_type = descriptor
            .scalar_type
            .ok_or_else(|| Error::UnsupportedType(name.to_owned()))?;
        let vrs = [descriptor.value_reference];

        let (status, value) = match scalar_type {
            ScalarType::Real => {
                let mut values = [0.0];
                let status = binding.get_real(component, &vrs, &mut values);
                (status, ScalarValue::Real(values[0]))
            }
            ScalarType::Integer | ScalarType::Enumeration => {
                let mut values = [0];
                let status = binding.get_integer(component, &vrs, &mut values);
                (status, ScalarValue::Integer(values[0].into()))
            }
            ScalarType::Boolean => {
                let mut values = [false];
                let status = binding.get_boolean(component, &vrs, &mut values);
                (status, ScalarValue::Boolean(values[0]))
            }
            ScalarType::String => {
                let mut values = [String::new()];
                let status = binding.get_string(component, &vrs, &mut values);
                let [value] = values;
                (status, ScalarValue::String(value))
            }
        };

        self.record(name, status)?;
        Ok(value)
    }

    /// Write `value` to `name`. The value's tag must match the declared type; nothing is
    /// converted.
    pub fn set<B: Binding>(
        &mut self,
        binding: &B,
        component: Component,
        name: &str,
        value: &ScalarValue,
    ) -> Result<Fmi1Status, Error> {
        let descriptor = self.resolve(name)?;
        let scalar_type = descriptor
            .scalar_type
            .ok_or_else(|| Error::UnsupportedType(name.to_owned()))?;
        let vrs = [descriptor.value_reference];

        let status = match (scalar_type, value) {
            (ScalarType::Real, ScalarValue::Real(v)) => binding.set_real(component, &vrs, &[*v]),
            (ScalarType::Integer | ScalarType::Enumeration, ScalarValue::Integer(v)) => {
                let v = i32::try_from(*v).map_err(|_| Error::IntegerOutOfRange {
                    name: name.to_owned(),
                    value: *v,
                })?;
                binding.set_integer(component, &vrs, &[v])
            }
            (ScalarType::Boolean, ScalarValue::Boolean(v)) => {
                binding.set_boolean(component, &vrs, &[*v])
            }
            (ScalarType::String, ScalarValue::String(v)) => {
                let v = CString::new(v.as_str())?;
                binding.set_string(component, &vrs, &[v.as_c_str()])
            }
            (expected, value) => {
                return Err(Error::TypeMismatch {
                    name: name.to_owned(),
                    expected,
                    found: value.scalar_type(),
                })
            }
        };

        self.record(name, status)
    }

    /// Store the accessor status on the cached descriptor, then surface failures.
    fn record(&mut self, name: &str, status: Fmi1Status) -> Result<Fmi1Status, Error> {
        if let Some(descriptor) = self.cache.get_mut(name) {
            descriptor.last_status = Some(status);
        }
        match status {
            Fmi1Status::OK => Ok(status),
            Fmi1Status::Warning => {
                log::warn!("Access to '{name}' returned {status}");
                Ok(status)
            }
            _ => Err(Error::VariableAccess {
                name: name.to_owned(),
                status,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBinding;

    fn registry() -> VariableRegistry {
        let mut registry = VariableRegistry::new();
        registry.attach(
            vec![
                VariableEntry::new("x", 12, ScalarType::Real),
                VariableEntry::new("n", 3, ScalarType::Integer),
                VariableEntry::new("mode", 4, ScalarType::Enumeration),
                VariableEntry::new("on", 5, ScalarType::Boolean),
                VariableEntry::new("label", 6, ScalarType::String),
                VariableEntry {
                    scalar_type: None,
                    ..VariableEntry::new("opaque", 7, ScalarType::Real)
                },
            ]
            .into(),
        );
        registry
    }

    #[test]
    fn test_resolve_caches() {
        let mut registry = registry();
        let first = registry.resolve("n").unwrap();
        assert_eq!(registry.scan_count(), 1);

        let second = registry.resolve("n").unwrap();
        assert_eq!(registry.scan_count(), 1);
        assert_eq!(first, second);
        assert_eq!(second.value_reference, 3);
        assert_eq!(second.scalar_type, Some(ScalarType::Integer));
    }

    #[test]
    fn test_resolve_errors() {
        let mut registry = VariableRegistry::new();
        assert!(matches!(registry.resolve("x"), Err(Error::NotLoaded)));

        let mut registry = self::registry();
        assert!(matches!(
            registry.resolve("missing"),
            Err(Error::VariableNotFound(name)) if name == "missing"
        ));
        assert!(registry.descriptor("missing").is_none());
    }

    #[test]
    fn test_attach_invalidates() {
        let mut registry = registry();
        registry.resolve("x").unwrap();
        registry.attach(vec![VariableEntry::new("x", 99, ScalarType::Real)].into());
        assert!(registry.descriptor("x").is_none());
        assert_eq!(registry.resolve("x").unwrap().value_reference, 99);
        assert_eq!(registry.scan_count(), 2);
    }

    #[test]
    fn test_set_get_round_trip() {
        let mock = MockBinding::new();
        let c = mock.component();
        let mut registry = registry();

        registry
            .set(&mock, c, "x", &ScalarValue::Real(1.5))
            .unwrap();
        assert_eq!(
            registry.get(&mock, c, "x").unwrap(),
            ScalarValue::Real(1.5)
        );

        registry
            .set(&mock, c, "mode", &ScalarValue::Integer(2))
            .unwrap();
        assert_eq!(
            registry.get(&mock, c, "mode").unwrap(),
            ScalarValue::Integer(2)
        );

        registry
            .set(&mock, c, "label", &ScalarValue::String("ball".into()))
            .unwrap();
        assert_eq!(
            registry.get(&mock, c, "label").unwrap(),
            ScalarValue::String("ball".into())
        );
        assert_eq!(
            registry.descriptor("label").unwrap().last_status,
            Some(Fmi1Status::OK)
        );
    }

    #[test]
    fn test_type_checks_before_native_call() {
        let mock = MockBinding::new();
        let c = mock.component();
        let mut registry = registry();

        assert!(matches!(
            registry.set(&mock, c, "x", &ScalarValue::Boolean(true)),
            Err(Error::TypeMismatch {
                expected: ScalarType::Real,
                found: ScalarType::Boolean,
                ..
            })
        ));
        assert!(matches!(
            registry.get(&mock, c, "opaque"),
            Err(Error::UnsupportedType(_))
        ));
        assert!(matches!(
            registry.set(&mock, c, "n", &ScalarValue::Integer(i64::from(i32::MAX) + 1)),
            Err(Error::IntegerOutOfRange { .. })
        ));
        assert!(matches!(
            registry.set(&mock, c, "label", &ScalarValue::String("a\0b".into())),
            Err(Error::Nul(_))
        ));
        assert_eq!(mock.state().accessor_calls, 0);
    }

    #[test]
    fn test_failed_access_records_status() {
        let mock = MockBinding::new();
        mock.state_mut().access_status = Fmi1Status::Error;
        let c = mock.component();
        let mut registry = registry();

        assert!(matches!(
            registry.get(&mock, c, "on"),
            Err(Error::VariableAccess { status: Fmi1Status::Error, .. })
        ));
        assert_eq!(
            registry.descriptor("on").unwrap().last_status,
            Some(Fmi1Status::Error)
        );

        mock.state_mut().access_status = Fmi1Status::Warning;
        assert_eq!(
            registry.set(&mock, c, "on", &ScalarValue::Boolean(true)).unwrap(),
            Fmi1Status::Warning
        );
    }
}
