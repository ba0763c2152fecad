use crate::error::{FieldError, RegistryError};
use crate::host::{Field, Input};
use ahash::AHashMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// The kinds of classes the registry can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryKind {
    Input,
    Field,
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryKind::Input => write!(f, "input"),
            RegistryKind::Field => write!(f, "field"),
        }
    }
}

/// Builds an input with the given name.
pub type InputConstructor = Arc<dyn Fn(Option<&str>) -> Input + Send + Sync>;

/// Builds a field from its JSON constructor arguments.
pub type FieldConstructor = Arc<dyn Fn(&[Value]) -> Result<Field, FieldError> + Send + Sync>;

/// A registered constructor of either kind.
#[derive(Clone)]
pub enum Constructor {
    Input(InputConstructor),
    Field(FieldConstructor),
}

impl Constructor {
    pub fn kind(&self) -> RegistryKind {
        match self {
            Constructor::Input(_) => RegistryKind::Input,
            Constructor::Field(_) => RegistryKind::Field,
        }
    }
}

/// An explicit name-to-constructor registry for inputs and fields.
///
/// Populated once during setup (see [`crate::inputs::register_builtin_inputs`]
/// and [`crate::fields::register_fields`]) and read at block instantiation.
#[derive(Clone, Default)]
pub struct ClassRegistry {
    inputs: AHashMap<String, InputConstructor>,
    fields: AHashMap<String, FieldConstructor>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor under `name`. A later registration replaces an
    /// earlier one of the same kind and name.
    pub fn register(&mut self, name: &str, constructor: Constructor) {
        log::trace!("Registering {} type '{}'", constructor.kind(), name);
        match constructor {
            Constructor::Input(ctor) => {
                self.inputs.insert(name.to_string(), ctor);
            }
            Constructor::Field(ctor) => {
                self.fields.insert(name.to_string(), ctor);
            }
        }
    }

    pub fn register_input<F>(&mut self, name: &str, ctor: F)
    where
        F: Fn(Option<&str>) -> Input + Send + Sync + 'static,
    {
        self.register(name, Constructor::Input(Arc::new(ctor)));
    }

    pub fn register_field<F>(&mut self, name: &str, ctor: F)
    where
        F: Fn(&[Value]) -> Result<Field, FieldError> + Send + Sync + 'static,
    {
        self.register(name, Constructor::Field(Arc::new(ctor)));
    }

    /// Resolves a constructor, failing with the offending key when absent.
    pub fn resolve(&self, kind: RegistryKind, name: &str) -> Result<Constructor, RegistryError> {
        let found = match kind {
            RegistryKind::Input => self.inputs.get(name).cloned().map(Constructor::Input),
            RegistryKind::Field => self.fields.get(name).cloned().map(Constructor::Field),
        };
        found.ok_or_else(|| RegistryError::Unregistered {
            kind,
            name: name.to_string(),
        })
    }

    pub fn resolve_input(&self, name: &str) -> Result<&InputConstructor, RegistryError> {
        self.inputs
            .get(name)
            .ok_or_else(|| RegistryError::Unregistered {
                kind: RegistryKind::Input,
                name: name.to_string(),
            })
    }

    pub fn resolve_field(&self, name: &str) -> Result<&FieldConstructor, RegistryError> {
        self.fields
            .get(name)
            .ok_or_else(|| RegistryError::Unregistered {
                kind: RegistryKind::Field,
                name: name.to_string(),
            })
    }

    pub fn contains(&self, kind: RegistryKind, name: &str) -> bool {
        match kind {
            RegistryKind::Input => self.inputs.contains_key(name),
            RegistryKind::Field => self.fields.contains_key(name),
        }
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut inputs: Vec<_> = self.inputs.keys().collect();
        let mut fields: Vec<_> = self.fields.keys().collect();
        inputs.sort();
        fields.sort();
        f.debug_struct("ClassRegistry")
            .field("inputs", &inputs)
            .field("fields", &fields)
            .finish()
    }
}
