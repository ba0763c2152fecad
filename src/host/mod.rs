//! An in-process model of the visual editor's runtime.
//!
//! The block-plan compiler materializes blocks into this model and generates
//! code from it. It covers what the compiler needs from a host toolkit: block
//! instances with inputs, fields and typed connections, a class registry for
//! input and field types, the block-type and code-generator registries, and a
//! workspace holding connected block trees.

mod block;
mod field;
mod registry;
mod state;
mod workspace;

pub use block::*;
pub use field::*;
pub use registry::*;
pub use state::*;
pub use workspace::*;

use crate::codegen::{Code, CodeGenerator};
use crate::error::{GenerateError, HostError, PlanError};
use ahash::AHashMap;
use std::sync::Arc;

/// The initialization half of a block type: called once for every new block.
pub trait BlockDefinition: Send + Sync {
    fn init(&self, block: &mut Block, classes: &ClassRegistry) -> Result<(), PlanError>;

    /// Called after a named field on the block changed its value.
    fn on_field_changed(&self, _block: &mut Block, _field: &str) -> Result<(), PlanError> {
        Ok(())
    }
}

/// The code-generation half of a block type.
pub type BlockGenerator =
    Arc<dyn Fn(&Block, &CodeGenerator<'_>) -> Result<Code, GenerateError> + Send + Sync>;

/// Owns the class registry and the per-type block and generator registries.
#[derive(Default)]
pub struct Host {
    pub classes: ClassRegistry,
    definitions: AHashMap<String, Arc<dyn BlockDefinition>>,
    generators: AHashMap<String, BlockGenerator>,
}

impl Host {
    pub fn new(classes: ClassRegistry) -> Self {
        Self {
            classes,
            definitions: AHashMap::new(),
            generators: AHashMap::new(),
        }
    }

    /// A host whose class registry holds the built-in inputs and all bundled
    /// field types.
    pub fn with_builtins() -> Self {
        let mut classes = ClassRegistry::new();
        crate::inputs::register_builtin_inputs(&mut classes);
        crate::fields::register_builtin_fields(&mut classes);
        crate::fields::register_fields(&mut classes);
        crate::fields::register_extension_fields(&mut classes);
        Self::new(classes)
    }

    /// Registers a new block type. Fails if the name is already taken.
    pub fn define_block_type(
        &mut self,
        name: &str,
        definition: Arc<dyn BlockDefinition>,
        generator: BlockGenerator,
    ) -> Result<(), HostError> {
        if self.definitions.contains_key(name) {
            return Err(HostError::DuplicateBlockType(name.to_string()));
        }
        self.replace_block_type(name, definition, generator);
        Ok(())
    }

    /// Registers a block type, replacing any existing one of the same name.
    /// Returns whether a previous definition was replaced.
    pub fn replace_block_type(
        &mut self,
        name: &str,
        definition: Arc<dyn BlockDefinition>,
        generator: BlockGenerator,
    ) -> bool {
        let replaced = self
            .definitions
            .insert(name.to_string(), definition)
            .is_some();
        self.generators.insert(name.to_string(), generator);
        replaced
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn definition(&self, name: &str) -> Result<&Arc<dyn BlockDefinition>, HostError> {
        self.definitions
            .get(name)
            .ok_or_else(|| HostError::UnknownBlockType(name.to_string()))
    }

    /// Overrides only the code generator of a block type.
    pub fn set_generator(&mut self, name: &str, generator: BlockGenerator) {
        self.generators.insert(name.to_string(), generator);
    }

    pub fn generator(&self, name: &str) -> Option<&BlockGenerator> {
        self.generators.get(name)
    }
}
