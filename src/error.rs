use crate::host::RegistryKind;
use thiserror::Error;

/// Errors raised by the class registry when a field or input type is missing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Unregistered {kind} type: '{name}'")]
    Unregistered { kind: RegistryKind, name: String },
}

/// Errors that can occur when constructing or updating a field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("Invalid arguments for field type '{type_name}': {message}")]
    InvalidArguments { type_name: String, message: String },

    #[error("Field type '{type_name}' rejected value '{value}'")]
    InvalidValue {
        type_name: String,
        value: serde_json::Value,
    },
}

/// Errors that can occur while compiling a code-generation template.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("{0}")]
    Syntax(String),
}

/// Configuration errors in block plans. These indicate an authoring bug in a
/// block library and are raised at plan construction or block instantiation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("No variants found in branch plan '{0}'")]
    EmptyVariants(String),

    #[error("Variant '{variant}' has no such input or field: '{name}'")]
    UnknownParameter { variant: String, name: String },

    #[error("Variant '{variant}' declares '{name}' as both an input and a field")]
    NameCollision { variant: String, name: String },

    #[error("Variant '{variant}' declares '{name}' more than once")]
    DuplicateName { variant: String, name: String },

    #[error("Branch '{branch}' has no variant named '{variant}'")]
    UnknownVariant { branch: String, variant: String },

    #[error("Block has no variant branch named '{0}'")]
    UnknownBranch(String),

    #[error("Block has not been initialized with a variant tree")]
    Uninitialized,

    #[error("Invalid template for '{name}': {source}")]
    Template {
        name: String,
        #[source]
        source: TemplateError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Errors surfaced by the host runtime (block definitions and workspaces).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("Block type '{0}' is already defined")]
    DuplicateBlockType(String),

    #[error("Block type '{0}' is not defined")]
    UnknownBlockType(String),

    #[error("Block {0} does not exist in this workspace")]
    NoSuchBlock(usize),

    #[error("Block '{block_type}' has no input named '{input}'")]
    NoSuchInput { block_type: String, input: String },

    #[error("Block '{block_type}' has no field named '{field}'")]
    NoSuchField { block_type: String, field: String },

    #[error("Cannot connect '{child_type}' to '{parent_type}': {message}")]
    ConnectionError {
        parent_type: String,
        child_type: String,
        message: String,
    },

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Errors that can occur while generating code from a workspace.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerateError {
    #[error("No code generator registered for block type '{0}'")]
    MissingGenerator(String),

    #[error("Block '{0}' has no code generation function attached")]
    NoFunctionAttached(String),

    #[error("Block {0} does not exist in this workspace")]
    NoSuchBlock(usize),

    #[error("Failed to render template: {0}")]
    Render(String),

    #[error("{0}")]
    Custom(String),
}

/// Errors that can occur when loading a block library.
#[derive(Error, Debug, Clone)]
pub enum LibraryError {
    #[error("Failed to parse block library JSON: {0}")]
    JsonParseError(String),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Host(#[from] HostError),
}
