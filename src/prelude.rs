//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the blockplan crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use blockplan::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let library_json = std::fs::read_to_string("path/to/library.json")?;
//! let library = BlockLibrary::from_json(&library_json)?;
//!
//! let mut host = Host::with_builtins();
//! let mut toolbox = Toolbox::new();
//! library.register(&mut host, &mut toolbox)?;
//!
//! println!("{}", serde_json::to_string_pretty(&toolbox)?);
//! # Ok(())
//! # }
//! ```

// Plans
pub use crate::plans::{
    BlockKind, BlockOrientation, BlockPlan, BlockPlanData, BlockVariantPlanData,
    CodeGenerationFunction, FieldPlanData, InputPlanData, OutputPlan, OutputPlanData,
    ShadowBlockData, stmt_code, value_code,
};

// Host runtime
pub use crate::host::{Block, BlockId, BlockState, ClassRegistry, ConnectionState, Host, Workspace};

// Code generation
pub use crate::codegen::{Code, CodeGenerator, GeneratorConfig, Order};

// Libraries, localization and toolbox
pub use crate::library::BlockLibrary;
pub use crate::localization::Localization;
pub use crate::toolbox::{Toolbox, ToolboxItem};

// Error types
pub use crate::error::{GenerateError, HostError, LibraryError, PlanError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
