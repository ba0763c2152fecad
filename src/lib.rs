//! # Blockplan - Declarative Block Compiler
//!
//! **Blockplan** turns declarative descriptions of visual programming blocks
//! into working block types for a block-based editor: it lays out each block's
//! inputs and fields from a message string, wires up typed connections, and
//! generates source code from connected block trees through templates.
//!
//! ## Core Workflow
//!
//! 1.  **Describe Your Blocks**: Write [`plans::BlockPlanData`] values, in Rust or as a
//!     JSON [`library::BlockLibrary`].
//! 2.  **Compile**: Build a [`plans::BlockPlan`] from each description. Variant trees,
//!     templates and name collisions are checked here.
//! 3.  **Define**: Register each plan with a [`host::Host`] (its block type and code
//!     generator) and list it in a [`toolbox::Toolbox`].
//! 4.  **Generate**: Place blocks in a [`host::Workspace`], connect them, and render
//!     the workspace with a [`codegen::CodeGenerator`].
//!
//! ## Quick Start
//!
//! ```rust
//! use blockplan::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     let mut host = Host::with_builtins();
//!
//!     let number = BlockPlanData::new("number", BlockKind::Value)
//!         .with_field(FieldPlanData::new("NUM", "number", vec![]))
//!         .with_output("Number")
//!         .with_code("{{NUM}}");
//!     let add = BlockPlanData::new("add", BlockKind::Value)
//!         .with_input(InputPlanData::value("A").accepting(&["Number"]))
//!         .with_input(InputPlanData::value("B").accepting(&["Number"]))
//!         .with_output("Number")
//!         .with_code("{{A}} + {{B}}");
//!
//!     for data in [number, add] {
//!         Arc::new(BlockPlan::new(data)?).define_block(&mut host)?;
//!     }
//!
//!     let mut workspace = Workspace::new();
//!     let sum = workspace.new_block(&host, "add")?;
//!     for (input, value) in [("A", 3), ("B", 4)] {
//!         let operand = workspace.new_block(&host, "number")?;
//!         workspace.set_field_value(&host, operand, "NUM", value.into())?;
//!         workspace.connect(sum, input, operand)?;
//!     }
//!
//!     let code = CodeGenerator::new(&host, &workspace).block_to_code(sum)?;
//!     assert_eq!(code, Code::Value("3 + 4".to_string(), Order::Atomic));
//!     Ok(())
//! }
//! ```

pub mod codegen;
pub mod colour;
pub mod error;
pub mod fields;
pub mod host;
pub mod inputs;
pub mod library;
pub mod localization;
pub mod message;
pub mod plans;
pub mod prelude;
pub mod toolbox;
