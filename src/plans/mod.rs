//! The block-plan compiler.
//!
//! Plans are built once from declarative data ([`BlockPlanData`] and the
//! nested input, field, output and variant descriptions) and then used to
//! initialize every block of their type and to generate its code.

mod block;
mod code;
mod field;
mod input;
mod output;
mod steps;
mod variant;

pub use block::*;
pub use code::*;
pub use field::*;
pub use input::*;
pub use output::*;
pub use steps::*;
pub use variant::*;
