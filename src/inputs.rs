//! Input types known to the class registry.

use crate::host::{ClassRegistry, Input, InputKind};

/// Registers the four built-in input kinds: `value`, `statement`, `dummy`
/// and `end_row`.
pub fn register_builtin_inputs(registry: &mut ClassRegistry) {
    registry.register_input("value", |name| Input::new(name, InputKind::Value, true));
    registry.register_input("statement", |name| {
        Input::new(name, InputKind::Statement, true)
    });
    registry.register_input("dummy", |name| Input::new(name, InputKind::Dummy, false));
    registry.register_input("end_row", |name| Input::new(name, InputKind::EndRow, false));
}
