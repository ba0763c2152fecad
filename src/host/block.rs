use crate::host::Field;
use crate::plans::{BlockVariant, CodeGenerationFunction};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a block within a [`crate::host::Workspace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

/// Indexes the input arena of a single block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputId(pub usize);

/// Indexes the field arena of a single block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub usize);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The built-in input kinds. Plugins may register further kinds under other
/// names; those are carried as `Custom`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    #[default]
    Value,
    Statement,
    Dummy,
    EndRow,
    #[serde(untagged)]
    Custom(String),
}

impl InputKind {
    /// The registry key for this kind.
    pub fn registry_name(&self) -> &str {
        match self {
            InputKind::Value => "value",
            InputKind::Statement => "statement",
            InputKind::Dummy => "dummy",
            InputKind::EndRow => "end_row",
            InputKind::Custom(name) => name,
        }
    }
}

/// A typed connection point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connection {
    /// Accepted types. `None` accepts anything.
    pub check: Option<Vec<String>>,
    /// The block on the other end, if any.
    pub target: Option<BlockId>,
}

impl Connection {
    pub fn with_check(check: Option<Vec<String>>) -> Self {
        Self {
            check,
            target: None,
        }
    }

    pub fn set_check(&mut self, check: Option<Vec<String>>) {
        self.check = check;
    }

    /// Two checks are compatible when either accepts anything or they share a type.
    pub fn is_compatible(&self, other: &Connection) -> bool {
        match (&self.check, &other.check) {
            (None, _) | (_, None) => true,
            (Some(ours), Some(theirs)) => ours.iter().any(|t| theirs.contains(t)),
        }
    }
}

/// A slot on a block: a value or statement socket, or a layout-only row.
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub name: Option<String>,
    pub kind: InputKind,
    pub field_row: Vec<FieldId>,
    pub connection: Option<Connection>,
}

impl Input {
    pub fn new(name: Option<&str>, kind: InputKind, has_connection: bool) -> Self {
        Self {
            name: name.map(str::to_string),
            kind,
            field_row: Vec::new(),
            connection: has_connection.then(Connection::default),
        }
    }

    pub fn set_check(&mut self, check: Option<Vec<String>>) {
        if let Some(connection) = &mut self.connection {
            connection.set_check(check);
        }
    }

    pub fn target_block(&self) -> Option<BlockId> {
        self.connection.as_ref().and_then(|c| c.target)
    }
}

/// One instance of a block type.
///
/// Every input and field ever created for the block lives in its arenas; the
/// current visual line is `input_list`, which the active variant rewrites.
#[derive(Clone)]
pub struct Block {
    pub id: BlockId,
    pub type_name: String,
    pub colour: u16,
    pub tooltip: String,
    pub help_url: String,
    pub inputs_inline: bool,
    pub is_shadow: bool,
    pub output: Option<Connection>,
    pub previous: Option<Connection>,
    pub next: Option<Connection>,
    pub parent: Option<BlockId>,
    pub variants: Option<BlockVariant>,
    pub generator: Option<CodeGenerationFunction>,
    input_arena: Vec<Input>,
    field_arena: Vec<Field>,
    input_list: Vec<InputId>,
}

impl Block {
    pub fn new(id: BlockId, type_name: &str) -> Self {
        Self {
            id,
            type_name: type_name.to_string(),
            colour: 0,
            tooltip: String::new(),
            help_url: String::new(),
            inputs_inline: false,
            is_shadow: false,
            output: None,
            previous: None,
            next: None,
            parent: None,
            variants: None,
            generator: None,
            input_arena: Vec::new(),
            field_arena: Vec::new(),
            input_list: Vec::new(),
        }
    }

    pub fn set_colour(&mut self, hue: u16) {
        self.colour = hue;
    }

    pub fn set_tooltip(&mut self, tooltip: &str) {
        self.tooltip = tooltip.to_string();
    }

    pub fn set_help_url(&mut self, url: &str) {
        self.help_url = url.to_string();
    }

    pub fn set_inputs_inline(&mut self, inline: bool) {
        self.inputs_inline = inline;
    }

    /// Enables or disables the output connection, keeping any existing target.
    pub fn set_output(&mut self, enabled: bool, check: Option<Vec<String>>) {
        self.output = toggle_connection(self.output.take(), enabled, check);
    }

    pub fn set_previous_statement(&mut self, enabled: bool, check: Option<Vec<String>>) {
        self.previous = toggle_connection(self.previous.take(), enabled, check);
    }

    pub fn set_next_statement(&mut self, enabled: bool, check: Option<Vec<String>>) {
        self.next = toggle_connection(self.next.take(), enabled, check);
    }

    /// Adds an input to the arena without placing it on the block's line.
    pub fn adopt_input(&mut self, input: Input) -> InputId {
        self.input_arena.push(input);
        InputId(self.input_arena.len() - 1)
    }

    /// Adds a field to the arena without attaching it to an input.
    pub fn adopt_field(&mut self, field: Field) -> FieldId {
        self.field_arena.push(field);
        FieldId(self.field_arena.len() - 1)
    }

    pub fn input(&self, id: InputId) -> &Input {
        &self.input_arena[id.0]
    }

    pub fn input_mut(&mut self, id: InputId) -> &mut Input {
        &mut self.input_arena[id.0]
    }

    pub fn field(&self, id: FieldId) -> &Field {
        &self.field_arena[id.0]
    }

    pub fn field_mut(&mut self, id: FieldId) -> &mut Field {
        &mut self.field_arena[id.0]
    }

    /// Clears the visible line of inputs.
    pub fn clear_inputs(&mut self) {
        self.input_list.clear();
    }

    /// Replaces an input's field row and appends it to the visible line.
    pub fn append_input(&mut self, input: InputId, fields: &[FieldId]) {
        self.input_arena[input.0].field_row = fields.to_vec();
        self.input_list.push(input);
    }

    /// The inputs currently on the block, in display order.
    pub fn inputs(&self) -> impl Iterator<Item = &Input> {
        self.input_list.iter().map(|id| &self.input_arena[id.0])
    }

    pub fn input_ids(&self) -> &[InputId] {
        &self.input_list
    }

    /// Every input in the arena, including those of inactive variants.
    pub fn all_input_ids(&self) -> Vec<InputId> {
        (0..self.input_arena.len()).map(InputId).collect()
    }

    /// Finds a visible input by name.
    pub fn get_input(&self, name: &str) -> Option<InputId> {
        self.input_list
            .iter()
            .copied()
            .find(|id| self.input_arena[id.0].name.as_deref() == Some(name))
    }

    /// Finds a visible field by name.
    pub fn get_field(&self, name: &str) -> Option<FieldId> {
        self.inputs()
            .flat_map(|input| input.field_row.iter().copied())
            .find(|id| self.field_arena[id.0].name.as_deref() == Some(name))
    }

    pub fn get_field_value(&self, name: &str) -> Option<&serde_json::Value> {
        self.get_field(name).map(|id| self.field(id).value())
    }

    /// Every visible field, in display order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.inputs()
            .flat_map(|input| input.field_row.iter().map(|id| &self.field_arena[id.0]))
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("inputs", &self.inputs().collect::<Vec<_>>())
            .field("output", &self.output)
            .field("previous", &self.previous)
            .field("next", &self.next)
            .finish_non_exhaustive()
    }
}

fn toggle_connection(
    existing: Option<Connection>,
    enabled: bool,
    check: Option<Vec<String>>,
) -> Option<Connection> {
    if !enabled {
        return None;
    }
    let mut connection = existing.unwrap_or_default();
    connection.set_check(check);
    Some(connection)
}
