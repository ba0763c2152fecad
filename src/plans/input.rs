use crate::error::RegistryError;
use crate::host::{Block, BlockState, ClassRegistry, ConnectionState, InputId, InputKind};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declarative description of one input slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputPlanData {
    pub name: String,
    #[serde(default)]
    pub kind: InputKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowBlockData>,
    /// Accepted types. `None` accepts anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepts: Option<Vec<String>>,
}

impl InputPlanData {
    pub fn value(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn statement(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: InputKind::Statement,
            ..Default::default()
        }
    }

    pub fn accepting(mut self, types: &[&str]) -> Self {
        self.accepts = Some(types.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_shadow(mut self, shadow: ShadowBlockData) -> Self {
        self.shadow = Some(shadow);
        self
    }
}

/// A default child block placed into an input when nothing else is there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowBlockData {
    pub block: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<ShadowInputValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ShadowFieldValue>,
}

/// A shadow nested under a named input of another shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowInputValue {
    pub name: String,
    #[serde(flatten)]
    pub shadow: ShadowBlockData,
}

/// A field value preset on a shadow block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowFieldValue {
    pub name: String,
    #[serde(default)]
    pub default: Value,
}

impl ShadowBlockData {
    pub fn new(block: &str) -> Self {
        Self {
            block: block.to_string(),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, name: &str, value: Value) -> Self {
        self.fields.push(ShadowFieldValue {
            name: name.to_string(),
            default: value,
        });
        self
    }

    /// The block state that instantiates this shadow.
    pub fn to_state(&self) -> BlockState {
        let mut state = BlockState::new(&self.block);
        for field in &self.fields {
            state.fields.insert(field.name.clone(), field.default.clone());
        }
        for input in &self.inputs {
            state.inputs.insert(
                input.name.clone(),
                ConnectionState::shadow(input.shadow.to_state()),
            );
        }
        state
    }
}

/// A compiled input description that instantiates inputs on blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPlan {
    pub name: Option<String>,
    pub kind: InputKind,
    pub shadow: Option<ShadowBlockData>,
    pub accepted_types: Option<Vec<String>>,
}

static DUMMY_INPUT_PLAN: Lazy<InputPlan> = Lazy::new(|| InputPlan::unnamed(InputKind::Dummy));
static END_ROW_INPUT_PLAN: Lazy<InputPlan> = Lazy::new(|| InputPlan::unnamed(InputKind::EndRow));

impl InputPlan {
    pub fn new(data: &InputPlanData) -> Self {
        Self {
            name: Some(data.name.clone()),
            kind: data.kind.clone(),
            shadow: data.shadow.clone(),
            accepted_types: data.accepts.clone(),
        }
    }

    fn unnamed(kind: InputKind) -> Self {
        Self {
            name: None,
            kind,
            shadow: None,
            accepted_types: None,
        }
    }

    /// Instantiates the input through the registry and adds it to the
    /// block's input arena. Connection-bearing inputs are restricted to the
    /// plan's accepted types.
    pub fn create_input(
        &self,
        block: &mut Block,
        registry: &ClassRegistry,
    ) -> Result<InputId, RegistryError> {
        let constructor = registry.resolve_input(self.kind.registry_name())?;
        let mut input = constructor(self.name.as_deref());
        if input.connection.is_some() {
            input.set_check(self.accepted_types.clone());
        }
        Ok(block.adopt_input(input))
    }
}

/// Creates a layout-only input that ends the current row.
pub fn create_dummy_input(
    block: &mut Block,
    registry: &ClassRegistry,
) -> Result<InputId, RegistryError> {
    DUMMY_INPUT_PLAN.create_input(block, registry)
}

/// Creates a layout-only input that forces the next input onto a new row.
pub fn create_end_row_input(
    block: &mut Block,
    registry: &ClassRegistry,
) -> Result<InputId, RegistryError> {
    END_ROW_INPUT_PLAN.create_input(block, registry)
}
