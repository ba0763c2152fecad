use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The serializable state of a block and the blocks connected below it.
///
/// Toolbox entries carry a `BlockState` so that dragging a block out of the
/// palette pre-populates its inputs with shadow blocks and its fields with
/// default values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockState {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub inputs: IndexMap<String, ConnectionState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<ConnectionState>>,
}

impl BlockState {
    pub fn new(block_type: &str) -> Self {
        Self {
            block_type: block_type.to_string(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.inputs.is_empty() && self.next.is_none()
    }
}

/// What is plugged into a connection: a real block, a shadow, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<BlockState>,
}

impl ConnectionState {
    pub fn block(state: BlockState) -> Self {
        Self {
            block: Some(state),
            shadow: None,
        }
    }

    pub fn shadow(state: BlockState) -> Self {
        Self {
            block: None,
            shadow: Some(state),
        }
    }
}
