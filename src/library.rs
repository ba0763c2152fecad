//! Block libraries: collections of block plans loaded from JSON.

use crate::error::LibraryError;
use crate::host::Host;
use crate::localization::Localization;
use crate::plans::{BlockPlan, BlockPlanData};
use crate::toolbox::Toolbox;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// A named set of block descriptions and the messages they are localized
/// with.
///
/// ```json
/// {
///   "name": "math",
///   "messages": { "add": { "MESSAGE": "%{A} + %{B}" } },
///   "blocks": [ { "name": "add", "kind": "value", "output": "Number" } ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockLibrary {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub messages: Value,
    pub blocks: Vec<BlockPlanData>,
}

impl BlockLibrary {
    pub fn new(name: &str, blocks: Vec<BlockPlanData>) -> Self {
        Self {
            name: name.to_string(),
            messages: Value::Null,
            blocks,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, LibraryError> {
        serde_json::from_str(json).map_err(|e| LibraryError::JsonParseError(e.to_string()))
    }

    pub fn localization(&self) -> Localization {
        Localization::new(self.messages.clone())
    }

    /// Builds a plan for every block, in order.
    pub fn compile(&self) -> Result<Vec<Arc<BlockPlan>>, LibraryError> {
        let localization = self.localization();
        self.blocks
            .iter()
            .map(|data| {
                BlockPlan::builder(data.clone())
                    .with_localization(&localization)
                    .build()
                    .map(Arc::new)
                    .map_err(LibraryError::from)
            })
            .collect()
    }

    /// Compiles every block, defines it with the host and lists it in the
    /// toolbox. Stops at the first failure.
    pub fn register(
        &self,
        host: &mut Host,
        toolbox: &mut Toolbox,
    ) -> Result<Vec<Arc<BlockPlan>>, LibraryError> {
        let plans = self.compile()?;
        for plan in &plans {
            plan.define_block(host)?;
            plan.define_toolbox_entry(toolbox);
        }
        log::info!(
            "Registered {} block types from library '{}'",
            plans.len(),
            self.name
        );
        Ok(plans)
    }
}
