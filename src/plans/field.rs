use crate::error::PlanError;
use crate::host::{Block, ClassRegistry, FieldId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declarative description of one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldPlanData {
    pub name: String,
    /// Key into the field registry.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Constructor arguments for the field type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldPlanData {
    pub fn new(name: &str, field_type: &str, args: Vec<Value>) -> Self {
        Self {
            name: name.to_string(),
            field_type: field_type.to_string(),
            args,
            default: None,
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// A compiled field description that instantiates fields on blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPlan {
    pub name: String,
    pub field_type: String,
    pub args: Vec<Value>,
    pub default: Option<Value>,
}

impl FieldPlan {
    pub fn new(data: &FieldPlanData) -> Self {
        Self {
            name: data.name.clone(),
            field_type: data.field_type.clone(),
            args: data.args.clone(),
            default: data.default.clone(),
        }
    }

    /// Instantiates the field and adds it to the block's field arena.
    ///
    /// The type is looked up as given, then under its `field_`-prefixed name.
    /// A miss is reported under the type as declared.
    /// The field is named here rather than when it is attached to an input,
    /// so it is self-describing before it lands on the block's line.
    pub fn create_field(
        &self,
        block: &mut Block,
        registry: &ClassRegistry,
    ) -> Result<FieldId, PlanError> {
        let constructor = registry
            .resolve_field(&self.field_type)
            .or_else(|missing| {
                registry
                    .resolve_field(&format!("field_{}", self.field_type))
                    .map_err(|_| missing)
            })?;

        let mut field = constructor(&self.args)?;
        if let Some(default) = &self.default {
            field.set_value(default.clone())?;
        }
        field.name = Some(self.name.clone());
        Ok(block.adopt_field(field))
    }
}
