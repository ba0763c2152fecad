use serde::{Deserialize, Serialize};

/// The accepted ways of declaring what a block produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputPlanData {
    Null,
    Type(String),
    Types(Vec<String>),
    TypeObject { r#type: Box<OutputPlanData> },
    TypesObject { types: Box<OutputPlanData> },
}

impl From<&str> for OutputPlanData {
    fn from(value: &str) -> Self {
        OutputPlanData::Type(value.to_string())
    }
}

impl From<Vec<String>> for OutputPlanData {
    fn from(value: Vec<String>) -> Self {
        OutputPlanData::Types(value)
    }
}

impl From<Option<Vec<String>>> for OutputPlanData {
    fn from(value: Option<Vec<String>>) -> Self {
        value.map_or(OutputPlanData::Null, OutputPlanData::Types)
    }
}

/// The canonical form of an output declaration.
///
/// `types: None` matches any type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPlan {
    pub types: Option<Vec<String>>,
}

impl OutputPlan {
    /// Normalizes any accepted declaration shape.
    pub fn normalize(data: &OutputPlanData) -> Self {
        match data {
            OutputPlanData::Null => Self { types: None },
            OutputPlanData::Type(name) => Self {
                types: Some(vec![name.clone()]),
            },
            OutputPlanData::Types(names) => Self {
                types: Some(names.clone()),
            },
            OutputPlanData::TypeObject { r#type: inner }
            | OutputPlanData::TypesObject { types: inner } => Self::normalize(inner),
        }
    }

    /// The connection check for this output.
    pub fn create_output(&self) -> Option<Vec<String>> {
        self.types.clone()
    }
}

impl From<&OutputPlanData> for OutputPlan {
    fn from(data: &OutputPlanData) -> Self {
        Self::normalize(data)
    }
}
