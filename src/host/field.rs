use crate::error::FieldError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single `(label, value)` entry of a dropdown field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

/// The concrete behaviour of a field, which decides what values it accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Label,
    TextInput,
    MultilineTextInput,
    Number {
        min: Option<f64>,
        max: Option<f64>,
        precision: Option<f64>,
    },
    Checkbox,
    Dropdown(Vec<DropdownOption>),
    Variable,
    Image {
        src: String,
        width: f64,
        height: f64,
        alt: String,
    },
    Angle,
    Colour,
    Date,
    /// A field type supplied by a plugin. Accepts any value.
    Custom,
}

/// An inline, non-connection element of a block carrying a literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: Option<String>,
    pub type_name: String,
    pub kind: FieldKind,
    value: Value,
}

impl Field {
    pub fn new(type_name: &str, kind: FieldKind, value: Value) -> Self {
        Self {
            name: None,
            type_name: type_name.to_string(),
            kind,
            value,
        }
    }

    /// A non-editable text label.
    pub fn label(text: &str) -> Self {
        Self::new("label", FieldKind::Label, Value::String(text.to_string()))
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The dropdown options, if this is a dropdown field.
    pub fn options(&self) -> Option<&[DropdownOption]> {
        match &self.kind {
            FieldKind::Dropdown(options) => Some(options),
            _ => None,
        }
    }

    /// Validates and stores a new value.
    pub fn set_value(&mut self, value: Value) -> Result<(), FieldError> {
        self.value = self.validate(value)?;
        Ok(())
    }

    fn validate(&self, value: Value) -> Result<Value, FieldError> {
        let rejected = |value: Value| FieldError::InvalidValue {
            type_name: self.type_name.clone(),
            value,
        };

        match &self.kind {
            FieldKind::Checkbox => match &value {
                Value::Bool(_) => Ok(value),
                Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
                Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
                _ => Err(rejected(value)),
            },
            FieldKind::Number {
                min,
                max,
                precision,
            } => {
                let number = match &value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                let Some(mut number) = number.filter(|n| n.is_finite()) else {
                    return Err(rejected(value));
                };
                if let Some(precision) = precision.filter(|p| *p > 0.0) {
                    number = (number / precision).round() * precision;
                }
                if let Some(min) = min {
                    number = number.max(*min);
                }
                if let Some(max) = max {
                    number = number.min(*max);
                }
                Ok(number_value(number))
            }
            FieldKind::Dropdown(options) => {
                let accepted = value
                    .as_str()
                    .is_some_and(|v| options.iter().any(|o| o.value == v));
                if accepted {
                    Ok(value)
                } else {
                    Err(rejected(value))
                }
            }
            FieldKind::Angle => match value.as_f64() {
                Some(angle) => Ok(number_value(angle.rem_euclid(360.0))),
                None => Err(rejected(value)),
            },
            FieldKind::Label
            | FieldKind::TextInput
            | FieldKind::MultilineTextInput
            | FieldKind::Variable
            | FieldKind::Colour
            | FieldKind::Date => match value {
                Value::String(_) => Ok(value),
                Value::Number(n) => Ok(Value::String(n.to_string())),
                Value::Null => Ok(Value::String(String::new())),
                other => Err(rejected(other)),
            },
            FieldKind::Image { .. } | FieldKind::Custom => Ok(value),
        }
    }
}

/// Stores whole numbers as integers so they render without a trailing `.0`.
fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Value::from(number as i64)
    } else {
        Value::from(number)
    }
}
