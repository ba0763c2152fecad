//! Field types known to the class registry.
//!
//! Each constructor takes the field's JSON constructor arguments, in the order
//! the editor's own field classes take them. Missing trailing arguments fall
//! back to the same defaults the editor uses.

use crate::error::FieldError;
use crate::host::{ClassRegistry, DropdownOption, Field, FieldKind};
use serde_json::Value;

macro_rules! register_field_types {
    ($registry:expr; $( $name:expr => $ctor:path ),* $(,)?) => {
        $( $registry.register_field($name, $ctor); )*
    };
}

/// Registers the editor's own field classes under their `field_`-prefixed
/// names.
pub fn register_builtin_fields(registry: &mut ClassRegistry) {
    register_field_types! { registry;
        "field_label" => label,
        "field_input" => text_input,
        "field_number" => number,
        "field_checkbox" => checkbox,
        "field_dropdown" => dropdown,
        "field_variable" => variable,
        "field_image" => image,
    }
}

/// Registers the short names block libraries use for the core field types.
pub fn register_fields(registry: &mut ClassRegistry) {
    register_field_types! { registry;
        "checkbox" => checkbox,
        "dropdown" => dropdown,
        "image" => image,
        "number" => number,
        "text_input" => text_input,
        "variable" => variable,
        "label" => label,
    }
}

/// Registers the plugin field types.
pub fn register_extension_fields(registry: &mut ClassRegistry) {
    register_field_types! { registry;
        "angle" => angle,
        "colour" => colour,
        "colour_hsv" => colour,
        "date" => date,
        "multiline_text_input" => multiline_text_input,
    }
}

fn label(args: &[Value]) -> Result<Field, FieldError> {
    Ok(Field::label(&string_arg(args, 0, "")))
}

fn text_input(args: &[Value]) -> Result<Field, FieldError> {
    Ok(Field::new(
        "text_input",
        FieldKind::TextInput,
        Value::String(string_arg(args, 0, "")),
    ))
}

fn multiline_text_input(args: &[Value]) -> Result<Field, FieldError> {
    Ok(Field::new(
        "multiline_text_input",
        FieldKind::MultilineTextInput,
        Value::String(string_arg(args, 0, "")),
    ))
}

fn number(args: &[Value]) -> Result<Field, FieldError> {
    let mut field = Field::new(
        "number",
        FieldKind::Number {
            min: number_arg(args, 1),
            max: number_arg(args, 2),
            precision: number_arg(args, 3),
        },
        Value::from(0),
    );
    field.set_value(first_non_null(args).unwrap_or(Value::from(0)))?;
    Ok(field)
}

fn checkbox(args: &[Value]) -> Result<Field, FieldError> {
    let mut field = Field::new("checkbox", FieldKind::Checkbox, Value::Bool(false));
    if let Some(value) = first_non_null(args) {
        field.set_value(value)?;
    }
    Ok(field)
}

fn dropdown(args: &[Value]) -> Result<Field, FieldError> {
    let invalid = |message: &str| FieldError::InvalidArguments {
        type_name: "dropdown".to_string(),
        message: message.to_string(),
    };

    let entries = args
        .first()
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("expected an array of options"))?;

    let options = entries
        .iter()
        .map(|entry| match entry {
            Value::String(value) => Some(DropdownOption {
                label: value.clone(),
                value: value.clone(),
            }),
            Value::Array(pair) => match (pair.first(), pair.get(1)) {
                (Some(Value::String(label)), Some(Value::String(value))) => Some(DropdownOption {
                    label: label.clone(),
                    value: value.clone(),
                }),
                _ => None,
            },
            _ => None,
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| invalid("each option must be a string or a [label, value] pair"))?;

    let first = options
        .first()
        .map(|o| o.value.clone())
        .ok_or_else(|| invalid("a dropdown needs at least one option"))?;

    Ok(Field::new(
        "dropdown",
        FieldKind::Dropdown(options),
        Value::String(first),
    ))
}

fn variable(args: &[Value]) -> Result<Field, FieldError> {
    Ok(Field::new(
        "variable",
        FieldKind::Variable,
        Value::String(string_arg(args, 0, "item")),
    ))
}

fn image(args: &[Value]) -> Result<Field, FieldError> {
    let src = string_arg(args, 0, "");
    Ok(Field::new(
        "image",
        FieldKind::Image {
            src: src.clone(),
            width: number_arg(args, 1).unwrap_or(15.0),
            height: number_arg(args, 2).unwrap_or(15.0),
            alt: string_arg(args, 3, ""),
        },
        Value::String(src),
    ))
}

fn angle(args: &[Value]) -> Result<Field, FieldError> {
    let mut field = Field::new("angle", FieldKind::Angle, Value::from(0));
    field.set_value(first_non_null(args).unwrap_or(Value::from(0)))?;
    Ok(field)
}

fn colour(args: &[Value]) -> Result<Field, FieldError> {
    Ok(Field::new(
        "colour",
        FieldKind::Colour,
        Value::String(string_arg(args, 0, "#ff0000")),
    ))
}

fn date(args: &[Value]) -> Result<Field, FieldError> {
    Ok(Field::new(
        "date",
        FieldKind::Date,
        Value::String(string_arg(args, 0, "")),
    ))
}

fn string_arg(args: &[Value], index: usize, default: &str) -> String {
    match args.get(index) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

fn first_non_null(args: &[Value]) -> Option<Value> {
    args.first().filter(|v| !v.is_null()).cloned()
}

fn number_arg(args: &[Value], index: usize) -> Option<f64> {
    args.get(index).and_then(Value::as_f64)
}
