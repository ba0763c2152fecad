//! Code templates.
//!
//! Templates are Handlebars, compiled once with HTML escaping turned off and
//! rendered against a [`TemplateContext`] built from a block's inputs and
//! fields.
//!
//! | Syntax                                   | Meaning                               |
//! |------------------------------------------|---------------------------------------|
//! | `{{NAME}}`, `{{{NAME}}}`                 | interpolate a field or child block    |
//! | `{{toCode NAME}}`                        | render a child block                  |
//! | `{{#if NAME}}..{{else}}..{{/if}}`        | conditional on truthiness             |
//! | `{{#unless NAME}}..{{/unless}}`          | negated conditional                   |
//! | `{{! comment }}`                         | dropped                               |
//!
//! The rest of the Handlebars built-ins (`each`, `with`, `lookup`) work too.

use crate::codegen::CodeGenerator;
use crate::error::{GenerateError, TemplateError};
use crate::host::{Block, BlockId, InputKind};
use ahash::AHashMap;
use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde_json::{Map, Value};
use std::fmt;

const TEMPLATE_NAME: &str = "code";
const RENDER_CHILD_HELPER: &str = "toCode";

/// A compiled, immutable code template.
pub struct Template {
    source: String,
    registry: Handlebars<'static>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_helper(RENDER_CHILD_HELPER, Box::new(render_child_helper));
        registry
            .register_template_string(TEMPLATE_NAME, source)
            .map_err(|e| TemplateError::Syntax(e.to_string()))?;

        Ok(Self {
            source: source.to_string(),
            registry,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Renders the template. Child blocks in the context are generated
    /// through `generator` first; names missing from the context render as
    /// empty strings.
    pub fn render(
        &self,
        context: &TemplateContext,
        generator: &CodeGenerator<'_>,
    ) -> Result<String, GenerateError> {
        let data = context.to_data(generator)?;
        self.registry
            .render(TEMPLATE_NAME, &data)
            .map_err(|e| GenerateError::Render(e.to_string()))
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template").field("source", &self.source).finish()
    }
}

/// `{{toCode NAME}}`. Children are bound as their generated code, so the
/// helper writes the bound value out as is.
fn render_child_helper(
    helper: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    match helper.param(0).map(|param| param.value()) {
        Some(Value::String(code)) => out.write(code)?,
        Some(Value::Null) | None => {}
        Some(other) => out.write(&other.to_string())?,
    }
    Ok(())
}

/// A value bound to a name in the template context.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    /// A connected child block, rendered before the template runs.
    Block { id: BlockId, statement: bool },
    /// A literal, usually a field value.
    Value(Value),
}

/// The names a template can refer to.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    values: AHashMap<String, ContextValue>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds every named input of the block to its connected child (or an
    /// empty string when unplugged) and every named field to its value.
    ///
    /// Fields are bound after the input they sit on, so a field sharing an
    /// input's name shadows it. Block plans reject such collisions up front.
    pub fn from_block(block: &Block) -> Self {
        let mut context = Self::new();
        for input in block.inputs() {
            if let Some(name) = input.name.as_deref().filter(|n| !n.is_empty()) {
                let value = match input.target_block() {
                    Some(id) => ContextValue::Block {
                        id,
                        statement: input.kind == InputKind::Statement,
                    },
                    None => ContextValue::Value(Value::String(String::new())),
                };
                context.insert(name, value);
            }
            for field_id in &input.field_row {
                let field = block.field(*field_id);
                if let Some(name) = field.name.as_deref().filter(|n| !n.is_empty()) {
                    context.insert(name, ContextValue::Value(field.value().clone()));
                }
            }
        }
        context
    }

    pub fn insert(&mut self, name: &str, value: ContextValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ContextValue> {
        self.values.get(name)
    }

    /// The JSON object handed to Handlebars. Child blocks are generated
    /// through [`CodeGenerator::render_child`], statement bodies indented.
    pub fn to_data(&self, generator: &CodeGenerator<'_>) -> Result<Value, GenerateError> {
        let mut data = Map::new();
        for (name, value) in &self.values {
            let value = match value {
                ContextValue::Block { id, statement } => {
                    Value::String(generator.render_child(*id, *statement)?)
                }
                ContextValue::Value(value) => value.clone(),
            };
            data.insert(name.clone(), value);
        }
        Ok(Value::Object(data))
    }
}
