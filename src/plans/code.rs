use crate::codegen::{Code, CodeGenerator, Order, Template, TemplateContext};
use crate::error::{GenerateError, TemplateError};
use crate::host::{Block, BlockGenerator};
use std::fmt;
use std::sync::Arc;

/// Whether a template produces an expression or statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeShape {
    Value,
    Statement,
}

/// How a block variant turns into code: a pre-parsed template, or an
/// arbitrary function.
#[derive(Clone)]
pub enum CodeGenerationFunction {
    Template {
        template: Arc<Template>,
        shape: CodeShape,
    },
    Function(BlockGenerator),
}

impl CodeGenerationFunction {
    pub fn template(source: &str, shape: CodeShape) -> Result<Self, TemplateError> {
        Ok(CodeGenerationFunction::Template {
            template: Arc::new(Template::parse(source)?),
            shape,
        })
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Block, &CodeGenerator<'_>) -> Result<Code, GenerateError> + Send + Sync + 'static,
    {
        CodeGenerationFunction::Function(Arc::new(f))
    }

    pub fn generate(
        &self,
        block: &Block,
        generator: &CodeGenerator<'_>,
    ) -> Result<Code, GenerateError> {
        match self {
            CodeGenerationFunction::Template { template, shape } => {
                let context = TemplateContext::from_block(block);
                let code = template.render(&context, generator)?;
                Ok(match shape {
                    CodeShape::Value => Code::Value(code, Order::Atomic),
                    CodeShape::Statement => Code::Statement(code),
                })
            }
            CodeGenerationFunction::Function(f) => f(block, generator),
        }
    }
}

impl fmt::Debug for CodeGenerationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeGenerationFunction::Template { template, shape } => f
                .debug_struct("Template")
                .field("source", &template.source())
                .field("shape", shape)
                .finish(),
            CodeGenerationFunction::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// A generator rendering `template` as an atomic expression.
pub fn value_code(template: &str) -> Result<CodeGenerationFunction, TemplateError> {
    CodeGenerationFunction::template(template, CodeShape::Value)
}

/// A generator rendering `template` as statements.
pub fn stmt_code(template: &str) -> Result<CodeGenerationFunction, TemplateError> {
    CodeGenerationFunction::template(template, CodeShape::Statement)
}
