//! The code-generation driver.
//!
//! A [`CodeGenerator`] walks a workspace and asks the generator registered for
//! each block's type to render it. Generators recurse into connected child
//! blocks through [`CodeGenerator::block_to_code`] and its helpers.

pub mod template;

pub use template::{ContextValue, Template, TemplateContext};

use crate::error::GenerateError;
use crate::host::{Block, BlockId, Host, Workspace};

/// Operator precedence of generated JavaScript expressions, loosest last.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Order {
    Atomic,
    New,
    Member,
    FunctionCall,
    Increment,
    Decrement,
    BitwiseNot,
    UnaryPlus,
    UnaryNegation,
    LogicalNot,
    Typeof,
    Void,
    Delete,
    Await,
    Exponentiation,
    Multiplication,
    Division,
    Modulus,
    Subtraction,
    Addition,
    BitwiseShift,
    Relational,
    In,
    Instanceof,
    Equality,
    BitwiseAnd,
    BitwiseXor,
    BitwiseOr,
    LogicalAnd,
    LogicalOr,
    Conditional,
    Assignment,
    Yield,
    Comma,
    None,
}

impl Order {
    pub fn precedence(self) -> f64 {
        match self {
            Order::Atomic => 0.0,
            Order::New => 1.1,
            Order::Member => 1.2,
            Order::FunctionCall => 2.0,
            Order::Increment | Order::Decrement => 3.0,
            Order::BitwiseNot => 4.1,
            Order::UnaryPlus => 4.2,
            Order::UnaryNegation => 4.3,
            Order::LogicalNot => 4.4,
            Order::Typeof => 4.5,
            Order::Void => 4.6,
            Order::Delete => 4.7,
            Order::Await => 4.8,
            Order::Exponentiation => 5.0,
            Order::Multiplication => 5.1,
            Order::Division => 5.2,
            Order::Modulus => 5.3,
            Order::Subtraction => 6.1,
            Order::Addition => 6.2,
            Order::BitwiseShift => 7.0,
            Order::Relational | Order::In | Order::Instanceof => 8.0,
            Order::Equality => 9.0,
            Order::BitwiseAnd => 10.0,
            Order::BitwiseXor => 11.0,
            Order::BitwiseOr => 12.0,
            Order::LogicalAnd => 13.0,
            Order::LogicalOr => 14.0,
            Order::Conditional => 15.0,
            Order::Assignment => 16.0,
            Order::Yield => 17.0,
            Order::Comma => 18.0,
            Order::None => 99.0,
        }
    }

    /// The precedence class: operators sharing a class bind equally tight.
    pub fn class(self) -> u32 {
        self.precedence().floor() as u32
    }

    /// Whether an expression tagged `inner` must be parenthesized when
    /// embedded in an operand position of `self`.
    pub fn needs_parentheses(self, inner: Order) -> bool {
        let (outer_class, inner_class) = (self.class(), inner.class());
        if outer_class > inner_class {
            return false;
        }
        if outer_class == inner_class && (outer_class == 0 || outer_class == 99) {
            return false;
        }
        !ORDER_OVERRIDES.contains(&(self, inner))
    }
}

/// `(outer, inner)` pairs of the same class that stay unparenthesized
/// because the operation is associative.
const ORDER_OVERRIDES: &[(Order, Order)] = &[
    (Order::FunctionCall, Order::Member),
    (Order::FunctionCall, Order::FunctionCall),
    (Order::Member, Order::Member),
    (Order::Member, Order::FunctionCall),
    (Order::LogicalNot, Order::LogicalNot),
    (Order::Multiplication, Order::Multiplication),
    (Order::Addition, Order::Addition),
    (Order::LogicalAnd, Order::LogicalAnd),
    (Order::LogicalOr, Order::LogicalOr),
];

/// The output of a block generator.
#[derive(Debug, Clone, PartialEq)]
pub enum Code {
    /// An expression and the precedence of its outermost operator.
    Value(String, Order),
    /// One or more complete statements.
    Statement(String),
}

impl Code {
    /// Drops the precedence tag, if any.
    pub fn into_code(self) -> String {
        match self {
            Code::Value(code, _) | Code::Statement(code) => code,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Code::Value(code, _) | Code::Statement(code) => code,
        }
    }
}

/// Settings for a generation pass.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Prefix added to every line of a nested statement body.
    pub indent: String,
    /// When set, a top-level block that fails to generate becomes a comment
    /// carrying the error instead of failing the whole pass.
    pub comment_errors: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            comment_errors: true,
        }
    }
}

/// Renders blocks of a workspace into source code.
pub struct CodeGenerator<'a> {
    host: &'a Host,
    workspace: &'a Workspace,
    config: GeneratorConfig,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(host: &'a Host, workspace: &'a Workspace) -> Self {
        Self::with_config(host, workspace, GeneratorConfig::default())
    }

    pub fn with_config(host: &'a Host, workspace: &'a Workspace, config: GeneratorConfig) -> Self {
        Self {
            host,
            workspace,
            config,
        }
    }

    pub fn workspace(&self) -> &'a Workspace {
        self.workspace
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates code for one block. Statement code includes every block
    /// chained below it through next connections. A value block with a
    /// statement chained below it is emitted as an expression statement
    /// followed by that chain.
    pub fn block_to_code(&self, id: BlockId) -> Result<Code, GenerateError> {
        let block = self
            .workspace
            .get(id)
            .ok_or(GenerateError::NoSuchBlock(id.0))?;
        let generator = self
            .host
            .generator(&block.type_name)
            .ok_or_else(|| GenerateError::MissingGenerator(block.type_name.clone()))?;
        let next = block.next.as_ref().and_then(|n| n.target);

        match (generator(block, self)?, next) {
            (Code::Statement(mut code), next) => {
                if !code.is_empty() && !code.ends_with('\n') {
                    code.push('\n');
                }
                if let Some(next) = next {
                    code.push_str(&self.chain_to_code(next)?);
                }
                Ok(Code::Statement(code))
            }
            (Code::Value(code, _), Some(next)) => Ok(Code::Statement(format!(
                "{};\n{}",
                code,
                self.chain_to_code(next)?
            ))),
            (value, None) => Ok(value),
        }
    }

    /// Generates a next-connected block as statements.
    fn chain_to_code(&self, id: BlockId) -> Result<String, GenerateError> {
        match self.block_to_code(id)? {
            Code::Value(code, _) => Ok(format!("{};\n", code)),
            Code::Statement(code) => Ok(code),
        }
    }

    /// Generates a connected child block and flattens it to plain code.
    /// Children of statement inputs are indented.
    pub fn render_child(&self, id: BlockId, statement: bool) -> Result<String, GenerateError> {
        let code = self.block_to_code(id)?.into_code();
        if statement {
            Ok(self.prefix_lines(&code))
        } else {
            Ok(code)
        }
    }

    /// Generates the expression plugged into a value input, parenthesized
    /// when its precedence binds looser than `outer`. Empty when unplugged.
    pub fn value_to_code(
        &self,
        block: &Block,
        input_name: &str,
        outer: Order,
    ) -> Result<String, GenerateError> {
        let Some(child) = self.target_of(block, input_name) else {
            return Ok(String::new());
        };
        match self.block_to_code(child)? {
            Code::Value(code, inner) if outer.needs_parentheses(inner) => Ok(format!("({})", code)),
            Code::Value(code, _) => Ok(code),
            Code::Statement(code) => Ok(code),
        }
    }

    /// Generates the indented statement chain plugged into a statement input.
    pub fn statement_to_code(
        &self,
        block: &Block,
        input_name: &str,
    ) -> Result<String, GenerateError> {
        match self.target_of(block, input_name) {
            Some(child) => self.render_child(child, true),
            None => Ok(String::new()),
        }
    }

    /// Generates every top-level block in creation order.
    pub fn workspace_to_code(&self) -> Result<String, GenerateError> {
        let mut out = String::new();
        for id in self.workspace.top_blocks() {
            match self.block_to_code(id) {
                Ok(Code::Value(code, _)) => {
                    out.push_str(&code);
                    out.push_str(";\n");
                }
                Ok(Code::Statement(code)) => {
                    out.push_str(&code);
                    if !code.ends_with('\n') {
                        out.push('\n');
                    }
                }
                Err(e) if self.config.comment_errors => {
                    log::warn!("Code generation failed for block {}: {}", id, e);
                    for line in e.to_string().lines() {
                        out.push_str("// ");
                        out.push_str(line);
                        out.push('\n');
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    fn target_of(&self, block: &Block, input_name: &str) -> Option<BlockId> {
        block
            .get_input(input_name)
            .and_then(|id| block.input(id).target_block())
    }

    fn prefix_lines(&self, code: &str) -> String {
        code.lines()
            .map(|line| {
                if line.is_empty() {
                    "\n".to_string()
                } else {
                    format!("{}{}\n", self.config.indent, line)
                }
            })
            .collect()
    }
}
