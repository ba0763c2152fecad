use crate::codegen::CodeGenerator;
use crate::error::{GenerateError, HostError, PlanError};
use crate::host::{
    Block, BlockDefinition, BlockGenerator, BlockState, ClassRegistry, ConnectionState, Host,
};
use crate::localization::Localization;
use crate::plans::{
    BlockPlanStep, BlockVariantLeaf, BlockVariantPlan, BlockVariantPlanData, CodeGenerationFunction,
    CodeShape, FieldPlanData, InputPlanData, OutputPlan, OutputPlanData, PlanContext,
    default_steps,
};
use crate::toolbox::{Toolbox, ToolboxItem};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// What kind of language construct a block represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Produces a value through an output connection.
    #[default]
    Value,
    /// Chains with other statements through previous and next connections.
    Statement,
    ValueAndStatement,
}

impl BlockKind {
    /// The shape `to_code` templates of this kind render to.
    pub fn code_shape(self) -> CodeShape {
        match self {
            BlockKind::Statement => CodeShape::Statement,
            BlockKind::Value | BlockKind::ValueAndStatement => CodeShape::Value,
        }
    }
}

/// The initial layout of a block's inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockOrientation {
    /// Inputs inline.
    #[default]
    Horizontal,
    /// Inputs stacked.
    Vertical,
}

/// Declarative description of a block type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockPlanData {
    pub name: String,
    #[serde(default)]
    pub kind: BlockKind,
    #[serde(default)]
    pub orientation: BlockOrientation,
    /// Toolbox categories listing this block.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<InputPlanData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldPlanData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputPlanData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<String>>,
    #[serde(default, alias = "toCode", skip_serializing_if = "Option::is_none")]
    pub to_code: Option<String>,
    #[serde(skip)]
    pub generator: Option<CodeGenerationFunction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<BlockVariantPlanData>>,
    /// Hue in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<u16>,
    /// Message of a block without variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BlockPlanData {
    pub fn new(name: &str, kind: BlockKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            ..Default::default()
        }
    }

    pub fn with_input(mut self, input: InputPlanData) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_field(mut self, field: FieldPlanData) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_output(mut self, output: impl Into<OutputPlanData>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_code(mut self, template: &str) -> Self {
        self.to_code = Some(template.to_string());
        self
    }

    pub fn with_generator(mut self, generator: CodeGenerationFunction) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn with_variants(mut self, variants: Vec<BlockVariantPlanData>) -> Self {
        self.variants = Some(variants);
        self
    }

    pub fn with_categories(mut self, categories: &[&str]) -> Self {
        self.categories = categories.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_orientation(mut self, orientation: BlockOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_colour(mut self, colour: u16) -> Self {
        self.colour = Some(colour);
        self
    }

    /// The root of the variant tree: a single leaf when no variants were
    /// declared, otherwise a branch named after the block.
    fn root_variant(&self) -> BlockVariantPlanData {
        BlockVariantPlanData {
            name: self.name.clone(),
            inputs: self.inputs.clone(),
            fields: self.fields.clone(),
            output: self.output.clone(),
            outputs: self.outputs.clone(),
            to_code: self.to_code.clone(),
            generator: self.generator.clone(),
            message: self.message.clone(),
            variants: self.variants.clone().filter(|variants| !variants.is_empty()),
        }
    }
}

/// Builds a [`BlockPlan`] with optional localization and extra steps.
pub struct BlockPlanBuilder<'a> {
    data: BlockPlanData,
    localization: Option<&'a Localization>,
    steps: Vec<Box<dyn BlockPlanStep>>,
}

impl<'a> BlockPlanBuilder<'a> {
    pub fn new(data: BlockPlanData) -> Self {
        let steps = default_steps(&data);
        Self {
            data,
            localization: None,
            steps,
        }
    }

    pub fn with_localization(mut self, localization: &'a Localization) -> Self {
        self.localization = Some(localization);
        self
    }

    pub fn with_step(mut self, step: Box<dyn BlockPlanStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn build(self) -> Result<BlockPlan, PlanError> {
        let fallback = Localization::default();
        let localization = self.localization.unwrap_or(&fallback);
        let context = PlanContext {
            shape: self.data.kind.code_shape(),
            localization,
        };
        let variants = BlockVariantPlan::new(&self.data.root_variant(), &context)?;
        let name = self.data.name;

        Ok(BlockPlan {
            tooltip: localization
                .localize(&format!("{}.TOOLTIP", name))
                .unwrap_or_default(),
            help_url: localization
                .localize(&format!("{}.HELP_URL", name))
                .unwrap_or_default(),
            name,
            kind: self.data.kind,
            orientation: self.data.orientation,
            categories: self.data.categories,
            variants,
            steps: self.steps,
        })
    }
}

/// A compiled block type: initializes new blocks of its type and attaches
/// their code generators.
#[derive(Debug)]
pub struct BlockPlan {
    pub name: String,
    pub kind: BlockKind,
    pub orientation: BlockOrientation,
    pub categories: Vec<String>,
    pub tooltip: String,
    pub help_url: String,
    pub variants: BlockVariantPlan,
    steps: Vec<Box<dyn BlockPlanStep>>,
}

impl BlockPlan {
    pub fn builder<'a>(data: BlockPlanData) -> BlockPlanBuilder<'a> {
        BlockPlanBuilder::new(data)
    }

    pub fn new(data: BlockPlanData) -> Result<Self, PlanError> {
        Self::builder(data).build()
    }

    /// Registers the plan as a block type with the host. Fails if a block
    /// type of the same name exists.
    pub fn define_block(self: &Arc<Self>, host: &mut Host) -> Result<(), HostError> {
        host.define_block_type(&self.name, self.clone(), Self::block_generator())?;
        log::debug!("Defined block type '{}'", self.name);
        Ok(())
    }

    /// Registers the plan as a block type, replacing any existing one.
    /// Returns whether a previous definition was replaced.
    pub fn redefine_block(self: &Arc<Self>, host: &mut Host) -> bool {
        let replaced = host.replace_block_type(&self.name, self.clone(), Self::block_generator());
        if replaced {
            log::debug!("Redefined block type '{}'", self.name);
        }
        replaced
    }

    /// Every block carries the generator of its active variant, so one
    /// generator serves all blocks of the type.
    fn block_generator() -> BlockGenerator {
        Arc::new(|block: &Block, generator: &CodeGenerator<'_>| match &block.generator {
            Some(function) => function.generate(block, generator),
            None => Err(GenerateError::NoFunctionAttached(block.type_name.clone())),
        })
    }

    /// Sets up a new block: runs the plan steps, applies the block's
    /// properties, builds its variant tree and lays out the active variant.
    pub fn initialize_block(
        &self,
        block: &mut Block,
        registry: &ClassRegistry,
    ) -> Result<(), PlanError> {
        for step in &self.steps {
            step.initialize_block(block);
        }

        block.set_tooltip(&self.tooltip);
        block.set_help_url(&self.help_url);
        block.set_inputs_inline(self.orientation == BlockOrientation::Horizontal);

        let variants = self.variants.construct_variant(block, registry, None)?;
        self.configure_block(block, variants.active_leaf());
        block.variants = Some(variants);
        Ok(())
    }

    /// Lays the block out from a leaf and sets its connections and generator.
    /// Re-callable: the previous line is cleared first.
    ///
    /// Statement and value-and-statement blocks always get previous and next
    /// connections, whether or not the leaf declares an output. A declared
    /// output only adds its type check to a statement block's connections.
    pub fn configure_block(&self, block: &mut Block, leaf: &BlockVariantLeaf) {
        block.clear_inputs();
        for entry in &leaf.line {
            block.append_input(entry.input, &entry.fields);
        }

        let has_output = leaf.output.is_some();
        let check = leaf.output.as_ref().and_then(OutputPlan::create_output);
        match self.kind {
            BlockKind::Value => {
                block.set_output(has_output, check);
                block.set_previous_statement(false, None);
                block.set_next_statement(false, None);
            }
            BlockKind::Statement => {
                block.set_output(false, None);
                block.set_previous_statement(true, check.clone());
                block.set_next_statement(true, check);
            }
            BlockKind::ValueAndStatement => {
                block.set_output(has_output, check);
                block.set_previous_statement(true, None);
                block.set_next_statement(true, None);
            }
        }

        block.generator = leaf.generator.clone();
    }

    /// Selects a variant of one of the block's branches, updates the
    /// branch's dropdown and lays the block out again.
    pub fn select_variant(
        &self,
        block: &mut Block,
        branch: &str,
        variant: &str,
    ) -> Result<(), PlanError> {
        let mut variants = block.variants.take().ok_or(PlanError::Uninitialized)?;

        let outcome = variants
            .find_branch_mut(branch)
            .ok_or_else(|| PlanError::UnknownBranch(branch.to_string()))
            .and_then(|node| node.select(variant).map(|()| node.dropdown))
            .and_then(|dropdown| {
                block
                    .field_mut(dropdown)
                    .set_value(Value::from(variant))
                    .map_err(PlanError::from)
            });

        if outcome.is_ok() {
            self.configure_block(block, variants.active_leaf());
            log::debug!(
                "Block {} switched '{}' to variant '{}'",
                block.id,
                branch,
                variant
            );
        }
        block.variants = Some(variants);
        outcome
    }

    /// The default state of a new block from the toolbox: shadow blocks for
    /// the root inputs and default values of the root fields. `None` when
    /// there is nothing to preset.
    pub fn generate_block_state(&self) -> Option<BlockState> {
        let scope = self.variants.scope();
        let mut state = BlockState::new(&self.name);

        for (name, input) in &scope.inputs {
            if let Some(shadow) = &input.shadow {
                state
                    .inputs
                    .insert(name.clone(), ConnectionState::shadow(shadow.to_state()));
            }
        }
        for (name, field) in &scope.fields {
            if let Some(default) = &field.default {
                state.fields.insert(name.clone(), default.clone());
            }
        }

        (!state.is_empty()).then_some(state)
    }

    pub fn generate_toolbox_entry(&self) -> ToolboxItem {
        ToolboxItem::Block(
            self.generate_block_state()
                .unwrap_or_else(|| BlockState::new(&self.name)),
        )
    }

    /// Lists the block in each of its categories, creating missing ones.
    pub fn define_toolbox_entry(&self, toolbox: &mut Toolbox) {
        toolbox.add_block(self.generate_toolbox_entry(), &self.categories);
    }
}

impl BlockDefinition for BlockPlan {
    fn init(&self, block: &mut Block, classes: &ClassRegistry) -> Result<(), PlanError> {
        self.initialize_block(block, classes)
    }

    /// Changing a branch's dropdown selects the chosen variant.
    fn on_field_changed(&self, block: &mut Block, field: &str) -> Result<(), PlanError> {
        let is_branch = block
            .variants
            .as_ref()
            .is_some_and(|variants| variants.find_branch(field).is_some());
        if !is_branch {
            return Ok(());
        }

        let selected = block
            .get_field_value(field)
            .and_then(Value::as_str)
            .map(str::to_string);
        match selected {
            Some(variant) => self.select_variant(block, field, &variant),
            None => Ok(()),
        }
    }
}
