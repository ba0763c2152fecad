//! Branching block shapes.
//!
//! A block's plan is a tree of variants. Every node carries inputs, fields, an
//! output and a generator; descendants inherit and extend them. Branch nodes
//! offer a choice between their children through a synthesized dropdown, and
//! leaf nodes hold the concrete message that lays the block out.
//!
//! Instantiating the tree on a block yields a [`BlockVariant`] runtime tree.
//! Every input and field of every variant is created up front in the block's
//! arenas; switching variants only changes which of them are on the block's
//! line.

use crate::error::PlanError;
use crate::host::{Block, ClassRegistry, Field, FieldId, InputId};
use crate::localization::Localization;
use crate::message::{MessageTokenKind, tokenize_message};
use crate::plans::{
    CodeGenerationFunction, CodeShape, FieldPlan, FieldPlanData, InputPlan, InputPlanData,
    OutputPlan, OutputPlanData, create_dummy_input,
};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Declarative description of one variant.
///
/// `variants: Some(..)` makes this a branch, even when the list is empty
/// (which is rejected when the plan is built).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockVariantPlanData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<InputPlanData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldPlanData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputPlanData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<String>>,
    /// Template source compiled with the block kind's code shape.
    #[serde(default, alias = "toCode", skip_serializing_if = "Option::is_none")]
    pub to_code: Option<String>,
    /// Takes precedence over `to_code`.
    #[serde(skip)]
    pub generator: Option<CodeGenerationFunction>,
    /// Layout of a leaf. Ignored on branches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<BlockVariantPlanData>>,
}

impl BlockVariantPlanData {
    pub fn leaf(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn branch(name: &str, variants: Vec<BlockVariantPlanData>) -> Self {
        Self {
            name: name.to_string(),
            variants: Some(variants),
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

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
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

    /// The declared output, preferring `output` over `outputs`.
    pub(crate) fn output_plan(&self) -> Option<OutputPlan> {
        match (&self.output, &self.outputs) {
            (Some(output), _) => Some(OutputPlan::normalize(output)),
            (None, Some(types)) => Some(OutputPlan {
                types: Some(types.clone()),
            }),
            (None, None) => None,
        }
    }
}

/// What a variant plan needs from its surroundings while it is built.
#[derive(Debug, Clone, Copy)]
pub struct PlanContext<'a> {
    /// Shape that `to_code` templates are compiled with.
    pub shape: CodeShape,
    pub localization: &'a Localization,
}

/// Names visible to a variant from its ancestors, in declaration order.
#[derive(Debug, Clone, Default)]
struct InheritedNames {
    inputs: IndexSet<String>,
    fields: IndexSet<String>,
}

/// The inputs, fields, output and generator declared on one variant node.
#[derive(Debug, Clone)]
pub struct VariantScope {
    pub name: String,
    pub inputs: IndexMap<String, InputPlan>,
    pub fields: IndexMap<String, FieldPlan>,
    pub output: Option<OutputPlan>,
    pub generator: Option<CodeGenerationFunction>,
}

impl VariantScope {
    fn new(data: &BlockVariantPlanData, context: &PlanContext<'_>) -> Result<Self, PlanError> {
        let generator = match (&data.generator, &data.to_code) {
            (Some(generator), _) => Some(generator.clone()),
            (None, Some(source)) => Some(
                CodeGenerationFunction::template(source, context.shape).map_err(|source| {
                    PlanError::Template {
                        name: data.name.clone(),
                        source,
                    }
                })?,
            ),
            (None, None) => None,
        };

        let duplicate = data
            .inputs
            .iter()
            .map(|input| &input.name)
            .duplicates()
            .chain(data.fields.iter().map(|field| &field.name).duplicates())
            .next();
        if let Some(name) = duplicate {
            return Err(PlanError::DuplicateName {
                variant: data.name.clone(),
                name: name.clone(),
            });
        }

        Ok(Self {
            name: data.name.clone(),
            inputs: data
                .inputs
                .iter()
                .map(|input| (input.name.clone(), InputPlan::new(input)))
                .collect(),
            fields: data
                .fields
                .iter()
                .map(|field| (field.name.clone(), FieldPlan::new(field)))
                .collect(),
            output: data.output_plan(),
            generator,
        })
    }

    /// Rejects a name that would be both an input and a field once this
    /// scope is merged over the inherited one.
    fn check_collisions(&self, inherited: &InheritedNames) -> Result<(), PlanError> {
        let collision = self
            .inputs
            .keys()
            .find(|name| self.fields.contains_key(*name) || inherited.fields.contains(*name))
            .or_else(|| {
                self.fields
                    .keys()
                    .find(|name| inherited.inputs.contains(*name))
            });

        match collision {
            Some(name) => Err(PlanError::NameCollision {
                variant: self.name.clone(),
                name: name.clone(),
            }),
            None => Ok(()),
        }
    }

    fn extend_names(&self, inherited: &InheritedNames) -> InheritedNames {
        let mut names = inherited.clone();
        names.inputs.extend(self.inputs.keys().cloned());
        names.fields.extend(self.fields.keys().cloned());
        names
    }
}

/// A compiled variant tree.
#[derive(Debug, Clone)]
pub enum BlockVariantPlan {
    Branch(BlockVariantBranchPlan),
    Leaf(BlockVariantLeafPlan),
}

/// A variant offering a choice between named child variants.
#[derive(Debug, Clone)]
pub struct BlockVariantBranchPlan {
    pub scope: VariantScope,
    pub variants: IndexMap<String, BlockVariantPlan>,
}

/// A concrete variant with a message laying out the block.
#[derive(Debug, Clone)]
pub struct BlockVariantLeafPlan {
    pub scope: VariantScope,
    pub message: String,
}

impl BlockVariantPlan {
    pub fn new(data: &BlockVariantPlanData, context: &PlanContext<'_>) -> Result<Self, PlanError> {
        Self::build(data, context, &InheritedNames::default())
    }

    fn build(
        data: &BlockVariantPlanData,
        context: &PlanContext<'_>,
        inherited: &InheritedNames,
    ) -> Result<Self, PlanError> {
        let mut scope = VariantScope::new(data, context)?;

        let Some(children) = &data.variants else {
            scope.check_collisions(inherited)?;
            let message = match &data.message {
                Some(message) => message.clone(),
                None => context
                    .localization
                    .localize(&format!("{}.MESSAGE", data.name))
                    .unwrap_or_else(|| synthesize_message(&scope.extend_names(inherited))),
            };
            return Ok(BlockVariantPlan::Leaf(BlockVariantLeafPlan { scope, message }));
        };

        if children.is_empty() {
            return Err(PlanError::EmptyVariants(data.name.clone()));
        }

        let duplicate = children
            .iter()
            .map(|child| &child.name)
            .duplicates()
            .next()
            .or_else(|| scope.fields.contains_key(&data.name).then_some(&data.name));
        if let Some(name) = duplicate {
            return Err(PlanError::DuplicateName {
                variant: data.name.clone(),
                name: name.clone(),
            });
        }

        let options = children
            .iter()
            .map(|child| json!([child.name, child.name]))
            .collect::<Vec<_>>();
        scope.fields.insert(
            data.name.clone(),
            FieldPlan::new(&FieldPlanData::new(
                &data.name,
                "dropdown",
                vec![serde_json::Value::Array(options)],
            )),
        );
        scope.check_collisions(inherited)?;

        let names = scope.extend_names(inherited);
        let mut variants = IndexMap::new();
        for child in children {
            variants.insert(child.name.clone(), Self::build(child, context, &names)?);
        }
        Ok(BlockVariantPlan::Branch(BlockVariantBranchPlan { scope, variants }))
    }

    pub fn name(&self) -> &str {
        &self.scope().name
    }

    pub fn scope(&self) -> &VariantScope {
        match self {
            BlockVariantPlan::Branch(branch) => &branch.scope,
            BlockVariantPlan::Leaf(leaf) => &leaf.scope,
        }
    }

    /// Instantiates this subtree's inputs and fields on `block` and builds
    /// the runtime variant tree over them.
    pub fn construct_variant(
        &self,
        block: &mut Block,
        registry: &ClassRegistry,
        parent: Option<&BlockVariantProtoLeaf>,
    ) -> Result<BlockVariant, PlanError> {
        match self {
            BlockVariantPlan::Branch(plan) => {
                let proto = BlockVariantProtoLeaf::new(block, registry, &plan.scope, parent)?;
                let dropdown = proto.fields.get(&plan.scope.name).copied().ok_or_else(|| {
                    PlanError::UnknownParameter {
                        variant: plan.scope.name.clone(),
                        name: plan.scope.name.clone(),
                    }
                })?;

                let mut variants = IndexMap::new();
                for (name, variant) in &plan.variants {
                    variants.insert(
                        name.clone(),
                        variant.construct_variant(block, registry, Some(&proto))?,
                    );
                }
                Ok(BlockVariant::Branch(BlockVariantBranch {
                    name: plan.scope.name.clone(),
                    dropdown,
                    current: 0,
                    variants,
                }))
            }
            BlockVariantPlan::Leaf(plan) => {
                let proto = BlockVariantProtoLeaf::new(block, registry, &plan.scope, parent)?;
                proto
                    .finalize(block, registry, &plan.scope.name, &plan.message)
                    .map(BlockVariant::Leaf)
            }
        }
    }
}

/// Lists every field, then every input, as parameters separated by spaces.
fn synthesize_message(names: &InheritedNames) -> String {
    names
        .fields
        .iter()
        .chain(names.inputs.iter())
        .map(|name| format!("%{{{}}}", name))
        .join(" ")
}

/// The merged view of a variant and its ancestors on one block: everything a
/// leaf needs to lay itself out.
#[derive(Debug, Clone, Default)]
pub struct BlockVariantProtoLeaf {
    pub inputs: IndexMap<String, InputId>,
    pub fields: IndexMap<String, FieldId>,
    pub output: Option<OutputPlan>,
    pub generator: Option<CodeGenerationFunction>,
}

impl BlockVariantProtoLeaf {
    /// Creates the scope's own fields and inputs on the block and merges them
    /// over the parent's. Output and generator fall back to the parent's.
    pub fn new(
        block: &mut Block,
        registry: &ClassRegistry,
        scope: &VariantScope,
        parent: Option<&BlockVariantProtoLeaf>,
    ) -> Result<Self, PlanError> {
        let mut merged = parent.cloned().unwrap_or_default();

        for (name, plan) in &scope.fields {
            merged
                .fields
                .insert(name.clone(), plan.create_field(block, registry)?);
        }
        for (name, plan) in &scope.inputs {
            merged
                .inputs
                .insert(name.clone(), plan.create_input(block, registry)?);
        }

        if scope.output.is_some() {
            merged.output = scope.output.clone();
        }
        if scope.generator.is_some() {
            merged.generator = scope.generator.clone();
        }
        Ok(merged)
    }

    pub fn finalize(
        self,
        block: &mut Block,
        registry: &ClassRegistry,
        name: &str,
        message: &str,
    ) -> Result<BlockVariantLeaf, PlanError> {
        let line = self.construct_line(block, registry, name, message)?;
        Ok(BlockVariantLeaf {
            name: name.to_string(),
            line,
            output: self.output,
            generator: self.generator,
        })
    }

    /// Turns the message into the leaf's line.
    ///
    /// Fields only exist on inputs, so text labels and field parameters are
    /// buffered until the next input, newline or the end of the message.
    fn construct_line(
        &self,
        block: &mut Block,
        registry: &ClassRegistry,
        name: &str,
        message: &str,
    ) -> Result<Vec<LineEntry>, PlanError> {
        let mut line = Vec::new();
        let mut buffer = Vec::new();

        for token in tokenize_message(message) {
            match token.kind {
                MessageTokenKind::Text => {
                    buffer.push(block.adopt_field(Field::label(&token.value)));
                }
                MessageTokenKind::Newline => {
                    let input = create_dummy_input(block, registry)?;
                    line.push(LineEntry::new(input, std::mem::take(&mut buffer)));
                }
                MessageTokenKind::ParameterName => {
                    if let Some(input) = self.inputs.get(&token.value) {
                        line.push(LineEntry::new(*input, std::mem::take(&mut buffer)));
                    } else if let Some(field) = self.fields.get(&token.value) {
                        buffer.push(*field);
                    } else {
                        return Err(PlanError::UnknownParameter {
                            variant: name.to_string(),
                            name: token.value,
                        });
                    }
                }
            }
        }

        if !buffer.is_empty() {
            let input = create_dummy_input(block, registry)?;
            line.push(LineEntry::new(input, buffer));
        }
        Ok(line)
    }
}

/// One input on a leaf's line and the fields displayed before it.
#[derive(Debug, Clone, PartialEq)]
pub struct LineEntry {
    pub input: InputId,
    pub fields: Vec<FieldId>,
}

impl LineEntry {
    pub fn new(input: InputId, fields: Vec<FieldId>) -> Self {
        Self { input, fields }
    }
}

/// The runtime variant tree of one block.
#[derive(Debug, Clone)]
pub enum BlockVariant {
    Branch(BlockVariantBranch),
    Leaf(BlockVariantLeaf),
}

#[derive(Debug, Clone)]
pub struct BlockVariantBranch {
    pub name: String,
    /// The dropdown choosing between the variants.
    pub dropdown: FieldId,
    current: usize,
    pub variants: IndexMap<String, BlockVariant>,
}

#[derive(Debug, Clone)]
pub struct BlockVariantLeaf {
    pub name: String,
    pub line: Vec<LineEntry>,
    pub output: Option<OutputPlan>,
    pub generator: Option<CodeGenerationFunction>,
}

impl BlockVariant {
    /// Follows the selected variant of every branch down to a leaf.
    pub fn active_leaf(&self) -> &BlockVariantLeaf {
        let mut node = self;
        loop {
            match node {
                BlockVariant::Branch(branch) => node = branch.selected(),
                BlockVariant::Leaf(leaf) => return leaf,
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BlockVariant::Branch(branch) => &branch.name,
            BlockVariant::Leaf(leaf) => &leaf.name,
        }
    }

    /// Finds a branch by name anywhere in the tree, selected or not.
    pub fn find_branch(&self, name: &str) -> Option<&BlockVariantBranch> {
        match self {
            BlockVariant::Branch(branch) if branch.name == name => Some(branch),
            BlockVariant::Branch(branch) => branch
                .variants
                .values()
                .find_map(|variant| variant.find_branch(name)),
            BlockVariant::Leaf(_) => None,
        }
    }

    pub fn find_branch_mut(&mut self, name: &str) -> Option<&mut BlockVariantBranch> {
        match self {
            BlockVariant::Branch(branch) => {
                if branch.name == name {
                    return Some(branch);
                }
                branch
                    .variants
                    .values_mut()
                    .find_map(|variant| variant.find_branch_mut(name))
            }
            BlockVariant::Leaf(_) => None,
        }
    }
}

impl BlockVariantBranch {
    /// The name of the selected variant.
    pub fn current(&self) -> &str {
        self.variants
            .get_index(self.current)
            .map_or("", |(name, _)| name.as_str())
    }

    pub fn selected(&self) -> &BlockVariant {
        &self.variants[self.current]
    }

    pub fn select(&mut self, variant: &str) -> Result<(), PlanError> {
        self.current =
            self.variants
                .get_index_of(variant)
                .ok_or_else(|| PlanError::UnknownVariant {
                    branch: self.name.clone(),
                    variant: variant.to_string(),
                })?;
        Ok(())
    }
}
