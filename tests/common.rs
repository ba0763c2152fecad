//! Common test utilities for building block plans and workspaces.
#![allow(dead_code)]
use blockplan::prelude::*;
use std::sync::Arc;

/// Builds a plan and defines it with the host.
pub fn define(host: &mut Host, data: BlockPlanData) -> Arc<BlockPlan> {
    let plan = Arc::new(BlockPlan::new(data).expect("Failed to build block plan"));
    plan.define_block(host).expect("Failed to define block");
    plan
}

/// `number`: a value block rendering its numeric field.
pub fn number_block() -> BlockPlanData {
    BlockPlanData::new("number", BlockKind::Value)
        .with_field(FieldPlanData::new("NUM", "number", vec![]))
        .with_output("Number")
        .with_code("{{NUM}}")
        .with_categories(&["Math"])
}

/// `add`: `{{A}} + {{B}}` over two numeric inputs.
pub fn add_block() -> BlockPlanData {
    BlockPlanData::new("add", BlockKind::Value)
        .with_input(InputPlanData::value("A").accepting(&["Number"]))
        .with_input(InputPlanData::value("B").accepting(&["Number"]))
        .with_output("Number")
        .with_code("{{A}} + {{B}}")
        .with_categories(&["Math"])
}

/// `text`: a value block producing a quoted string.
pub fn text_block() -> BlockPlanData {
    BlockPlanData::new("text", BlockKind::Value)
        .with_field(FieldPlanData::new("TEXT", "text_input", vec![]))
        .with_output("String")
        .with_code("\"{{TEXT}}\"")
        .with_categories(&["Text"])
}

/// `print`: a statement printing whatever is plugged into it.
pub fn print_block() -> BlockPlanData {
    BlockPlanData::new("print", BlockKind::Statement)
        .with_input(InputPlanData::value("VALUE"))
        .with_message("print %{VALUE}")
        .with_code("print({{VALUE}});")
}

/// `repeat`: a statement wrapping a statement body.
pub fn repeat_block() -> BlockPlanData {
    BlockPlanData::new("repeat", BlockKind::Statement)
        .with_field(FieldPlanData::new("TIMES", "number", vec![serde_json::json!(2)]))
        .with_input(InputPlanData::statement("DO"))
        .with_message("repeat %{TIMES} times\ndo %{DO}")
        .with_code("for (let i = 0; i < {{TIMES}}; i++) {\n{{DO}}}")
}

/// `object`: a branch choosing between one and many objects.
pub fn object_block() -> BlockPlanData {
    BlockPlanData::new("object", BlockKind::Value)
        .with_output("Object")
        .with_variants(vec![
            BlockVariantPlanData::leaf("single")
                .with_input(InputPlanData::value("OBJECT"))
                .with_code("get({{OBJECT}})"),
            BlockVariantPlanData::leaf("multiple")
                .with_input(InputPlanData::value("OBJECTS"))
                .with_code("getAll({{OBJECTS}})"),
        ])
}

/// A host with the number, add, text, print, repeat and object blocks.
pub fn math_host() -> Host {
    let mut host = Host::with_builtins();
    for data in [
        number_block(),
        add_block(),
        text_block(),
        print_block(),
        repeat_block(),
        object_block(),
    ] {
        define(&mut host, data);
    }
    host
}

/// Places a `number` block holding `value`.
pub fn number(host: &Host, workspace: &mut Workspace, value: i64) -> BlockId {
    let id = workspace
        .new_block(host, "number")
        .expect("Failed to create number block");
    workspace
        .set_field_value(host, id, "NUM", value.into())
        .expect("Failed to set number");
    id
}

/// Names of the inputs currently on a block, in display order.
pub fn input_names(block: &Block) -> Vec<String> {
    block
        .inputs()
        .map(|input| input.name.clone().unwrap_or_default())
        .collect()
}

/// Names of the inputs currently on a block, skipping unnamed layout inputs.
pub fn named_inputs(block: &Block) -> Vec<String> {
    block.inputs().filter_map(|input| input.name.clone()).collect()
}
