//! Toolbox generation and block library loading tests.
mod common;
use blockplan::colour::colour_from_string;
use blockplan::error::{HostError, LibraryError};
use blockplan::plans::ShadowBlockData;
use blockplan::prelude::*;
use blockplan::toolbox::ToolboxCategory;
use common::*;
use serde_json::json;

const LIBRARY: &str = r#"{
    "name": "arithmetic",
    "messages": {
        "sum": { "MESSAGE": "%{A} plus %{B}", "TOOLTIP": "Adds two numbers" }
    },
    "blocks": [
        {
            "name": "literal",
            "kind": "value",
            "categories": ["Numbers"],
            "fields": [{ "name": "N", "type": "number", "default": 1 }],
            "output": "Number",
            "toCode": "{{N}}"
        },
        {
            "name": "sum",
            "categories": ["Numbers", "Operators"],
            "inputs": [
                { "name": "A", "accepts": ["Number"], "shadow": { "block": "literal" } },
                { "name": "B", "accepts": ["Number"] }
            ],
            "output": { "type": "Number" },
            "toCode": "{{A}} + {{B}}"
        },
        {
            "name": "log",
            "kind": "statement",
            "inputs": [{ "name": "VALUE" }],
            "message": "log %{VALUE}",
            "toCode": "console.log({{VALUE}});"
        }
    ]
}"#;

#[test_log::test]
fn test_entries_join_existing_categories() {
    let mut host = Host::with_builtins();
    let plan = define(&mut host, number_block());
    let mut toolbox = Toolbox::from_json(
        r##"{"kind": "categoryToolbox", "contents": [
            {"kind": "category", "name": "Math", "colour": "#123456", "contents": []}
        ]}"##,
    )
    .expect("valid toolbox");

    plan.define_toolbox_entry(&mut toolbox);

    assert_eq!(toolbox.contents.len(), 1);
    let math = toolbox.category("Math").expect("Math category");
    assert_eq!(math.colour.as_deref(), Some("#123456"));
    assert_eq!(math.block_types().collect::<Vec<_>>(), vec!["number"]);
}

#[test_log::test]
fn test_missing_categories_are_created_with_a_colour() {
    let mut host = Host::with_builtins();
    let plan = define(
        &mut host,
        text_block().with_categories(&["Text", "Strings", "Text"]),
    );
    let mut toolbox = Toolbox::new();

    plan.define_toolbox_entry(&mut toolbox);

    let names: Vec<_> = toolbox.categories().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Text", "Strings"]);
    let text = toolbox.category("Text").expect("Text category");
    assert_eq!(text.colour, Some(colour_from_string("Text")));
    assert_eq!(text.block_types().count(), 1);
}

#[test_log::test]
fn test_blocks_without_categories_are_not_listed() {
    let mut host = Host::with_builtins();
    let plan = define(&mut host, print_block());
    let mut toolbox = Toolbox::new();
    plan.define_toolbox_entry(&mut toolbox);
    assert!(toolbox.contents.is_empty());
}

#[test_log::test]
fn test_entries_carry_shadows_and_field_defaults() {
    let mut host = Host::with_builtins();
    define(&mut host, number_block());
    let plan = define(
        &mut host,
        BlockPlanData::new("scale", BlockKind::Value)
            .with_field(FieldPlanData::new("UNIT", "text_input", vec![]).with_default(json!("cm")))
            .with_input(
                InputPlanData::value("BY")
                    .with_shadow(ShadowBlockData::new("number").with_field("NUM", json!(10))),
            )
            .with_output("Number")
            .with_code("{{BY}}{{UNIT}}"),
    );

    let ToolboxItem::Block(state) = plan.generate_toolbox_entry() else {
        panic!("expected a block entry");
    };
    assert_eq!(state.block_type, "scale");
    assert_eq!(state.fields["UNIT"], json!("cm"));
    let shadow = state.inputs["BY"].shadow.as_ref().expect("BY has a shadow");
    assert_eq!(shadow.block_type, "number");
    assert_eq!(shadow.fields["NUM"], json!(10));

    // Placing the entry builds the shadow and presets the field.
    let mut workspace = Workspace::new();
    let id = workspace.append_state(&host, &state).expect("append");
    let code = CodeGenerator::new(&host, &workspace)
        .block_to_code(id)
        .expect("generate");
    assert_eq!(code.into_code(), "10cm");
}

#[test_log::test]
fn test_entry_without_presets_is_a_bare_block() {
    let mut host = Host::with_builtins();
    let plan = define(&mut host, add_block());
    assert_eq!(plan.generate_block_state(), None);
    assert_eq!(
        plan.generate_toolbox_entry(),
        ToolboxItem::Block(BlockState::new("add"))
    );
}

#[test_log::test]
fn test_toolbox_serializes_with_kind_tags() {
    let mut toolbox = Toolbox::new();
    let mut category = ToolboxCategory::new("Logic").with_colour("#5b80a5");
    category.contents.push(ToolboxItem::Block(BlockState::new("and")));
    toolbox.push(ToolboxItem::Category(category));
    toolbox.push(ToolboxItem::Separator);

    let value = serde_json::to_value(&toolbox).expect("serialize");
    assert_eq!(
        value,
        json!({
            "kind": "categoryToolbox",
            "contents": [
                {
                    "kind": "category",
                    "name": "Logic",
                    "colour": "#5b80a5",
                    "contents": [{ "kind": "block", "type": "and" }]
                },
                { "kind": "sep" }
            ]
        })
    );

    let parsed: Toolbox = serde_json::from_value(value).expect("deserialize");
    assert_eq!(parsed, toolbox);
}

#[test_log::test]
fn test_library_registers_blocks_and_toolbox() {
    let library = BlockLibrary::from_json(LIBRARY).expect("valid library");
    assert_eq!(library.name, "arithmetic");
    assert_eq!(library.blocks.len(), 3);

    let mut host = Host::with_builtins();
    let mut toolbox = Toolbox::new();
    let plans = library
        .register(&mut host, &mut toolbox)
        .expect("Failed to register library");

    assert_eq!(plans.len(), 3);
    assert!(host.is_defined("literal"));
    assert!(host.is_defined("sum"));
    assert!(host.is_defined("log"));
    assert_eq!(plans[1].tooltip, "Adds two numbers");

    let numbers = toolbox.category("Numbers").expect("Numbers category");
    assert_eq!(numbers.block_types().collect::<Vec<_>>(), vec!["literal", "sum"]);
    let operators = toolbox.category("Operators").expect("Operators category");
    assert_eq!(operators.block_types().collect::<Vec<_>>(), vec!["sum"]);

    let sum_state = numbers
        .contents
        .iter()
        .find_map(|item| match item {
            ToolboxItem::Block(state) if state.block_type == "sum" => Some(state.clone()),
            _ => None,
        })
        .expect("sum entry");
    let mut workspace = Workspace::new();
    let sum = workspace.append_state(&host, &sum_state).expect("append");
    let log = workspace.new_block(&host, "log").expect("create log");
    workspace.connect(log, "VALUE", sum).expect("connect");

    let code = CodeGenerator::new(&host, &workspace)
        .workspace_to_code()
        .expect("generate");
    assert_eq!(code, "console.log(1 + );\n");
}

#[test_log::test]
fn test_library_errors() {
    assert!(matches!(
        BlockLibrary::from_json("{ not json").unwrap_err(),
        LibraryError::JsonParseError(_)
    ));

    let broken = BlockLibrary::new(
        "broken",
        vec![BlockPlanData::new("empty", BlockKind::Value).with_variants(vec![
            BlockVariantPlanData::branch("nothing", vec![]),
        ])],
    );
    assert!(matches!(
        broken.compile().unwrap_err(),
        LibraryError::Plan(PlanError::EmptyVariants(ref name)) if name == "nothing"
    ));

    let library = BlockLibrary::from_json(LIBRARY).expect("valid library");
    let mut host = Host::with_builtins();
    define(&mut host, number_block().with_categories(&[]));
    let mut renamed = library.clone();
    renamed.blocks[0].name = "number".to_string();
    assert!(matches!(
        renamed.register(&mut host, &mut Toolbox::new()).unwrap_err(),
        LibraryError::Host(HostError::DuplicateBlockType(ref name)) if name == "number"
    ));
}

#[test_log::test]
fn test_define_and_redefine() {
    let mut host = Host::with_builtins();
    let first = std::sync::Arc::new(BlockPlan::new(add_block()).expect("plan"));
    first.define_block(&mut host).expect("first definition");
    assert_eq!(
        first.define_block(&mut host).unwrap_err(),
        HostError::DuplicateBlockType("add".to_string())
    );

    let second = std::sync::Arc::new(
        BlockPlan::new(add_block().with_code("{{A}} - {{B}}")).expect("plan"),
    );
    assert!(second.redefine_block(&mut host));

    let fresh = std::sync::Arc::new(BlockPlan::new(print_block()).expect("plan"));
    assert!(!fresh.redefine_block(&mut host));

    define(&mut host, number_block());
    let mut workspace = Workspace::new();
    let sum = workspace.new_block(&host, "add").expect("create add");
    let five = number(&host, &mut workspace, 5);
    workspace.connect(sum, "A", five).expect("connect");
    let code = CodeGenerator::new(&host, &workspace)
        .block_to_code(sum)
        .expect("generate");
    assert_eq!(code.as_str(), "5 - ");
}
