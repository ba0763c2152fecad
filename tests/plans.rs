//! Tests for plan construction and block initialization.
mod common;
use blockplan::error::{PlanError, RegistryError, TemplateError};
use blockplan::host::{BlockId, FieldKind, InputKind, RegistryKind};
use blockplan::plans::{
    BlockVariant, BlockVariantPlan, FieldPlan, InputPlan, PlanContext, create_dummy_input,
    create_end_row_input,
};
use blockplan::prelude::*;
use common::*;
use serde_json::json;

fn initialized(host: &Host, data: BlockPlanData) -> Block {
    let plan = BlockPlan::new(data).expect("Failed to build block plan");
    let mut block = Block::new(BlockId(0), &plan.name);
    plan.initialize_block(&mut block, &host.classes)
        .expect("Failed to initialize block");
    block
}

fn labels(block: &Block, fields: &[blockplan::host::FieldId]) -> Vec<serde_json::Value> {
    fields.iter().map(|id| block.field(*id).value().clone()).collect()
}

#[test_log::test]
fn test_output_plan_normalizes_every_declaration_shape() {
    let cases = [
        (json!(null), None),
        (json!("Foo"), Some(vec!["Foo"])),
        (json!(["A", "B"]), Some(vec!["A", "B"])),
        (json!({"type": "Foo"}), Some(vec!["Foo"])),
        (json!({"types": ["A"]}), Some(vec!["A"])),
        (json!({"type": ["A", "B"]}), Some(vec!["A", "B"])),
    ];

    for (json, expected) in cases {
        let data: OutputPlanData =
            serde_json::from_value(json.clone()).expect("Failed to parse output declaration");
        let plan = OutputPlan::normalize(&data);
        let expected = expected.map(|types| types.iter().map(|t| t.to_string()).collect());
        assert_eq!(plan.types, expected, "normalizing {}", json);

        // Normalizing the canonical form again changes nothing.
        assert_eq!(OutputPlan::normalize(&plan.types.clone().into()), plan);
    }
}

#[test_log::test]
fn test_output_plan_from_rust_values() {
    assert_eq!(
        OutputPlan::from(&OutputPlanData::from("Number")).create_output(),
        Some(vec!["Number".to_string()])
    );
    assert_eq!(OutputPlan::normalize(&OutputPlanData::Null).create_output(), None);
}

#[test_log::test]
fn test_input_plan_restricts_connection_to_accepted_types() {
    let host = Host::with_builtins();
    let mut block = Block::new(BlockId(0), "test");

    let typed = InputPlan::new(&InputPlanData::value("A").accepting(&["Number", "String"]));
    let id = typed
        .create_input(&mut block, &host.classes)
        .expect("Failed to create input");
    let input = block.input(id);
    assert_eq!(input.name.as_deref(), Some("A"));
    assert_eq!(input.kind, InputKind::Value);
    assert_eq!(
        input.connection.as_ref().and_then(|c| c.check.clone()),
        Some(vec!["Number".to_string(), "String".to_string()])
    );

    let open = InputPlan::new(&InputPlanData::statement("DO"));
    let id = open
        .create_input(&mut block, &host.classes)
        .expect("Failed to create input");
    let connection = block.input(id).connection.as_ref().expect("statement has a connection");
    assert_eq!(connection.check, None);
}

#[test_log::test]
fn test_layout_inputs_have_no_connection() {
    let host = Host::with_builtins();
    let mut block = Block::new(BlockId(0), "test");

    let dummy = create_dummy_input(&mut block, &host.classes).expect("Failed to create dummy");
    let end_row = create_end_row_input(&mut block, &host.classes).expect("Failed to create row");
    assert_eq!(block.input(dummy).kind, InputKind::Dummy);
    assert_eq!(block.input(end_row).kind, InputKind::EndRow);
    assert!(block.input(dummy).connection.is_none());
    assert!(block.input(end_row).name.is_none());
}

#[test_log::test]
fn test_unregistered_input_kind_is_an_error() {
    let host = Host::with_builtins();
    let mut block = Block::new(BlockId(0), "test");
    let data: InputPlanData =
        serde_json::from_value(json!({"name": "X", "kind": "fancy"})).expect("Failed to parse");
    assert_eq!(data.kind, InputKind::Custom("fancy".to_string()));

    let error = InputPlan::new(&data)
        .create_input(&mut block, &host.classes)
        .unwrap_err();
    assert_eq!(
        error,
        RegistryError::Unregistered {
            kind: RegistryKind::Input,
            name: "fancy".to_string()
        }
    );
}

#[test_log::test]
fn test_field_plan_falls_back_to_prefixed_type_and_stamps_name() {
    let host = Host::with_builtins();
    let mut block = Block::new(BlockId(0), "test");

    let plan = FieldPlan::new(&FieldPlanData::new("LABEL", "input", vec![json!("hi")]));
    let id = plan
        .create_field(&mut block, &host.classes)
        .expect("Failed to create field");
    let field = block.field(id);
    assert_eq!(field.name.as_deref(), Some("LABEL"));
    assert_eq!(field.kind, FieldKind::TextInput);
    assert_eq!(field.value(), &json!("hi"));
}

#[test_log::test]
fn test_field_plan_missing_type_reports_the_declared_key() {
    let host = Host::with_builtins();
    let mut block = Block::new(BlockId(0), "test");

    let error = FieldPlan::new(&FieldPlanData::new("X", "nope", vec![]))
        .create_field(&mut block, &host.classes)
        .unwrap_err();
    assert_eq!(
        error,
        PlanError::Registry(RegistryError::Unregistered {
            kind: RegistryKind::Field,
            name: "nope".to_string()
        })
    );
}

#[test_log::test]
fn test_field_plan_applies_default_value() {
    let host = Host::with_builtins();
    let mut block = Block::new(BlockId(0), "test");
    let options = json!([["Ascending", "ASC"], ["Descending", "DESC"]]);

    let plan = FieldPlan::new(
        &FieldPlanData::new("ORDER", "dropdown", vec![options.clone()]).with_default(json!("DESC")),
    );
    let id = plan
        .create_field(&mut block, &host.classes)
        .expect("Failed to create field");
    assert_eq!(block.field(id).value(), &json!("DESC"));

    let invalid = FieldPlan::new(
        &FieldPlanData::new("ORDER", "dropdown", vec![options]).with_default(json!("RANDOM")),
    );
    assert!(matches!(
        invalid.create_field(&mut block, &host.classes),
        Err(PlanError::Field(_))
    ));
}

#[test_log::test]
fn test_branch_without_variants_is_rejected() {
    let localization = Localization::default();
    let context = PlanContext {
        shape: blockplan::plans::CodeShape::Value,
        localization: &localization,
    };
    let error = BlockVariantPlan::new(&BlockVariantPlanData::branch("empty", vec![]), &context)
        .unwrap_err();
    assert_eq!(error, PlanError::EmptyVariants("empty".to_string()));

    let nested = BlockPlanData::new("outer", BlockKind::Value)
        .with_variants(vec![BlockVariantPlanData::branch("inner", vec![])]);
    assert_eq!(
        BlockPlan::new(nested).unwrap_err(),
        PlanError::EmptyVariants("inner".to_string())
    );
}

#[test_log::test]
fn test_empty_variant_list_on_block_means_single_leaf() {
    let host = Host::with_builtins();
    let block = initialized(
        &host,
        BlockPlanData::new("plain", BlockKind::Value)
            .with_input(InputPlanData::value("A"))
            .with_variants(vec![]),
    );
    assert!(matches!(block.variants, Some(BlockVariant::Leaf(_))));
    assert_eq!(named_inputs(&block), vec!["A"]);
}

#[test_log::test]
fn test_variants_inherit_output_unless_they_declare_their_own() {
    let host = Host::with_builtins();
    let block = initialized(
        &host,
        BlockPlanData::new("shape", BlockKind::Value)
            .with_output("Parent")
            .with_variants(vec![
                BlockVariantPlanData::leaf("inherits"),
                BlockVariantPlanData::leaf("overrides").with_output("Own"),
            ]),
    );

    let Some(BlockVariant::Branch(branch)) = &block.variants else {
        panic!("expected a branch");
    };
    let output_of = |name: &str| match &branch.variants[name] {
        BlockVariant::Leaf(leaf) => leaf.output.clone(),
        BlockVariant::Branch(_) => panic!("expected a leaf"),
    };
    assert_eq!(
        output_of("inherits"),
        Some(OutputPlan {
            types: Some(vec!["Parent".to_string()])
        })
    );
    assert_eq!(
        output_of("overrides"),
        Some(OutputPlan {
            types: Some(vec!["Own".to_string()])
        })
    );
}

#[test_log::test]
fn test_first_declared_variant_is_selected_initially() {
    let host = Host::with_builtins();
    let block = initialized(&host, object_block());

    let variants = block.variants.as_ref().expect("block has variants");
    assert_eq!(variants.active_leaf().name, "single");
    assert_eq!(block.get_field_value("object"), Some(&json!("single")));

    let dropdown = block.get_field("object").expect("branch dropdown is visible");
    let options: Vec<_> = block
        .field(dropdown)
        .options()
        .expect("dropdown has options")
        .iter()
        .map(|o| o.value.as_str())
        .collect();
    assert_eq!(options, vec!["single", "multiple"]);
}

#[test_log::test]
fn test_message_line_pairs_inputs_with_preceding_fields() {
    let host = Host::with_builtins();
    let block = initialized(
        &host,
        BlockPlanData::new("plus", BlockKind::Value)
            .with_input(InputPlanData::value("A"))
            .with_input(InputPlanData::value("B"))
            .with_message("%{A} plus %{B}"),
    );

    let leaf = block.variants.as_ref().expect("variants").active_leaf();
    assert_eq!(leaf.line.len(), 2);
    assert!(leaf.line[0].fields.is_empty());
    assert_eq!(labels(&block, &leaf.line[1].fields), vec![json!(" plus ")]);
    assert_eq!(input_names(&block), vec!["A", "B"]);
}

#[test_log::test]
fn test_trailing_text_gets_a_dummy_input() {
    let host = Host::with_builtins();
    let block = initialized(
        &host,
        BlockPlanData::new("count", BlockKind::Value)
            .with_input(InputPlanData::value("A"))
            .with_message("%{A} items"),
    );

    let leaf = block.variants.as_ref().expect("variants").active_leaf();
    assert_eq!(leaf.line.len(), 2);
    let last = &leaf.line[1];
    assert_eq!(block.input(last.input).kind, InputKind::Dummy);
    assert_eq!(labels(&block, &last.fields), vec![json!(" items")]);
}

#[test_log::test]
fn test_newlines_end_rows_with_dummy_inputs() {
    let host = Host::with_builtins();
    let block = initialized(&host, repeat_block());

    let kinds: Vec<_> = block.inputs().map(|input| input.kind.clone()).collect();
    assert_eq!(kinds, vec![InputKind::Dummy, InputKind::Statement]);

    let first_row: Vec<_> = block
        .inputs()
        .next()
        .map(|input| input.field_row.clone())
        .unwrap_or_default();
    assert_eq!(
        labels(&block, &first_row),
        vec![json!("repeat "), json!(2), json!(" times")]
    );
}

#[test_log::test]
fn test_synthesized_message_lists_fields_then_inputs() {
    let host = Host::with_builtins();
    let block = initialized(
        &host,
        BlockPlanData::new("synth", BlockKind::Value)
            .with_input(InputPlanData::value("A"))
            .with_field(FieldPlanData::new("F", "checkbox", vec![json!(true)])),
    );

    let leaf = block.variants.as_ref().expect("variants").active_leaf();
    assert_eq!(leaf.line.len(), 1);
    assert_eq!(
        labels(&block, &leaf.line[0].fields),
        vec![json!(true), json!(" ")]
    );
    assert_eq!(named_inputs(&block), vec!["A"]);
}

#[test_log::test]
fn test_unknown_message_parameter_fails_instantiation() {
    let host = Host::with_builtins();
    let plan = BlockPlan::new(
        BlockPlanData::new("broken", BlockKind::Value)
            .with_input(InputPlanData::value("A"))
            .with_message("%{A} and %{Z}"),
    )
    .expect("Plan construction does not tokenize messages");

    let mut block = Block::new(BlockId(0), "broken");
    assert_eq!(
        plan.initialize_block(&mut block, &host.classes).unwrap_err(),
        PlanError::UnknownParameter {
            variant: "broken".to_string(),
            name: "Z".to_string()
        }
    );
}

#[test_log::test]
fn test_input_field_name_collisions_are_rejected() {
    let same_level = BlockPlanData::new("clash", BlockKind::Value)
        .with_input(InputPlanData::value("X"))
        .with_field(FieldPlanData::new("X", "checkbox", vec![]));
    assert_eq!(
        BlockPlan::new(same_level).unwrap_err(),
        PlanError::NameCollision {
            variant: "clash".to_string(),
            name: "X".to_string()
        }
    );

    let inherited = BlockPlanData::new("clash", BlockKind::Value)
        .with_field(FieldPlanData::new("MODE", "checkbox", vec![]))
        .with_variants(vec![
            BlockVariantPlanData::leaf("ok"),
            BlockVariantPlanData::leaf("bad").with_input(InputPlanData::value("MODE")),
        ]);
    assert_eq!(
        BlockPlan::new(inherited).unwrap_err(),
        PlanError::NameCollision {
            variant: "bad".to_string(),
            name: "MODE".to_string()
        }
    );
}

#[test_log::test]
fn test_duplicate_names_fail_plan_construction() {
    let siblings = BlockPlanData::new("pick", BlockKind::Value).with_variants(vec![
        BlockVariantPlanData::leaf("a").with_code("first"),
        BlockVariantPlanData::leaf("a").with_code("second"),
    ]);
    assert_eq!(
        BlockPlan::new(siblings).unwrap_err(),
        PlanError::DuplicateName {
            variant: "pick".to_string(),
            name: "a".to_string()
        }
    );

    let inputs = BlockPlanData::new("twice", BlockKind::Value)
        .with_input(InputPlanData::value("A"))
        .with_input(InputPlanData::value("A"));
    assert_eq!(
        BlockPlan::new(inputs).unwrap_err(),
        PlanError::DuplicateName {
            variant: "twice".to_string(),
            name: "A".to_string()
        }
    );

    let fields = BlockPlanData::new("twice", BlockKind::Value).with_variants(vec![
        BlockVariantPlanData::leaf("only")
            .with_field(FieldPlanData::new("F", "checkbox", vec![]))
            .with_field(FieldPlanData::new("F", "text_input", vec![])),
    ]);
    assert_eq!(
        BlockPlan::new(fields).unwrap_err(),
        PlanError::DuplicateName {
            variant: "only".to_string(),
            name: "F".to_string()
        }
    );

    // The branch dropdown takes the branch's name.
    let shadowed = BlockPlanData::new("mode", BlockKind::Value)
        .with_field(FieldPlanData::new("mode", "checkbox", vec![]))
        .with_variants(vec![BlockVariantPlanData::leaf("on")]);
    assert_eq!(
        BlockPlan::new(shadowed).unwrap_err(),
        PlanError::DuplicateName {
            variant: "mode".to_string(),
            name: "mode".to_string()
        }
    );
}

#[test_log::test]
fn test_invalid_template_fails_plan_construction() {
    let error = BlockPlan::new(add_block().with_code("{{#if A}}{{A}}")).unwrap_err();
    assert!(matches!(
        error,
        PlanError::Template {
            ref name,
            source: TemplateError::Syntax(_)
        } if name == "add"
    ));
}

#[test_log::test]
fn test_localized_message_tooltip_and_help_url() {
    let host = Host::with_builtins();
    let localization = Localization::new(json!({
        "add": {
            "MESSAGE": "sum of %{A} and %{B}",
            "TOOLTIP": "Adds two numbers",
            "HELP_URL": "https://example.com/add"
        }
    }));
    let plan = BlockPlan::builder(add_block())
        .with_localization(&localization)
        .build()
        .expect("Failed to build block plan");
    assert_eq!(plan.tooltip, "Adds two numbers");

    let mut block = Block::new(BlockId(0), "add");
    plan.initialize_block(&mut block, &host.classes)
        .expect("Failed to initialize block");
    assert_eq!(block.tooltip, "Adds two numbers");
    assert_eq!(block.help_url, "https://example.com/add");

    let leaf = block.variants.as_ref().expect("variants").active_leaf();
    assert_eq!(labels(&block, &leaf.line[0].fields), vec![json!("sum of ")]);
    assert_eq!(labels(&block, &leaf.line[1].fields), vec![json!(" and ")]);
}

#[test_log::test]
fn test_explicit_message_wins_over_localization() {
    let host = Host::with_builtins();
    let localization = Localization::new(json!({"print": {"MESSAGE": "say %{VALUE}"}}));
    let plan = BlockPlan::builder(print_block())
        .with_localization(&localization)
        .build()
        .expect("Failed to build block plan");

    let mut block = Block::new(BlockId(0), "print");
    plan.initialize_block(&mut block, &host.classes)
        .expect("Failed to initialize block");
    let leaf = block.variants.as_ref().expect("variants").active_leaf();
    assert_eq!(labels(&block, &leaf.line[0].fields), vec![json!("print ")]);
    assert_eq!(block.tooltip, "");
}

#[test_log::test]
fn test_connections_follow_block_kind() {
    let host = Host::with_builtins();

    let value = initialized(&host, add_block());
    assert_eq!(
        value.output.as_ref().and_then(|c| c.check.clone()),
        Some(vec!["Number".to_string()])
    );
    assert!(value.previous.is_none() && value.next.is_none());

    let statement = initialized(&host, print_block());
    assert!(statement.output.is_none());
    assert!(statement.previous.is_some() && statement.next.is_some());

    let both = initialized(
        &host,
        BlockPlanData::new("both", BlockKind::ValueAndStatement).with_output("Number"),
    );
    assert!(both.output.is_some() && both.previous.is_some() && both.next.is_some());

    let no_output = initialized(&host, BlockPlanData::new("bare", BlockKind::Value));
    assert!(no_output.output.is_none());
}

#[test_log::test]
fn test_statement_connections_do_not_depend_on_output() {
    let host = Host::with_builtins();

    let typed = initialized(&host, print_block().with_output("Action"));
    assert!(typed.output.is_none());
    assert_eq!(
        typed.previous.as_ref().and_then(|c| c.check.clone()),
        Some(vec!["Action".to_string()])
    );
    assert_eq!(
        typed.next.as_ref().and_then(|c| c.check.clone()),
        Some(vec!["Action".to_string()])
    );

    let untyped = initialized(&host, BlockPlanData::new("call", BlockKind::ValueAndStatement));
    assert!(untyped.output.is_none());
    assert!(untyped.previous.is_some() && untyped.next.is_some());
}

#[test_log::test]
fn test_orientation_and_colour() {
    let host = Host::with_builtins();

    let horizontal = initialized(&host, add_block());
    assert!(horizontal.inputs_inline);
    assert_eq!(horizontal.colour, 255);

    let vertical = initialized(
        &host,
        add_block()
            .with_orientation(BlockOrientation::Vertical)
            .with_colour(120),
    );
    assert!(!vertical.inputs_inline);
    assert_eq!(vertical.colour, 120);
}

#[test_log::test]
fn test_initialization_is_repeatable() {
    let host = Host::with_builtins();
    let plan = BlockPlan::new(add_block()).expect("Failed to build block plan");
    let mut block = Block::new(BlockId(0), "add");
    plan.initialize_block(&mut block, &host.classes)
        .expect("Failed to initialize block");
    plan.initialize_block(&mut block, &host.classes)
        .expect("Failed to initialize block again");
    assert_eq!(named_inputs(&block), vec!["A", "B"]);
}

#[test_log::test]
fn test_generated_block_state_collects_shadows_and_defaults() {
    let data = BlockPlanData::new("roll", BlockKind::Value)
        .with_input(
            InputPlanData::value("DICE")
                .with_shadow(ShadowBlockData::new("number").with_field("NUM", json!(6))),
        )
        .with_field(FieldPlanData::new("KEEP", "checkbox", vec![]).with_default(json!(true)));
    let plan = BlockPlan::new(data).expect("Failed to build block plan");

    let state = plan.generate_block_state().expect("roll has defaults");
    assert_eq!(state.block_type, "roll");
    assert_eq!(state.fields.get("KEEP"), Some(&json!(true)));
    let shadow = state.inputs["DICE"].shadow.as_ref().expect("DICE has a shadow");
    assert_eq!(shadow.block_type, "number");
    assert_eq!(shadow.fields.get("NUM"), Some(&json!(6)));

    let plain = BlockPlan::new(add_block()).expect("Failed to build block plan");
    assert!(plain.generate_block_state().is_none());
}
