//! Instruction emission and key interning.

mod common;

use common::*;
use pretty_assertions::assert_eq;

use cfml_transformer::prelude::*;

fn key(unit: &str, index: usize) -> Instr {
    Instr::LoadKey {
        unit: unit.to_string(),
        index,
    }
}

// ==================== Key table ====================

#[test]
fn test_same_name_registers_once_per_unit() {
    let f = factory();
    let mut ctx = CompileContext::new(&f, "unit1");
    let name = f.create_lit_string("firstName", None);
    let shouted = f.create_lit_string("FIRSTNAME", None);
    f.register_key(&mut ctx, &name, false).unwrap();
    f.register_key(&mut ctx, &shouted, false).unwrap();
    assert_eq!(ctx.code().to_vec(), vec![key("unit1", 0), key("unit1", 0)]);
    assert_eq!(ctx.keys().len(), 1);
}

#[test]
fn test_well_known_names_never_take_a_slot() {
    let f = factory();
    let mut ctx = CompileContext::new(&f, "unit1");
    f.register_key(&mut ctx, &f.create_lit_string("id", None), false).unwrap();
    f.register_key(&mut ctx, &f.create_lit_string("id", None), true).unwrap();
    f.register_key(&mut ctx, &f.create_lit_string("Id", None), false).unwrap();
    assert_eq!(
        ctx.code().to_vec(),
        vec![
            Instr::LoadKeyConstant("_id".to_string()),
            Instr::LoadKeyConstant("_ID".to_string()),
            key("unit1", 0),
        ]
    );
    assert_eq!(ctx.keys().keys()[0].as_str(), "Id");
}

#[test]
fn test_upper_casing_leaves_the_name_node_untouched() {
    let f = factory();
    let mut ctx = CompileContext::new(&f, "u");
    let name = f.create_lit_string("total", None);
    f.register_key(&mut ctx, &name, true).unwrap();
    assert_eq!(name.as_literal().map(|l| &l.value), Some(&LitValue::String("total".into())));
    assert_eq!(ctx.keys().keys()[0].as_str(), "TOTAL");
}

#[test]
fn test_non_string_literal_names_use_their_text() {
    let f = factory();
    let mut ctx = CompileContext::new(&f, "u");
    let member = f.create_data_member(&f.create_lit_integer(3, None));
    f.register_key(&mut ctx, member.name(), false).unwrap();
    assert_eq!(ctx.code().to_vec(), vec![key("u", 0)]);
    assert_eq!(ctx.keys().keys()[0].as_str(), "3");
}

#[test]
fn test_computed_names_build_keys_at_runtime() {
    let f = factory();
    let mut ctx = CompileContext::new(&f, "u");
    let computed = f.op_string(
        &f.create_lit_string("col", None),
        &variable(&f, None, &["i"]).into_expr(),
        true,
    );
    f.register_key(&mut ctx, &computed, false).unwrap();
    assert_eq!(ctx.code().last(), Some(&Instr::ToKey));
    assert_eq!(ctx.code().first(), Some(&Instr::PushStr("col".to_string())));
}

#[test]
fn test_null_literal_is_not_a_key() {
    let f = factory();
    let mut ctx = CompileContext::new(&f, "u");
    let err = f.register_key(&mut ctx, &f.null(), false).unwrap_err();
    assert!(matches!(err, TransformerError::Compile { .. }));
}

#[test]
fn test_unit_ids_come_from_the_source_path() {
    let f = factory();
    let mut ctx = CompileContext::for_source(&f, "/app/index.cfm");
    let unit = ctx.unit().to_string();
    write_out(&mut ctx, &variable(&f, None, &["counter"]).into_expr()).unwrap();
    assert!(ctx.code().contains(&key(&unit, 0)));
}

// ==================== Expressions ====================

#[test]
fn test_variable_chain() {
    init_tracing();
    let f = factory();
    let unit = compile(&f, &variable(&f, Some(Scope::Url), &["user", "id"]).into_expr());
    assert_eq!(
        unit.code,
        vec![
            Instr::LoadScope(Scope::Url),
            key("test", 0),
            Instr::GetMember,
            Instr::LoadKeyConstant("_ID".to_string()),
            Instr::GetMember,
        ]
    );
    assert_eq!(unit.keys, vec!["USER".to_string()]);
}

#[test]
fn test_dot_notation_case_is_configurable() {
    let f = factory_with(EngineConfig {
        dot_notation_upper_case: false,
        ..EngineConfig::default()
    });
    let unit = compile(&f, &variable(&f, None, &["user"]).into_expr());
    assert_eq!(unit.keys, vec!["user".to_string()]);
}

#[test]
fn test_literals_and_string_cast_folding() {
    let f = factory();
    let e = f.op_string(&f.create_lit_integer(1, None), &f.lit_true(), false);
    assert_eq!(
        compile(&f, &e).code,
        vec![
            Instr::PushStr("1".to_string()),
            Instr::PushStr("true".to_string()),
            Instr::Concat,
        ]
    );
    let n = f.to_expr_string(&num(&f, "1.50"));
    assert_eq!(compile(&f, &n).code, vec![Instr::PushStr("1.5".to_string())]);
}

#[test]
fn test_null_constant_follows_null_support() {
    let f = factory();
    assert_eq!(
        compile(&f, &f.create_null_constant(None)).code,
        vec![
            Instr::LoadScope(Scope::Undefined),
            key("test", 0),
            Instr::GetMemberOrNull,
        ]
    );
    let strict = factory_with(EngineConfig {
        null_support: true,
        ..EngineConfig::default()
    });
    assert_eq!(compile(&strict, &strict.create_null_constant(None)).code, vec![Instr::PushNull]);
}

#[test]
fn test_arithmetic_and_comparison() {
    let f = factory();
    let e = f.op_decision(
        &f.op_number(&num(&f, "2"), &f.create_lit_string("3", None), NumberOp::Exp),
        &f.create_lit_long(8, None),
        DecisionOp::Gte,
    );
    assert_eq!(
        compile(&f, &e).code,
        vec![
            Instr::PushNumber("2".to_string()),
            Instr::PushNumber("3".to_string()),
            Instr::Arith(NumberOp::Exp),
            Instr::PushLong(8),
            Instr::Compare(DecisionOp::Gte),
        ]
    );
}

#[test]
fn test_and_short_circuits() {
    let f = factory();
    let e = f.op_bool(
        &variable(&f, None, &["a"]).into_expr(),
        &f.lit_false(),
        BoolOp::And,
    );
    assert_eq!(
        compile(&f, &e).code,
        vec![
            Instr::LoadScope(Scope::Undefined),
            key("test", 0),
            Instr::GetMember,
            Instr::Cast(CastTarget::Boolean),
            Instr::Dup,
            Instr::JumpIfFalse(8),
            Instr::Pop,
            Instr::PushBool(false),
        ]
    );
}

#[test]
fn test_xor_evaluates_both_sides() {
    let f = factory();
    let e = f.op_bool(&f.lit_true(), &f.lit_false(), BoolOp::Xor);
    assert_eq!(
        compile(&f, &e).code,
        vec![Instr::PushBool(true), Instr::PushBool(false), Instr::Logic(BoolOp::Xor)]
    );
}

#[test]
fn test_conditional_jumps() {
    let f = factory();
    let e = f.op_conditional(
        &f.create_lit_string("no", None),
        &f.create_lit_integer(1, None),
        &f.create_lit_integer(2, None),
    );
    assert_eq!(
        compile(&f, &e).code,
        vec![
            Instr::PushBool(false),
            Instr::JumpIfFalse(4),
            Instr::PushInt(1),
            Instr::Jump(5),
            Instr::PushInt(2),
        ]
    );
}

#[test]
fn test_elvis_loads_left_once() {
    let f = factory();
    let e = f.op_elvis(
        variable(&f, None, &["session", "cart"]),
        &f.create_struct(),
    );
    let code = compile(&f, &e).code;
    assert_eq!(
        code,
        vec![
            Instr::LoadScope(Scope::Undefined),
            key("test", 0),
            Instr::GetMemberOrNull,
            key("test", 1),
            Instr::GetMemberOrNull,
            Instr::Dup,
            Instr::JumpIfNotNull(9),
            Instr::Pop,
            Instr::NewStruct,
        ]
    );
    assert_eq!(code.iter().filter(|i| **i == Instr::LoadScope(Scope::Undefined)).count(), 1);
}

#[test]
fn test_compound_assignment_emits_one_helper_call() {
    let f = factory();
    let e = f.op_unary_number(
        variable(&f, Some(Scope::Local), &["stats", "count"]),
        &f.number_one(),
        AssignKind::Post,
        NumberOp::Plus,
        None,
    );
    assert_eq!(
        compile(&f, &e).code,
        vec![
            Instr::LoadScope(Scope::Local),
            key("test", 0),
            Instr::GetMember,
            key("test", 1),
            Instr::PushNumber("1".to_string()),
            Instr::UnaryAssign {
                op: Some(NumberOp::Plus),
                assign: AssignKind::Post,
            },
        ]
    );
}

#[test]
fn test_assignment_to_bare_scope_is_a_compile_error() {
    let f = factory();
    let e = f.op_unary_string(
        f.create_variable(Some(Scope::Form), None),
        &f.empty(),
        AssignKind::Pre,
        None,
    );
    let mut ctx = CompileContext::new(&f, "u");
    assert!(matches!(write_out(&mut ctx, &e), Err(TransformerError::Compile { .. })));
}

#[test]
fn test_negation() {
    let f = factory();
    let x = variable(&f, None, &["x"]).into_expr();
    let e = f.op_negate_number(&x, NegateOp::Minus, None);
    assert_eq!(
        compile(&f, &e).code[3..].to_vec(),
        vec![Instr::Cast(CastTarget::Number), Instr::Neg]
    );
    let e = f.op_negate(&x, None);
    assert_eq!(
        compile(&f, &e).code[3..].to_vec(),
        vec![Instr::Cast(CastTarget::Boolean), Instr::Not]
    );
}
