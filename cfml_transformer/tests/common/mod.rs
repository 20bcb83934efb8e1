//! Shared helpers for integration tests
// Not every test target uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use cfml_transformer::prelude::*;

pub fn factory() -> ExprFactory {
    ExprFactory::new(Arc::new(EngineConfig::default()))
}

pub fn factory_with(config: EngineConfig) -> ExprFactory {
    ExprFactory::new(Arc::new(config))
}

pub fn context(factory: &ExprFactory) -> ExecutionContext {
    ExecutionContext::new(factory.config().clone())
}

pub fn limited_context(factory: &ExprFactory) -> ExecutionContext {
    ExecutionContext::restricted(factory.config().clone())
}

/// `scope.a.b...` with literal member names
pub fn variable(factory: &ExprFactory, scope: Option<Scope>, names: &[&str]) -> Variable {
    let mut var = factory.create_variable(scope, None);
    for name in names {
        var.add_member(factory.create_data_member(&factory.create_lit_string(*name, None)));
    }
    var
}

pub fn num(factory: &ExprFactory, text: &str) -> ExprRef {
    factory
        .create_lit_number(text, None)
        .unwrap_or_else(|e| panic!("bad number literal {}: {}", text, e))
}

/// Compile `expr` into a fresh unit and return its instructions.
pub fn compile(factory: &ExprFactory, expr: &ExprRef) -> CompiledUnit {
    let mut ctx = CompileContext::new(factory, "test");
    write_out(&mut ctx, expr).unwrap_or_else(|e| panic!("compile failed: {}", e));
    ctx.finish()
}

/// Install a log subscriber for the test binary; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}
