use cfml_runtime::dispatch::{BoolOp, NegateOp};
use cfml_runtime::key;
use cfml_runtime::scope::Scope;
use tracing::trace;

use super::context::CompileContext;
use super::instr::Instr;
use crate::cast::remove_cast_string;
use crate::error::{TResult, TransformerError};
use crate::expr::{Expr, ExprRef, ExprType, LitValue, Literal, Op, Variable};
use crate::span::Span;

/// Emit the key for a member name.
///
/// A literal name (optionally upper-cased first) loads a well-known key
/// constant when one exists, otherwise a slot of the unit's key table. A
/// computed name is emitted and converted to a key at runtime.
pub fn register_key(ctx: &mut CompileContext<'_>, name: &ExprRef, upper_case: bool) -> TResult<()> {
    let stripped = remove_cast_string(name);
    if let Some(lit) = stripped.as_literal() {
        let text = if upper_case {
            lit.upper_cased().as_string()
        } else {
            lit.as_string()
        };
        let text = text.ok_or_else(|| {
            TransformerError::compile("a null literal can't be used as a key", lit.span)
        })?;
        emit_key_name(ctx, &text);
        return Ok(());
    }
    write_expr(ctx, name)?;
    ctx.emit(Instr::ToKey);
    Ok(())
}

fn emit_key_name(ctx: &mut CompileContext<'_>, text: &str) {
    if let Some(field) = key::field_name(text) {
        trace!(key = text, field, "well-known key");
        ctx.emit(Instr::LoadKeyConstant(field.to_string()));
        return;
    }
    let index = ctx.keys_mut().register(text);
    let unit = ctx.unit().to_string();
    ctx.emit(Instr::LoadKey { unit, index });
}

/// Emit the instructions evaluating `expr`, leaving its value on the stack.
#[tracing::instrument(level = "debug", skip_all, fields(unit = %ctx.unit()))]
pub fn write_out(ctx: &mut CompileContext<'_>, expr: &ExprRef) -> TResult<()> {
    write_expr(ctx, expr)
}

fn write_expr(ctx: &mut CompileContext<'_>, expr: &ExprRef) -> TResult<()> {
    match &**expr {
        Expr::Literal(lit) => write_literal(ctx, lit),
        Expr::Variable(var) => {
            write_variable(ctx, var, false)?;
        }
        Expr::Cast {
            expr: inner,
            target,
            ..
        } => {
            if ExprType::of_cast(target) == ExprType::String {
                if let Some(text) = inner.as_literal().and_then(Literal::as_string) {
                    ctx.emit(Instr::PushStr(text));
                    return Ok(());
                }
            }
            write_expr(ctx, inner)?;
            ctx.emit(Instr::Cast(target.clone()));
        }
        Expr::Op { op, span } => write_op(ctx, op, *span)?,
        Expr::EmptyStruct => ctx.emit(Instr::NewStruct),
        Expr::EmptyArray => ctx.emit(Instr::NewArray),
    }
    Ok(())
}

fn write_literal(ctx: &mut CompileContext<'_>, lit: &Literal) {
    match &lit.value {
        LitValue::Boolean(b) => ctx.emit(Instr::PushBool(*b)),
        LitValue::String(s) => ctx.emit(Instr::PushStr(s.clone())),
        LitValue::Number(n) => ctx.emit(Instr::PushNumber(n.to_string())),
        LitValue::Integer(i) => ctx.emit(Instr::PushInt(*i)),
        LitValue::Long(l) => ctx.emit(Instr::PushLong(*l)),
        LitValue::Null => ctx.emit(Instr::PushNull),
        LitValue::NullConstant if ctx.factory().config().null_support => {
            ctx.emit(Instr::PushNull)
        }
        LitValue::NullConstant => {
            // without null support, `null` is an ordinary (usually undefined) variable
            ctx.emit(Instr::LoadScope(Scope::Undefined));
            emit_key_name(ctx, "null");
            ctx.emit(Instr::GetMemberOrNull);
        }
        LitValue::Empty => ctx.emit(Instr::PushEmpty),
    }
}

fn write_variable(ctx: &mut CompileContext<'_>, var: &Variable, or_null: bool) -> TResult<()> {
    let upper_case = ctx.factory().config().dot_notation_upper_case;
    ctx.emit(Instr::LoadScope(var.scope()));
    for member in var.members() {
        register_key(ctx, member.name(), upper_case)?;
        ctx.emit(if or_null {
            Instr::GetMemberOrNull
        } else {
            Instr::GetMember
        });
    }
    Ok(())
}

fn write_op(ctx: &mut CompileContext<'_>, op: &Op, span: Option<Span>) -> TResult<()> {
    match op {
        Op::Concat { left, right } => {
            write_expr(ctx, left)?;
            write_expr(ctx, right)?;
            ctx.emit(Instr::Concat);
        }
        Op::Bool {
            left,
            right,
            op: op @ (BoolOp::And | BoolOp::Or),
        } => {
            write_expr(ctx, left)?;
            ctx.emit(Instr::Dup);
            let j = ctx.here();
            ctx.emit(if *op == BoolOp::And {
                Instr::JumpIfFalse(usize::MAX)
            } else {
                Instr::JumpIfTrue(usize::MAX)
            });
            ctx.emit(Instr::Pop);
            write_expr(ctx, right)?;
            let end = ctx.here();
            ctx.patch_jump(j, end);
        }
        Op::Bool { left, right, op } => {
            write_expr(ctx, left)?;
            write_expr(ctx, right)?;
            ctx.emit(Instr::Logic(*op));
        }
        Op::Number { left, right, op } => {
            write_expr(ctx, left)?;
            write_expr(ctx, right)?;
            ctx.emit(Instr::Arith(*op));
        }
        Op::Decision { left, right, op } => {
            write_expr(ctx, left)?;
            write_expr(ctx, right)?;
            ctx.emit(Instr::Compare(*op));
        }
        Op::Negate { expr } => {
            write_expr(ctx, expr)?;
            ctx.emit(Instr::Not);
        }
        Op::NegateNumber { expr, op } => {
            write_expr(ctx, expr)?;
            if *op == NegateOp::Minus {
                ctx.emit(Instr::Neg);
            }
        }
        Op::UnaryAssign {
            var,
            value,
            op,
            assign,
        } => {
            let Some((last, parents)) = var.members().split_last() else {
                return Err(TransformerError::compile(
                    format!("can't assign to the {} scope itself", var.scope().name()),
                    span,
                ));
            };
            let upper_case = ctx.factory().config().dot_notation_upper_case;
            ctx.emit(Instr::LoadScope(var.scope()));
            for member in parents {
                register_key(ctx, member.name(), upper_case)?;
                ctx.emit(Instr::GetMember);
            }
            register_key(ctx, last.name(), upper_case)?;
            write_expr(ctx, value)?;
            ctx.emit(Instr::UnaryAssign {
                op: *op,
                assign: *assign,
            });
        }
        Op::Conditional { cond, left, right } => {
            write_expr(ctx, cond)?;
            let j_else = ctx.here();
            ctx.emit(Instr::JumpIfFalse(usize::MAX));
            write_expr(ctx, left)?;
            let j_end = ctx.here();
            ctx.emit(Instr::Jump(usize::MAX));
            let else_start = ctx.here();
            ctx.patch_jump(j_else, else_start);
            write_expr(ctx, right)?;
            let end = ctx.here();
            ctx.patch_jump(j_end, end);
        }
        Op::Elvis { left, right } => {
            // the left chain is loaded once; the duplicate is the result
            write_variable(ctx, left, true)?;
            ctx.emit(Instr::Dup);
            let j = ctx.here();
            ctx.emit(Instr::JumpIfNotNull(usize::MAX));
            ctx.emit(Instr::Pop);
            write_expr(ctx, right)?;
            let end = ctx.here();
            ctx.patch_jump(j, end);
        }
    }
    Ok(())
}
