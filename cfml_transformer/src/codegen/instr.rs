use serde::{Deserialize, Serialize};

use cfml_runtime::dispatch::{AssignKind, BoolOp, CastTarget, DecisionOp, NumberOp};
use cfml_runtime::scope::Scope;

/// Stack-machine instruction of a compiled unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instr {
    // constants
    PushStr(String),
    PushBool(bool),
    PushNumber(String), // canonical decimal text
    PushInt(i32),
    PushLong(i64),
    PushNull,
    PushEmpty,
    NewStruct,
    NewArray,

    // keys
    /// Load a process-wide well-known key by its field name (e.g. `_ID`)
    LoadKeyConstant(String),
    /// Load slot `index` of the key table of unit `unit`
    LoadKey {
        unit: String,
        index: usize,
    },
    /// Pop a value and push it converted to a key
    ToKey,

    // member access
    LoadScope(Scope),
    /// Pop key and collection, push the member; fails when it is missing
    GetMember,
    /// Like `GetMember`, but a missing member (or a null collection) yields null
    GetMemberOrNull,

    // operations
    Cast(CastTarget),
    Concat,
    Arith(NumberOp),
    Compare(DecisionOp),
    Logic(BoolOp),
    Not,
    Neg,
    /// Pop value, key and collection; apply `op` (concatenation when `None`)
    /// to the stored member and push the pre- or post-mutation value
    UnaryAssign {
        op: Option<NumberOp>,
        assign: AssignKind,
    },

    // stack / control
    Dup,
    Pop,
    Jump(usize),
    JumpIfFalse(usize), // pops the condition
    JumpIfTrue(usize),  // pops the condition
    JumpIfNotNull(usize), // pops the tested value
}
