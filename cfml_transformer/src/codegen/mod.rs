//! Instruction emission
//!
//! Expression trees are lowered to a small stack-machine instruction set.
//! Member names go through [`register_key`], which prefers well-known key
//! constants and otherwise interns the name in the unit's key table.

mod context;
mod emit;
mod instr;

pub use context::{CompileContext, CompiledUnit};
pub use emit::{register_key, write_out};
pub use instr::Instr;
