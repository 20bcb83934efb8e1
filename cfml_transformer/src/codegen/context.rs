use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::instr::Instr;
use crate::error::{TResult, TransformerError};
use crate::factory::ExprFactory;
use crate::keys::KeyTable;

/// Emission target for one compilation unit: its identifier, its
/// instruction buffer and its dynamic key table.
#[derive(Debug)]
pub struct CompileContext<'f> {
    factory: &'f ExprFactory,
    unit: String,
    code: Vec<Instr>,
    keys: KeyTable,
}

/// Result of compiling a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledUnit {
    pub unit: String,
    pub code: Vec<Instr>,
    /// Key table in slot order
    pub keys: Vec<String>,
}

impl CompiledUnit {
    /// JSON dump of the unit, for inspection
    pub fn to_json(&self) -> TResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TransformerError::compile(format!("can't serialize unit: {}", e), None))
    }
}

impl<'f> CompileContext<'f> {
    pub fn new(factory: &'f ExprFactory, unit: impl Into<String>) -> Self {
        Self {
            factory,
            unit: unit.into(),
            code: Vec::new(),
            keys: KeyTable::new(),
        }
    }

    /// Context whose unit identifier is derived from the source path, so
    /// the same template always compiles to the same unit name.
    pub fn for_source(factory: &'f ExprFactory, path: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(path.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        Self::new(factory, format!("cf{}", &digest[..16]))
    }

    pub fn factory(&self) -> &'f ExprFactory {
        self.factory
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn keys(&self) -> &KeyTable {
        &self.keys
    }

    pub(crate) fn keys_mut(&mut self) -> &mut KeyTable {
        &mut self.keys
    }

    pub fn code(&self) -> &[Instr] {
        &self.code
    }

    pub fn emit(&mut self, i: Instr) {
        self.code.push(i);
    }

    pub fn here(&self) -> usize {
        self.code.len()
    }

    pub fn patch_jump(&mut self, at: usize, target: usize) {
        self.code[at] = match &self.code[at] {
            Instr::Jump(_) => Instr::Jump(target),
            Instr::JumpIfFalse(_) => Instr::JumpIfFalse(target),
            Instr::JumpIfTrue(_) => Instr::JumpIfTrue(target),
            Instr::JumpIfNotNull(_) => Instr::JumpIfNotNull(target),
            _ => return,
        };
    }

    pub fn finish(self) -> CompiledUnit {
        CompiledUnit {
            unit: self.unit,
            code: self.code,
            keys: self
                .keys
                .keys()
                .iter()
                .map(|k| k.as_str().to_string())
                .collect(),
        }
    }
}
