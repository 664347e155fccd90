//! Semantic analysis and MEPA code generation.
mod codegen;
mod ir;
mod label;
mod symbol;

pub use codegen::CodeGen;
pub use ir::{Code, Instr, Target};
pub use label::{JumpKind, LabelId, Labels};
pub use symbol::{Symbol, SymbolError, SymbolTable};

use crate::{constants::MAX_IDENT_LEN, PascalError, PascalResult};

/// Compiler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompileConf {
    /// Identifiers longer than this are a lexical error.
    pub max_ident_len: usize,
    /// Emit `AMEM n` after `INPP` to reserve the variable segment.
    ///
    /// Without it the code is a listing only: the interpreter has no
    /// variable segment, so any variable access fails at run time.
    pub reserve_memory: bool,
}

impl Default for CompileConf {
    fn default() -> Self {
        Self {
            max_ident_len: MAX_IDENT_LEN,
            reserve_memory: true,
        }
    }
}

impl CompileConf {
    /// Reject settings whose code can be listed but not executed.
    pub fn check_runnable(&self) -> PascalResult<()> {
        if self.reserve_memory {
            Ok(())
        } else {
            Err(PascalError::Conf(
                "code compiled with 'reserve_memory: false' cannot be run".to_owned(),
            ))
        }
    }
}
