//! MEPA instructions.
use std::{fmt, ops::Index, slice};

use super::label::LabelId;
use crate::constants::{Address, Word};

/// MEPA instruction.
///
/// Comparison and logic instructions pop two operands, the right-hand side
/// being on top, and push `1` for true or `0` for false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    /// `INPP`
    /// Start of program.
    Start,
    /// `AMEM m`
    /// Reserve `m` cells for the variable segment.
    Alloc(Address),
    /// `CRCT k`
    /// Push constant `k`.
    LoadConst(Word),
    /// `CRVL n`
    /// Push the value of the variable at address `n`.
    LoadVar(Address),
    /// `ARMZ n`
    /// Pop the top of the stack into the variable at address `n`.
    Store(Address),
    /// `SOMA`
    Add,
    /// `SUBT`
    Sub,
    /// `MULT`
    Mul,
    /// `DIVI`
    /// Integer division, truncating towards zero.
    Div,
    /// `INVR`
    /// Negate the top of the stack.
    Neg,
    /// `CONJ`
    And,
    /// `DISJ`
    Or,
    /// `NEGA`
    /// Logical not, zero becomes `1` and anything else `0`.
    Not,
    /// `CMME`
    Less,
    /// `CMMA`
    Greater,
    /// `CMIG`
    Eq,
    /// `CMDG`
    NotEq,
    /// `CMEG`
    LessEq,
    /// `CMAG`
    GreaterEq,
    /// `DSVS p`
    /// Unconditional jump to instruction `p`.
    Jump(Target),
    /// `DSVF p`
    /// Pop the top of the stack and jump to instruction `p` if it is zero.
    JumpFalse(Target),
    /// `NADA`
    Nop,
    /// `LEIT`
    /// Read a value from input and push it.
    Read,
    /// `IMPR`
    /// Pop the top of the stack and write it to output.
    Write,
    /// `PARA`
    /// Halt the machine.
    Halt,
}

/// Operand of a jump instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Placeholder for a label whose position is not known yet.
    Label(LabelId),
    /// Index of an instruction in the program.
    Addr(Address),
}

impl Instr {
    #[rustfmt::skip]
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instr::Start        => "INPP",
            Instr::Alloc(_)     => "AMEM",
            Instr::LoadConst(_) => "CRCT",
            Instr::LoadVar(_)   => "CRVL",
            Instr::Store(_)     => "ARMZ",
            Instr::Add          => "SOMA",
            Instr::Sub          => "SUBT",
            Instr::Mul          => "MULT",
            Instr::Div          => "DIVI",
            Instr::Neg          => "INVR",
            Instr::And          => "CONJ",
            Instr::Or           => "DISJ",
            Instr::Not          => "NEGA",
            Instr::Less         => "CMME",
            Instr::Greater      => "CMMA",
            Instr::Eq           => "CMIG",
            Instr::NotEq        => "CMDG",
            Instr::LessEq       => "CMEG",
            Instr::GreaterEq    => "CMAG",
            Instr::Jump(_)      => "DSVS",
            Instr::JumpFalse(_) => "DSVF",
            Instr::Nop          => "NADA",
            Instr::Read         => "LEIT",
            Instr::Write        => "IMPR",
            Instr::Halt         => "PARA",
        }
    }

    /// Jump target, if this is a jump instruction.
    #[inline]
    pub fn target(&self) -> Option<Target> {
        match self {
            Instr::Jump(target) | Instr::JumpFalse(target) => Some(*target),
            _ => None,
        }
    }
}

/// Outputs instruction as MEPA assembly.
impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = self.mnemonic();
        match self {
            Instr::Alloc(n) | Instr::LoadVar(n) | Instr::Store(n) => write!(f, "{name} {n}"),
            Instr::LoadConst(k) => write!(f, "{name} {k}"),
            Instr::Jump(target) | Instr::JumpFalse(target) => write!(f, "{name} {target}"),
            _ => write!(f, "{name}"),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Target::Label(label) => write!(f, "{label}"),
            Target::Addr(addr) => write!(f, "{addr}"),
        }
    }
}

/// Generated program.
///
/// Instructions are append-only: the index of an instruction is its
/// address and never changes. Only the target of a pending jump may be
/// written after emission, see [`super::label::Labels::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Code {
    instrs: Vec<Instr>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instruction, returning its address.
    #[inline]
    pub fn emit(&mut self, instr: Instr) -> Address {
        let addr = self.next_addr();
        self.instrs.push(instr);
        addr
    }

    /// Address the next emitted instruction will have.
    #[inline]
    pub fn next_addr(&self) -> Address {
        self.instrs.len() as Address
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Instr> {
        self.instrs.iter()
    }

    pub fn as_slice(&self) -> &[Instr] {
        &self.instrs
    }

    /// Write the resolved target of the pending jump at `addr`.
    ///
    /// # Panics
    ///
    /// Panics when the instruction is not a jump waiting on `label`.
    pub(crate) fn patch(&mut self, addr: Address, label: LabelId, resolved: Address) {
        match self.instrs.get_mut(addr as usize) {
            Some(Instr::Jump(target)) | Some(Instr::JumpFalse(target)) if *target == Target::Label(label) => {
                *target = Target::Addr(resolved);
            }
            other => panic!("instruction at {addr} is not a jump pending on {label}: {other:?}"),
        }
    }
}

impl Index<usize> for Code {
    type Output = Instr;

    fn index(&self, index: usize) -> &Self::Output {
        &self.instrs[index]
    }
}

impl<'a> IntoIterator for &'a Code {
    type Item = &'a Instr;
    type IntoIter = slice::Iter<'a, Instr>;

    fn into_iter(self) -> Self::IntoIter {
        self.instrs.iter()
    }
}

/// One instruction per line.
impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for instr in &self.instrs {
            writeln!(f, "{instr}")?;
        }
        Ok(())
    }
}
