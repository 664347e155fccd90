//! Jump labels.
use std::fmt;

use super::ir::{Code, Instr, Target};
use crate::constants::Address;

/// Handle to a jump destination that may not have an address yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelId(pub(crate) u32);

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Debug)]
enum LabelState {
    /// Addresses of jumps waiting for this label.
    Pending(Vec<Address>),
    Resolved(Address),
}

/// Forward jump bookkeeping.
///
/// A jump to a label that is not resolved yet is emitted with a placeholder
/// operand and remembered. Resolving the label writes the address into every
/// remembered jump. Jumps to an already resolved label get the address
/// directly, which is how loops jump backwards.
#[derive(Debug, Default)]
pub struct Labels {
    labels: Vec<LabelState>,
}

/// Which jump instruction to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Always,
    IfFalse,
}

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_label(&mut self) -> LabelId {
        let id = LabelId(self.labels.len() as u32);
        self.labels.push(LabelState::Pending(vec![]));
        id
    }

    /// Emit a jump to `label`, returning the jump's address.
    pub fn emit_jump(&mut self, code: &mut Code, kind: JumpKind, label: LabelId) -> Address {
        let state = &mut self.labels[label.0 as usize];

        let target = match state {
            LabelState::Resolved(addr) => Target::Addr(*addr),
            LabelState::Pending(_) => Target::Label(label),
        };

        let addr = code.emit(match kind {
            JumpKind::Always => Instr::Jump(target),
            JumpKind::IfFalse => Instr::JumpFalse(target),
        });

        if let LabelState::Pending(jumps) = state {
            jumps.push(addr);
        }

        addr
    }

    /// Bind `label` to `target`, patching every pending jump.
    ///
    /// # Panics
    ///
    /// A label can only be resolved once.
    pub fn resolve(&mut self, code: &mut Code, label: LabelId, target: Address) {
        let state = std::mem::replace(&mut self.labels[label.0 as usize], LabelState::Resolved(target));

        match state {
            LabelState::Pending(jumps) => {
                for addr in jumps {
                    code.patch(addr, label, target);
                }
            }
            LabelState::Resolved(prev) => panic!("label {label} resolved twice, first to {prev} then to {target}"),
        }
    }

    /// Bind `label` to the address of the next emitted instruction.
    #[inline]
    pub fn resolve_here(&mut self, code: &mut Code, label: LabelId) {
        let target = code.next_addr();
        self.resolve(code, label, target);
    }

    /// Labels that were created but never resolved.
    pub fn unresolved(&self) -> impl Iterator<Item = LabelId> + '_ {
        self.labels.iter().enumerate().filter_map(|(index, state)| match state {
            LabelState::Pending(_) => Some(LabelId(index as u32)),
            LabelState::Resolved(_) => None,
        })
    }

    /// # Panics
    ///
    /// Panics if any label is unresolved, which would leave a placeholder
    /// operand in the program.
    pub fn assert_resolved(&self) {
        let unresolved = self.unresolved().collect::<Vec<_>>();
        assert!(unresolved.is_empty(), "unresolved labels: {unresolved:?}");
    }
}
