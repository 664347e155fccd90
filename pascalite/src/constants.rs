//! Constant values of the PascalLite language and the MEPA machine.

/// Identifiers longer than this many characters are a lexical error.
pub const MAX_IDENT_LEN: usize = 20;

/// Deepest nesting of parentheses, unary operators and structured
/// statements the parser accepts.
pub const MAX_NESTING: usize = 256;

/// Longest chain of binary operators a single expression may build up,
/// counted across all nesting levels.
pub const MAX_EXPR_DEPTH: usize = 1024;

/// Address of the first declared variable in the MEPA data segment.
///
/// Each further variable takes the next address, in declaration order.
pub const VAR_BASE: Address = 0;

/// Maximum depth of the MEPA evaluation stack, not counting the data segment.
///
/// Expressions in PascalLite are shallow, so hitting this
/// limit means the interpreter is executing garbage.
pub const STACK_SIZE: usize = 0x1000; // 4096

/// Type for data segment addresses and instruction indices.
pub type Address = u32;

/// Type of the single integer scalar the machine computes with.
pub type Word = i64;
