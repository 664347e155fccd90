use std::{collections::BTreeMap, error, fmt, slice};

use smol_str::SmolStr;

use crate::constants::{Address, VAR_BASE};

/// Declared variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    /// Data segment address of the variable.
    pub address: Address,
    /// Line of the declaration.
    pub line: u32,
}

/// Variables of the program, in declaration order.
///
/// Addresses are handed out contiguously starting at [`VAR_BASE`], so the
/// n-th declared variable lives at `VAR_BASE + n`. Lookups are exact
/// matches, identifiers are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    /// Index into `symbols` by name.
    names: BTreeMap<SmolStr, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, returning its new address.
    ///
    /// Declaring a name twice is an error and leaves the table unchanged.
    pub fn declare(&mut self, name: &str, line: u32) -> Result<Address, SymbolError> {
        if let Some(existing) = self.get(name) {
            return Err(SymbolError::Duplicate {
                name: existing.name.clone(),
                first_line: existing.line,
            });
        }

        let address = VAR_BASE + self.symbols.len() as Address;
        let name = SmolStr::from(name);
        self.names.insert(name.clone(), self.symbols.len());
        self.symbols.push(Symbol { name, address, line });

        Ok(address)
    }

    pub fn lookup(&self, name: &str) -> Result<Address, SymbolError> {
        self.get(name)
            .map(|symbol| symbol.address)
            .ok_or_else(|| SymbolError::Undeclared { name: SmolStr::from(name) })
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.names.get(name).map(|index| &self.symbols[*index])
    }

    /// Number of declared variables.
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Variables in declaration order.
    pub fn iter(&self) -> slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }
}

impl<'a> IntoIterator for &'a SymbolTable {
    type Item = &'a Symbol;
    type IntoIter = slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

/// Symbol table as an address map, one variable per line.
impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for symbol in &self.symbols {
            writeln!(f, "{:>4}  {}", symbol.address, symbol.name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    Duplicate { name: SmolStr, first_line: u32 },
    Undeclared { name: SmolStr },
}

impl error::Error for SymbolError {}

impl fmt::Display for SymbolError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SymbolError::Duplicate { name, first_line } => {
                write!(f, "variable '{name}' is already declared on line {first_line}")
            }
            SymbolError::Undeclared { name } => write!(f, "variable '{name}' is not declared"),
        }
    }
}
