pub mod compile;
pub mod constants;
pub mod diagnostic;
mod error;
pub mod lex;
pub mod parsing;
pub mod token_stream;
pub mod tokens;
pub mod vm;

use compile::{Code, CodeGen, CompileConf, SymbolTable};
use constants::Word;
use diagnostic::Diagnostics;

pub use error::{PascalError, PascalResult};

pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use super::{
        compile,
        compile::{Code, CompileConf, Instr},
        compile_str,
        diagnostic::{Diagnostic, Diagnostics, Severity},
        error::{PascalError, PascalResult},
        run_str,
        vm::{MepaConf, MepaVm},
        Compilation,
    };
}

/// Everything a compilation produced.
///
/// The code is only complete and runnable when there are no diagnostics.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub code: Code,
    pub symbols: SymbolTable,
    /// Lexical, syntactic and semantic errors, ordered by line.
    pub diagnostics: Diagnostics,
}

impl Compilation {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Size of the variable segment the program needs.
    #[inline]
    pub fn var_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn into_result(self) -> PascalResult<Code> {
        if self.is_ok() {
            Ok(self.code)
        } else {
            Err(PascalError::Compile(self.diagnostics))
        }
    }
}

/// Run the whole pipeline over one source text.
///
/// Never stops at the first error: the returned diagnostics cover
/// the whole source.
pub fn compile(source: &str, conf: &CompileConf) -> Compilation {
    // Lexical analysis
    let lexer = lex::Lexer::with_ident_limit(source, conf.max_ident_len);
    let mut stream = token_stream::TokenStream::new(lexer);

    // Syntactic analysis
    let tree = parsing::parse_program(&mut stream);
    let mut diagnostics = stream.take_diagnostics();
    log::debug!("parsed program with {} diagnostic(s)", diagnostics.len());

    // Semantic analysis and code generation
    let mut codegen = CodeGen::new(conf.clone());
    if let Some(tree) = &tree {
        codegen.compile(tree);
    }
    let (code, symbols, semantic) = codegen.finish();
    log::debug!(
        "generated {} instruction(s) for {} variable(s), {} semantic diagnostic(s)",
        code.len(),
        symbols.len(),
        semantic.len()
    );

    diagnostics.extend(semantic);
    diagnostics.sort_by_line();

    Compilation {
        code,
        symbols,
        diagnostics,
    }
}

/// Compile with the default configuration, failing on any diagnostic.
pub fn compile_str(source: &str) -> PascalResult<Code> {
    compile(source, &CompileConf::default()).into_result()
}

/// Compile and run a program, returning the values it wrote.
pub fn run_str(source: &str, input: impl IntoIterator<Item = Word>) -> PascalResult<Vec<Word>> {
    let code = compile_str(source)?;
    let output = vm::run(&code, input, vm::MepaConf::default())?;
    Ok(output)
}
