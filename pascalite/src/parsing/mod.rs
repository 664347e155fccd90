//! Syntactic analysis.
//!
//! Each grammar construct is a node type implementing [`Parse`]. Errors
//! inside a statement list or declaration list are reported to the token
//! stream's diagnostics, and parsing resumes at the next synchronization
//! token. The resulting tree only contains constructs that parsed cleanly.
mod block;
mod decl;
mod delim;
mod expr;
mod ident;
mod literal;
mod prog;
mod stmts;

pub use block::*;
pub use decl::*;
pub use delim::*;
pub use expr::*;
pub use ident::*;
pub use literal::*;
pub use prog::*;
pub use stmts::*;

use crate::{
    constants::MAX_NESTING,
    diagnostic::{Diagnostic, Severity},
    token_stream::{TokenError, TokenStream},
    tokens::{Keyword, Token, TokenKind},
};
use std::{error::Error, fmt};

pub trait Parse: Sized {
    type Output;
    type Err: Error;

    fn parse(input: &mut TokenStream) -> Result<Self::Output, Self::Err>;
}

/// Parse a whole program, reporting any error that could not be
/// recovered from locally.
///
/// Returns `None` when not even a partial tree could be built.
pub fn parse_program(input: &mut TokenStream) -> Option<Program> {
    match Program::parse(input) {
        Ok(program) => Some(program),
        Err(err) => {
            report(input, &err);
            None
        }
    }
}

/// Record the error as a syntactic diagnostic.
pub(crate) fn report(input: &mut TokenStream, err: &ParseError) {
    let diagnostic = Diagnostic::new(Severity::Syntactic, err.describe(input.source_code()), err.line());
    input.report(diagnostic);
}

/// Parse a construct that may contain itself.
///
/// Input nested deeper than [`MAX_NESTING`] is a syntax error at the
/// token that would open the next level.
pub(crate) fn nested<T>(
    input: &mut TokenStream,
    parse: impl FnOnce(&mut TokenStream) -> Result<T, ParseError>,
) -> Result<T, ParseError> {
    if input.nesting >= MAX_NESTING {
        return Err(ParseError::unexpected(
            input.peek().clone(),
            format!("nesting too deep, the limit is {MAX_NESTING} levels"),
        ));
    }

    input.nesting += 1;
    let result = parse(input);
    input.nesting -= 1;
    result
}

/// Tokens where parsing resumes after a syntax error in a statement.
pub fn is_sync_token(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Semicolon | TokenKind::Keyword(Keyword::End) | TokenKind::Dot | TokenKind::EOF
    )
}

/// Skip tokens up to, but not including, the next synchronization token.
pub(crate) fn synchronize(input: &mut TokenStream) {
    input.ignore_while(|kind| !is_sync_token(kind));
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Token(TokenError),
    Unexpected { encountered: Token, msg: String },
    /// Integer literal does not fit the machine word.
    NumberRange(Token),
}

impl ParseError {
    pub fn unexpected(encountered: Token, msg: impl ToString) -> Self {
        ParseError::Unexpected {
            encountered,
            msg: msg.to_string(),
        }
    }

    /// The offending token.
    pub fn token(&self) -> &Token {
        match self {
            ParseError::Token(err) => &err.encountered,
            ParseError::Unexpected { encountered, .. } => encountered,
            ParseError::NumberRange(token) => token,
        }
    }

    pub fn line(&self) -> u32 {
        self.token().span.line
    }

    /// Message that quotes the offending source text.
    pub fn describe(&self, source: &str) -> String {
        let found = match self.token().kind {
            TokenKind::EOF => "end-of-file".to_owned(),
            _ => format!("'{}'", self.token().fragment(source)),
        };

        match self {
            ParseError::Token(err) => format!("expected '{}', found {found}", err.expected),
            ParseError::Unexpected { msg, .. } => format!("{msg}, found {found}"),
            ParseError::NumberRange(_) => format!("integer literal {found} is out of range"),
        }
    }
}

impl Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Token(err) => fmt::Display::fmt(err, f),
            ParseError::Unexpected { encountered, msg } => {
                write!(f, "{msg}, found '{}' on line {}", encountered.kind, encountered.span.line)
            }
            ParseError::NumberRange(token) => write!(f, "integer literal out of range on line {}", token.span.line),
        }
    }
}

impl From<TokenError> for ParseError {
    fn from(err: TokenError) -> Self {
        ParseError::Token(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lex::Lexer;

    fn parse(source: &str) -> (Option<Program>, crate::diagnostic::Diagnostics) {
        let mut input = TokenStream::new(Lexer::new(source));
        let program = parse_program(&mut input);
        (program, input.take_diagnostics())
    }

    #[test]
    fn test_parse_minimal() {
        let (program, diagnostics) = parse("program p; begin end.");
        assert!(diagnostics.is_empty(), "{diagnostics}");
        let program = program.unwrap();
        assert_eq!(program.name.as_ref().map(|n| n.name.as_str()), Some("p"));
        assert!(program.block.vars.is_none());
    }

    #[test]
    fn test_parse_declarations() {
        let (program, diagnostics) = parse("program p; var a, b: integer; c: integer; begin end.");
        assert!(diagnostics.is_empty(), "{diagnostics}");
        let vars = program.unwrap().block.vars.unwrap();
        let names = vars
            .decls
            .iter()
            .flat_map(|decl| decl.names.iter())
            .map(|ident| ident.name.as_str().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_recover_bad_statement() {
        let source = "program p;\nvar x: integer;\nbegin\n  x := ;\n  x := 2\nend.";
        let (program, diagnostics) = parse(source);
        assert_eq!(diagnostics.len(), 1, "{diagnostics}");
        assert_eq!(diagnostics.as_slice()[0].severity, Severity::Syntactic);
        assert_eq!(diagnostics.as_slice()[0].line, 4);

        // The broken statement is dropped, the next one survives.
        let body = program.unwrap().block.body;
        let assigns = body.stmts.iter().filter(|s| matches!(s, Stmt::Assign(_))).count();
        assert_eq!(assigns, 1);
    }

    #[test]
    fn test_recover_multiple_errors() {
        let source = "program p;\nvar x: integer;\nbegin\n  x := 1 +;\n  x 2;\n  write x\nend.";
        let (program, diagnostics) = parse(source);
        assert!(program.is_some());
        let lines = diagnostics.iter().map(|d| d.line).collect::<Vec<_>>();
        assert_eq!(lines, vec![4, 5]);
    }

    #[test]
    fn test_recover_bad_declaration() {
        let source = "program p;\nvar x: real;\n y: integer;\nbegin y := 1 end.";
        let (program, diagnostics) = parse(source);
        assert_eq!(diagnostics.len(), 1, "{diagnostics}");
        assert_eq!(diagnostics.as_slice()[0].line, 2);
        let vars = program.unwrap().block.vars.unwrap();
        assert_eq!(vars.decls.len(), 1);
        assert_eq!(vars.decls[0].names.items[0].name, "y");
    }

    #[test]
    fn test_missing_end() {
        let (program, diagnostics) = parse("program p; var x: integer; begin x := 1 .");
        assert!(program.is_some());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.as_slice()[0].message.contains("'end'"));
    }

    #[test]
    fn test_missing_begin_fails() {
        let (program, diagnostics) = parse("program p; var x: integer; x := 1 end.");
        assert!(program.is_none());
        assert!(diagnostics.count(Severity::Syntactic) >= 1);
    }

    #[test]
    fn test_trailing_tokens() {
        let (_, diagnostics) = parse("program p; begin end. x");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_bad_header_recovers() {
        let (program, diagnostics) = parse("program ; var x: integer; begin x := 1 end.");
        assert_eq!(diagnostics.len(), 1);
        let program = program.unwrap();
        assert!(program.name.is_none());
        assert_eq!(program.block.body.stmts.len(), 1);
    }
}
