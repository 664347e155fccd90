//! Statement parsing.
use super::{delim::Delimited, expr::Expr, ident::Ident, nested, report, synchronize, Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, TokenKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Assign(Assign),
    If(IfStmt),
    While(WhileStmt),
    Read(ReadStmt),
    Write(WriteStmt),
    Compound(Compound),
    /// Nothing between two separators, or before `end`.
    Empty,
}

/// `x := expr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assign {
    pub target: Ident,
    pub rhs: Expr,
}

/// `if cond then stmt [else stmt]`
///
/// A dangling `else` binds to the nearest `if`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
}

/// `while cond do stmt`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Box<Stmt>,
}

/// `read x` or `read(x, y, ...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadStmt {
    pub targets: Delimited<Ident>,
}

/// `write expr` or `write(expr, expr, ...)`
///
/// When `write` is followed by a parenthesis the argument list form is
/// used, so `write (a) + 1` is a syntax error rather than `write a + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteStmt {
    pub args: Delimited<Expr>,
}

/// `begin stmt; stmt; ... end`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    pub stmts: Vec<Stmt>,
}

impl Parse for Stmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use Keyword as K;
        use TokenKind as T;

        match input.peek_kind() {
            T::Ident => Assign::parse(input).map(Stmt::Assign),
            T::Keyword(K::If) => nested(input, IfStmt::parse).map(Stmt::If),
            T::Keyword(K::While) => nested(input, WhileStmt::parse).map(Stmt::While),
            T::Keyword(K::Read) => ReadStmt::parse(input).map(Stmt::Read),
            T::Keyword(K::Write) => WriteStmt::parse(input).map(Stmt::Write),
            T::Keyword(K::Begin) => nested(input, Compound::parse).map(Stmt::Compound),
            T::Semicolon | T::Keyword(K::End) | T::Keyword(K::Else) | T::Dot | T::EOF => Ok(Stmt::Empty),
            _ => Err(ParseError::unexpected(input.peek().clone(), "expected a statement")),
        }
    }
}

impl Parse for Assign {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let target = Ident::parse(input)?;
        input.consume(TokenKind::Assign)?;
        let rhs = Expr::parse(input)?;

        Ok(Assign { target, rhs })
    }
}

impl Parse for IfStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.consume(TokenKind::Keyword(Keyword::If))?;
        let cond = Expr::parse(input)?;
        input.consume(TokenKind::Keyword(Keyword::Then))?;
        let then_branch = Box::new(Stmt::parse(input)?);

        let else_branch = if input.match_token(TokenKind::Keyword(Keyword::Else)) {
            Some(Box::new(Stmt::parse(input)?))
        } else {
            None
        };

        Ok(IfStmt {
            cond,
            then_branch,
            else_branch,
        })
    }
}

impl Parse for WhileStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.consume(TokenKind::Keyword(Keyword::While))?;
        let cond = Expr::parse(input)?;
        input.consume(TokenKind::Keyword(Keyword::Do))?;
        let body = Box::new(Stmt::parse(input)?);

        Ok(WhileStmt { cond, body })
    }
}

impl Parse for ReadStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.consume(TokenKind::Keyword(Keyword::Read))?;
        let targets = parse_args(input)?;

        Ok(ReadStmt { targets })
    }
}

impl Parse for WriteStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        input.consume(TokenKind::Keyword(Keyword::Write))?;
        let args = parse_args(input)?;

        Ok(WriteStmt { args })
    }
}

/// Either a parenthesised, comma separated list, or a single bare item.
fn parse_args<T>(input: &mut TokenStream) -> Result<Delimited<T>, ParseError>
where
    T: Parse<Output = T, Err = ParseError>,
{
    if input.match_token(TokenKind::LeftParen) {
        let args = Delimited::<T>::parse(input)?;
        input.consume(TokenKind::RightParen)?;
        Ok(args)
    } else {
        Ok(Delimited {
            items: vec![T::parse(input)?],
        })
    }
}

impl Parse for Compound {
    type Output = Self;
    type Err = ParseError;

    /// Statements that fail to parse are reported and left out of the
    /// list. Parsing resumes at the next `;`, `end` or `.`.
    ///
    /// A missing `end` is reported here as well, so only a missing
    /// `begin` fails the whole compound statement.
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use TokenKind as T;

        input.consume(T::Keyword(Keyword::Begin))?;

        let mut stmts = vec![];

        loop {
            match Stmt::parse(input) {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    report(input, &err);
                    synchronize(input);
                }
            }

            match input.peek_kind() {
                T::Semicolon => {
                    input.next_token();
                }
                T::Keyword(Keyword::End) | T::Dot | T::EOF => break,
                _ => {
                    let err = ParseError::unexpected(input.peek().clone(), "expected ';' or 'end'");
                    report(input, &err);
                    synchronize(input);
                    if !input.match_token(T::Semicolon) {
                        break;
                    }
                }
            }
        }

        if let Err(err) = input.consume(T::Keyword(Keyword::End)) {
            report(input, &ParseError::from(err));
        }

        Ok(Compound { stmts })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lex::Lexer;

    fn parse_stmt(source: &str) -> Result<Stmt, ParseError> {
        let mut input = TokenStream::new(Lexer::new(source));
        Stmt::parse(&mut input)
    }

    #[test]
    fn test_dangling_else() {
        let stmt = parse_stmt("if a then if b then x := 1 else x := 2").unwrap();
        match stmt {
            Stmt::If(outer) => {
                assert!(outer.else_branch.is_none());
                match *outer.then_branch {
                    Stmt::If(inner) => assert!(inner.else_branch.is_some()),
                    other => panic!("unexpected {other:?}"),
                }
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_io_forms() {
        match parse_stmt("read(a, b, c)").unwrap() {
            Stmt::Read(read) => assert_eq!(read.targets.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
        match parse_stmt("read a").unwrap() {
            Stmt::Read(read) => assert_eq!(read.targets.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
        match parse_stmt("write(a + 1, 2)").unwrap() {
            Stmt::Write(write) => assert_eq!(write.args.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
        match parse_stmt("write a * 2").unwrap() {
            Stmt::Write(write) => assert!(matches!(write.args.items[0], Expr::Binary(_))),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_read_requires_identifier() {
        let err = parse_stmt("read(1)").unwrap_err();
        assert_eq!(err.token().kind, TokenKind::Number);
    }

    #[test]
    fn test_empty_statements() {
        let mut input = TokenStream::new(Lexer::new("begin ; x := 1; ; end"));
        let compound = Compound::parse(&mut input).unwrap();
        assert!(input.diagnostics().is_empty());
        assert_eq!(compound.stmts.len(), 4);
        assert_eq!(compound.stmts.iter().filter(|s| **s == Stmt::Empty).count(), 3);
    }

    #[test]
    fn test_missing_separator() {
        let mut input = TokenStream::new(Lexer::new("begin x := 1 y := 2; z := 3 end"));
        let compound = Compound::parse(&mut input).unwrap();
        assert_eq!(input.diagnostics().len(), 1);
        // `y := 2` is skipped during recovery.
        assert_eq!(compound.stmts.len(), 2);
    }

    #[test]
    fn test_deep_statement_nesting() {
        let source = format!("{}x := 1", "while x do ".repeat(5000));
        let err = parse_stmt(&source).unwrap_err();
        assert_eq!(err.token().kind, TokenKind::Keyword(Keyword::While));
        assert!(err.describe(&source).starts_with("nesting too deep"));

        // Each rejected `begin` is reported and skipped inside its parent.
        let source = format!("{}{}", "begin ".repeat(5000), "end ".repeat(5000));
        let mut input = TokenStream::new(Lexer::new(&source));
        assert!(Stmt::parse(&mut input).is_ok());
        assert!(!input.diagnostics().is_empty());
        assert_eq!(input.nesting, 0);
    }

    #[test]
    fn test_nested_compound() {
        let stmt = parse_stmt("while i < 10 do begin i := i + 1; write i end").unwrap();
        match stmt {
            Stmt::While(w) => match *w.body {
                Stmt::Compound(c) => assert_eq!(c.stmts.len(), 2),
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }
}
