//! Expressions.
//!
//! Precedence, from tightest to loosest binding:
//!
//! ```text
//! not, unary -      factor
//! * / div           term
//! + -               sum
//! = <> < <= > >=    relation (non-associative)
//! and or            logical
//! ```
//!
//! All binary operators are left associative. There is a single integer
//! type, so conditions are ordinary expressions where zero is false.
use super::{ident::Ident, literal::Number, nested, Parse, ParseError};
use crate::{
    constants::MAX_EXPR_DEPTH,
    token_stream::TokenStream,
    tokens::{Keyword, TokenKind},
};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Number(Number),
    /// Read a variable.
    Access(Ident),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryExpr {
    pub operator: UnaryOp,
    pub rhs: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    pub operator: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
}

impl BinaryOp {
    #[rustfmt::skip]
    fn from_token(kind: TokenKind) -> Option<Self> {
        use TokenKind as TK;
        match kind {
            TK::Plus                  => Some(Self::Add),
            TK::Minus                 => Some(Self::Sub),
            TK::Star                  => Some(Self::Mul),
            TK::Slash                 => Some(Self::Div),
            TK::Keyword(Keyword::Div) => Some(Self::Div),
            TK::Eq                    => Some(Self::Eq),
            TK::NotEq                 => Some(Self::NotEq),
            TK::Less                  => Some(Self::Less),
            TK::LessEq                => Some(Self::LessEq),
            TK::Greater               => Some(Self::Greater),
            TK::GreaterEq             => Some(Self::GreaterEq),
            TK::Keyword(Keyword::And) => Some(Self::And),
            TK::Keyword(Keyword::Or)  => Some(Self::Or),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryOp {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Add       => write!(f, "+"),
            Self::Sub       => write!(f, "-"),
            Self::Mul       => write!(f, "*"),
            Self::Div       => write!(f, "/"),
            Self::Eq        => write!(f, "="),
            Self::NotEq     => write!(f, "<>"),
            Self::Less      => write!(f, "<"),
            Self::LessEq    => write!(f, "<="),
            Self::Greater   => write!(f, ">"),
            Self::GreaterEq => write!(f, ">="),
            Self::And       => write!(f, "and"),
            Self::Or        => write!(f, "or"),
        }
    }
}

impl Parse for Expr {
    type Output = Self;
    type Err = ParseError;

    #[inline]
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        parse_logical(input)
    }
}

impl Expr {
    fn binary(operator: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(BinaryExpr {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    /// Visit every variable read in the expression, left to right.
    pub fn for_each_access<'a>(&'a self, f: &mut impl FnMut(&'a Ident)) {
        match self {
            Expr::Number(_) => {}
            Expr::Access(ident) => f(ident),
            Expr::Unary(unary) => unary.rhs.for_each_access(f),
            Expr::Binary(binary) => {
                binary.lhs.for_each_access(f);
                binary.rhs.for_each_access(f);
            }
        }
    }
}

/// Parse one precedence level of left associative operators.
///
/// Every operator in the chain deepens the tree by one node, so the chain
/// counts towards the stream's expression depth until the level is done.
fn parse_left_assoc(
    input: &mut TokenStream,
    is_operator: impl Fn(TokenKind) -> bool,
    operand: impl Fn(&mut TokenStream) -> Result<Expr, ParseError>,
) -> Result<Expr, ParseError> {
    let mut lhs = operand(input)?;
    let mut links = 0;

    let result = loop {
        let kind = input.peek_kind();
        match BinaryOp::from_token(kind) {
            Some(operator) if is_operator(kind) => {
                if input.expr_depth >= MAX_EXPR_DEPTH {
                    break Err(ParseError::unexpected(
                        input.peek().clone(),
                        format!("expression too complex, the limit is {MAX_EXPR_DEPTH} operators"),
                    ));
                }
                input.expr_depth += 1;
                links += 1;

                input.next_token();
                match operand(input) {
                    Ok(rhs) => lhs = Expr::binary(operator, lhs, rhs),
                    Err(err) => break Err(err),
                }
            }
            _ => break Ok(lhs),
        }
    };

    input.expr_depth -= links;
    result
}

fn parse_logical(input: &mut TokenStream) -> Result<Expr, ParseError> {
    parse_left_assoc(
        input,
        |kind| matches!(kind, TokenKind::Keyword(Keyword::And | Keyword::Or)),
        parse_relation,
    )
}

/// A comparison takes exactly two operands, `a < b < c` is rejected
/// by whatever construct expected the expression to end.
fn parse_relation(input: &mut TokenStream) -> Result<Expr, ParseError> {
    let lhs = parse_sum(input)?;

    let kind = input.peek_kind();
    match BinaryOp::from_token(kind) {
        Some(operator) if kind.is_relational() => {
            input.next_token();
            let rhs = parse_sum(input)?;
            Ok(Expr::binary(operator, lhs, rhs))
        }
        _ => Ok(lhs),
    }
}

fn parse_sum(input: &mut TokenStream) -> Result<Expr, ParseError> {
    parse_left_assoc(
        input,
        |kind| matches!(kind, TokenKind::Plus | TokenKind::Minus),
        parse_term,
    )
}

fn parse_term(input: &mut TokenStream) -> Result<Expr, ParseError> {
    parse_left_assoc(
        input,
        |kind| matches!(kind, TokenKind::Star | TokenKind::Slash | TokenKind::Keyword(Keyword::Div)),
        parse_factor,
    )
}

fn parse_factor(input: &mut TokenStream) -> Result<Expr, ParseError> {
    use TokenKind as TK;

    match input.peek_kind() {
        TK::Number => Number::parse(input).map(Expr::Number),
        TK::Ident => Ident::parse(input).map(Expr::Access),
        TK::LeftParen => nested(input, |input| {
            input.next_token();
            let expr = parse_logical(input)?;
            input.consume(TK::RightParen)?;
            Ok(expr)
        }),
        TK::Keyword(Keyword::Not) => nested(input, |input| {
            input.next_token();
            parse_unary(input, UnaryOp::Not)
        }),
        TK::Minus => nested(input, |input| {
            input.next_token();
            parse_unary(input, UnaryOp::Neg)
        }),
        _ => Err(ParseError::unexpected(input.peek().clone(), "expected an expression")),
    }
}

fn parse_unary(input: &mut TokenStream, operator: UnaryOp) -> Result<Expr, ParseError> {
    let rhs = parse_factor(input)?;
    Ok(Expr::Unary(UnaryExpr {
        operator,
        rhs: Box::new(rhs),
    }))
}
