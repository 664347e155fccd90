//! Variable declarations.
use super::{delim::Delimited, ident::Ident, report, Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, TokenKind},
};

/// `var a, b: integer; c: integer;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarSection {
    pub decls: Vec<VarDecl>,
}

/// One declaration line, naming one or more variables of a type.
///
/// `integer` is the only type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl {
    pub names: Delimited<Ident>,
}

impl VarSection {
    /// Declared names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &Ident> {
        self.decls.iter().flat_map(|decl| decl.names.iter())
    }
}

impl Parse for VarSection {
    type Output = Self;
    type Err = ParseError;

    /// A broken declaration is reported and skipped up to its `;`,
    /// or up to the `begin` of the program body.
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use TokenKind as T;

        input.consume(T::Keyword(Keyword::Var))?;

        if input.peek_kind() != T::Ident {
            let err = ParseError::unexpected(input.peek().clone(), "expected a variable declaration");
            report(input, &err);
        }

        let mut decls = vec![];

        while input.peek_kind() == T::Ident {
            match VarDecl::parse(input) {
                Ok(decl) => decls.push(decl),
                Err(err) => {
                    report(input, &err);
                    input.ignore_while(|kind| {
                        !matches!(kind, T::Semicolon | T::Keyword(Keyword::Begin) | T::Dot)
                    });
                    input.match_token(T::Semicolon);
                }
            }
        }

        Ok(VarSection { decls })
    }
}

impl Parse for VarDecl {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let names = Delimited::<Ident>::parse(input)?;
        input.consume(TokenKind::Colon)?;

        if input.peek_kind() != TokenKind::Keyword(Keyword::Integer) {
            return Err(ParseError::unexpected(input.peek().clone(), "expected type 'integer'"));
        }
        input.next_token();
        input.consume(TokenKind::Semicolon)?;

        Ok(VarDecl { names })
    }
}
