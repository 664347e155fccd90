use super::{Parse, ParseError};
use crate::{token_stream::TokenStream, tokens::TokenKind};
use smol_str::SmolStr;

/// Identifier node, either a declaration or a use of a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: SmolStr,
    /// Line where the name appears, used for semantic errors.
    pub line: u32,
}

impl Parse for Ident {
    type Output = Self;
    type Err = ParseError;

    #[inline]
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let token = input.consume(TokenKind::Ident)?;
        let name = SmolStr::from(input.span_fragment(&token.span));
        Ok(Ident {
            name,
            line: token.span.line,
        })
    }
}
