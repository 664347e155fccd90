//! Literal values.
use super::{Parse, ParseError};
use crate::{constants::Word, token_stream::TokenStream, tokens::TokenKind};

/// Unsigned integer literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number {
    pub value: Word,
    pub line: u32,
}

impl Parse for Number {
    type Output = Self;
    type Err = ParseError;

    #[inline]
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let token = input.consume(TokenKind::Number)?;
        let value = input
            .span_fragment(&token.span)
            .parse::<Word>()
            .map_err(|_| ParseError::NumberRange(token.clone()))?;

        Ok(Number {
            value,
            line: token.span.line,
        })
    }
}
