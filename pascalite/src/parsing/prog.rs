use super::{block::Block, ident::Ident, report, Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, TokenKind},
};

/// `program name; block .`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// Missing when the header was malformed.
    pub name: Option<Ident>,
    pub block: Block,
}

impl Program {
    fn parse_header(input: &mut TokenStream) -> Result<Ident, ParseError> {
        input.consume(TokenKind::Keyword(Keyword::Program))?;
        let name = Ident::parse(input)?;
        input.consume(TokenKind::Semicolon)?;
        Ok(name)
    }
}

impl Parse for Program {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use TokenKind as T;

        let name = match Self::parse_header(input) {
            Ok(name) => Some(name),
            Err(err) => {
                report(input, &err);
                input.ignore_while(|kind| !matches!(kind, T::Keyword(Keyword::Var | Keyword::Begin)));
                None
            }
        };

        let block = Block::parse(input)?;

        if let Err(err) = input.consume(T::Dot) {
            report(input, &ParseError::from(err));
        } else if input.peek_kind() != T::EOF {
            let err = ParseError::unexpected(input.peek().clone(), "expected end-of-file after '.'");
            report(input, &err);
        }

        Ok(Program { name, block })
    }
}
