use super::{decl::VarSection, stmts::Compound, Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Keyword, TokenKind},
};

/// Optional declarations followed by the program body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub vars: Option<VarSection>,
    pub body: Compound,
}

impl Parse for Block {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let vars = if input.peek_kind() == TokenKind::Keyword(Keyword::Var) {
            Some(VarSection::parse(input)?)
        } else {
            None
        };

        let body = Compound::parse(input)?;

        Ok(Block { vars, body })
    }
}
