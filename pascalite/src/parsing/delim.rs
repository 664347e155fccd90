//! Comma delimited list.
use super::{Parse, ParseError};
use crate::{token_stream::TokenStream, tokens::TokenKind};
use std::slice;

/// One or more items separated by commas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimited<T> {
    pub items: Vec<T>,
}

impl<T> Delimited<T> {
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Parse for Delimited<T>
where
    T: Parse<Output = T, Err = ParseError>,
{
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let mut items = vec![T::parse(input)?];

        while input.match_token(TokenKind::Comma) {
            items.push(T::parse(input)?);
        }

        Ok(Delimited { items })
    }
}

impl<'a, T> IntoIterator for &'a Delimited<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
