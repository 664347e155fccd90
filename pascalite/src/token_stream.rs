//! Token stream with one token of look ahead.
use std::{error, fmt};

use crate::{
    diagnostic::{Diagnostic, Diagnostics},
    lex::{LexErrorKind, Lexer, LexerIter},
    tokens::{Span, Token, TokenKind},
};

/// Stream of tokens with one token of lookahead.
///
/// Tokens are lazily lexed. Peeking or consuming the next token
/// triggers the internal lexer. Lexical errors never reach the parser:
/// they are reported to the stream's diagnostics and the offending
/// characters are skipped. An overlong identifier is reported and then
/// handed to the parser as a normal identifier, so one bad name does not
/// also cause a cascade of syntax errors.
pub struct TokenStream<'a> {
    lexer: LexerIter<'a>,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    original: &'a str,
    peeked: Option<Token>,
    diagnostics: Diagnostics,
    /// Nested constructs currently being parsed.
    pub(crate) nesting: usize,
    /// Binary operator nodes on the path to the expression being parsed.
    pub(crate) expr_depth: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            original: lexer.source_code(),
            lexer: lexer.into_iter(),
            peeked: None,
            diagnostics: Diagnostics::new(),
            nesting: 0,
            expr_depth: 0,
        }
    }

    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Helper function to extract the span's string fragment
    /// from the original source code.
    #[inline]
    pub fn span_fragment(&self, span: &Span) -> &'a str {
        span.fragment(self.original)
    }

    /// Pull from the lexer until a token is available.
    fn fill(&mut self) -> &Token {
        while self.peeked.is_none() {
            match self.lexer.next() {
                Some(Ok(token)) => self.peeked = Some(token),
                Some(Err(err)) => {
                    self.diagnostics.report(Diagnostic::lexical(&err, self.original));
                    if let LexErrorKind::IdentTooLong { .. } = err.kind {
                        self.peeked = Some(Token {
                            span: err.span,
                            kind: TokenKind::Ident,
                        });
                    }
                }
                None => unreachable!("token stream must not be advanced past end-of-file"),
            }
        }

        match self.peeked {
            Some(ref token) => token,
            None => unreachable!(),
        }
    }

    /// Return the current token without advancing the cursor.
    ///
    /// At the end of the source this keeps returning the EOF token.
    #[inline]
    pub fn peek(&mut self) -> &Token {
        self.fill()
    }

    /// Return the current token kind without advancing the cursor.
    #[inline]
    pub fn peek_kind(&mut self) -> TokenKind {
        self.fill().kind
    }

    /// Consumes the current token regardless of type.
    ///
    /// The EOF token is never consumed, it is returned on every call.
    pub fn next_token(&mut self) -> Token {
        let token = self.fill().clone();
        if token.kind != TokenKind::EOF {
            self.peeked = None;
        }
        token
    }

    /// Consumes the current token if it matches the given token kind.
    ///
    /// Returns true when matched. Returns false when token kinds
    /// do not match.
    ///
    /// Does not consume the token if the types do not match.
    pub fn match_token(&mut self, token_kind: TokenKind) -> bool {
        let is_match = self.peek_kind() == token_kind;
        if is_match {
            let _ = self.next_token(); // discard
        }
        is_match
    }

    /// Return the current token and advance the cursor.
    ///
    /// The consumed token must match the given token type, otherwise
    /// a [`TokenError`] is returned. The cursor is not advanced if
    /// the token kind does not match.
    pub fn consume(&mut self, token_kind: TokenKind) -> Result<Token, TokenError> {
        if self.peek_kind() != token_kind {
            Err(TokenError {
                expected: token_kind,
                encountered: self.peek().clone(),
            })
        } else {
            Ok(self.next_token())
        }
    }

    /// Consumes tokens while the given predicate tests as `true`.
    ///
    /// Stops at the end-of-file token.
    pub fn ignore_while(&mut self, predicate: impl Fn(TokenKind) -> bool) {
        loop {
            let kind = self.peek_kind();
            if kind == TokenKind::EOF || !predicate(kind) {
                return;
            }
            self.next_token();
        }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.report(diagnostic);
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Takes the diagnostics collected so far, leaving the stream's list empty.
    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }
}

/// Error returned when an unexpected token type is encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenError {
    pub expected: TokenKind,
    pub encountered: Token,
}

impl error::Error for TokenError {}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "encountered unexpected token '{}', expected '{}'",
            self.encountered.kind, self.expected
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::diagnostic::Severity;

    #[test]
    fn test_consume_mismatch_keeps_cursor() {
        let mut stream = TokenStream::new(Lexer::new("x ;"));
        let err = stream.consume(TokenKind::Semicolon).unwrap_err();
        assert_eq!(err.expected, TokenKind::Semicolon);
        assert_eq!(err.encountered.kind, TokenKind::Ident);
        assert!(stream.consume(TokenKind::Ident).is_ok());
        assert!(stream.match_token(TokenKind::Semicolon));
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut stream = TokenStream::new(Lexer::new("x"));
        assert_eq!(stream.next_token().kind, TokenKind::Ident);
        assert_eq!(stream.next_token().kind, TokenKind::EOF);
        assert_eq!(stream.next_token().kind, TokenKind::EOF);
        assert_eq!(stream.peek_kind(), TokenKind::EOF);
    }

    #[test]
    fn test_lex_errors_reported() {
        let mut stream = TokenStream::new(Lexer::new("a\n# b"));
        assert_eq!(stream.next_token().kind, TokenKind::Ident);
        let b = stream.next_token();
        assert_eq!(stream.span_fragment(&b.span), "b");

        let diagnostics = stream.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.as_slice()[0].severity, Severity::Lexical);
        assert_eq!(diagnostics.as_slice()[0].line, 2);
    }

    #[test]
    fn test_long_ident_stands_in() {
        let mut stream = TokenStream::new(Lexer::new("abcdefghijklmnopqrstuvwxyz := 1"));
        assert_eq!(stream.next_token().kind, TokenKind::Ident);
        assert_eq!(stream.next_token().kind, TokenKind::Assign);
        assert_eq!(stream.diagnostics().count(Severity::Lexical), 1);
    }

    #[test]
    fn test_ignore_while() {
        let mut stream = TokenStream::new(Lexer::new("a b c ; d"));
        stream.ignore_while(|kind| kind != TokenKind::Semicolon);
        assert_eq!(stream.peek_kind(), TokenKind::Semicolon);
    }
}
