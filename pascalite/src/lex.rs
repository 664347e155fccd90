//! Lexical analysis (tokenizer)
use crate::{
    constants::MAX_IDENT_LEN,
    tokens::{Keyword, Span, Token, TokenKind},
};

use itertools::{multipeek, MultiPeek};
use std::{error, fmt, iter::Iterator, str::CharIndices};

/// Write one line per token, with its position, kind and source fragment.
///
/// Lexical errors are written inline and the listing continues.
pub fn write_tokens<W: fmt::Write>(lexer: Lexer, w: &mut W) -> fmt::Result {
    let source = lexer.source_code();

    writeln!(w, "line:col | token         | lexeme")?;
    for result in lexer {
        match result {
            Ok(token) => {
                let pos = format!("{}:{}", token.span.line, token.span.column);
                let kind = format!("{:?}", token.kind); // cannot format debug print {:?} into columns
                match token.kind {
                    TokenKind::EOF => writeln!(w, "{pos: <8} | {kind: <13} |")?,
                    _ => writeln!(w, "{pos: <8} | {kind: <13} | {}", token.fragment(source))?,
                }
            }
            Err(err) => writeln!(w, "{: <8} | error: {}", err.span.line, err.describe(source))?,
        }
    }

    Ok(())
}

/// Lexical analyzer.
///
/// Whitespace and comments are discarded. Errors are returned
/// after the offending characters have been consumed, so calling
/// [`Lexer::next_token`] again resumes with the following token.
pub struct Lexer<'a> {
    source: SourceText<'a>,
    token_start: SourcePos,
    /// Longest identifier that is accepted, in characters.
    max_ident_len: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self::with_ident_limit(source_code, MAX_IDENT_LEN)
    }

    pub fn with_ident_limit(source_code: &'a str, max_ident_len: usize) -> Self {
        Self {
            source: SourceText::new(source_code),
            token_start: SourcePos::default(),
            max_ident_len,
        }
    }

    /// Original source code that was passed in during construction.
    pub fn source_code(&self) -> &'a str {
        self.source.original
    }

    #[rustfmt::skip]
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        use TokenKind as T;

        loop {
            self.consume_whitespace();
            self.start_token();

            let next_char = match self.source.next_char() {
                Some(c) => c,
                // Give end-of-source its own zero sized token.
                None => return Ok(self.make_token(T::EOF)),
            };

            match next_char {
                '+' => return Ok(self.make_token(T::Plus)),
                '-' => return Ok(self.make_token(T::Minus)),
                '*' => return Ok(self.make_token(T::Star)),
                '=' => return Ok(self.make_token(T::Eq)),
                ';' => return Ok(self.make_token(T::Semicolon)),
                ',' => return Ok(self.make_token(T::Comma)),
                '.' => return Ok(self.make_token(T::Dot)),
                ')' => return Ok(self.make_token(T::RightParen)),
                ':' => return Ok(self.make_pair('=', T::Assign, T::Colon)),
                '>' => return Ok(self.make_pair('=', T::GreaterEq, T::Greater)),
                '<' => {
                    let kind = match self.source.peek_char() {
                        Some('=') => T::LessEq,
                        Some('>') => T::NotEq,
                        _         => return Ok(self.make_token(T::Less)),
                    };
                    self.source.next_char();
                    return Ok(self.make_token(kind));
                }
                '/' => {
                    if self.source.peek_char() == Some('/') {
                        self.consume_until_newline();
                        continue;
                    }
                    return Ok(self.make_token(T::Slash));
                }
                '(' => {
                    if self.source.peek_char() == Some('*') {
                        self.source.next_char();
                        self.consume_block_comment(&['*', ')'])?;
                        continue;
                    }
                    return Ok(self.make_token(T::LeftParen));
                }
                '{' => {
                    self.consume_block_comment(&['}'])?;
                    continue;
                }
                '0'..='9' => return Ok(self.consume_number()),
                c if is_letter(c) => return self.consume_ident(),
                c => return Err(LexError::new(LexErrorKind::UnknownCharacter(c), self.make_span())),
            }
        }
    }

    /// Prime the lexer state for recording a new token.
    fn start_token(&mut self) {
        self.token_start = self.source.pos();
    }

    /// Create a span from the starting position of the current token
    /// up to the current cursor.
    fn make_span(&self) -> Span {
        let start = &self.token_start;
        let end = self.source.offset;

        // start and end can be equal, and a token can have 0 size.
        debug_assert!(end >= start.offset);

        Span {
            index: start.offset as u32,
            size: (end - start.offset) as u32,
            line: start.line,
            column: start.column,
        }
    }

    fn make_token(&mut self, kind: TokenKind) -> Token {
        Token {
            span: self.make_span(),
            kind,
        }
    }

    /// Make a two character token when the next character matches,
    /// otherwise a single character token.
    fn make_pair(&mut self, second: char, pair: TokenKind, single: TokenKind) -> Token {
        if self.source.peek_char() == Some(second) {
            self.source.next_char();
            self.make_token(pair)
        } else {
            self.make_token(single)
        }
    }

    fn fragment(&self) -> &'a str {
        self.make_span().fragment(self.source.original)
    }

    /// Consume whitespace characters, including newlines.
    ///
    /// Line breaks carry no meaning in PascalLite,
    /// the cursor tracks the line number.
    fn consume_whitespace(&mut self) {
        while let Some(c) = self.source.peek_char() {
            if !c.is_whitespace() {
                break;
            }
            self.source.next_char();
        }
    }

    /// Erase a `//` comment up to, but not including, the trailing newline.
    fn consume_until_newline(&mut self) {
        while let Some(c) = self.source.peek_char() {
            if c == '\n' {
                break;
            }
            self.source.next_char();
        }
    }

    /// Erase a block comment, including its terminator.
    ///
    /// Block comments do not nest. Reaching the end of the source is an
    /// error reported at the line where the comment opened.
    fn consume_block_comment(&mut self, terminator: &[char]) -> Result<(), LexError> {
        loop {
            match self.source.next_char() {
                Some(c) if c == terminator[0] => match terminator.get(1) {
                    Some(&second) if self.source.peek_char() == Some(second) => {
                        self.source.next_char();
                        return Ok(());
                    }
                    Some(_) => continue,
                    None => return Ok(()),
                },
                Some(_) => continue,
                None => return Err(LexError::new(LexErrorKind::UnterminatedComment, self.make_span())),
            }
        }
    }

    /// Make a number literal token.
    ///
    /// Only unsigned decimal literals exist. The value
    /// is parsed later from the fragment.
    fn consume_number(&mut self) -> Token {
        while let Some('0'..='9') = self.source.peek_char() {
            self.source.next_char();
        }

        self.make_token(TokenKind::Number)
    }

    /// Make an identifier or keyword token.
    ///
    /// The whole run of identifier characters is consumed even when it
    /// exceeds the length limit, so one overlong name is one error.
    fn consume_ident(&mut self) -> Result<Token, LexError> {
        while let Some(c) = self.source.peek_char() {
            if !is_letter_or_digit(c) {
                break;
            }
            self.source.next_char();
        }

        // If a valid keyword can be parsed from the source fragment, then
        // the token is a reserved keyword instead of a user defined identifier.
        if let Some(keyword) = Keyword::parse(self.fragment()) {
            return Ok(self.make_token(TokenKind::Keyword(keyword)));
        }

        // Identifier characters are all ASCII, so bytes are characters.
        let length = self.fragment().len();
        if length > self.max_ident_len {
            return Err(LexError::new(
                LexErrorKind::IdentTooLong {
                    length,
                    max: self.max_ident_len,
                },
                self.make_span(),
            ));
        }

        Ok(self.make_token(TokenKind::Ident))
    }
}

fn is_letter(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_letter_or_digit(c: char) -> bool {
    is_letter(c) || c.is_ascii_digit()
}

impl<'a> IntoIterator for Lexer<'a> {
    type Item = Result<Token, LexError>;
    type IntoIter = LexerIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        LexerIter {
            lexer: self,
            done: false,
        }
    }
}

/// Convenience iterator that wraps the lexer.
///
/// Yields the [`TokenKind::EOF`] token exactly once, then `None`.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LexerIter<'a> {
    // Track end so an EOF token is emitted once.
    done: bool,
    lexer: Lexer<'a>,
}

impl<'a> LexerIter<'a> {
    pub fn source_code(&self) -> &'a str {
        self.lexer.source_code()
    }
}

impl<'a> Iterator for LexerIter<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.lexer.next_token();
        if let Ok(Token {
            kind: TokenKind::EOF, ..
        }) = result
        {
            self.done = true;
        }
        Some(result)
    }
}

/// Wrapper for source code that keeps a cursor position.
///
/// Allows forward lookup via peeking.
struct SourceText<'a> {
    original: &'a str,

    /// Iterator over UTF-8 encoded source code.
    ///
    /// The `MultiPeek` wrapper allows for arbitrary lookahead by consuming
    /// the iterator internally and buffering the result. Peeking advances
    /// an internal peek cursor, which is restored when calling
    /// `MultiPeek::next()` or `MultiPeek::reset_peek()`.
    chars: MultiPeek<CharIndices<'a>>,

    /// Byte position of the next character to be consumed.
    offset: usize,
    line: u32,
    column: u32,
}

impl<'a> SourceText<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            original: source,
            chars: multipeek(source.char_indices()),
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Advance the cursor and return the consumed character.
    fn next_char(&mut self) -> Option<char> {
        let (index, c) = self.chars.next()?;
        self.offset = index + c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Peeks the next character without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.reset_peek();
        self.chars.peek().map(|(_, c)| *c)
    }

    fn pos(&self) -> SourcePos {
        SourcePos {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }
}

#[derive(Debug)]
struct SourcePos {
    offset: usize,
    line: u32,
    column: u32,
}

impl Default for SourcePos {
    fn default() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    /// Source of the offending characters. For unterminated
    /// comments this starts at the comment opener.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    UnknownCharacter(char),
    UnterminatedComment,
    IdentTooLong { length: usize, max: usize },
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Message that quotes the offending source text.
    pub fn describe(&self, source: &str) -> String {
        match self.kind {
            LexErrorKind::IdentTooLong { length, max } => format!(
                "identifier '{}' has {length} characters, the limit is {max}",
                self.span.fragment(source)
            ),
            _ => self.to_string(),
        }
    }
}

impl error::Error for LexError {}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            LexErrorKind::UnknownCharacter(c) => write!(f, "invalid character '{}'", c.escape_default()),
            LexErrorKind::UnterminatedComment => write!(f, "unterminated comment"),
            LexErrorKind::IdentTooLong { length, max } => {
                write!(f, "identifier has {length} characters, the limit is {max}")
            }
        }
    }
}
