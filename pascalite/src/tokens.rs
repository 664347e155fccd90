//! Tokens
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub span: Span,
    pub kind: TokenKind,
}

impl Token {
    /// Raw source text of the token.
    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        self.span.fragment(text)
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.span.line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum TokenKind {
    // Simple
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Eq,           // =
    NotEq,        // <>
    Less,         // <
    LessEq,       // <=
    Greater,      // >
    GreaterEq,    // >=
    Assign,       // :=
    Colon,        // :
    Semicolon,    // ;
    Comma,        // ,
    Dot,          // .
    LeftParen,    // (
    RightParen,   // )

    // ------------------------------------------------------------------------
    // Complex
    Ident,
    /// Reserved identifiers
    Keyword(Keyword),
    /// Unsigned integer literal
    Number,

    // ------------------------------------------------------------------------
    // Special
    /// End-of-file
    EOF,
}

impl TokenKind {
    /// Relational operators share a single precedence level.
    #[inline]
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::NotEq
                | TokenKind::Less
                | TokenKind::LessEq
                | TokenKind::Greater
                | TokenKind::GreaterEq
        )
    }
}

impl fmt::Display for TokenKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenKind as TK;
        match self {
            TK::Plus       => write!(f, "+"),
            TK::Minus      => write!(f, "-"),
            TK::Star       => write!(f, "*"),
            TK::Slash      => write!(f, "/"),
            TK::Eq         => write!(f, "="),
            TK::NotEq      => write!(f, "<>"),
            TK::Less       => write!(f, "<"),
            TK::LessEq     => write!(f, "<="),
            TK::Greater    => write!(f, ">"),
            TK::GreaterEq  => write!(f, ">="),
            TK::Assign     => write!(f, ":="),
            TK::Colon      => write!(f, ":"),
            TK::Semicolon  => write!(f, ";"),
            TK::Comma      => write!(f, ","),
            TK::Dot        => write!(f, "."),
            TK::LeftParen  => write!(f, "("),
            TK::RightParen => write!(f, ")"),
            TK::Ident      => write!(f, "identifier"),
            TK::Keyword(k) => write!(f, "{k}"),
            TK::Number     => write!(f, "number"),
            TK::EOF        => write!(f, "end-of-file"),
        }
    }
}

/// Chunk of source code, encoded as a starting byte position and a size.
///
/// The line and column are of the first character, both starting at 1.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Span {
    pub index: u32,
    pub size: u32,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(index: u32, size: u32, line: u32, column: u32) -> Self {
        Self {
            index,
            size,
            line,
            column,
        }
    }

    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        &text[(self.index as usize)..(self.end() as usize)]
    }

    /// Ending index of the span, exclusive.
    #[inline]
    pub fn end(&self) -> u32 {
        self.index + self.size
    }
}

/// Reserved words.
///
/// Matched case-insensitively, so `BEGIN` and `Begin` are both [`Keyword::Begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum Keyword {
    Program,   // program
    Var,       // var
    Integer,   // integer
    Begin,     // begin
    End,       // end
    If,        // if
    Then,      // then
    Else,      // else
    While,     // while
    Do,        // do
    Read,      // read
    Write,     // write
    And,       // and
    Or,        // or
    Not,       // not
    Div,       // div
}

impl Keyword {
    #[rustfmt::skip]
    pub fn parse(text: impl AsRef<str>) -> Option<Self> {
        let text = text.as_ref();

        // Keywords are short, anything longer can skip the lowercase copy.
        if text.len() > 7 {
            return None;
        }

        match text.to_ascii_lowercase().as_str() {
            "program" => Some(Self::Program),
            "var"     => Some(Self::Var),
            "integer" => Some(Self::Integer),
            "begin"   => Some(Self::Begin),
            "end"     => Some(Self::End),
            "if"      => Some(Self::If),
            "then"    => Some(Self::Then),
            "else"    => Some(Self::Else),
            "while"   => Some(Self::While),
            "do"      => Some(Self::Do),
            "read"    => Some(Self::Read),
            "write"   => Some(Self::Write),
            "and"     => Some(Self::And),
            "or"      => Some(Self::Or),
            "not"     => Some(Self::Not),
            "div"     => Some(Self::Div),
            _ => None,
        }
    }
}

impl fmt::Display for Keyword {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Program => write!(f, "program"),
            Self::Var     => write!(f, "var"),
            Self::Integer => write!(f, "integer"),
            Self::Begin   => write!(f, "begin"),
            Self::End     => write!(f, "end"),
            Self::If      => write!(f, "if"),
            Self::Then    => write!(f, "then"),
            Self::Else    => write!(f, "else"),
            Self::While   => write!(f, "while"),
            Self::Do      => write!(f, "do"),
            Self::Read    => write!(f, "read"),
            Self::Write   => write!(f, "write"),
            Self::And     => write!(f, "and"),
            Self::Or      => write!(f, "or"),
            Self::Not     => write!(f, "not"),
            Self::Div     => write!(f, "div"),
        }
    }
}
