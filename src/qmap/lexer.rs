use std::fmt;
use std::ops::BitOr;

use crate::qmap::result::{LexError, LexErrorKind};

const ESCAPE: u8 = b'\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Integer,
    Decimal,
    String,
    OParenthesis,
    CParenthesis,
    OBrace,
    CBrace,
    OBracket,
    CBracket,
    Comment,
    Eof,
    Eol,
}

impl TokenKind {
    const ALL: [TokenKind; 12] = [
        TokenKind::Integer,
        TokenKind::Decimal,
        TokenKind::String,
        TokenKind::OParenthesis,
        TokenKind::CParenthesis,
        TokenKind::OBrace,
        TokenKind::CBrace,
        TokenKind::OBracket,
        TokenKind::CBracket,
        TokenKind::Comment,
        TokenKind::Eof,
        TokenKind::Eol,
    ];

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }

    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Integer => "integer",
            TokenKind::Decimal => "decimal",
            TokenKind::String => "string",
            TokenKind::OParenthesis => "'('",
            TokenKind::CParenthesis => "')'",
            TokenKind::OBrace => "'{'",
            TokenKind::CBrace => "'}'",
            TokenKind::OBracket => "'['",
            TokenKind::CBracket => "']'",
            TokenKind::Comment => "comment",
            TokenKind::Eof => "end of file",
            TokenKind::Eol => "end of line",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of token kinds, used to describe what the parser would have
/// accepted at a given position.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenKinds(u16);

impl TokenKinds {
    pub const NUMBER: TokenKinds =
        TokenKinds::of(TokenKind::Integer).with(TokenKind::Decimal);

    pub const fn of(kind: TokenKind) -> TokenKinds {
        TokenKinds(kind.bit())
    }

    pub const fn with(self, kind: TokenKind) -> TokenKinds {
        TokenKinds(self.0 | kind.bit())
    }

    pub fn contains(self, kind: TokenKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = TokenKind> {
        TokenKind::ALL.into_iter().filter(move |&kind| self.contains(kind))
    }
}

impl From<TokenKind> for TokenKinds {
    fn from(kind: TokenKind) -> TokenKinds {
        TokenKinds::of(kind)
    }
}

impl BitOr<TokenKind> for TokenKind {
    type Output = TokenKinds;

    fn bitor(self, rhs: TokenKind) -> TokenKinds {
        TokenKinds::of(self).with(rhs)
    }
}

impl BitOr<TokenKind> for TokenKinds {
    type Output = TokenKinds;

    fn bitor(self, rhs: TokenKind) -> TokenKinds {
        self.with(rhs)
    }
}

impl fmt::Display for TokenKinds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kinds: Vec<TokenKind> = self.iter().collect();

        for (index, kind) in kinds.iter().enumerate() {
            if index > 0 && index + 1 == kinds.len() {
                f.write_str(" or ")?;
            } else if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(kind.name())?;
        }

        Ok(())
    }
}

impl fmt::Debug for TokenKinds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TokenKinds({})", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Token text. Quoted strings exclude their quotes but keep escapes.
    pub text: &'a str,
    /// Byte offset of the first character, opening quote included.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl<'a> Token<'a> {
    pub fn is(&self, kinds: impl Into<TokenKinds>) -> bool {
        kinds.into().contains(self.kind)
    }

    pub fn to_float(&self) -> Result<f64, LexError> {
        self.text.parse::<f64>().map_err(|_| self.malformed())
    }

    pub fn to_integer(&self) -> Result<i64, LexError> {
        self.text.parse::<i64>().map_err(|_| self.malformed())
    }

    fn malformed(&self) -> LexError {
        LexError {
            kind: LexErrorKind::MalformedNumber(self.text.to_string()),
            line: self.line,
            column: self.column,
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} `{}`: line {}", self.kind, self.text, self.line)
    }
}

/// Pull-based tokenizer over a complete map source with one token of
/// lookahead.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    eol_significant: bool,
    peeked: Option<(Token<'a>, Cursor)>,
}

/// Lexer position captured before a token was peeked.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Lexer<'a> {
        Lexer {
            source,
            pos: 0,
            line: 1,
            column: 1,
            eol_significant: false,
            peeked: None,
        }
    }

    /// Rewind to the start of the source.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.line = 1;
        self.column = 1;
        self.peeked = None;
    }

    /// When enabled, `\n` produces an `Eol` token instead of being skipped.
    pub fn set_eol_significant(&mut self, significant: bool) {
        self.unpeek();
        self.eol_significant = significant;
    }

    pub fn next_token(&mut self) -> Result<Token<'a>, LexError> {
        match self.peeked.take() {
            Some((token, _)) => Ok(token),
            None => self.emit_token(),
        }
    }

    pub fn peek_token(&mut self) -> Result<Token<'a>, LexError> {
        if let Some((token, _)) = self.peeked {
            return Ok(token);
        }

        let origin = Cursor {
            pos: self.pos,
            line: self.line,
            column: self.column,
        };
        let token = self.emit_token()?;
        self.peeked = Some((token, origin));
        Ok(token)
    }

    /// Read a raw run of non-whitespace characters regardless of what
    /// tokens it would otherwise form. Texture names may contain braces,
    /// parentheses and the like.
    pub fn read_any_string(&mut self) -> Token<'a> {
        self.unpeek();

        while self.cur().is_some_and(is_whitespace) {
            self.advance();
        }

        let (start, line, column) = (self.pos, self.line, self.column);

        while self.cur().is_some_and(|b| !is_whitespace(b)) {
            self.advance();
        }

        let kind = if start == self.pos {
            TokenKind::Eof
        } else {
            TokenKind::String
        };

        Token {
            kind,
            text: &self.source[start..self.pos],
            offset: start,
            line,
            column,
        }
    }

    fn unpeek(&mut self) {
        if let Some((_, origin)) = self.peeked.take() {
            self.pos = origin.pos;
            self.line = origin.line;
            self.column = origin.column;
        }
    }

    fn emit_token(&mut self) -> Result<Token<'a>, LexError> {
        while let Some(byte) = self.cur() {
            let (start, line, column) = (self.pos, self.line, self.column);

            match byte {
                b'/' if self.look_ahead(1) == Some(b'/') => {
                    if self.look_ahead(2) == Some(b'/') {
                        self.advance_to(start + 3);
                        return Ok(self.token(
                            TokenKind::Comment,
                            start,
                            line,
                            column,
                        ));
                    }

                    while self.cur().is_some_and(|b| b != b'\n' && b != b'\r')
                    {
                        self.advance();
                    }
                }
                b'{' => return Ok(self.single(TokenKind::OBrace)),
                b'}' => return Ok(self.single(TokenKind::CBrace)),
                b'(' => return Ok(self.single(TokenKind::OParenthesis)),
                b')' => return Ok(self.single(TokenKind::CParenthesis)),
                b'[' => return Ok(self.single(TokenKind::OBracket)),
                b']' => return Ok(self.single(TokenKind::CBracket)),
                b'"' => return self.quoted(),
                b'\n' if self.eol_significant => {
                    return Ok(self.single(TokenKind::Eol));
                }
                b if is_whitespace(b) => self.advance(),
                _ => return self.word(),
            }
        }

        Ok(Token {
            kind: TokenKind::Eof,
            text: "",
            offset: self.pos,
            line: self.line,
            column: self.column,
        })
    }

    fn single(&mut self, kind: TokenKind) -> Token<'a> {
        let (start, line, column) = (self.pos, self.line, self.column);
        self.advance();
        self.token(kind, start, line, column)
    }

    fn quoted(&mut self) -> Result<Token<'a>, LexError> {
        let (start, line, column) = (self.pos, self.line, self.column);
        self.advance();
        let content_start = self.pos;
        let mut escaped = false;

        loop {
            match self.cur() {
                None | Some(b'\n') => {
                    return Err(LexError {
                        kind: LexErrorKind::UnterminatedString,
                        line,
                        column,
                    });
                }
                Some(b'"') if !escaped => break,
                // Paths with a trailing backslash look like an escaped quote
                Some(b'"')
                    if matches!(
                        self.look_ahead(1),
                        Some(b'\n' | b'\r' | b'}')
                    ) =>
                {
                    break
                }
                Some(b) => escaped = !escaped && b == ESCAPE,
            }
            self.advance();
        }

        let text = &self.source[content_start..self.pos];
        self.advance();

        Ok(Token {
            kind: TokenKind::String,
            text,
            offset: start,
            line,
            column,
        })
    }

    fn word(&mut self) -> Result<Token<'a>, LexError> {
        let (start, line, column) = (self.pos, self.line, self.column);
        let bytes = self.source.as_bytes();

        if bytes[start].is_ascii_control() {
            let ch = self.source[start..].chars().next().unwrap_or('\0');
            return Err(LexError {
                kind: LexErrorKind::UnexpectedChar(ch),
                line,
                column,
            });
        }

        let (kind, end) = if let Some(end) = scan_integer(bytes, start) {
            (TokenKind::Integer, end)
        } else if let Some(end) = scan_decimal(bytes, start) {
            (TokenKind::Decimal, end)
        } else {
            let end = bytes[start..]
                .iter()
                .position(|&b| is_whitespace(b))
                .map_or(bytes.len(), |len| start + len);
            (TokenKind::String, end)
        };

        self.advance_to(end);
        Ok(self.token(kind, start, line, column))
    }

    fn token(
        &self,
        kind: TokenKind,
        start: usize,
        line: usize,
        column: usize,
    ) -> Token<'a> {
        Token {
            kind,
            text: &self.source[start..self.pos],
            offset: start,
            line,
            column,
        }
    }

    fn cur(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn look_ahead(&self, distance: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + distance).copied()
    }

    fn advance(&mut self) {
        if let Some(byte) = self.cur() {
            self.pos += 1;

            if byte == b'\n' {
                self.line += 1;
                self.column = 1;
            } else if byte & 0xC0 != 0x80 {
                // UTF-8 continuation bytes share their character's column
                self.column += 1;
            }
        }
    }

    fn advance_to(&mut self, end: usize) {
        while self.pos < end && self.cur().is_some() {
            self.advance();
        }
    }
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

fn is_number_delim(bytes: &[u8], index: usize) -> bool {
    match bytes.get(index) {
        None => true,
        Some(&b) => is_whitespace(b) || b == b')',
    }
}

fn count_digits(bytes: &[u8], index: usize) -> usize {
    bytes[index.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count()
}

fn skip_sign(bytes: &[u8], index: usize) -> usize {
    match bytes.get(index) {
        Some(b'+' | b'-') => index + 1,
        _ => index,
    }
}

fn scan_integer(bytes: &[u8], start: usize) -> Option<usize> {
    let digits_start = skip_sign(bytes, start);
    let digits = count_digits(bytes, digits_start);
    let end = digits_start + digits;

    (digits > 0 && is_number_delim(bytes, end)).then_some(end)
}

fn scan_decimal(bytes: &[u8], start: usize) -> Option<usize> {
    let mut index = skip_sign(bytes, start);
    let int_digits = count_digits(bytes, index);
    index += int_digits;

    let mut frac_digits = 0;
    if bytes.get(index) == Some(&b'.') {
        index += 1;
        frac_digits = count_digits(bytes, index);
        index += frac_digits;
    }

    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(index), Some(b'e' | b'E')) {
        let exp_start = skip_sign(bytes, index + 1);
        let exp_digits = count_digits(bytes, exp_start);

        if exp_digits == 0 {
            return None;
        }
        index = exp_start + exp_digits;
    }

    is_number_delim(bytes, index).then_some(index)
}
