use std::fmt;

use thiserror::Error as ThisError;

use crate::qmap::lexer::{TokenKind, TokenKinds};

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum LexErrorKind {
    #[error("Unexpected character: {0:?}")]
    UnexpectedChar(char),
    #[error("Quoted string is missing its closing quote")]
    UnterminatedString,
    #[error("Malformed number `{0}`")]
    MalformedNumber(String),
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("Line {line}, column {column}: {kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error(
    "Line {line}, column {column}: expected {expected}, got {actual} `{text}`"
)]
pub struct SyntaxError {
    pub expected: TokenKinds,
    pub actual: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Lexer(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("No world entity found")]
    NoWorldEntity,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal findings recorded while parsing. The offending input is
/// resolved by policy and parsing continues.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    DuplicateAttribute {
        name: String,
        line: usize,
        column: usize,
    },
    DuplicateExtraAttribute {
        name: String,
        line: usize,
        column: usize,
    },
    LateAttribute {
        name: String,
        line: usize,
        column: usize,
    },
    CollinearFace {
        line: usize,
        column: usize,
    },
    AmbiguousFaceValues {
        guess: SurfaceGuess,
        line: usize,
        column: usize,
    },
    ExtraWorldEntity {
        line: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceGuess {
    Quake2,
    Hexen2,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::DuplicateAttribute { name, line, column } => write!(
                f,
                "Line {}, column {}: ignoring duplicate entity property `{}`",
                line, column, name
            ),
            Warning::DuplicateExtraAttribute { name, line, column } => write!(
                f,
                "Line {}, column {}: ignoring duplicate extra attribute `{}`",
                line, column, name
            ),
            Warning::LateAttribute { name, line, column } => write!(
                f,
                "Line {}, column {}: property `{}` follows a brush and is \
                 dropped",
                line, column, name
            ),
            Warning::CollinearFace { line, column } => write!(
                f,
                "Line {}, column {}: skipping face, face points are collinear",
                line, column
            ),
            Warning::AmbiguousFaceValues { guess, line, column } => write!(
                f,
                "Line {}, column {}: trailing face values read as {:?}",
                line, column, guess
            ),
            Warning::ExtraWorldEntity { line } => write!(
                f,
                "Line {}: additional worldspawn entity is not the world",
                line
            ),
        }
    }
}
