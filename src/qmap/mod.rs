pub mod attributes;
pub mod lexer;
pub mod parser;
pub mod repr;
pub mod result;
pub mod write;

pub use attributes::EntityRole;

pub use lexer::{Lexer, Token, TokenKind, TokenKinds};

pub use parser::{
    parse, parse_reader, MapFormat, ParseOptions, ParsedMap, Parser,
};

pub use repr::{
    Alignment, Attribute, BaseAlignment, Brush, Entity, ExtraAttribute,
    ExtraAttributeKind, ExtraAttributes, HalfSpace, Point, QuakeMap, Surface,
    SurfaceValues, Vec2, Vec3, NO_TEXTURE_NAME,
};

pub use result::{
    Error, LexError, LexErrorKind, Result, SurfaceGuess, SyntaxError, Warning,
};

pub use write::{CheckWritable, WriteAttempt, WriteError, Writes};



#[cfg(test)]
mod write_test;
