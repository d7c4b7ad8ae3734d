use std::io::Read;
use std::mem;

#[cfg(feature = "hashbrown")]
use hashbrown::HashSet;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashSet;

use log::{debug, trace, warn};

use crate::geometry::MIN_BRUSH_FACES;
use crate::{common, qmap};
use qmap::attributes::EntityRole;
use qmap::lexer::{Lexer, Token, TokenKind, TokenKinds};
use qmap::repr::{
    Alignment, Attribute, BaseAlignment, Brush, Entity, ExtraAttribute,
    ExtraAttributeKind, ExtraAttributes, Point, QuakeMap, Surface,
    SurfaceValues, NO_TEXTURE_NAME,
};
use qmap::result::{Error, Result, SurfaceGuess, SyntaxError, Warning};

const COLLINEAR_EPSILON: f64 = f32::EPSILON as f64;

/// Grammar variant of the face lines in a map file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapFormat {
    /// `ox oy rot sx sy`, trailing values guessed.
    #[default]
    Standard,
    /// `[ ux uy uz ox ] [ vx vy vz oy ] rot sx sy`, trailing values guessed.
    Valve,
    /// Standard alignment, optionally followed by contents, flags and value.
    Quake2,
    /// Standard alignment, optionally followed by one extra value.
    Hexen2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParseOptions {
    pub format: MapFormat,
    /// Multiplier applied to every face point as it is read.
    pub point_scale: f64,
    pub lowercase_textures: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            format: MapFormat::Standard,
            point_scale: 1.0,
            lowercase_textures: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMap {
    pub map: QuakeMap,
    pub warnings: Vec<Warning>,
    /// The `point_scale` the face points were read with.
    pub point_scale: f64,
}

/// Parse a complete map file. Fails without a partial tree on any lexer or
/// syntax error, or when no entity is the world.
pub fn parse(text: &str, options: &ParseOptions) -> Result<ParsedMap> {
    let mut parser = Parser::new(text, *options);
    let map = parser.parse_entities()?;

    Ok(ParsedMap {
        map,
        warnings: parser.into_warnings(),
        point_scale: options.point_scale,
    })
}

/// Read `reader` to the end, then parse. Bytes that are not UTF-8 are
/// replaced.
pub fn parse_reader<R: Read>(
    mut reader: R,
    options: &ParseOptions,
) -> Result<ParsedMap> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse(&String::from_utf8_lossy(&bytes), options)
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    options: ParseOptions,
    warnings: Vec<Warning>,
}

impl<'a> Parser<'a> {
    pub fn new(text: &'a str, options: ParseOptions) -> Self {
        Self {
            lexer: Lexer::new(text),
            options,
            warnings: Vec::new(),
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    /// Rewind to the start of the text and forget recorded warnings, so the
    /// same text can be parsed again.
    pub fn reset(&mut self) {
        self.lexer.reset();
        self.warnings.clear();
    }

    pub fn set_format(&mut self, format: MapFormat) {
        self.options.format = format;
    }

    pub fn parse_entities(&mut self) -> Result<QuakeMap> {
        let mut entities = Vec::new();

        loop {
            let token = self.lexer.peek_token()?;
            if token.kind == TokenKind::Eof {
                break;
            }

            expect(TokenKind::OBrace.into(), &token)?;
            entities.push(self.parse_entity()?);
        }

        let world = self.locate_world(&entities)?;
        debug!("Parsed {} entities, world is #{}", entities.len(), world);

        Ok(QuakeMap { entities, world })
    }

    /// Parse a sequence of bare brushes, as found on a clipboard.
    pub fn parse_brushes(&mut self) -> Result<Vec<Brush>> {
        let mut brushes = Vec::new();

        loop {
            let token = self.lexer.peek_token()?;
            if token.kind == TokenKind::Eof {
                break;
            }

            expect(TokenKind::OBrace.into(), &token)?;
            if let Some(brush) = self.parse_brush()? {
                brushes.push(brush);
            }
        }

        Ok(brushes)
    }

    /// Parse a sequence of bare face lines.
    pub fn parse_faces(&mut self) -> Result<Vec<Surface>> {
        let mut faces = Vec::new();

        loop {
            let token = self.lexer.peek_token()?;
            if token.kind == TokenKind::Eof {
                break;
            }

            expect(TokenKind::OParenthesis.into(), &token)?;
            if let Some(face) = self.parse_face()? {
                faces.push(face);
            }
        }

        Ok(faces)
    }

    fn locate_world(&mut self, entities: &[Entity]) -> Result<usize> {
        let mut worlds = entities
            .iter()
            .enumerate()
            .filter(|(_, ent)| ent.role() == EntityRole::Worldspawn);

        let (world, _) = worlds.next().ok_or(Error::NoWorldEntity)?;

        for (_, extra) in worlds {
            self.warn(Warning::ExtraWorldEntity {
                line: extra.start_line,
            });
        }

        Ok(world)
    }

    fn parse_entity(&mut self) -> Result<Entity> {
        let start_line = self.expect_next(TokenKind::OBrace)?.line;

        let mut attributes = Vec::new();
        let mut names = HashSet::new();
        let mut extra_attributes = ExtraAttributes::new();
        let mut entity: Option<Entity> = None;

        loop {
            let token = self.lexer.peek_token()?;

            match token.kind {
                TokenKind::Comment => {
                    self.lexer.next_token()?;
                    let extras = match entity.as_mut() {
                        Some(ent) => &mut ent.extra_attributes,
                        None => &mut extra_attributes,
                    };
                    self.parse_extra_attributes(extras)?;
                }
                TokenKind::String => {
                    let late = entity.is_some();
                    self.parse_entity_attribute(
                        &mut attributes,
                        &mut names,
                        late,
                    )?;
                }
                TokenKind::OBrace => {
                    // Properties are fixed once the first brush appears
                    let ent = entity.get_or_insert_with(|| Entity {
                        attributes: mem::take(&mut attributes),
                        extra_attributes: mem::take(&mut extra_attributes),
                        ..Entity::default()
                    });

                    if let Some(brush) = self.parse_brush()? {
                        ent.brushes.push(brush);
                    }
                }
                TokenKind::CBrace => {
                    let end_line = self.lexer.next_token()?.line;
                    let mut ent = entity.unwrap_or_else(|| Entity {
                        attributes,
                        extra_attributes,
                        ..Entity::default()
                    });

                    ent.start_line = start_line;
                    ent.line_count = end_line - start_line;
                    debug!(
                        "Entity `{}` at line {}: {} brushes",
                        ent.classname(),
                        start_line,
                        ent.brushes.len()
                    );

                    return Ok(ent);
                }
                _ => {
                    return Err(unexpected(
                        TokenKind::Comment
                            | TokenKind::String
                            | TokenKind::OBrace
                            | TokenKind::CBrace,
                        &token,
                    )
                    .into());
                }
            }
        }
    }

    fn parse_entity_attribute(
        &mut self,
        attributes: &mut Vec<Attribute>,
        names: &mut HashSet<&'a str>,
        late: bool,
    ) -> Result<()> {
        let name = self.expect_next(TokenKind::String)?;
        let value = self.expect_next(TokenKind::String)?;

        if late {
            self.warn(Warning::LateAttribute {
                name: name.text.to_string(),
                line: name.line,
                column: name.column,
            });
        } else if names.insert(name.text) {
            attributes.push(Attribute::new(name.text, value.text));
        } else {
            self.warn(Warning::DuplicateAttribute {
                name: name.text.to_string(),
                line: name.line,
                column: name.column,
            });
        }

        Ok(())
    }

    /// Returns `None` for an empty `{ }` block.
    fn parse_brush(&mut self) -> Result<Option<Brush>> {
        let start_line = self.expect_next(TokenKind::OBrace)?.line;

        if self.lexer.peek_token()?.kind == TokenKind::CBrace {
            self.lexer.next_token()?;
            trace!("Ignoring empty brush at line {}", start_line);
            return Ok(None);
        }

        let mut faces = Vec::with_capacity(MIN_BRUSH_FACES);
        let mut extra_attributes = ExtraAttributes::new();

        loop {
            let token = self.lexer.peek_token()?;

            match token.kind {
                TokenKind::Comment => {
                    self.lexer.next_token()?;
                    self.parse_extra_attributes(&mut extra_attributes)?;
                }
                TokenKind::OParenthesis => {
                    if let Some(face) = self.parse_face()? {
                        faces.push(face);
                    }
                }
                TokenKind::CBrace => {
                    let end_line = self.lexer.next_token()?.line;
                    trace!(
                        "Brush at line {}: {} faces",
                        start_line,
                        faces.len()
                    );

                    return Ok(Some(Brush {
                        faces,
                        extra_attributes,
                        start_line,
                        line_count: end_line - start_line,
                    }));
                }
                _ => {
                    return Err(unexpected(
                        TokenKind::Comment
                            | TokenKind::OParenthesis
                            | TokenKind::CBrace,
                        &token,
                    )
                    .into());
                }
            }
        }
    }

    /// Returns `None` when the three points are collinear.
    fn parse_face(&mut self) -> Result<Option<Surface>> {
        let first = self.lexer.peek_token()?;
        let (line, column) = (first.line, first.column);

        let p1 = self.parse_point()?;
        let p2 = self.parse_point()?;
        let p3 = self.parse_point()?;

        let texture_token = self.lexer.read_any_string();
        expect(TokenKind::String.into(), &texture_token)?;
        let texture = self.texture_name(texture_token.text);

        let alignment = match self.options.format {
            MapFormat::Valve => self.parse_valve_alignment()?,
            _ => self.parse_standard_alignment()?,
        };

        let surface_values = self.parse_surface_values()?;

        let normal = common::cross(common::sub(p3, p1), common::sub(p2, p1));
        if normal.iter().all(|c| c.abs() < COLLINEAR_EPSILON) {
            self.warn(Warning::CollinearFace { line, column });
            return Ok(None);
        }

        let scale = self.options.point_scale;

        Ok(Some(Surface {
            half_space: [
                common::scale(p1, scale),
                common::scale(p2, scale),
                common::scale(p3, scale),
            ],
            texture,
            alignment,
            surface_values,
            line,
            column,
        }))
    }

    fn texture_name(&self, raw: &str) -> String {
        let name = match raw.len() {
            len if len >= 2 && raw.starts_with('"') && raw.ends_with('"') => {
                &raw[1..len - 1]
            }
            _ => raw,
        };

        if name == NO_TEXTURE_NAME {
            String::new()
        } else if self.options.lowercase_textures {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }

    fn parse_point(&mut self) -> Result<Point> {
        self.expect_next(TokenKind::OParenthesis)?;
        let point = self.parse_vector()?;
        self.expect_next(TokenKind::CParenthesis)?;

        Ok(point)
    }

    fn parse_vector(&mut self) -> Result<Point> {
        let x = self.expect_number()?;
        let y = self.expect_number()?;
        let z = self.expect_number()?;

        Ok([x, y, z])
    }

    fn parse_standard_alignment(&mut self) -> Result<Alignment> {
        let offset_x = self.expect_number()?;
        let offset_y = self.expect_number()?;
        let rotation = self.expect_number()?;
        let scale_x = self.expect_number()?;
        let scale_y = self.expect_number()?;

        Ok(Alignment::Standard(BaseAlignment {
            offset: [offset_x, offset_y],
            rotation,
            scale: [scale_x, scale_y],
        }))
    }

    fn parse_valve_alignment(&mut self) -> Result<Alignment> {
        self.expect_next(TokenKind::OBracket)?;
        let u = self.parse_vector()?;
        let offset_x = self.expect_number()?;
        self.expect_next(TokenKind::CBracket)?;

        self.expect_next(TokenKind::OBracket)?;
        let v = self.parse_vector()?;
        let offset_y = self.expect_number()?;
        self.expect_next(TokenKind::CBracket)?;

        let rotation = self.expect_number()?;
        let scale_x = self.expect_number()?;
        let scale_y = self.expect_number()?;

        Ok(Alignment::Valve220 {
            base: BaseAlignment {
                offset: [offset_x, offset_y],
                rotation,
                scale: [scale_x, scale_y],
            },
            u,
            v,
        })
    }

    fn parse_surface_values(&mut self) -> Result<Option<SurfaceValues>> {
        let end_of_face = TokenKind::OParenthesis
            | TokenKind::CBrace
            | TokenKind::Eof
            | TokenKind::Comment;

        if self.lexer.peek_token()?.is(end_of_face) {
            return Ok(None);
        }

        let first = self.expect_next(TokenKinds::NUMBER)?;

        let guess = match self.options.format {
            MapFormat::Quake2 => SurfaceGuess::Quake2,
            MapFormat::Hexen2 => SurfaceGuess::Hexen2,
            MapFormat::Standard | MapFormat::Valve => {
                let guess = if self.lexer.peek_token()?.kind
                    == TokenKind::Integer
                {
                    SurfaceGuess::Quake2
                } else {
                    SurfaceGuess::Hexen2
                };

                self.warn(Warning::AmbiguousFaceValues {
                    guess,
                    line: first.line,
                    column: first.column,
                });
                guess
            }
        };

        let values = match guess {
            SurfaceGuess::Quake2 => {
                let contents = match (self.options.format, first.kind) {
                    (_, TokenKind::Integer) => first.to_integer()?,
                    // Guessed contents written as a decimal are truncated
                    (MapFormat::Standard | MapFormat::Valve, _) => {
                        first.to_float()? as i64
                    }
                    _ => {
                        return Err(unexpected(
                            TokenKind::Integer.into(),
                            &first,
                        )
                        .into())
                    }
                };
                let flags = self.expect_next(TokenKind::Integer)?.to_integer()?;
                let value = self.expect_number()?;

                SurfaceValues::Quake2 {
                    contents,
                    flags,
                    value,
                }
            }
            SurfaceGuess::Hexen2 => SurfaceValues::Hexen2(first.to_float()?),
        };

        Ok(Some(values))
    }

    /// Parse the `name value` pairs following a `///` comment token up to
    /// the end of its line.
    fn parse_extra_attributes(
        &mut self,
        extras: &mut ExtraAttributes,
    ) -> Result<()> {
        self.lexer.set_eol_significant(true);
        let result = self.parse_extra_attribute_line(extras);
        self.lexer.set_eol_significant(false);
        result
    }

    fn parse_extra_attribute_line(
        &mut self,
        extras: &mut ExtraAttributes,
    ) -> Result<()> {
        let line_end = TokenKind::String | TokenKind::Eol | TokenKind::Eof;
        let mut token = self.expect_next(line_end)?;

        while token.kind == TokenKind::String {
            let value =
                self.expect_next(TokenKind::String | TokenKind::Integer)?;

            let kind = match value.kind {
                TokenKind::Integer => ExtraAttributeKind::Integer,
                _ => ExtraAttributeKind::String,
            };

            let added = extras.insert(ExtraAttribute {
                kind,
                name: token.text.to_string(),
                value: value.text.to_string(),
                line: value.line,
                column: value.column,
            });

            if !added {
                self.warn(Warning::DuplicateExtraAttribute {
                    name: token.text.to_string(),
                    line: token.line,
                    column: token.column,
                });
            }

            token = self.expect_next(line_end)?;
        }

        Ok(())
    }

    fn expect_next(
        &mut self,
        kinds: impl Into<TokenKinds>,
    ) -> Result<Token<'a>> {
        let token = self.lexer.next_token()?;
        expect(kinds.into(), &token)?;
        Ok(token)
    }

    fn expect_number(&mut self) -> Result<f64> {
        Ok(self.expect_next(TokenKinds::NUMBER)?.to_float()?)
    }

    fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

fn expect(kinds: TokenKinds, token: &Token) -> Result<()> {
    if token.is(kinds) {
        Ok(())
    } else {
        Err(unexpected(kinds, token).into())
    }
}

fn unexpected(expected: TokenKinds, token: &Token) -> SyntaxError {
    SyntaxError {
        expected,
        actual: token.kind,
        text: token.text.to_string(),
        line: token.line,
        column: token.column,
    }
}
