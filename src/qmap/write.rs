use std::io;

use thiserror::Error;

use crate::qmap::repr::{
    Alignment, Attribute, BaseAlignment, Brush, Entity, ExtraAttribute,
    ExtraAttributeKind, ExtraAttributes, HalfSpace, QuakeMap, Surface,
    SurfaceValues, NO_TEXTURE_NAME,
};

pub type ValidationResult = Result<(), String>;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type WriteAttempt = Result<(), WriteError>;

pub trait CheckWritable {
    fn check_writable(&self) -> ValidationResult;
}

/// Serialization back into map text. Elements are checked before anything
/// is written, so a failed check leaves the writer untouched.
pub trait Writes<W: io::Write> {
    fn write_to(&self, writer: &mut W) -> WriteAttempt;
}

macro_rules! checked_writes {
    ($element:ty, $write_fn:ident) => {
        impl<W: io::Write> Writes<W> for $element {
            fn write_to(&self, writer: &mut W) -> WriteAttempt {
                self.check_writable().map_err(WriteError::Validation)?;
                $write_fn(writer, self)?;
                Ok(())
            }
        }
    };
}

checked_writes!(QuakeMap, write_map);
checked_writes!(Entity, write_entity);
checked_writes!(Brush, write_brush);
checked_writes!(Surface, write_surface);

fn write_map<W: io::Write>(writer: &mut W, map: &QuakeMap) -> io::Result<()> {
    for ent in &map.entities {
        write_entity(writer, ent)?;
    }
    Ok(())
}

fn write_entity<W: io::Write>(writer: &mut W, ent: &Entity) -> io::Result<()> {
    writer.write_all(b"{\r\n")?;
    write_extra_attributes(writer, &ent.extra_attributes)?;

    for attr in &ent.attributes {
        write!(writer, "\"{}\" \"{}\"\r\n", attr.name, attr.value)?;
    }

    for brush in &ent.brushes {
        write_brush(writer, brush)?;
    }

    writer.write_all(b"}\r\n")?;
    Ok(())
}

fn write_extra_attributes<W: io::Write>(
    writer: &mut W,
    extras: &ExtraAttributes,
) -> io::Result<()> {
    for extra in extras {
        match extra.kind {
            ExtraAttributeKind::String => write!(
                writer,
                "/// \"{}\" \"{}\"\r\n",
                extra.name, extra.value
            )?,
            ExtraAttributeKind::Integer => {
                write!(writer, "/// \"{}\" {}\r\n", extra.name, extra.value)?
            }
        }
    }
    Ok(())
}

fn write_brush<W: io::Write>(writer: &mut W, brush: &Brush) -> io::Result<()> {
    writer.write_all(b"{\r\n")?;
    write_extra_attributes(writer, &brush.extra_attributes)?;

    for surf in &brush.faces {
        write_surface(writer, surf)?;
        writer.write_all(b"\r\n")?;
    }

    writer.write_all(b"}\r\n")?;
    Ok(())
}

fn write_surface<W: io::Write>(
    writer: &mut W,
    surf: &Surface,
) -> io::Result<()> {
    write_half_space(writer, &surf.half_space)?;
    writer.write_all(b" ")?;

    if surf.texture.is_empty() {
        writer.write_all(NO_TEXTURE_NAME.as_bytes())?;
    } else {
        writer.write_all(surf.texture.as_bytes())?;
    }

    writer.write_all(b" ")?;
    write_alignment(writer, &surf.alignment)?;

    match surf.surface_values {
        Some(SurfaceValues::Quake2 {
            contents,
            flags,
            value,
        }) => write!(writer, " {} {} {}", contents, flags, value)?,
        Some(SurfaceValues::Hexen2(value)) => write!(writer, " {}", value)?,
        None => {}
    }

    Ok(())
}

fn write_half_space<W: io::Write>(
    writer: &mut W,
    half_space: &HalfSpace,
) -> io::Result<()> {
    for (index, pt) in half_space.iter().enumerate() {
        writer.write_all(b"( ")?;

        for element in pt.iter() {
            write!(writer, "{} ", element)?;
        }

        writer.write_all(b")")?;

        if index != 2 {
            writer.write_all(b" ")?;
        }
    }
    Ok(())
}

fn write_alignment<W: io::Write>(
    writer: &mut W,
    alignment: &Alignment,
) -> io::Result<()> {
    match alignment {
        Alignment::Standard(base) => {
            write!(
                writer,
                "{} {} {} {} {}",
                base.offset[0],
                base.offset[1],
                base.rotation,
                base.scale[0],
                base.scale[1]
            )?;
        }
        Alignment::Valve220 { base, u, v } => {
            write!(
                writer,
                "[ {} {} {} {} ] [ {} {} {} {} ] {} {} {}",
                u[0],
                u[1],
                u[2],
                base.offset[0],
                v[0],
                v[1],
                v[2],
                base.offset[1],
                base.rotation,
                base.scale[0],
                base.scale[1]
            )?;
        }
    }
    Ok(())
}

impl CheckWritable for QuakeMap {
    fn check_writable(&self) -> ValidationResult {
        for ent in &self.entities {
            ent.check_writable()?;
        }

        Ok(())
    }
}

impl CheckWritable for Entity {
    fn check_writable(&self) -> ValidationResult {
        self.extra_attributes.check_writable()?;

        for attr in &self.attributes {
            attr.check_writable()?;
        }

        for brush in &self.brushes {
            brush.check_writable()?;
        }

        Ok(())
    }
}

impl CheckWritable for Attribute {
    fn check_writable(&self) -> ValidationResult {
        check_quotable(&self.name, false)?;
        check_quotable(&self.value, true)
    }
}

impl CheckWritable for ExtraAttributes {
    fn check_writable(&self) -> ValidationResult {
        for extra in self {
            extra.check_writable()?;
        }

        Ok(())
    }
}

impl CheckWritable for ExtraAttribute {
    fn check_writable(&self) -> ValidationResult {
        check_quotable(&self.name, false)?;

        match self.kind {
            ExtraAttributeKind::String => check_quotable(&self.value, true),
            ExtraAttributeKind::Integer => match self.int_value() {
                Some(_) => Ok(()),
                None => Err(format!(
                    "Extra attribute `{}` is not an integer ({})",
                    self.name, self.value
                )),
            },
        }
    }
}

impl CheckWritable for Brush {
    fn check_writable(&self) -> ValidationResult {
        self.extra_attributes.check_writable()?;

        for surface in &self.faces {
            surface.check_writable()?;
        }

        Ok(())
    }
}

impl CheckWritable for Surface {
    fn check_writable(&self) -> ValidationResult {
        for point in &self.half_space {
            point.check_writable()?;
        }

        if self.texture.chars().any(char::is_whitespace) {
            return Err(format!(
                "Texture name has whitespace ({:?})",
                self.texture
            ));
        }

        self.alignment.check_writable()?;

        match self.surface_values {
            Some(SurfaceValues::Quake2 { value, .. }) => value.check_writable(),
            Some(SurfaceValues::Hexen2(value)) => value.check_writable(),
            None => Ok(()),
        }
    }
}

impl CheckWritable for Alignment {
    fn check_writable(&self) -> ValidationResult {
        match self {
            Alignment::Standard(base) => base.check_writable(),
            Alignment::Valve220 { base, u, v } => {
                base.check_writable()?;
                u.check_writable()?;
                v.check_writable()
            }
        }
    }
}

impl CheckWritable for BaseAlignment {
    fn check_writable(&self) -> ValidationResult {
        self.offset.check_writable()?;
        self.rotation.check_writable()?;
        self.scale.check_writable()
    }
}

impl<const N: usize> CheckWritable for [f64; N] {
    fn check_writable(&self) -> ValidationResult {
        for num in self {
            num.check_writable()?;
        }

        Ok(())
    }
}

impl CheckWritable for f64 {
    fn check_writable(&self) -> ValidationResult {
        if self.is_finite() {
            Ok(())
        } else {
            Err(format!("Non-finite number ({})", *self))
        }
    }
}

/// Text must survive being wrapped in quotes: no line breaks, no bare
/// quotes. A trailing backslash only survives at the end of a line.
fn check_quotable(s: &str, trailing_backslash_ok: bool) -> ValidationResult {
    let mut escaped = false;

    for ch in s.chars() {
        match ch {
            '\r' | '\n' => {
                return Err(format!("Key/value has line break ({:?})", s));
            }
            '"' if !escaped => {
                return Err(format!("Key/value has bare quote ({:?})", s));
            }
            _ => escaped = !escaped && ch == '\\',
        }
    }

    if escaped && !trailing_backslash_ok {
        Err(format!("Key has trailing backslash ({:?})", s))
    } else {
        Ok(())
    }
}
