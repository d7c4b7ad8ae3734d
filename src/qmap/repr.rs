pub use crate::common::{Point, Vec2, Vec3};

use crate::qmap::attributes::{self, EntityRole};

/// Texture name written for faces without a texture.
pub const NO_TEXTURE_NAME: &str = "__TB_empty";

#[derive(Debug, Clone, PartialEq)]
pub struct QuakeMap {
    pub entities: Vec<Entity>,
    /// Index into `entities` of the world entity.
    pub world: usize,
}

impl QuakeMap {
    pub fn world(&self) -> Option<&Entity> {
        self.entities.get(self.world)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    pub attributes: Vec<Attribute>,
    pub extra_attributes: ExtraAttributes,
    pub brushes: Vec<Brush>,
    pub start_line: usize,
    pub line_count: usize,
}

impl Entity {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn classname(&self) -> &str {
        attributes::find_attribute(
            &self.attributes,
            attributes::names::CLASSNAME,
        )
    }

    pub fn role(&self) -> EntityRole {
        attributes::classify(&self.attributes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraAttributeKind {
    String,
    Integer,
}

/// Metadata introduced by a `///` comment line, e.g. `/// _tb_id 3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraAttribute {
    pub kind: ExtraAttributeKind,
    pub name: String,
    pub value: String,
    pub line: usize,
    pub column: usize,
}

impl ExtraAttribute {
    pub fn int_value(&self) -> Option<i64> {
        match self.kind {
            ExtraAttributeKind::Integer => self.value.parse().ok(),
            ExtraAttributeKind::String => None,
        }
    }
}

/// Extra attributes in source order, unique by name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtraAttributes(Vec<ExtraAttribute>);

impl ExtraAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `attribute` unless one of the same name exists. Returns whether
    /// it was added.
    pub fn insert(&mut self, attribute: ExtraAttribute) -> bool {
        if self.get(&attribute.name).is_some() {
            false
        } else {
            self.0.push(attribute);
            true
        }
    }

    pub fn get(&self, name: &str) -> Option<&ExtraAttribute> {
        self.0.iter().find(|attr| attr.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExtraAttribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ExtraAttributes {
    type Item = &'a ExtraAttribute;
    type IntoIter = std::slice::Iter<'a, ExtraAttribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Brush {
    pub faces: Vec<Surface>,
    pub extra_attributes: ExtraAttributes,
    pub start_line: usize,
    pub line_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub half_space: HalfSpace,
    /// Empty when the face has no texture.
    pub texture: String,
    pub alignment: Alignment,
    pub surface_values: Option<SurfaceValues>,
    pub line: usize,
    pub column: usize,
}

/// Three points on the face plane, clockwise when seen from outside the
/// brush.
pub type HalfSpace = [Point; 3];

#[derive(Debug, Clone, PartialEq)]
pub enum Alignment {
    Standard(BaseAlignment),
    Valve220 {
        base: BaseAlignment,
        u: Vec3,
        v: Vec3,
    },
}

impl Alignment {
    pub fn base(&self) -> &BaseAlignment {
        match self {
            Alignment::Standard(base) => base,
            Alignment::Valve220 { base, .. } => base,
        }
    }

    pub fn base_mut(&mut self) -> &mut BaseAlignment {
        match self {
            Alignment::Standard(base) => base,
            Alignment::Valve220 { base, .. } => base,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseAlignment {
    pub offset: Vec2,
    pub rotation: f64,
    pub scale: Vec2,
}

/// Values trailing a face definition in some dialects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceValues {
    Quake2 { contents: i64, flags: i64, value: f64 },
    Hexen2(f64),
}
