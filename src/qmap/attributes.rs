//! Well-known entity property names and values, and the role lookup used to
//! locate the world entity.

use crate::qmap::repr::Attribute;

pub mod names {
    pub const CLASSNAME: &str = "classname";
    pub const ORIGIN: &str = "origin";
    pub const WAD: &str = "wad";
    pub const TEXTURES: &str = "_tb_textures";
    pub const MODS: &str = "_tb_mod";
    pub const ENGINE_PARAMETER_SPECS: &str = "_tb_engines";
    pub const SPAWNFLAGS: &str = "spawnflags";
    pub const ENTITY_DEFINITIONS: &str = "_tb_def";
    pub const ANGLE: &str = "angle";
    pub const ANGLES: &str = "angles";
    pub const MANGLE: &str = "mangle";
    pub const TARGET: &str = "target";
    pub const TARGETNAME: &str = "targetname";
    pub const KILLTARGET: &str = "killtarget";
    pub const GROUP_TYPE: &str = "_tb_type";
    pub const LAYER_ID: &str = "_tb_id";
    pub const LAYER_NAME: &str = "_tb_name";
    pub const LAYER: &str = "_tb_layer";
    pub const GROUP_ID: &str = "_tb_id";
    pub const GROUP_NAME: &str = "_tb_name";
    pub const GROUP: &str = "_tb_group";
    pub const MESSAGE: &str = "_tb_message";
}

pub mod values {
    pub const WORLDSPAWN_CLASSNAME: &str = "worldspawn";
    pub const NO_CLASSNAME: &str = "undefined";
    pub const LAYER_CLASSNAME: &str = "func_group";
    pub const GROUP_CLASSNAME: &str = "func_group";
    pub const GROUP_TYPE_LAYER: &str = "_tb_layer";
    pub const GROUP_TYPE_GROUP: &str = "_tb_group";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRole {
    Layer,
    Group,
    Worldspawn,
    Default,
}

/// Value of the first attribute called `name`, or `""`.
pub fn find_attribute<'a>(attributes: &'a [Attribute], name: &str) -> &'a str {
    attributes
        .iter()
        .find(|attr| attr.name == name)
        .map_or("", |attr| attr.value.as_str())
}

pub fn classify(attributes: &[Attribute]) -> EntityRole {
    let classname = find_attribute(attributes, names::CLASSNAME);

    if is_layer(classname, attributes) {
        EntityRole::Layer
    } else if is_group(classname, attributes) {
        EntityRole::Group
    } else if is_worldspawn(classname) {
        EntityRole::Worldspawn
    } else {
        EntityRole::Default
    }
}

pub fn is_layer(classname: &str, attributes: &[Attribute]) -> bool {
    classname == values::LAYER_CLASSNAME
        && find_attribute(attributes, names::GROUP_TYPE)
            == values::GROUP_TYPE_LAYER
}

pub fn is_group(classname: &str, attributes: &[Attribute]) -> bool {
    classname == values::GROUP_CLASSNAME
        && find_attribute(attributes, names::GROUP_TYPE)
            == values::GROUP_TYPE_GROUP
}

pub fn is_worldspawn(classname: &str) -> bool {
    classname == values::WORLDSPAWN_CLASSNAME
}

/// Prefix of a numbered property such as `target2` (`"target"`), or `""` if
/// the name does not end in digits.
pub fn numbered_attribute_prefix(name: &str) -> &str {
    let prefix_len = name.trim_end_matches(|c: char| c.is_ascii_digit()).len();

    if prefix_len == name.len() {
        ""
    } else {
        &name[..prefix_len]
    }
}

pub fn is_numbered_attribute(prefix: &str, name: &str) -> bool {
    name.strip_prefix(prefix)
        .is_some_and(|rest| rest.bytes().all(|b| b.is_ascii_digit()))
}
