use crate::qmap;
use qmap::parser::{parse, MapFormat, ParseOptions};
use qmap::repr::{
    Alignment, Attribute, BaseAlignment, Brush, Entity, ExtraAttribute,
    ExtraAttributeKind, ExtraAttributes, HalfSpace, QuakeMap, Surface,
    SurfaceValues,
};
use qmap::write::{CheckWritable, WriteError, Writes};

const GOOD_HALF_SPACE: HalfSpace =
    [[-1.0, -1.0, 0.0], [-1.0, 1.0, 0.0], [1.0, -1.0, 0.0]];

const GOOD_BASE: BaseAlignment = BaseAlignment {
    offset: [0.0, 0.0],
    rotation: 0.0,
    scale: [1.0, 1.0],
};

fn simple_surface() -> Surface {
    Surface {
        half_space: GOOD_HALF_SPACE,
        texture: String::from("{fence"),
        alignment: Alignment::Standard(GOOD_BASE),
        surface_values: None,
        line: 0,
        column: 0,
    }
}

fn simple_entity() -> Entity {
    Entity {
        attributes: vec![Attribute::new("classname", "worldspawn")],
        brushes: vec![Brush {
            faces: vec![simple_surface()],
            ..Brush::default()
        }],
        ..Entity::default()
    }
}

fn to_text<T: Writes<Vec<u8>>>(element: &T) -> String {
    let mut out = Vec::new();
    element.write_to(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn write_surface_variants() {
    let mut surface = simple_surface();
    assert_eq!(
        to_text(&surface),
        "( -1 -1 0 ) ( -1 1 0 ) ( 1 -1 0 ) {fence 0 0 0 1 1"
    );

    surface.texture.clear();
    surface.alignment = Alignment::Valve220 {
        base: BaseAlignment {
            offset: [2.5, -3.0],
            ..GOOD_BASE
        },
        u: [1.0, 0.0, 0.0],
        v: [0.0, -1.0, 0.0],
    };
    surface.surface_values = Some(SurfaceValues::Quake2 {
        contents: 1,
        flags: 16,
        value: 0.5,
    });

    assert_eq!(
        to_text(&surface),
        "( -1 -1 0 ) ( -1 1 0 ) ( 1 -1 0 ) __TB_empty \
         [ 1 0 0 2.5 ] [ 0 -1 0 -3 ] 0 1 1 1 16 0.5"
    );
}

#[test]
fn write_entity_with_extras() {
    let mut ent = simple_entity();
    ent.extra_attributes.insert(ExtraAttribute {
        kind: ExtraAttributeKind::Integer,
        name: String::from("_tb_id"),
        value: String::from("7"),
        line: 0,
        column: 0,
    });

    let text = to_text(&ent);
    let lines: Vec<&str> = text.split("\r\n").collect();

    assert_eq!(
        lines,
        [
            "{",
            "/// \"_tb_id\" 7",
            "\"classname\" \"worldspawn\"",
            "{",
            "( -1 -1 0 ) ( -1 1 0 ) ( 1 -1 0 ) {fence 0 0 0 1 1",
            "}",
            "}",
            "",
        ]
    );
}

#[test]
fn round_trip_preserves_tree() {
    let source = "{\n\
        /// \"_tb_id\" 2\n\
        \"classname\" \"worldspawn\"\n\
        \"message\" \"say \\\"hi\\\"\"\n\
        \"path\" \"C:\\maps\\\"\n\
        \"message\" \"dropped\"\n\
        {\n\
        /// \"_tb_name\" \"Floor\"\n\
        ( 0 0 0 ) ( 0 1 0 ) ( 1 0 0 ) base_floor [ 1 0 0 0.25 ] \
        [ 0 -1 0 -16 ] 0 1 1 0 0 0\n\
        ( 0 0 0 ) ( 1 0 0 ) ( 0 0 1 ) __TB_empty [ 1 0 0 0 ] \
        [ 0 0 -1 0 ] 0 1 1\n\
        }\n\
        }\n\
        { \"classname\" \"info_player_start\" \"origin\" \"1.5 0 -24\" }\n";

    let opts = ParseOptions {
        format: MapFormat::Valve,
        ..ParseOptions::default()
    };
    let first = parse(source, &opts).unwrap().map;

    let written = to_text(&first);
    let second = parse(&written, &opts).unwrap().map;

    assert_eq!(first.entities.len(), second.entities.len());
    assert_eq!(first.world, second.world);

    for (a, b) in first.entities.iter().zip(&second.entities) {
        assert_eq!(a.attributes, b.attributes);
        assert_eq!(a.extra_attributes.len(), b.extra_attributes.len());
        assert_eq!(a.brushes.len(), b.brushes.len());

        for (brush_a, brush_b) in a.brushes.iter().zip(&b.brushes) {
            assert_eq!(
                brush_a.extra_attributes.get("_tb_name").map(|e| &e.value),
                brush_b.extra_attributes.get("_tb_name").map(|e| &e.value)
            );

            for (face_a, face_b) in brush_a.faces.iter().zip(&brush_b.faces) {
                assert_eq!(face_a.half_space, face_b.half_space);
                assert_eq!(face_a.texture, face_b.texture);
                assert_eq!(face_a.alignment, face_b.alignment);
                assert_eq!(face_a.surface_values, face_b.surface_values);
            }
        }
    }

    let world = second.world().unwrap();
    assert_eq!(world.attribute("message"), Some(r#"say \"hi\""#));
    assert_eq!(world.attribute("path"), Some(r"C:\maps\"));
}

// Validation failures

#[test]
fn check_bad_attribute() {
    let mut ent = simple_entity();
    ent.attributes.push(Attribute::new("\n", "oops"));

    assert!(ent.check_writable().is_err());

    let mut out = Vec::new();
    let err = ent.write_to(&mut out).unwrap_err();
    assert!(matches!(err, WriteError::Validation(_)));
    assert!(out.is_empty());
}

#[test]
fn check_bare_quote_and_trailing_backslash() {
    assert!(Attribute::new("a\"b", "c").check_writable().is_err());
    assert!(Attribute::new("key\\", "c").check_writable().is_err());
    assert!(Attribute::new("key", "dir\\").check_writable().is_ok());
    assert!(Attribute::new("key", "say \\\"x\\\"").check_writable().is_ok());
}

#[test]
fn check_bad_surfaces() {
    let mut spaced = simple_surface();
    spaced.texture = String::from("two words");
    assert!(spaced.check_writable().is_err());

    let mut nan_point = simple_surface();
    nan_point.half_space[0][0] = f64::NAN;
    assert!(nan_point.check_writable().is_err());

    let mut infinite_scale = simple_surface();
    infinite_scale.alignment.base_mut().scale[1] = f64::INFINITY;
    assert!(infinite_scale.check_writable().is_err());
}

#[test]
fn check_bad_extra_attribute() {
    let mut extras = ExtraAttributes::new();
    extras.insert(ExtraAttribute {
        kind: ExtraAttributeKind::Integer,
        name: String::from("_tb_id"),
        value: String::from("seven"),
        line: 1,
        column: 1,
    });

    assert!(extras.check_writable().is_err());
}

#[test]
fn write_map_checks_everything() {
    let mut map = QuakeMap {
        entities: vec![simple_entity()],
        world: 0,
    };
    assert!(map.check_writable().is_ok());

    map.entities[0].brushes[0].faces[0].alignment.base_mut().rotation =
        f64::NAN;
    assert!(map.check_writable().is_err());
}
