use std::fs::{self, File};
use std::io::BufReader;

use brushmap::qmap::{
    self, attributes, Alignment, EntityRole, MapFormat, ParseOptions,
    QuakeMap, SurfaceGuess, SurfaceValues, Warning, Writes,
};
use brushmap::scene::{self, Scene};

const FIXTURES: [(&str, MapFormat); 4] = [
    ("test-res/standard.map", MapFormat::Standard),
    ("test-res/valve.map", MapFormat::Valve),
    ("test-res/quake2.map", MapFormat::Quake2),
    ("test-res/hexen2.map", MapFormat::Hexen2),
];

fn options(format: MapFormat) -> ParseOptions {
    ParseOptions {
        format,
        ..ParseOptions::default()
    }
}

fn load_fixture(path: &str, format: MapFormat) -> Scene {
    let text = fs::read_to_string(path).unwrap();

    match scene::load(&text, &options(format)) {
        Ok(scene) => scene,
        Err(err) => panic!("{}: {}", path, err),
    }
}

fn assert_closed(scene: &Scene) {
    for brush in scene.entities.iter().flat_map(|ent| &ent.brushes) {
        for face in &brush.faces {
            assert!(face.vertices.len() >= 3);

            for &vertex in &face.vertices {
                assert!(face.plane.distance_to(vertex).abs() < 1e-6);
                assert!(brush.contains(vertex));
            }
        }
    }
}

fn assert_same_tree(first: &QuakeMap, second: &QuakeMap) {
    assert_eq!(first.world, second.world);
    assert_eq!(first.entities.len(), second.entities.len());

    for (a, b) in first.entities.iter().zip(&second.entities) {
        assert_eq!(a.attributes, b.attributes);
        assert_eq!(a.extra_attributes.len(), b.extra_attributes.len());
        assert_eq!(a.brushes.len(), b.brushes.len());

        for (brush_a, brush_b) in a.brushes.iter().zip(&b.brushes) {
            assert_eq!(brush_a.faces.len(), brush_b.faces.len());

            for (face_a, face_b) in brush_a.faces.iter().zip(&brush_b.faces) {
                assert_eq!(face_a.half_space, face_b.half_space);
                assert_eq!(face_a.texture, face_b.texture);
                assert_eq!(face_a.alignment, face_b.alignment);
                assert_eq!(face_a.surface_values, face_b.surface_values);
            }
        }
    }
}

#[test]
fn fixtures_build_cleanly() {
    for (path, format) in FIXTURES {
        let scene = load_fixture(path, format);

        assert!(scene.warnings.is_empty(), "{}", path);
        assert!(scene.failures.is_empty(), "{}", path);
        assert_eq!(scene.world().unwrap().brushes.len(), 6);
        assert_closed(&scene);
    }
}

#[test]
fn standard_entities() {
    let scene = load_fixture(FIXTURES[0].0, MapFormat::Standard);
    let roles: Vec<EntityRole> =
        scene.entities.iter().map(|ent| ent.role).collect();

    assert_eq!(
        roles,
        [
            EntityRole::Worldspawn,
            EntityRole::Default,
            EntityRole::Default,
            EntityRole::Layer,
            EntityRole::Default,
        ]
    );

    let layer = &scene.entities[3];
    assert_eq!(layer.attribute("_tb_name"), Some("Details"));
    assert_eq!(
        layer
            .extra_attributes
            .get("_tb_id")
            .and_then(|extra| extra.int_value()),
        Some(1)
    );

    let ramp = &layer.brushes[0];
    let counts: Vec<usize> =
        ramp.faces.iter().map(|face| face.vertices.len()).collect();
    assert_eq!(counts, [3, 3, 4, 4, 4]);
    assert_eq!(ramp.vertices().len(), 6);

    let door = &scene.entities[4];
    let numbered: Vec<&str> = door
        .attributes
        .iter()
        .map(|attr| attr.name.as_str())
        .filter(|name| attributes::is_numbered_attribute("target", name))
        .collect();
    assert_eq!(numbered, ["target", "target2"]);

    assert_eq!(
        scene.texture_names(),
        ["wbrick1_5", "ramp_side", "ramp_base", "ramp_top", "door02_1"]
    );
}

#[test]
fn valve_alignment() {
    let scene = load_fixture(FIXTURES[1].0, MapFormat::Valve);
    let text = fs::read_to_string(FIXTURES[1].0).unwrap();
    let map = qmap::parse(&text, &options(MapFormat::Valve)).unwrap().map;

    let face = &map.world().unwrap().brushes[0].faces[0];
    assert_eq!(
        face.alignment,
        Alignment::Valve220 {
            base: *face.alignment.base(),
            u: [0.0, 1.0, 0.0],
            v: [0.0, 0.0, -1.0],
        }
    );

    assert_eq!(scene.texture_names(), ["c1a0_labw", "door02_1"]);
}

#[test]
fn quake2_surface_values() {
    let text = fs::read_to_string(FIXTURES[2].0).unwrap();
    let map = qmap::parse(&text, &options(MapFormat::Quake2)).unwrap().map;
    let faces = &map.world().unwrap().brushes[0].faces;

    assert_eq!(
        faces[0].surface_values,
        Some(SurfaceValues::Quake2 {
            contents: 1,
            flags: 0,
            value: 0.0
        })
    );
    assert_eq!(
        faces[3].surface_values,
        Some(SurfaceValues::Quake2 {
            contents: 0,
            flags: 4,
            value: 200.0
        })
    );
    assert_eq!(faces[0].texture, "e1u1/floor1_3");
}

#[test]
fn hexen2_values_guessed_without_format() {
    let text = fs::read_to_string(FIXTURES[3].0).unwrap();

    let explicit = qmap::parse(&text, &options(MapFormat::Hexen2)).unwrap();
    assert!(explicit.warnings.is_empty());
    assert_eq!(
        explicit.map.world().unwrap().brushes[0].faces[0].surface_values,
        Some(SurfaceValues::Hexen2(0.0))
    );

    let guessed = qmap::parse(&text, &options(MapFormat::Standard)).unwrap();
    assert_eq!(guessed.warnings.len(), 36);
    assert!(guessed.warnings.iter().all(|warning| matches!(
        warning,
        Warning::AmbiguousFaceValues {
            guess: SurfaceGuess::Hexen2,
            ..
        }
    )));
    assert_same_tree(&explicit.map, &guessed.map);
}

#[test]
fn fixtures_round_trip() {
    for (path, format) in FIXTURES {
        let text = fs::read_to_string(path).unwrap();
        let first = qmap::parse(&text, &options(format)).unwrap().map;

        let mut written = Vec::new();
        first.write_to(&mut written).unwrap();
        let written = String::from_utf8(written).unwrap();

        let second = qmap::parse(&written, &options(format)).unwrap().map;
        assert_same_tree(&first, &second);

        let rebuilt = scene::load(&written, &options(format)).unwrap();
        let original = load_fixture(path, format);

        for (a, b) in original.entities.iter().zip(&rebuilt.entities) {
            assert_eq!(a.brushes, b.brushes);
        }
    }
}

#[test]
fn load_from_file() {
    let reader = BufReader::new(File::open(FIXTURES[0].0).unwrap());
    let scene =
        scene::load_reader(reader, &options(MapFormat::Standard)).unwrap();

    assert_eq!(scene.entities.len(), 5);
    assert_eq!(scene.world().unwrap().classname(), "worldspawn");
}
