use crate::geometry::GeometryError;
use crate::qmap::{EntityRole, Error, ParseOptions, Warning};
use crate::scene::{load, load_reader, BrushFailure};

use approx::assert_relative_eq;

const CUBE: &str = "{
( -64 -64 -16 ) ( -64 -63 -16 ) ( -64 -64 -15 ) __TB_empty 0 0 0 1 1
( -64 -64 -16 ) ( -64 -64 -15 ) ( -63 -64 -16 ) __TB_empty 0 0 0 1 1
( -64 -64 -16 ) ( -63 -64 -16 ) ( -64 -63 -16 ) FLOOR1 16 -8 90 0.5 2
( 64 64 16 ) ( 64 65 16 ) ( 65 64 16 ) CEIL_1 0 0 0 1 1
( 64 64 16 ) ( 65 64 16 ) ( 64 64 17 ) {fence 0 0 0 1 1
( 64 64 16 ) ( 64 64 17 ) ( 64 65 16 ) floor1 0 0 0 1 1
}
";

fn world_with(brushes: &str) -> String {
    format!(
        "{{\n\"classname\" \"worldspawn\"\n{}}}\n\
         {{\n\"classname\" \"light\"\n\"origin\" \"0 0 8\"\n}}\n",
        brushes
    )
}

#[test]
fn load_cube() {
    let scene = load(&world_with(CUBE), &ParseOptions::default()).unwrap();

    assert!(scene.warnings.is_empty());
    assert!(scene.failures.is_empty());
    assert_eq!(scene.entities.len(), 2);

    let world = scene.world().unwrap();
    assert_eq!(world.role, EntityRole::Worldspawn);
    assert_eq!(world.brushes.len(), 1);
    assert_eq!(world.start_line, 1);

    let brush = &world.brushes[0];
    assert_eq!(brush.faces.len(), 6);
    assert_eq!(brush.vertices().len(), 8);

    for face in &brush.faces {
        assert_eq!(face.vertices.len(), 4);
    }

    let floor = &brush.faces[2];
    assert_eq!(floor.texture, "floor1");
    assert_eq!(floor.plane.normal, [0.0, 0.0, -1.0]);
    assert_eq!(floor.offset, [16.0, -8.0]);
    assert_eq!(floor.rotation, 90.0);
    assert_eq!(floor.scale, [0.5, 2.0]);
    assert_eq!(floor.tc_sys.index, 1);

    let light = &scene.entities[1];
    assert_eq!(light.classname(), "light");
    assert_eq!(light.attribute("origin"), Some("0 0 8"));
    assert_eq!(light.role, EntityRole::Default);
    assert!(light.brushes.is_empty());
}

#[test]
fn texture_names_in_first_use_order() {
    let scene = load(&world_with(CUBE), &ParseOptions::default()).unwrap();

    assert_eq!(scene.texture_names(), ["floor1", "ceil_1", "{fence"]);
}

#[test]
fn scaled_points() {
    let options = ParseOptions {
        point_scale: 0.01,
        ..ParseOptions::default()
    };
    let scene = load(&world_with(CUBE), &options).unwrap();
    let brush = &scene.world().unwrap().brushes[0];

    for vertex in brush.vertices() {
        assert_relative_eq!(vertex[0].abs(), 0.64, epsilon = 1e-9);
        assert_relative_eq!(vertex[1].abs(), 0.64, epsilon = 1e-9);
        assert_relative_eq!(vertex[2].abs(), 0.16, epsilon = 1e-9);
    }
}

#[test]
fn thin_brush_at_small_scale() {
    let slab = "{
( -64 -64 0 ) ( -64 -63 0 ) ( -64 -64 1 ) trim 0 0 0 1 1
( -64 -64 0 ) ( -64 -64 1 ) ( -63 -64 0 ) trim 0 0 0 1 1
( -64 -64 0 ) ( -63 -64 0 ) ( -64 -63 0 ) trim 0 0 0 1 1
( 64 64 2 ) ( 64 65 2 ) ( 65 64 2 ) trim 0 0 0 1 1
( 64 64 2 ) ( 65 64 2 ) ( 64 64 3 ) trim 0 0 0 1 1
( 64 64 2 ) ( 64 64 3 ) ( 64 65 2 ) trim 0 0 0 1 1
}
";
    let options = ParseOptions {
        point_scale: 0.01,
        ..ParseOptions::default()
    };
    let scene = load(&world_with(slab), &options).unwrap();

    assert!(scene.failures.is_empty());

    let brush = &scene.world().unwrap().brushes[0];
    assert_eq!(brush.scale, 0.01);
    assert_eq!(brush.vertices().len(), 8);

    for face in &brush.faces {
        assert_eq!(face.vertices.len(), 4);

        for &vertex in &face.vertices {
            assert!(brush.contains(vertex));
            assert!(face.plane.distance_to(vertex).abs() < 1e-9);
        }
    }

    let top = &brush.faces[3];
    for vertex in &top.vertices {
        assert_relative_eq!(vertex[0].abs(), 0.64, epsilon = 1e-9);
        assert_relative_eq!(vertex[2], 0.02, epsilon = 1e-9);
    }
    assert_relative_eq!(top.plane.dist, 0.02, epsilon = 1e-9);
}

#[test]
fn failed_brush_is_skipped() {
    // Second brush starts on line 11 and loses its collinear face
    let broken = "{
( -64 -64 -16 ) ( -64 -63 -16 ) ( -64 -64 -15 ) wall 0 0 0 1 1
( 0 0 0 ) ( 1 0 0 ) ( 2 0 0 ) wall 0 0 0 1 1
( -64 -64 -16 ) ( -64 -64 -15 ) ( -63 -64 -16 ) wall 0 0 0 1 1
( 64 64 16 ) ( 64 65 16 ) ( 65 64 16 ) wall 0 0 0 1 1
}
";
    let text = world_with(&format!("{CUBE}{broken}"));
    let scene = load(&text, &ParseOptions::default()).unwrap();

    assert_eq!(
        scene.warnings,
        [Warning::CollinearFace { line: 13, column: 1 }]
    );
    assert_eq!(
        scene.failures,
        [BrushFailure {
            entity: 0,
            brush: 1,
            line: 11,
            error: GeometryError::TooFewFaces { faces: 3 },
        }]
    );
    assert_eq!(
        scene.failures[0].to_string(),
        "Entity 0, brush 1 (line 11): Brush has 3 faces, at least 4 are \
         needed"
    );

    let world = scene.world().unwrap();
    assert_eq!(world.brushes.len(), 1);
    assert!(!scene.texture_names().contains(&"wall"));
}

#[test]
fn parse_errors_fail_the_load() {
    let options = ParseOptions::default();

    assert!(matches!(
        load("{ \"classname\" \"light\" }", &options),
        Err(Error::NoWorldEntity)
    ));
    assert!(matches!(
        load("{ \"classname\" \"worldspawn\"", &options),
        Err(Error::Syntax(_))
    ));
}

#[test]
fn load_from_reader() {
    let text = world_with(CUBE);
    let scene =
        load_reader(text.as_bytes(), &ParseOptions::default()).unwrap();

    assert_eq!(scene.world, 0);
    assert_eq!(scene.world().unwrap().brushes.len(), 1);
}
