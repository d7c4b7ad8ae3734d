fn main() {
    use brushmap::qmap::{MapFormat, ParseOptions};
    use brushmap::scene;
    use std::env::args;

    let mut arguments = args();
    arguments.next();

    let inpath = if let Some(path) = arguments.next() {
        path
    } else {
        panic!("No input path");
    };

    let format = match arguments.next().as_deref() {
        None | Some("standard") => MapFormat::Standard,
        Some("valve") => MapFormat::Valve,
        Some("quake2") => MapFormat::Quake2,
        Some("hexen2") => MapFormat::Hexen2,
        Some(other) => panic!("Unknown format `{}`", other),
    };

    let options = ParseOptions {
        format,
        ..ParseOptions::default()
    };

    let infile = std::fs::File::open(inpath).unwrap();
    let scene = scene::load_reader(infile, &options).unwrap();

    for (index, entity) in scene.entities.iter().enumerate() {
        if entity.brushes.is_empty() {
            continue;
        }

        let faces: usize = entity.brushes.iter().map(|b| b.faces.len()).sum();
        let vertices: usize =
            entity.brushes.iter().map(|b| b.vertices().len()).sum();

        println!(
            "{:>4} {:<24} {:>5} brushes {:>6} faces {:>6} vertices",
            index,
            entity.classname(),
            entity.brushes.len(),
            faces,
            vertices,
        );
    }

    println!("Textures:");

    for name in scene.texture_names() {
        println!("    {}", name);
    }

    for warning in &scene.warnings {
        eprintln!("Warning: {}", warning);
    }

    for failure in &scene.failures {
        eprintln!("Skipped: {}", failure);
    }
}
