fn main() {
    use brushmap::qmap::{self, MapFormat, ParseOptions, Writes};
    use std::env::args;
    use std::io;

    let mut arguments = args();
    arguments.next();

    let inpath = if let Some(path) = arguments.next() {
        path
    } else {
        panic!("No input path");
    };

    let outpath = if let Some(path) = arguments.next() {
        path
    } else {
        panic!("No output path");
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
        lowercase_textures: false,
        ..ParseOptions::default()
    };

    let infile = std::fs::File::open(inpath).unwrap();
    let reader = io::BufReader::new(infile);
    let parsed = qmap::parse_reader(reader, &options).unwrap();

    for warning in &parsed.warnings {
        eprintln!("Warning: {}", warning);
    }

    let outfile = std::fs::File::create(outpath).unwrap();
    let mut writer = io::BufWriter::new(outfile);
    parsed.map.write_to(&mut writer).unwrap();
}
