use lapy::{FormatSchema, ReadMode, TrajectoryReader};

fn main() -> lapy::Result<()> {
    let path = std::env::args()
        .nth(1)
        .expect("please provide one trajectory path");
    let schema = FormatSchema::from_path(&path).expect("unknown trajectory extension");

    let mut reader = TrajectoryReader::open(path, schema, ReadMode::Streaming)?;

    let start = std::time::Instant::now();
    let n = reader.frame_count()?;
    let duration = start.elapsed().as_secs_f32() * 1000.0;
    eprintln!("offsets: found {n} frames");
    eprintln!("         took {duration:.6} ms");

    for descriptor in reader.descriptors() {
        println!("{}\t{}", descriptor.start_line, descriptor.atom_count)
    }

    Ok(())
}
