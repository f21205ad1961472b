use lapy::{FormatSchema, ReadMode, TrajectoryReader};

fn main() -> lapy::Result<()> {
    let path = std::env::args()
        .nth(1)
        .expect("please provide one trajectory path");
    let schema = FormatSchema::from_path(&path).expect("unknown trajectory extension");

    let mut reader = TrajectoryReader::open(path, schema, ReadMode::Streaming)?;
    let mut frames = reader.frames();

    let mut n = 0;
    let mut natoms = 0;
    while let Some(frame) = frames.advance() {
        natoms += frame?.data()?.nrows();
        n += 1;
    }
    eprintln!("reader: read {n} frames, {natoms} atoms in total");

    Ok(())
}
