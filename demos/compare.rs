use lapy::{FormatSchema, ReadMode, TrajectoryReader};

fn main() -> lapy::Result<()> {
    let path = std::env::args()
        .nth(1)
        .expect("please provide one trajectory path");
    let schema = FormatSchema::from_path(&path).expect("unknown trajectory extension");

    let mut buffered = TrajectoryReader::open(&path, schema, ReadMode::Buffered)?;
    let mut streaming = TrajectoryReader::open(&path, schema, ReadMode::Streaming)?;

    let n = buffered.frame_count()?;
    assert_eq!(n, streaming.frame_count()?);
    assert_eq!(buffered.descriptors(), streaming.descriptors());

    // Walk backwards, which is the worst case for the streaming reader.
    for idx in (0..n).rev() {
        let a = buffered.select(idx)?.table()?;
        let b = streaming.select(idx)?.table()?;
        assert_eq!(a, b, "frame {idx} differs");
    }
    eprintln!("compare: {n} frames agree");

    Ok(())
}
