use std::io::Cursor;

use bencher::{benchmark_group, benchmark_main, Bencher};
use lapy::{FormatSchema, FrameSelection, ReadMode, TrajectoryReader};

benchmark_main!(reading, access);
benchmark_group!(
    reading,
    open_buffered,
    iterate_buffered,
    iterate_streaming,
    read_frames_streaming
);
benchmark_group!(access, random_buffered, random_streaming, parse_data);

const NFRAMES: usize = 50;
const NATOMS: usize = 500;

/// Build a dump trajectory in memory, so the benchmarks do not depend on a large fixture.
fn trajectory() -> Vec<u8> {
    let mut text = String::new();
    for frame in 0..NFRAMES {
        text.push_str(&format!(
            "ITEM: TIMESTEP\n{}\nITEM: NUMBER OF ATOMS\n{NATOMS}\n\
             ITEM: BOX BOUNDS pp pp pp\n0 40\n0 40\n0 40\nITEM: ATOMS id type x y z\n",
            frame * 100
        ));
        for atom in 0..NATOMS {
            let v = (frame * NATOMS + atom) as f64 * 1e-3;
            text.push_str(&format!("{} 1 {v:.4} {:.4} {:.4}\n", atom + 1, v * 2.0, v * 3.0));
        }
    }
    text.into_bytes()
}

fn reader(bytes: &[u8], mode: ReadMode) -> TrajectoryReader<Cursor<Vec<u8>>> {
    TrajectoryReader::new(Cursor::new(bytes.to_vec()), FormatSchema::DUMP, mode).unwrap()
}

fn open_buffered(b: &mut Bencher) {
    let bytes = trajectory();
    b.iter(|| reader(&bytes, ReadMode::Buffered));
}

fn iterate(b: &mut Bencher, mode: ReadMode) {
    let bytes = trajectory();
    let mut reader = reader(&bytes, mode);
    b.iter(|| {
        let mut frames = reader.frames();
        let mut n = 0;
        while let Some(frame) = frames.advance() {
            n += frame.unwrap().atom_count();
        }
        n
    });
}

fn iterate_buffered(b: &mut Bencher) {
    iterate(b, ReadMode::Buffered)
}

fn iterate_streaming(b: &mut Bencher) {
    iterate(b, ReadMode::Streaming)
}

fn read_frames_streaming(b: &mut Bencher) {
    let bytes = trajectory();
    let mut reader = reader(&bytes, ReadMode::Streaming);
    let selection: FrameSelection = "::5".parse().unwrap();
    let mut frames = Vec::new();
    b.iter(|| {
        frames.clear();
        reader.read_frames(&mut frames, &selection).unwrap()
    });
}

fn random(b: &mut Bencher, mode: ReadMode) {
    let bytes = trajectory();
    let mut reader = reader(&bytes, mode);
    let order = [NFRAMES - 1, 3, NFRAMES / 2, 0, 7];
    b.iter(|| {
        for &n in &order {
            reader.select(n).unwrap();
        }
    });
}

fn random_buffered(b: &mut Bencher) {
    random(b, ReadMode::Buffered)
}

fn random_streaming(b: &mut Bencher) {
    random(b, ReadMode::Streaming)
}

fn parse_data(b: &mut Bencher) {
    let bytes = trajectory();
    let mut reader = reader(&bytes, ReadMode::Buffered);
    b.iter(|| reader.select(NFRAMES / 2).unwrap().data().unwrap());
}
