#![allow(dead_code)]

use lapy::{FormatSchema, ReadMode, TrajectoryReader};

pub mod trajectories {
    /// Three frames of 3, 2 and 4 atoms at timesteps 0, 1000 and 2000.
    pub const DUMP: &str = "tests/trajectories/small.lammpstrj";
    /// Four frames of 2, 3, 1 and 2 atoms.
    pub const XYZ: &str = "tests/trajectories/walk.xyz";
    /// Two frames, the second of which has a short atom line.
    pub const BAD: &str = "tests/trajectories/bad.lammpstrj";
}

pub const MODES: [ReadMode; 2] = [ReadMode::Buffered, ReadMode::Streaming];

pub fn open(path: &str, mode: ReadMode) -> lapy::Result<TrajectoryReader> {
    let schema = FormatSchema::from_path(path).expect("fixture paths have known extensions");
    TrajectoryReader::open(path, schema, mode)
}
