use std::num::NonZeroU64;

use lapy::{FrameSelection as FS, Range};

mod common;
use common::{open, trajectories, MODES};

const PATH: &str = trajectories::XYZ;

/// Read frames according to some [`FrameSelection`] and return the frame numbers that were
/// read, for each of the reading modes.
fn selected(frame_selection: FS) -> lapy::Result<Vec<usize>> {
    let mut results = Vec::new();
    for mode in MODES {
        let mut reader = open(PATH, mode)?;
        let mut frames = Vec::new();
        let n = reader.read_frames(&mut frames, &frame_selection)?;
        assert_eq!(n, frames.len());
        results.push(
            frames
                .iter()
                .map(|frame| frame.descriptor().frame_number)
                .collect::<Vec<_>>(),
        );
    }
    assert_eq!(results[0], results[1], "modes should select the same frames");
    Ok(results.swap_remove(0))
}

macro_rules! assert_frames {
    ($frame_selection:expr => $expected:expr) => {{
        assert_eq!(selected($frame_selection)?, $expected);
        Ok(())
    }};
}

#[test]
fn all() -> lapy::Result<()> {
    assert_frames!(FS::All => [0, 1, 2, 3])
}

#[test]
fn until() -> lapy::Result<()> {
    assert_frames!(FS::Range(Range::new(None, Some(2), None)) => [0, 1])
}

#[test]
fn from() -> lapy::Result<()> {
    assert_frames!(FS::Range(Range::new(Some(1), None, None)) => [1, 2, 3])
}

#[test]
fn stepped() -> lapy::Result<()> {
    let step = NonZeroU64::new(2);
    assert_frames!(FS::Range(Range::new(Some(1), None, step)) => [1, 3])
}

#[test]
fn beyond_the_end() -> lapy::Result<()> {
    assert_frames!(FS::Range(Range::new(Some(10), Some(100), None)) => [0usize; 0])
}

#[test]
fn list() -> lapy::Result<()> {
    assert_frames!(FS::from_frame_list(vec![3, 0, 7]) => [0, 3])
}

#[test]
fn empty_list() -> lapy::Result<()> {
    assert_frames!(FS::FrameList(vec![]) => [0usize; 0])
}

#[test]
fn owned_frames_outlive_the_reader() -> lapy::Result<()> {
    let mut frames = Vec::new();
    {
        let mut reader = open(trajectories::DUMP, lapy::ReadMode::Streaming)?;
        reader.read_frames(&mut frames, &"1:".parse().expect("valid selection"))?;
    }
    let timesteps: Vec<_> = frames.iter().map(|f| f.view().timestep()).collect();
    assert_eq!(timesteps, [Some(1000), Some(2000)]);
    assert_eq!(frames[1].view().positions()?.len(), 4);
    Ok(())
}
