//! Random access to the frames of LAMMPS dump and xyz trajectories.
//!
//! A trajectory is a sequence of frames, each a short header followed by one line per atom. The
//! position of every frame is only known once all frames before it have been seen, so a
//! [`TrajectoryReader`] discovers frame boundaries as it goes and remembers them in a
//! [`FrameIndex`]. Once a frame is known, it can be selected again directly.
//!
//! ```no_run
//! # fn main() -> lapy::Result<()> {
//! use lapy::{FormatSchema, ReadMode, TrajectoryReader};
//!
//! let mut reader = TrajectoryReader::open("dump.lammpstrj", FormatSchema::DUMP, ReadMode::Streaming)?;
//! let mut frames = reader.frames();
//! while let Some(frame) = frames.advance() {
//!     let frame = frame?;
//!     println!("{:?} {:?}", frame.timestep(), frame.cell()?);
//! }
//! # Ok(())
//! # }
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;

use tracing::info;

pub use crate::cursor::LineCursor;
pub use crate::error::{parse_frame_number, Error, Result};
pub use crate::frame::{Cell, Frame, FrameView, Matrix, Table};
pub use crate::index::{FrameDescriptor, FrameIndex, LineSource};
pub use crate::reader::{BufferedReader, StreamingReader};
pub use crate::schema::FormatSchema;
pub use crate::selection::{FrameSelection, Range};

pub mod cursor;
pub mod error;
pub mod frame;
pub mod index;
pub mod reader;
pub mod schema;
pub mod selection;

/// How a [`TrajectoryReader`] holds on to its source.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Load the whole file and index all frames when opening.
    #[default]
    Buffered,
    /// Keep memory bounded by reading frames from the file as they are selected.
    Streaming,
}

/// A trajectory reader, using the strategy picked when it was opened.
///
/// The underlying file is closed when the reader is dropped.
#[derive(Debug)]
pub enum TrajectoryReader<R = BufReader<File>> {
    Buffered(BufferedReader),
    Streaming(StreamingReader<R>),
}

impl TrajectoryReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P, schema: FormatSchema, mode: ReadMode) -> Result<Self> {
        let path = path.as_ref();
        let reader = match mode {
            ReadMode::Buffered => {
                let reader = BufferedReader::open(path, schema)?;
                info!(
                    path = %path.display(),
                    frames = reader.index().len(),
                    "loaded {} trajectory",
                    schema.name
                );
                Self::Buffered(reader)
            }
            ReadMode::Streaming => {
                info!(path = %path.display(), "streaming {} trajectory", schema.name);
                Self::Streaming(StreamingReader::open(path, schema)?)
            }
        };
        Ok(reader)
    }
}

impl<R: BufRead + Seek> TrajectoryReader<R> {
    /// Create a reader over any seekable source.
    ///
    /// In [`ReadMode::Buffered`] the source is read to its end right away.
    pub fn new(reader: R, schema: FormatSchema, mode: ReadMode) -> Result<Self> {
        Ok(match mode {
            ReadMode::Buffered => Self::Buffered(BufferedReader::new(reader, schema)?),
            ReadMode::Streaming => Self::Streaming(StreamingReader::new(reader, schema)),
        })
    }

    pub fn mode(&self) -> ReadMode {
        match self {
            Self::Buffered(_) => ReadMode::Buffered,
            Self::Streaming(_) => ReadMode::Streaming,
        }
    }

    pub fn schema(&self) -> &FormatSchema {
        match self {
            Self::Buffered(reader) => reader.schema(),
            Self::Streaming(reader) => reader.schema(),
        }
    }

    /// The frames discovered so far.
    ///
    /// For a buffered reader, these are all frames in the trajectory.
    pub fn descriptors(&self) -> &[FrameDescriptor] {
        match self {
            Self::Buffered(reader) => reader.index().as_slice(),
            Self::Streaming(reader) => reader.index().as_slice(),
        }
    }

    /// Returns the descriptor of a frame, discovering frames until it is known.
    pub fn ensure(&mut self, frame_number: usize) -> Result<FrameDescriptor> {
        match self {
            Self::Buffered(reader) => reader.ensure(frame_number),
            Self::Streaming(reader) => reader.ensure(frame_number),
        }
    }

    /// Select a frame and return a view of its lines.
    ///
    /// The view borrows the reader, so it must be dropped before the next frame is selected.
    pub fn select(&mut self, frame_number: usize) -> Result<FrameView<'_>> {
        match self {
            Self::Buffered(reader) => reader.select(frame_number),
            Self::Streaming(reader) => reader.select(frame_number),
        }
    }

    /// Returns the total number of frames.
    ///
    /// A streaming reader scans to the end of the file to find out, after which selecting an
    /// earlier frame will cost a rescan.
    pub fn frame_count(&mut self) -> Result<usize> {
        match self {
            Self::Buffered(reader) => Ok(reader.index().len()),
            Self::Streaming(reader) => reader.discover_all(),
        }
    }

    /// The timestep of every frame in the trajectory.
    pub fn timesteps(&mut self) -> Result<Vec<Option<i64>>> {
        self.frame_count()?;
        Ok(self.descriptors().iter().map(|d| d.timestep).collect())
    }

    /// The number of atoms in every frame of the trajectory.
    pub fn atoms_per_frame(&mut self) -> Result<Vec<usize>> {
        self.frame_count()?;
        Ok(self.descriptors().iter().map(|d| d.atom_count).collect())
    }

    /// Return to the start of the trajectory.
    ///
    /// For a streaming reader this rewinds the underlying source. A buffered reader has nothing
    /// to rewind.
    pub fn home(&mut self) -> Result<()> {
        match self {
            Self::Buffered(_) => Ok(()),
            Self::Streaming(reader) => reader.home(),
        }
    }

    /// Iterate over the frames, starting at the first one.
    pub fn frames(&mut self) -> Frames<'_, R> {
        Frames {
            reader: self,
            next: 0,
            done: false,
        }
    }

    /// Append [`Frame`]s to the `frames` buffer according to a [`FrameSelection`].
    ///
    /// If successful, it will return the number of frames that were read.
    /// This can be useful since the selection itself is not enough to tell how many frames will
    /// actually be read.
    pub fn read_frames(
        &mut self,
        frames: &mut impl Extend<Frame>,
        frame_selection: &FrameSelection,
    ) -> Result<usize> {
        let mut n = 0;
        for idx in 0.. {
            let result = match frame_selection.is_included(idx) {
                Some(true) => self.select(idx).map(|view| frames.extend(Some(view.to_frame()))),
                // Make sure the frame exists, so an open-ended selection stops at the end.
                Some(false) => self.ensure(idx).map(|_| ()),
                None => break,
            };
            match result {
                Ok(()) if frame_selection.is_included(idx) == Some(true) => n += 1,
                Ok(()) => {}
                Err(err) if err.is_frame_not_found() => break,
                Err(err) => return Err(err),
            }
        }

        Ok(n)
    }
}

/// A restartable cursor over the frames of a [`TrajectoryReader`].
///
/// [`Frames::advance`] hands out borrowed views without copying. As an [`Iterator`], owned
/// [`Frame`]s are produced instead.
#[derive(Debug)]
pub struct Frames<'r, R> {
    reader: &'r mut TrajectoryReader<R>,
    next: usize,
    done: bool,
}

impl<R: BufRead + Seek> Frames<'_, R> {
    /// Select the next frame.
    ///
    /// Returns [`None`] once there are no more frames. After an error, the cursor stops until it
    /// is restarted.
    pub fn advance(&mut self) -> Option<Result<FrameView<'_>>> {
        if self.done {
            return None;
        }
        match self.reader.select(self.next) {
            Ok(view) => {
                self.next += 1;
                Some(Ok(view))
            }
            Err(err) if err.is_frame_not_found() => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }

    /// The number of the frame the next call to [`Frames::advance`] will select.
    pub fn position(&self) -> usize {
        self.next
    }

    /// Go back to the first frame.
    pub fn restart(&mut self) {
        self.next = 0;
        self.done = false;
    }
}

impl<R: BufRead + Seek> Iterator for Frames<'_, R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().map(|view| view.map(|view| view.to_frame()))
    }
}
