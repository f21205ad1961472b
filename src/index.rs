use std::io::{BufRead, Seek};

use tracing::debug;

use crate::cursor::LineCursor;
use crate::error::{Error, Result};
use crate::schema::FormatSchema;

/// The location and size of one frame within a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor {
    pub frame_number: usize,
    /// Line number of the first header line of the frame.
    pub start_line: usize,
    pub atom_count: usize,
    /// Only formats that record a timestep have one.
    pub timestep: Option<i64>,
}

impl FrameDescriptor {
    /// The range of line numbers the frame occupies under `schema`.
    pub fn lines(&self, schema: &FormatSchema) -> std::ops::Range<usize> {
        self.start_line..self.start_line + schema.frame_lines(self.atom_count)
    }
}

/// Anything the index can pull header lines out of.
pub trait LineSource {
    /// Returns the requested lines in ascending order.
    ///
    /// Must fail with [`Error::OutOfRange`] if the source ends before the last requested line.
    fn read_lines(&mut self, requested: &[usize]) -> Result<Vec<(usize, String)>>;
}

impl<R: BufRead + Seek> LineSource for LineCursor<R> {
    fn read_lines(&mut self, requested: &[usize]) -> Result<Vec<(usize, String)>> {
        LineCursor::read_lines(self, requested)
    }
}

impl LineSource for &[String] {
    fn read_lines(&mut self, requested: &[usize]) -> Result<Vec<(usize, String)>> {
        let mut wanted = requested.to_vec();
        wanted.sort_unstable();
        wanted.dedup();
        wanted
            .into_iter()
            .map(|idx| match self.get(idx) {
                Some(text) => Ok((idx, text.clone())),
                None => Err(Error::OutOfRange {
                    requested: idx,
                    available: self.len(),
                }),
            })
            .collect()
    }
}

/// An append-only, ordered list of the frames discovered so far.
///
/// Invariant: `frames[i + 1].start_line == frames[i].start_line + atom_count + header_lines`.
#[derive(Debug, Clone)]
pub struct FrameIndex {
    schema: FormatSchema,
    frames: Vec<FrameDescriptor>,
}

impl FrameIndex {
    pub fn new(schema: FormatSchema) -> Self {
        Self {
            schema,
            frames: Vec::new(),
        }
    }

    pub fn schema(&self) -> &FormatSchema {
        &self.schema
    }

    /// The number of frames discovered so far.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, frame_number: usize) -> Option<&FrameDescriptor> {
        self.frames.get(frame_number)
    }

    pub fn as_slice(&self) -> &[FrameDescriptor] {
        &self.frames
    }

    /// The line at which the first undiscovered frame starts.
    pub fn next_start_line(&self) -> usize {
        match self.frames.last() {
            Some(last) => last.start_line + self.schema.frame_lines(last.atom_count),
            None => 0,
        }
    }

    /// Returns the descriptor of `frame_number`, discovering frames from `source` until it is known.
    ///
    /// Every frame is discovered at most once. Frames that are already known are returned without
    /// touching the source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameNotFound`] if the source is exhausted before the frame is found. The
    /// frames discovered up to that point stay in the index.
    pub fn ensure<S: LineSource + ?Sized>(
        &mut self,
        source: &mut S,
        frame_number: usize,
    ) -> Result<FrameDescriptor> {
        while self.frames.len() <= frame_number {
            if self.discover_next(source)?.is_none() {
                return Err(Error::FrameNotFound(frame_number));
            }
        }
        Ok(self.frames[frame_number])
    }

    /// Discover every remaining frame in `source`, returning the total number of frames.
    pub fn discover_all<S: LineSource + ?Sized>(&mut self, source: &mut S) -> Result<usize> {
        while self.discover_next(source)?.is_some() {}
        Ok(self.frames.len())
    }

    /// Discover the next frame, or return [`None`] when the source has no more frames.
    fn discover_next<S: LineSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<Option<FrameDescriptor>> {
        let start = self.next_start_line();
        let lines = match source.read_lines(&self.schema.descriptor_lines(start)) {
            Ok(lines) => lines,
            Err(Error::OutOfRange { .. }) => return Ok(None),
            Err(err) => return Err(err),
        };
        let line = |offset: usize| {
            lines
                .iter()
                .find(|(idx, _)| *idx == start + offset)
                .map(|(_, text)| text.as_str())
                .unwrap_or_default()
        };

        let timestep = self.schema.timestep_offset.map(&line);
        let atom_count = line(self.schema.atom_count_offset);
        self.push(start, timestep, atom_count).map(Some)
    }

    /// Append the frame at [`Self::next_start_line`] from its complete block of header lines.
    ///
    /// This lets a caller that already holds the header lines of a new frame register it without
    /// asking the source for them a second time.
    pub fn append_from_header(&mut self, header: &[String]) -> Result<FrameDescriptor> {
        let start = self.next_start_line();
        if header.len() < self.schema.header_lines {
            return Err(Error::OutOfRange {
                requested: start + self.schema.header_lines - 1,
                available: start + header.len(),
            });
        }
        let timestep = self.schema.timestep_offset.map(|o| header[o].as_str());
        let atom_count = header[self.schema.atom_count_offset].as_str();
        self.push(start, timestep, atom_count)
    }

    /// Parse and append a descriptor. Nothing is appended if either value fails to parse.
    fn push(
        &mut self,
        start: usize,
        timestep: Option<&str>,
        atom_count: &str,
    ) -> Result<FrameDescriptor> {
        let timestep = match (self.schema.timestep_offset, timestep) {
            (Some(offset), Some(text)) => Some(text.trim().parse::<i64>().map_err(|_| {
                Error::malformed(start + offset, format!("invalid timestep '{text}'"))
            })?),
            _ => None,
        };
        let atom_count = atom_count.trim().parse::<usize>().map_err(|_| {
            Error::malformed(
                start + self.schema.atom_count_offset,
                format!("invalid atom count '{atom_count}'"),
            )
        })?;

        let descriptor = FrameDescriptor {
            frame_number: self.frames.len(),
            start_line: start,
            atom_count,
            timestep,
        };
        debug!(
            frame = descriptor.frame_number,
            start_line = start,
            atom_count,
            ?timestep,
            "discovered frame"
        );
        self.frames.push(descriptor);
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const XYZ: [&str; 8] = [
        "2", "c1", "A 0 0 0", "B 1 1 1", "2", "c2", "A 2 2 2", "B 3 3 3",
    ];

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    fn cursor(text: &[&str]) -> LineCursor<Cursor<Vec<u8>>> {
        LineCursor::new(Cursor::new(text.join("\n").into_bytes()))
    }

    #[test]
    fn point_cloud_in_memory() -> Result<()> {
        let source = lines(&XYZ);
        let mut index = FrameIndex::new(FormatSchema::POINT_CLOUD);
        assert_eq!(index.discover_all(&mut source.as_slice())?, 2);
        assert_eq!(
            index.as_slice(),
            [
                FrameDescriptor {
                    frame_number: 0,
                    start_line: 0,
                    atom_count: 2,
                    timestep: None
                },
                FrameDescriptor {
                    frame_number: 1,
                    start_line: 4,
                    atom_count: 2,
                    timestep: None
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn streaming_matches_in_memory() -> Result<()> {
        let mut memory = FrameIndex::new(FormatSchema::POINT_CLOUD);
        memory.discover_all(&mut lines(&XYZ).as_slice())?;

        let mut streaming = FrameIndex::new(FormatSchema::POINT_CLOUD);
        let mut source = cursor(&XYZ);
        assert_eq!(streaming.ensure(&mut source, 1)?.start_line, 4);
        assert_eq!(streaming.as_slice(), memory.as_slice());
        Ok(())
    }

    #[test]
    fn one_past_the_end() -> Result<()> {
        let mut index = FrameIndex::new(FormatSchema::POINT_CLOUD);
        let mut source = cursor(&XYZ);
        assert!(matches!(
            index.ensure(&mut source, 2),
            Err(Error::FrameNotFound(2))
        ));
        // The frames that were found are kept, and remain accessible.
        assert_eq!(index.len(), 2);
        assert_eq!(index.ensure(&mut source, 0)?.start_line, 0);
        Ok(())
    }

    #[test]
    fn known_frames_do_not_touch_the_source() -> Result<()> {
        let mut index = FrameIndex::new(FormatSchema::POINT_CLOUD);
        let mut source = cursor(&XYZ);
        index.ensure(&mut source, 1)?;
        let consumed = source.lines_consumed();
        index.ensure(&mut source, 1)?;
        index.ensure(&mut source, 0)?;
        assert_eq!(source.lines_consumed(), consumed);
        Ok(())
    }

    #[test]
    fn dump_descriptors() -> Result<()> {
        let mut text = Vec::new();
        for (step, natoms) in [(0, 1), (100, 3), (200, 0)] {
            text.extend([
                "ITEM: TIMESTEP".to_string(),
                format!("{step}"),
                "ITEM: NUMBER OF ATOMS".to_string(),
                format!("{natoms}"),
                "ITEM: BOX BOUNDS pp pp pp".to_string(),
                "0 1".to_string(),
                "0 1".to_string(),
                "0 1".to_string(),
                "ITEM: ATOMS id".to_string(),
            ]);
            text.extend((0..natoms).map(|i| format!("{i}")));
        }

        let mut index = FrameIndex::new(FormatSchema::DUMP);
        assert_eq!(index.discover_all(&mut text.as_slice())?, 3);
        let starts: Vec<_> = index.as_slice().iter().map(|d| d.start_line).collect();
        assert_eq!(starts, [0, 10, 22]);
        let steps: Vec<_> = index.as_slice().iter().map(|d| d.timestep).collect();
        assert_eq!(steps, [Some(0), Some(100), Some(200)]);
        Ok(())
    }

    #[test]
    fn malformed_atom_count_is_not_appended() {
        let source = lines(&["2", "c", "A 0 0 0", "B 0 0 0", "two", "c"]);
        let mut index = FrameIndex::new(FormatSchema::POINT_CLOUD);
        match index.ensure(&mut source.as_slice(), 1) {
            Err(Error::MalformedRecord { line, .. }) => assert_eq!(line, 4),
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn header_block() -> Result<()> {
        let mut index = FrameIndex::new(FormatSchema::POINT_CLOUD);
        let d = index.append_from_header(&lines(&["3", "comment"]))?;
        assert_eq!((d.start_line, d.atom_count), (0, 3));
        assert_eq!(index.next_start_line(), 5);
        assert!(index.append_from_header(&lines(&["3"])).is_err());
        Ok(())
    }
}
