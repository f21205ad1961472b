use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

use crate::cursor::LineCursor;
use crate::error::{Error, Result};
use crate::frame::FrameView;
use crate::index::{FrameDescriptor, FrameIndex};
use crate::schema::FormatSchema;

/// Reads the whole trajectory into memory and indexes every frame up front.
#[derive(Debug, Clone)]
pub struct BufferedReader {
    lines: Vec<String>,
    index: FrameIndex,
}

impl BufferedReader {
    pub fn open<P: AsRef<Path>>(path: P, schema: FormatSchema) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(file, schema)
    }

    /// Read all lines from `reader` and build the complete frame index in one pass.
    ///
    /// # Errors
    ///
    /// Fails if any frame header is malformed, since the whole index is built here.
    pub fn new<R: Read>(reader: R, schema: FormatSchema) -> Result<Self> {
        let lines = BufReader::new(reader)
            .lines()
            .collect::<std::io::Result<Vec<_>>>()?;
        let mut index = FrameIndex::new(schema);
        index.discover_all(&mut lines.as_slice())?;
        Ok(Self { lines, index })
    }

    pub fn schema(&self) -> &FormatSchema {
        self.index.schema()
    }

    pub fn index(&self) -> &FrameIndex {
        &self.index
    }

    /// The number of lines in the trajectory.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn ensure(&self, frame_number: usize) -> Result<FrameDescriptor> {
        self.index
            .get(frame_number)
            .copied()
            .ok_or(Error::FrameNotFound(frame_number))
    }

    pub fn select(&self, frame_number: usize) -> Result<FrameView<'_>> {
        let descriptor = self.ensure(frame_number)?;
        let range = descriptor.lines(self.schema());
        let lines = self.lines.get(range.clone()).ok_or(Error::OutOfRange {
            requested: range.end - 1,
            available: self.lines.len(),
        })?;
        Ok(FrameView::new(*self.schema(), descriptor, lines))
    }
}

/// Reads frames on demand, holding only the lines of the selected frame in memory.
///
/// Frames are discovered lazily as they are asked for. Moving forward through the trajectory
/// reads every line once. Selecting a frame that lies before the current position rescans the
/// source from its start.
#[derive(Debug)]
pub struct StreamingReader<R> {
    cursor: LineCursor<R>,
    index: FrameIndex,
    /// Lines of the selected frame.
    block: Vec<String>,
    selected: Option<usize>,
}

impl StreamingReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P, schema: FormatSchema) -> Result<Self> {
        let cursor = LineCursor::open(path)?;
        Ok(Self::with_cursor(cursor, schema))
    }
}

impl<R: BufRead + Seek> StreamingReader<R> {
    pub fn new(reader: R, schema: FormatSchema) -> Self {
        Self::with_cursor(LineCursor::new(reader), schema)
    }

    fn with_cursor(cursor: LineCursor<R>, schema: FormatSchema) -> Self {
        Self {
            cursor,
            index: FrameIndex::new(schema),
            block: Vec::new(),
            selected: None,
        }
    }

    pub fn schema(&self) -> &FormatSchema {
        self.index.schema()
    }

    pub fn index(&self) -> &FrameIndex {
        &self.index
    }

    pub fn cursor(&self) -> &LineCursor<R> {
        &self.cursor
    }

    pub fn ensure(&mut self, frame_number: usize) -> Result<FrameDescriptor> {
        self.index.ensure(&mut self.cursor, frame_number)
    }

    /// Discover all remaining frames, leaving the cursor at the end of the source.
    pub fn discover_all(&mut self) -> Result<usize> {
        self.index.discover_all(&mut self.cursor)
    }

    /// Move the cursor back to the start of the source.
    pub fn home(&mut self) -> Result<()> {
        self.cursor.rewind()
    }

    pub fn select(&mut self, frame_number: usize) -> Result<FrameView<'_>> {
        if self.selected != Some(frame_number) {
            self.selected = None;
            self.block = self.load(frame_number)?;
            self.selected = Some(frame_number);
        }
        let descriptor = self.index.as_slice()[frame_number];
        Ok(FrameView::new(*self.schema(), descriptor, &self.block))
    }

    fn load(&mut self, frame_number: usize) -> Result<Vec<String>> {
        let schema = *self.schema();
        if let Some(descriptor) = self.index.get(frame_number) {
            let range = descriptor.lines(&schema);
            return self.cursor.read_range(range);
        }

        // Discover everything before the frame, then read its header in the same pass as its
        // atom lines. Going through `ensure` for the frame itself would leave the cursor in the
        // middle of its header.
        if let Some(previous) = frame_number.checked_sub(1) {
            self.index
                .ensure(&mut self.cursor, previous)
                .map_err(|err| match err {
                    Error::FrameNotFound(_) => Error::FrameNotFound(frame_number),
                    err => err,
                })?;
        }
        let start = self.index.next_start_line();
        let mut block = match self.cursor.read_range(start..start + schema.header_lines) {
            Ok(header) => header,
            // A header cut short may still carry enough lines to index the frame. If it does,
            // the frame exists but cannot be read.
            Err(err @ Error::OutOfRange { .. }) => {
                return Err(match self.index.ensure(&mut self.cursor, frame_number) {
                    Ok(_) => err,
                    Err(other) => other,
                });
            }
            Err(err) => return Err(err),
        };
        let descriptor = self.index.append_from_header(&block)?;
        let range = descriptor.lines(&schema);
        block.extend(self.cursor.read_range(start + schema.header_lines..range.end)?);
        Ok(block)
    }
}
