use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::ops::Range;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// A forward-biased sequential line reader.
///
/// The cursor only ever moves forward through its source. Asking for a line behind it forces a
/// rewind to the start of the stream and a rescan, which costs a pass over everything up to the
/// requested line. The single most recently produced line is remembered, so asking for it again
/// right away is free.
#[derive(Debug)]
pub struct LineCursor<R> {
    reader: R,
    /// Index of the next unread line.
    current_line: usize,
    last_line: Option<(usize, String)>,
    /// Total number of lines pulled from the source, including rescans.
    consumed: u64,
    buf: String,
}

impl LineCursor<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead + Seek> LineCursor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            current_line: 0,
            last_line: None,
            consumed: 0,
            buf: String::new(),
        }
    }

    /// Index of the next line this cursor will read from its source.
    pub fn current_line(&self) -> usize {
        self.current_line
    }

    /// The number of lines read from the source so far, counting every rescan.
    pub fn lines_consumed(&self) -> u64 {
        self.consumed
    }

    /// Seek back to the start of the stream.
    pub fn rewind(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.current_line = 0;
        Ok(())
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read the requested lines, returned in ascending order of their line numbers.
    ///
    /// # Errors
    ///
    /// If the source ends before the highest requested line, [`Error::OutOfRange`] is returned
    /// and the lines that were found along the way are dropped.
    pub fn read_lines(&mut self, requested: &[usize]) -> Result<Vec<(usize, String)>> {
        let mut wanted = requested.to_vec();
        wanted.sort_unstable();
        wanted.dedup();
        let (Some(&first), Some(&last)) = (wanted.first(), wanted.last()) else {
            return Ok(Vec::new());
        };

        let mut lines = Vec::with_capacity(wanted.len());
        self.scan(
            first,
            last,
            |idx| wanted.binary_search(&idx).is_ok(),
            |idx, text| lines.push((idx, text)),
        )?;
        Ok(lines)
    }

    /// Read every line in `range`.
    pub fn read_range(&mut self, range: Range<usize>) -> Result<Vec<String>> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let mut lines = Vec::with_capacity(range.len());
        self.scan(range.start, range.end - 1, |_| true, |_, text| lines.push(text))?;
        Ok(lines)
    }

    fn scan(
        &mut self,
        first: usize,
        last: usize,
        keep: impl Fn(usize) -> bool,
        mut emit: impl FnMut(usize, String),
    ) -> Result<()> {
        if first < self.current_line {
            match &self.last_line {
                // The first line we want is the one we just produced.
                Some((idx, text)) if *idx == first && first + 1 == self.current_line => {
                    emit(first, text.clone());
                    if last == first {
                        return Ok(());
                    }
                }
                _ => {
                    debug!(
                        first,
                        current_line = self.current_line,
                        "rewinding line cursor to rescan from the start"
                    );
                    self.rewind()?;
                }
            }
        }

        while self.current_line <= last {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Err(Error::OutOfRange {
                    requested: last,
                    available: self.current_line,
                });
            }
            self.consumed += 1;

            let idx = self.current_line;
            self.current_line += 1;
            if idx < first || !keep(idx) {
                continue;
            }

            let text = self.buf.trim_end_matches(&['\n', '\r'][..]).to_string();
            if idx == last {
                self.last_line = Some((idx, text.clone()));
            }
            emit(idx, text);
        }

        Ok(())
    }
}
