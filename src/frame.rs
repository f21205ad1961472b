use glam::DVec3;

use crate::error::{Error, Result};
use crate::index::FrameDescriptor;
use crate::schema::FormatSchema;

/// The simulation cell of a frame, as lower and upper bounds per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub lo: DVec3,
    pub hi: DVec3,
}

impl Cell {
    /// Returns `[[xlo, xhi], [ylo, yhi], [zlo, zhi]]`.
    pub fn bounds(&self) -> [[f64; 2]; 3] {
        [
            [self.lo.x, self.hi.x],
            [self.lo.y, self.hi.y],
            [self.lo.z, self.hi.z],
        ]
    }

    pub fn lengths(&self) -> DVec3 {
        self.hi - self.lo
    }
}

/// A dense row-major matrix of per-atom values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix {
    ncols: usize,
    values: Vec<f64>,
}

impl Matrix {
    /// Build a matrix from row-major `values`.
    ///
    /// # Panics
    ///
    /// Panics if the length of `values` is not a multiple of `ncols`.
    pub fn from_rows(ncols: usize, values: Vec<f64>) -> Self {
        assert!(
            (ncols > 0 && values.len() % ncols == 0) || values.is_empty(),
            "number of values ({}) must be divisible by the number of columns ({ncols})",
            values.len()
        );
        Self { ncols, values }
    }

    /// Returns `(nrows, ncols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols)
    }

    pub fn nrows(&self) -> usize {
        match self.ncols {
            0 => 0,
            n => self.values.len() / n,
        }
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn row(&self, idx: usize) -> Option<&[f64]> {
        let start = idx.checked_mul(self.ncols)?;
        self.values.get(start..start + self.ncols)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.ncols.max(1))
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = f64> + '_ {
        let ncols = self.ncols;
        self.values
            .iter()
            .skip(idx)
            .step_by(ncols.max(1))
            .copied()
            .take(if idx < ncols { self.nrows() } else { 0 })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }
}

/// Column names paired with their data, the form in which frames are handed to analysis code.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub data: Matrix,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = f64> + '_> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.data.column(idx))
    }
}

/// A view into the raw lines of one frame.
///
/// The lines start at the first header line of the frame and include all of its atom lines.
/// Nothing is parsed until one of the accessors asks for it.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    schema: FormatSchema,
    descriptor: FrameDescriptor,
    lines: &'a [String],
}

impl<'a> FrameView<'a> {
    pub(crate) fn new(
        schema: FormatSchema,
        descriptor: FrameDescriptor,
        lines: &'a [String],
    ) -> Self {
        debug_assert_eq!(lines.len(), schema.frame_lines(descriptor.atom_count));
        Self {
            schema,
            descriptor,
            lines,
        }
    }

    pub fn descriptor(&self) -> &FrameDescriptor {
        &self.descriptor
    }

    pub fn frame_number(&self) -> usize {
        self.descriptor.frame_number
    }

    pub fn timestep(&self) -> Option<i64> {
        self.descriptor.timestep
    }

    pub fn atom_count(&self) -> usize {
        self.descriptor.atom_count
    }

    pub fn schema(&self) -> &FormatSchema {
        &self.schema
    }

    /// All lines of the frame, header included.
    pub fn raw_lines(&self) -> &'a [String] {
        self.lines
    }

    /// The per-atom lines following the header.
    pub fn atom_lines(&self) -> &'a [String] {
        &self.lines[self.schema.header_lines..]
    }

    /// Absolute line number of a line at `offset` within this frame.
    fn line_number(&self, offset: usize) -> usize {
        self.descriptor.start_line + offset
    }

    /// The tokens of the comment line, for formats that have one.
    pub fn comment(&self) -> Option<Vec<&'a str>> {
        let offset = self.schema.comment_offset?;
        Some(self.lines[offset].split_whitespace().collect())
    }

    /// The names of the data columns.
    ///
    /// For formats that name their columns in the header, the two leading marker tokens are
    /// dropped.
    pub fn columns(&self) -> Result<Vec<String>> {
        let Some(offset) = self.schema.columns_offset else {
            return Ok(self
                .schema
                .default_columns
                .iter()
                .map(|c| c.to_string())
                .collect());
        };

        let line = &self.lines[offset];
        if !line.starts_with(FormatSchema::COLUMNS_MARKER) {
            return Err(Error::mismatch(
                self.line_number(offset),
                format!("a '{}' column header", FormatSchema::COLUMNS_MARKER),
            ));
        }
        let columns: Vec<String> = line.split_whitespace().skip(2).map(String::from).collect();
        if columns.is_empty() {
            return Err(Error::mismatch(
                self.line_number(offset),
                "at least one column name",
            ));
        }
        Ok(columns)
    }

    /// The box bounds of this frame, or [`None`] if the format does not record them.
    pub fn cell(&self) -> Result<Option<Cell>> {
        let Some(offset) = self.schema.box_offset else {
            return Ok(None);
        };

        let marker = offset - 1;
        if !self.lines[marker].starts_with(FormatSchema::BOX_MARKER) {
            return Err(Error::mismatch(
                self.line_number(marker),
                format!("a '{}' header", FormatSchema::BOX_MARKER),
            ));
        }

        let mut bounds = [[0.0; 2]; 3];
        for (axis, pair) in bounds.iter_mut().enumerate() {
            let n = self.line_number(offset + axis);
            let tokens: Vec<&str> = self.lines[offset + axis].split_whitespace().collect();
            // Triclinic boxes carry a trailing tilt factor, which we do not use.
            if !(2..=3).contains(&tokens.len()) {
                return Err(Error::malformed(
                    n,
                    format!("expected a 'lo hi' pair, found {} tokens", tokens.len()),
                ));
            }
            for (value, token) in pair.iter_mut().zip(&tokens) {
                *value = parse_f64(token, n)?;
            }
        }

        Ok(Some(Cell {
            lo: DVec3::new(bounds[0][0], bounds[1][0], bounds[2][0]),
            hi: DVec3::new(bounds[0][1], bounds[1][1], bounds[2][1]),
        }))
    }

    /// Parse the atom lines into a matrix of shape `(atom_count, number of columns)`.
    ///
    /// A label column, such as the element name of an xyz file, is not part of the matrix.
    ///
    /// # Errors
    ///
    /// Any atom line with the wrong number of tokens, or with a token that is not a number, is
    /// reported as [`Error::MalformedRecord`].
    pub fn data(&self) -> Result<Matrix> {
        let ncols = self.columns()?.len();
        let ntokens = ncols + usize::from(self.schema.label_column.is_some());

        let mut values = Vec::with_capacity(self.atom_count() * ncols);
        for (i, line) in self.atom_lines().iter().enumerate() {
            let n = self.line_number(self.schema.header_lines + i);
            let before = values.len();
            for (col, token) in line.split_whitespace().enumerate() {
                if col >= ntokens {
                    break;
                }
                if Some(col) != self.schema.label_column {
                    values.push(parse_f64(token, n)?);
                }
            }
            let found = line.split_whitespace().count();
            if found != ntokens || values.len() - before != ncols {
                return Err(Error::malformed(
                    n,
                    format!("expected {ntokens} fields, found {found}"),
                ));
            }
        }

        Ok(Matrix::from_rows(ncols, values))
    }

    /// Column names together with the data matrix.
    pub fn table(&self) -> Result<Table> {
        Ok(Table {
            columns: self.columns()?,
            data: self.data()?,
        })
    }

    /// The type of each atom.
    ///
    /// This is the label column where the format has one, and the `type` column otherwise.
    pub fn atom_types(&self) -> Result<Vec<&'a str>> {
        let column = match self.schema.label_column {
            Some(column) => column,
            None => {
                let columns = self.columns()?;
                columns.iter().position(|c| c == "type").ok_or_else(|| {
                    Error::mismatch(
                        self.line_number(self.schema.columns_offset.unwrap_or_default()),
                        "a 'type' column",
                    )
                })?
            }
        };

        self.atom_lines()
            .iter()
            .enumerate()
            .map(|(i, line)| {
                line.split_whitespace().nth(column).ok_or_else(|| {
                    Error::malformed(
                        self.line_number(self.schema.header_lines + i),
                        format!("missing type in column {column}"),
                    )
                })
            })
            .collect()
    }

    /// The position of each atom.
    ///
    /// Dumps are searched for wrapped (`x y z`), unwrapped (`xu yu zu`) or scaled (`xs ys zs`)
    /// coordinates, in that order.
    pub fn positions(&self) -> Result<Vec<DVec3>> {
        let table = self.table()?;
        let xyz = [["x", "y", "z"], ["xu", "yu", "zu"], ["xs", "ys", "zs"]]
            .iter()
            .find_map(|names| {
                let find = |name: &str| table.columns.iter().position(|c| c == name);
                Some([find(names[0])?, find(names[1])?, find(names[2])?])
            })
            .ok_or_else(|| {
                Error::mismatch(
                    self.line_number(self.schema.columns_offset.unwrap_or_default()),
                    "x, y and z coordinate columns",
                )
            })?;

        Ok(table
            .data
            .rows()
            .map(|row| DVec3::new(row[xyz[0]], row[xyz[1]], row[xyz[2]]))
            .collect())
    }

    /// Copy the lines of this view into an owned [`Frame`].
    pub fn to_frame(&self) -> Frame {
        Frame {
            schema: self.schema,
            descriptor: self.descriptor,
            lines: self.lines.to_vec(),
        }
    }
}

/// An owned frame, detached from the reader it came from.
#[derive(Debug, Clone)]
pub struct Frame {
    schema: FormatSchema,
    descriptor: FrameDescriptor,
    lines: Vec<String>,
}

impl Frame {
    pub fn view(&self) -> FrameView<'_> {
        FrameView::new(self.schema, self.descriptor, &self.lines)
    }

    pub fn descriptor(&self) -> &FrameDescriptor {
        &self.descriptor
    }
}

fn parse_f64(token: &str, line: usize) -> Result<f64> {
    token
        .parse()
        .map_err(|_| Error::malformed(line, format!("'{token}' is not a number")))
}
