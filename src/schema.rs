use std::path::Path;

/// A static description of how a trajectory dialect lays out the header of each frame.
///
/// All offsets are counted in lines from the first line of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSchema {
    pub name: &'static str,
    /// The number of lines preceding the per-atom data of every frame.
    pub header_lines: usize,
    pub timestep_offset: Option<usize>,
    pub atom_count_offset: usize,
    /// Offset of a free-form comment line.
    pub comment_offset: Option<usize>,
    /// Offset of the first of three box bound lines, one `lo hi` pair per axis.
    pub box_offset: Option<usize>,
    /// Offset of the line holding the column names, following two marker tokens.
    pub columns_offset: Option<usize>,
    /// Column names for formats that do not carry them in the header.
    pub default_columns: &'static [&'static str],
    /// A non-numeric leading data column, such as the element name in xyz files.
    pub label_column: Option<usize>,
}

impl FormatSchema {
    /// The xyz point cloud: an atom count line, a comment line, then `type x y z` per atom.
    pub const POINT_CLOUD: Self = Self {
        name: "xyz",
        header_lines: 2,
        timestep_offset: None,
        atom_count_offset: 0,
        comment_offset: Some(1),
        box_offset: None,
        columns_offset: None,
        default_columns: &["x", "y", "z"],
        label_column: Some(0),
    };

    /// The LAMMPS dump: nine header lines delimited by `ITEM:` markers.
    pub const DUMP: Self = Self {
        name: "lammpstrj",
        header_lines: 9,
        timestep_offset: Some(1),
        atom_count_offset: 3,
        comment_offset: None,
        box_offset: Some(5),
        columns_offset: Some(8),
        default_columns: &[],
        label_column: None,
    };

    pub const BOX_MARKER: &'static str = "ITEM: BOX BOUNDS";
    pub const COLUMNS_MARKER: &'static str = "ITEM: ATOMS";

    /// Guess the schema from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xyz" => Some(Self::POINT_CLOUD),
            "lammpstrj" | "dump" => Some(Self::DUMP),
            _ => None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        Self::from_extension(ext)
    }

    /// Returns the total number of lines a frame with `atom_count` atoms occupies.
    pub const fn frame_lines(&self, atom_count: usize) -> usize {
        self.header_lines + atom_count
    }

    /// The header line numbers the index needs to describe the frame starting at `start`.
    ///
    /// These are returned in ascending order.
    pub fn descriptor_lines(&self, start: usize) -> Vec<usize> {
        let mut lines = vec![start + self.atom_count_offset];
        if let Some(offset) = self.timestep_offset {
            lines.push(start + offset);
        }
        lines.sort_unstable();
        lines
    }
}
