use std::num::{NonZeroU64, ParseIntError};
use std::str::FromStr;

/// A selection of frames to be read from a [`TrajectoryReader`](super::TrajectoryReader).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum FrameSelection {
    /// Include all frames that are in a trajectory.
    #[default]
    All,
    /// Include frames that lie within a certain [`Range`].
    Range(Range),
    /// Include frames that match the indices in this list.
    ///
    /// Invariant: The indices in the FrameList are _unique_ and _sorted_.
    FrameList(Vec<usize>),
}

impl FrameSelection {
    /// Build a frame list, sorting and deduplicating the indices to uphold its invariant.
    pub fn from_frame_list(mut indices: Vec<usize>) -> Self {
        indices.sort_unstable();
        indices.dedup();
        Self::FrameList(indices)
    }

    /// Determine whether some index `idx` is included in this [`FrameSelection`].
    ///
    /// Will return [`None`] once the index is beyond the scope of this `FrameSelection`.
    pub fn is_included(&self, idx: usize) -> Option<bool> {
        match self {
            FrameSelection::All => Some(true),
            FrameSelection::Range(range) => range.is_included(idx as u64),
            FrameSelection::FrameList(indices) => {
                if *indices.last()? < idx {
                    None
                } else {
                    Some(indices.binary_search(&idx).is_ok())
                }
            }
        }
    }

    /// The exclusive upper bound of this selection, if it has one.
    pub fn until(&self) -> Option<usize> {
        match self {
            FrameSelection::All => None,
            FrameSelection::Range(range) => range.end.map(|end| end as usize),
            FrameSelection::FrameList(list) => Some(list.last().map_or(0, |&last| last + 1)),
        }
    }
}

/// Parses `start:stop:step`, where each of the values is optional.
///
/// - `:100` selects the first 100 frames.
/// - `3:14` selects the 4th up to and including the 14th frame, 11 frames in total.
/// - `:100:2` selects every second frame from the first 100 frames, 50 in total.
impl FromStr for FrameSelection {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut components = s.split(':');
        let mut next = || components.next().filter(|c| !c.is_empty());
        let start = next().map(str::parse).transpose()?;
        let end = next().map(str::parse).transpose()?;
        let step = next().map(NonZeroU64::from_str).transpose()?;
        Ok(FrameSelection::Range(Range::new(start, end, step)))
    }
}

/// A range of frames.
///
/// The `start` of a [`Range`] is always bounded, and is zero by default.
/// The `end` may be bounded or unbounded. In case the end is unbounded ([`None`]), the range
/// extends up to and including the last frame. If it is bounded by [`Some`] value, it is an
/// exclusive bound.
/// The `step` describes the number of frames that passed in each stride.
/// For instance, given a `step` of four, one frame is read and the following three are skipped.
///
/// # Note
///
/// An instance where `start` > `end` is a valid `Range`, but it will select zero frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: u64,
    pub end: Option<u64>,
    pub step: NonZeroU64,
}

impl Range {
    pub fn new(start: Option<u64>, end: Option<u64>, step: Option<NonZeroU64>) -> Self {
        let mut sel = Self {
            end,
            ..Self::default()
        };
        if let Some(start) = start {
            sel.start = start;
        }
        if let Some(step) = step {
            sel.step = step;
        }
        sel
    }

    fn is_included(&self, idx: u64) -> Option<bool> {
        if let Some(end) = self.end {
            // Determine whether `idx` is already beyond the defined range.
            if end <= idx {
                return None;
            }
        }
        if idx < self.start {
            return Some(false);
        }
        Some((idx - self.start) % self.step == 0)
    }
}

impl Default for Range {
    fn default() -> Self {
        Self {
            start: 0,
            end: None,
            step: NonZeroU64::MIN,
        }
    }
}
