//! Merging of overlapping projected ranges into a partition of the line.
//!
//! Every character position of a line is tagged with the sources of the
//! ranges covering it, in the order the ranges were supplied. Runs of
//! positions with identical tags collapse into one [`MergedRange`]. Zero-width
//! ranges are insertion points: they are emitted as separate entries before
//! the run starting at their position and always break a run.
use std::mem;

use serde::Serialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::projection::ProjectedRange;

/// Sources covering a merged range, in insertion order.
pub type Indexes = SmallVec<[usize; 4]>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedRange {
  pub start:   usize,
  pub length:  usize,
  pub indexes: Indexes,
}

impl MergedRange {
  pub fn end(&self) -> usize {
    self.start.saturating_add(self.length)
  }

  pub fn is_empty(&self) -> bool {
    self.length == 0
  }

  pub fn is_marked(&self) -> bool {
    !self.indexes.is_empty()
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("range {start}..{end} exceeds line length {line_len}")]
  OutOfBounds {
    start:    usize,
    end:      usize,
    line_len: usize,
  },
  #[error("range starting at {start} overlaps the previous range ending at {covered}")]
  Overlap { start: usize, covered: usize },
  #[error("gap between {covered} and {start}")]
  Gap { start: usize, covered: usize },
  #[error("ranges cover {covered} of {line_len} characters")]
  Incomplete { covered: usize, line_len: usize },
}

/// Merges `ranges` on a line of `line_len` characters.
///
/// The non-empty results partition `0..line_len`. Two positions are only
/// merged when their source lists are equal element by element, so the same
/// set of sources added in a different order yields separate ranges.
///
/// Ranges reaching past the end of the line are clipped.
pub fn merge_ranges(line_len: usize, ranges: &[ProjectedRange]) -> Vec<MergedRange> {
  let mut coverage = vec![Indexes::new(); line_len];
  let mut zero_width = vec![Indexes::new(); line_len + 1];

  for range in ranges {
    if range.is_empty() {
      if range.start > line_len {
        tracing::trace!(
          start = range.start,
          line_len,
          "moving zero-width range to line end"
        );
      }
      zero_width[range.start.min(line_len)].push(range.source);
      continue;
    }

    let end = range.end().min(line_len);
    if end != range.end() {
      tracing::trace!(
        start = range.start,
        end = range.end(),
        line_len,
        "clipping range to line end"
      );
    }
    for position in range.start..end {
      coverage[position].push(range.source);
    }
  }

  let mut merged = Vec::new();
  let mut i = 0;
  while i < line_len {
    if !zero_width[i].is_empty() {
      merged.push(MergedRange {
        start:   i,
        length:  0,
        indexes: mem::take(&mut zero_width[i]),
      });
    }

    let mut j = 1;
    while i + j < line_len && coverage[i + j] == coverage[i] && zero_width[i + j].is_empty() {
      j += 1;
    }
    merged.push(MergedRange {
      start:   i,
      length:  j,
      indexes: mem::take(&mut coverage[i]),
    });
    i += j;
  }

  if !zero_width[line_len].is_empty() {
    merged.push(MergedRange {
      start:   line_len,
      length:  0,
      indexes: mem::take(&mut zero_width[line_len]),
    });
  }

  merged
}

/// Verifies that `merged` is sorted, stays inside the line and that its
/// non-empty entries cover `0..line_len` exactly once. Empty entries must
/// sit at the start of the following range or at the end of the line.
pub fn check_partition(line_len: usize, merged: &[MergedRange]) -> Result<(), Error> {
  let mut covered = 0;
  for range in merged {
    if range.end() > line_len {
      return Err(Error::OutOfBounds {
        start: range.start,
        end: range.end(),
        line_len,
      });
    }
    if range.start < covered {
      return Err(Error::Overlap {
        start: range.start,
        covered,
      });
    }
    if range.start > covered {
      return Err(Error::Gap {
        start: range.start,
        covered,
      });
    }
    covered = range.end();
  }

  if covered != line_len {
    return Err(Error::Incomplete { covered, line_len });
  }
  Ok(())
}
