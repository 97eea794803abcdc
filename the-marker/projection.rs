//! Projection of (possibly multi-line) marks onto a single display line.
//!
//! Display lines are one-based. A mark whose row is absent or zero maps to
//! line 0, which never corresponds to a code line.
use serde::Serialize;

use crate::annotation::{
  Markable,
  RowNumbering,
};

/// The character span a single mark contributes to one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectedRange {
  pub start:  usize,
  pub length: usize,
  /// Index of the mark in the list the caller projected.
  pub source: usize,
}

impl ProjectedRange {
  pub fn end(&self) -> usize {
    self.start.saturating_add(self.length)
  }

  pub fn is_empty(&self) -> bool {
    self.length == 0
  }
}

/// First and last display line touched by `mark`.
///
/// One-based marks are shifted up by one line, so a mark without a row ends
/// up on line `-1` instead of `0`. Neither matches a real code line.
pub fn affected_lines<M: Markable + ?Sized>(mark: &M) -> (i64, i64) {
  let rows = i64::from(mark.rows().unwrap_or(1));
  let (mut first, mut last) = match mark.row() {
    Some(row) if row != 0 => {
      let row = i64::from(row);
      (row + 1, row + rows)
    },
    _ => (0, 0),
  };

  if mark.numbering() == RowNumbering::OneBased {
    first -= 1;
    last -= 1;
  }
  (first, last)
}

/// The column of `mark` if it lies inside a line of `line_len` characters.
pub fn valid_column<M: Markable + ?Sized>(mark: &M, line_len: usize) -> Option<usize> {
  let column = mark.column()?;
  usize::try_from(column)
    .ok()
    .filter(|&column| column < line_len)
}

/// Computes the range `mark` covers on display line `line`.
///
/// Lines strictly between the first and last affected line are covered
/// completely. On the first line the range starts at the column; on the last
/// line it is `columns` wide, or zero wide for machine marks and the rest of
/// the line for user marks when no width is given. Out of bounds columns are
/// ignored.
pub fn project<M: Markable + ?Sized>(
  mark: &M,
  line: usize,
  line_len: usize,
  source: usize,
) -> ProjectedRange {
  let (first, last) = affected_lines(mark);
  let line = i64::try_from(line).unwrap_or(i64::MAX);
  let column = valid_column(mark, line_len);
  if column.is_none() && mark.column().is_some() {
    tracing::trace!(
      column = ?mark.column(),
      line_len,
      "ignoring out of bounds annotation column"
    );
  }

  let start = if line == first { column.unwrap_or(0) } else { 0 };
  let available = line_len - start;

  let mut length = available;
  if line == last && column.is_some() {
    length = match (mark.columns(), mark.numbering()) {
      (Some(columns), _) => columns as usize,
      (None, RowNumbering::ZeroBased) => 0,
      (None, RowNumbering::OneBased) => available,
    };
  }

  if length > available {
    tracing::trace!(length, available, "clamping annotation width to line end");
    length = available;
  }

  ProjectedRange {
    start,
    length,
    source,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::annotation::{
    Annotation,
    AnnotationKind,
    SelectedRange,
  };

  fn machine(row: u32, rows: u32) -> Annotation {
    Annotation::new(AnnotationKind::Error).at(row, rows)
  }

  fn user(row: u32, rows: u32) -> Annotation {
    Annotation::new(AnnotationKind::Annotation).at(row, rows)
  }

  fn span(range: ProjectedRange) -> (usize, usize) {
    (range.start, range.length)
  }

  #[test]
  fn single_line_machine_annotation() {
    let annotation = machine(5, 1).span(3, Some(4));
    assert_eq!(affected_lines(&annotation), (6, 6));
    assert_eq!(span(project(&annotation, 6, 20, 0)), (3, 4));
  }

  #[test]
  fn multi_line_middle_is_fully_covered() {
    let annotation = machine(2, 3).span(5, Some(2));
    assert_eq!(affected_lines(&annotation), (3, 5));
    assert_eq!(span(project(&annotation, 4, 12, 0)), (0, 12));
    assert_eq!(span(project(&annotation, 3, 12, 0)), (5, 7));
    assert_eq!(span(project(&annotation, 5, 12, 0)), (0, 2));
  }

  #[test]
  fn multi_line_without_column_covers_first_line() {
    let annotation = machine(2, 3);
    assert_eq!(span(project(&annotation, 3, 9, 0)), (0, 9));
  }

  #[test]
  fn out_of_bounds_column_is_ignored() {
    let annotation = machine(4, 1).span(9999, Some(2));
    assert_eq!(span(project(&annotation, 5, 10, 0)), (0, 10));

    let negative = machine(4, 1).span(-1, Some(2));
    assert_eq!(span(project(&negative, 5, 10, 0)), (0, 10));
  }

  #[test]
  fn column_at_line_end_is_out_of_bounds() {
    let annotation = machine(4, 1).span(10, None);
    assert_eq!(span(project(&annotation, 5, 10, 0)), (0, 10));
  }

  #[test]
  fn machine_default_width_is_zero() {
    let annotation = machine(1, 1).span(4, None);
    assert_eq!(span(project(&annotation, 2, 10, 0)), (4, 0));
  }

  #[test]
  fn user_default_width_is_rest_of_line() {
    let annotation = user(2, 1).span(4, None);
    assert_eq!(affected_lines(&annotation), (2, 2));
    assert_eq!(span(project(&annotation, 2, 10, 0)), (4, 6));
  }

  #[test]
  fn explicit_zero_width_is_kept() {
    let annotation = user(2, 1).span(4, Some(0));
    assert_eq!(span(project(&annotation, 2, 10, 0)), (4, 0));
  }

  #[test]
  fn width_is_clamped_to_line_end() {
    let annotation = machine(1, 1).span(6, Some(40));
    assert_eq!(span(project(&annotation, 2, 10, 0)), (6, 4));
  }

  #[test]
  fn row_zero_is_treated_as_no_row() {
    let annotation = machine(0, 2).span(1, Some(1));
    assert_eq!(affected_lines(&annotation), (0, 0));
    assert_eq!(span(project(&annotation, 1, 10, 0)), (0, 10));

    let global = Annotation::new(AnnotationKind::Question);
    assert_eq!(affected_lines(&global), (-1, -1));
  }

  #[test]
  fn last_line_uses_columns_even_when_not_first() {
    let annotation = user(3, 2).span(6, Some(3));
    assert_eq!(affected_lines(&annotation), (3, 4));
    assert_eq!(span(project(&annotation, 4, 10, 0)), (0, 3));
  }

  #[test]
  fn empty_line_projects_to_zero_width() {
    let annotation = user(3, 1).span(0, Some(4));
    assert_eq!(span(project(&annotation, 3, 0, 0)), (0, 0));
  }

  #[test]
  fn selection_uses_one_based_rows() {
    let selection = SelectedRange {
      column: Some(2),
      columns: Some(3),
      ..SelectedRange::new(7, 1)
    };
    assert_eq!(affected_lines(&selection), (7, 7));
    assert_eq!(span(project(&selection, 7, 10, 3)), (2, 3));
    assert_eq!(project(&selection, 7, 10, 3).source, 3);
  }
}
