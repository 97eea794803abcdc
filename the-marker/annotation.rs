//! Annotation records as supplied by the surrounding application.
//!
//! Two families of annotations reach the renderer: machine diagnostics
//! produced by analysis tools and user comments or questions. They share the
//! same coordinate fields but use different row numbering, which is captured
//! by [`RowNumbering`] instead of string comparisons at every call site.
use std::{
  cmp::Ordering,
  fmt,
  str::FromStr,
};

use serde::{
  Deserialize,
  Deserializer,
  Serialize,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
  Error,
  Warning,
  Info,
  Annotation,
  Question,
}

/// How the `row` field of a mark maps onto display lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowNumbering {
  /// The first affected display line is `row + 1`.
  ZeroBased,
  /// The first affected display line is `row`.
  OneBased,
}

impl AnnotationKind {
  pub const ALL: [Self; 5] = [
    Self::Error,
    Self::Warning,
    Self::Info,
    Self::Annotation,
    Self::Question,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Error => "error",
      Self::Warning => "warning",
      Self::Info => "info",
      Self::Annotation => "annotation",
      Self::Question => "question",
    }
  }

  pub fn is_machine(self) -> bool {
    matches!(self, Self::Error | Self::Warning | Self::Info)
  }

  pub fn is_user(self) -> bool {
    !self.is_machine()
  }

  pub fn numbering(self) -> RowNumbering {
    if self.is_machine() {
      RowNumbering::ZeroBased
    } else {
      RowNumbering::OneBased
    }
  }

  /// Lower values are shown first when several annotations overlap.
  pub fn priority(self) -> u8 {
    match self {
      Self::Error => 0,
      Self::Warning => 1,
      Self::Info => 2,
      Self::Annotation => 3,
      Self::Question => 4,
    }
  }

  /// Kinds that stay visible when only important annotations are shown.
  pub fn is_important(self) -> bool {
    matches!(self, Self::Error | Self::Annotation | Self::Question)
  }
}

impl fmt::Display for AnnotationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown annotation type '{0}'")]
pub struct ParseKindError(pub String);

impl FromStr for AnnotationKind {
  type Err = ParseKindError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|kind| kind.as_str() == s)
      .ok_or_else(|| ParseKindError(s.to_string()))
  }
}

/// Coordinates shared by everything that can be marked on a code line.
pub trait Markable {
  fn row(&self) -> Option<u32>;
  fn rows(&self) -> Option<u32>;
  fn column(&self) -> Option<i64>;
  fn columns(&self) -> Option<u32>;
  fn numbering(&self) -> RowNumbering;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:      Option<u64>,
  #[serde(rename = "type")]
  pub kind:    AnnotationKind,
  #[serde(default)]
  pub text:    String,
  #[serde(default, deserialize_with = "lenient_count")]
  pub row:     Option<u32>,
  #[serde(default, deserialize_with = "lenient_count")]
  pub rows:    Option<u32>,
  pub column:  Option<i64>,
  #[serde(default, deserialize_with = "lenient_count")]
  pub columns: Option<u32>,
}

/// Integers that do not fit a `u32`, such as negative widths, read as absent.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<i64>::deserialize(deserializer)?;
  Ok(value.and_then(|value| {
    let count = u32::try_from(value).ok();
    if count.is_none() {
      tracing::trace!(value, "ignoring out of range annotation coordinate");
    }
    count
  }))
}

impl Annotation {
  pub fn new(kind: AnnotationKind) -> Self {
    Self {
      id: None,
      kind,
      text: String::new(),
      row: None,
      rows: None,
      column: None,
      columns: None,
    }
  }

  pub fn with_id(mut self, id: u64) -> Self {
    self.id = Some(id);
    self
  }

  pub fn with_text(mut self, text: impl Into<String>) -> Self {
    self.text = text.into();
    self
  }

  pub fn at(mut self, row: u32, rows: u32) -> Self {
    self.row = Some(row);
    self.rows = Some(rows);
    self
  }

  pub fn span(mut self, column: i64, columns: Option<u32>) -> Self {
    self.column = Some(column);
    self.columns = columns;
    self
  }

  pub fn is_hovered(&self, hovered: Option<u64>) -> bool {
    self.id.is_some() && self.id == hovered
  }

  /// User annotations without column information decorate the whole line
  /// rather than a character range. A zero column counts as absent.
  pub fn is_full_line(&self) -> bool {
    self.kind.is_user()
      && self.column.is_none_or(|column| column == 0)
      && self.columns.is_none_or(|columns| columns == 0)
  }
}

impl Markable for Annotation {
  fn row(&self) -> Option<u32> {
    self.row
  }

  fn rows(&self) -> Option<u32> {
    self.rows
  }

  fn column(&self) -> Option<i64> {
    self.column
  }

  fn columns(&self) -> Option<u32> {
    self.columns
  }

  fn numbering(&self) -> RowNumbering {
    self.kind.numbering()
  }
}

/// The range the user is currently selecting, before it becomes an
/// annotation. Rows are one-based display lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedRange {
  pub row:     u32,
  #[serde(default = "default_rows")]
  pub rows:    u32,
  pub column:  Option<i64>,
  pub columns: Option<u32>,
}

fn default_rows() -> u32 {
  1
}

impl SelectedRange {
  pub fn new(row: u32, rows: u32) -> Self {
    Self {
      row,
      rows,
      column: None,
      columns: None,
    }
  }

  pub fn covers(&self, line: usize) -> bool {
    let row = self.row as usize;
    row <= line && row + self.rows as usize > line
  }
}

impl Markable for SelectedRange {
  fn row(&self) -> Option<u32> {
    Some(self.row)
  }

  fn rows(&self) -> Option<u32> {
    Some(self.rows)
  }

  fn column(&self) -> Option<i64> {
    self.column
  }

  fn columns(&self) -> Option<u32> {
    self.columns
  }

  fn numbering(&self) -> RowNumbering {
    RowNumbering::OneBased
  }
}

/// A borrowed handle to anything the renderer can put on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkRef<'a> {
  Annotation(&'a Annotation),
  Selection(&'a SelectedRange),
}

impl<'a> MarkRef<'a> {
  pub fn annotation(self) -> Option<&'a Annotation> {
    match self {
      Self::Annotation(annotation) => Some(annotation),
      Self::Selection(_) => None,
    }
  }

  pub fn kind(self) -> Option<AnnotationKind> {
    self.annotation().map(|annotation| annotation.kind)
  }

  pub fn is_hovered(self, hovered: Option<u64>) -> bool {
    self
      .annotation()
      .is_some_and(|annotation| annotation.is_hovered(hovered))
  }

  fn priority(self) -> u8 {
    self.kind().map_or(u8::MAX, AnnotationKind::priority)
  }
}

impl Markable for MarkRef<'_> {
  fn row(&self) -> Option<u32> {
    match self {
      Self::Annotation(annotation) => annotation.row(),
      Self::Selection(selection) => selection.row(),
    }
  }

  fn rows(&self) -> Option<u32> {
    match self {
      Self::Annotation(annotation) => annotation.rows(),
      Self::Selection(selection) => selection.rows(),
    }
  }

  fn column(&self) -> Option<i64> {
    match self {
      Self::Annotation(annotation) => annotation.column(),
      Self::Selection(selection) => selection.column(),
    }
  }

  fn columns(&self) -> Option<u32> {
    match self {
      Self::Annotation(annotation) => annotation.columns(),
      Self::Selection(selection) => selection.columns(),
    }
  }

  fn numbering(&self) -> RowNumbering {
    match self {
      Self::Annotation(annotation) => annotation.numbering(),
      Self::Selection(selection) => selection.numbering(),
    }
  }
}

/// Hovered marks first, then by kind priority. The selection sorts last.
/// Equal marks keep their relative order when used with a stable sort.
pub fn compare_display_order(a: MarkRef<'_>, b: MarkRef<'_>, hovered: Option<u64>) -> Ordering {
  b.is_hovered(hovered)
    .cmp(&a.is_hovered(hovered))
    .then_with(|| a.priority().cmp(&b.priority()))
}
