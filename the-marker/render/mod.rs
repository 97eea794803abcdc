//! Rendering of annotated code lines into layered segments.
//!
//! Every layer runs the same pipeline: project each mark onto the line,
//! merge the projections and slice the line text along the merged ranges.
//! Layers only differ in which marks they feed into it.

pub mod context;

use std::iter;

use serde::Serialize;
use smallvec::SmallVec;

pub use self::context::{
  Layer,
  Layers,
  ParseVisibilityError,
  RenderContext,
  SelectionStyle,
  Visibility,
};
use crate::{
  annotation::{
    Annotation,
    AnnotationKind,
    MarkRef,
    SelectedRange,
    compare_display_order,
  },
  index::AnnotationIndex,
  merge::{
    self,
    MergedRange,
    check_partition,
    merge_ranges,
  },
  projection::{
    ProjectedRange,
    project,
  },
};

/// Marks covering one segment, in display order.
pub type Marks<'a> = SmallVec<[MarkRef<'a>; 4]>;

/// A kind drawn either normally or, when hovered, with intense colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Emphasis {
  pub kind:    AnnotationKind,
  pub intense: bool,
}

/// Decoration of a marked segment.
///
/// The underline (with its marker arrow) comes from the first machine mark
/// and the fill from the first user mark, so the most important annotation
/// determines the look when several overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct MarkerStyle {
  pub underline: Option<Emphasis>,
  pub fill:      Option<Emphasis>,
  pub selection: Option<SelectionStyle>,
}

impl MarkerStyle {
  /// Expects `marks` in display order.
  pub fn for_marks(marks: &[MarkRef<'_>], context: &RenderContext) -> Self {
    let emphasis = |mark: &MarkRef<'_>| {
      mark.kind().map(|kind| Emphasis {
        kind,
        intense: mark.is_hovered(context.hovered),
      })
    };

    Self {
      underline: marks
        .iter()
        .find(|mark| mark.kind().is_some_and(AnnotationKind::is_machine))
        .and_then(emphasis),
      fill:      marks
        .iter()
        .find(|mark| mark.kind().is_some_and(AnnotationKind::is_user))
        .and_then(emphasis),
      selection: marks
        .iter()
        .any(|mark| matches!(mark, MarkRef::Selection(_)))
        .then(|| context.selection_style()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
  Plain {
    start: usize,
    text:  &'a str,
  },
  Marked {
    start:  usize,
    length: usize,
    text:   &'a str,
    marks:  Marks<'a>,
    style:  MarkerStyle,
  },
}

impl<'a> Segment<'a> {
  pub fn start(&self) -> usize {
    match self {
      Self::Plain { start, .. } | Self::Marked { start, .. } => *start,
    }
  }

  pub fn text(&self) -> &'a str {
    match self {
      Self::Plain { text, .. } | Self::Marked { text, .. } => *text,
    }
  }

  pub fn marks(&self) -> &[MarkRef<'a>] {
    match self {
      Self::Plain { .. } => &[],
      Self::Marked { marks, .. } => marks,
    }
  }

  pub fn is_marked(&self) -> bool {
    matches!(self, Self::Marked { .. })
  }
}

/// Slices `text` along `merged`, resolving the merged indexes into `marks`.
///
/// Column positions are counted in chars. Ranges reaching past the end of
/// the text are cut short instead of failing.
pub fn render_segments<'a>(
  text: &'a str,
  merged: &[MergedRange],
  marks: &[MarkRef<'a>],
  context: &RenderContext,
) -> Vec<Segment<'a>> {
  let offsets: Vec<usize> = text
    .char_indices()
    .map(|(offset, _)| offset)
    .chain(iter::once(text.len()))
    .collect();
  let char_len = offsets.len() - 1;
  let byte_offset = |pos: usize| offsets[pos.min(char_len)];

  let mut segments = Vec::with_capacity(merged.len());
  for range in merged {
    if range.end() > char_len {
      tracing::trace!(
        start = range.start,
        end = range.end(),
        char_len,
        "cutting segment at end of text"
      );
    }
    let slice = &text[byte_offset(range.start)..byte_offset(range.end())];

    if !range.is_marked() {
      segments.push(Segment::Plain {
        start: range.start,
        text:  slice,
      });
      continue;
    }

    let mut resolved: Marks<'a> = range
      .indexes
      .iter()
      .filter_map(|&idx| {
        let mark = marks.get(idx).copied();
        if mark.is_none() {
          tracing::warn!(idx, "merged range refers to an unknown mark");
        }
        mark
      })
      .collect();
    resolved.sort_by(|a, b| compare_display_order(*a, *b, context.hovered));

    let style = MarkerStyle::for_marks(&resolved, context);
    segments.push(Segment::Marked {
      start: range.start,
      length: range.length,
      text: slice,
      marks: resolved,
      style,
    });
  }
  segments
}

/// Projects `marks` onto display line `line` and merges the projections.
///
/// The indexes of the merged ranges refer to positions in `marks`.
pub fn merge_line(
  line: usize,
  line_len: usize,
  marks: &[MarkRef<'_>],
) -> Result<Vec<MergedRange>, merge::Error> {
  let ranges: Vec<ProjectedRange> = marks
    .iter()
    .enumerate()
    .map(|(source, mark)| project(mark, line, line_len, source))
    .collect();
  let merged = merge_ranges(line_len, &ranges);
  check_partition(line_len, &merged)?;
  Ok(merged)
}

/// Runs the whole pipeline for one layer of display line `line`.
///
/// If merging ever produced an invalid partition the line is rendered
/// without annotations.
pub fn mark_line<'a>(
  line: usize,
  text: &'a str,
  marks: &[MarkRef<'a>],
  context: &RenderContext,
) -> Vec<Segment<'a>> {
  let merged = merge_line(line, text.chars().count(), marks);
  debug_assert!(
    merged.is_ok(),
    "invalid partition on line {line}: {merged:?}"
  );
  match merged {
    Ok(merged) => render_segments(text, &merged, marks, context),
    Err(err) => {
      tracing::warn!(%err, line, "rendering line without annotations");
      vec![Segment::Plain { start: 0, text }]
    },
  }
}

/// All requested layers of one display line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineRender<'a> {
  pub line:       usize,
  pub background: Vec<Segment<'a>>,
  pub tooltip:    Vec<Segment<'a>>,
  pub marking:    Vec<Segment<'a>>,
  /// Visible user annotations without columns, decorating the whole line.
  pub full_line:  Vec<&'a Annotation>,
  /// Annotations on this line hidden by the visibility setting.
  pub hidden:     Vec<&'a Annotation>,
  /// Set when the live selection covers this line.
  pub selection:  Option<SelectionStyle>,
}

impl LineRender<'_> {
  pub fn has_hidden(&self) -> bool {
    !self.hidden.is_empty()
  }
}

/// Renders lines of a listing against an [`AnnotationIndex`].
#[derive(Debug, Clone)]
pub struct LineRenderer<'i, 'a> {
  index:     &'i AnnotationIndex<'a>,
  context:   RenderContext,
  selection: Option<&'a SelectedRange>,
  layers:    Layers,
}

impl<'i, 'a> LineRenderer<'i, 'a> {
  pub fn new(index: &'i AnnotationIndex<'a>, context: RenderContext) -> Self {
    Self {
      index,
      context,
      selection: None,
      layers: Layers::default(),
    }
  }

  #[must_use]
  pub fn with_layers(mut self, layers: Layers) -> Self {
    self.layers = layers;
    self
  }

  #[must_use]
  pub fn with_selection(mut self, selection: Option<&'a SelectedRange>) -> Self {
    self.selection = selection;
    self
  }

  pub fn context(&self) -> &RenderContext {
    &self.context
  }

  pub fn layers(&self) -> Layers {
    self.layers
  }

  /// Renders display line `line` (one-based) whose content is `text`.
  pub fn render<'t>(&self, line: usize, text: &'t str) -> LineRender<'t>
  where
    'a: 't,
  {
    let context = &self.context;
    let on_line: Vec<&'a Annotation> = self.index.marking(line).collect();
    let (visible, hidden): (Vec<&'a Annotation>, Vec<&'a Annotation>) = on_line
      .iter()
      .copied()
      .partition(|annotation| context.is_visible(annotation));
    let selection = self.selection.filter(|selection| selection.covers(line));

    let mut render = LineRender {
      line,
      selection: selection.map(|_| context.selection_style()),
      ..LineRender::default()
    };

    if self.layers.contains(Layers::BACKGROUND) {
      let marks = as_marks(&visible);
      render.background = mark_line(line, text, &marks, context);
    }
    if self.layers.contains(Layers::TOOLTIP) {
      let marks = as_marks(&on_line);
      render.tooltip = mark_line(line, text, &marks, context);
    }
    if self.layers.contains(Layers::MARKING) {
      let mut marks = as_marks(&visible);
      marks.extend(selection.map(MarkRef::Selection));
      render.marking = mark_line(line, text, &marks, context);
    }

    render.full_line = visible
      .iter()
      .copied()
      .filter(|annotation| annotation.is_full_line())
      .collect();
    sort_annotations(&mut render.full_line, context);

    render.hidden = hidden;
    sort_annotations(&mut render.hidden, context);
    render
  }

  /// Renders every line of `text`, numbering them from 1.
  pub fn render_all<'t>(&self, text: &'t str) -> Vec<LineRender<'t>>
  where
    'a: 't,
  {
    text
      .lines()
      .enumerate()
      .map(|(idx, line)| self.render(idx + 1, line))
      .collect()
  }
}

fn as_marks<'a>(annotations: &[&'a Annotation]) -> Vec<MarkRef<'a>> {
  annotations.iter().copied().map(MarkRef::Annotation).collect()
}

fn sort_annotations(annotations: &mut [&Annotation], context: &RenderContext) {
  annotations.sort_by(|a, b| {
    compare_display_order(MarkRef::Annotation(a), MarkRef::Annotation(b), context.hovered)
  });
}
