//! Text and JSON printers for rendered lines.
use std::{
  io::Write,
  iter,
};

use eyre::Result;
use serde::Serialize;
use the_marker::{
  Annotation,
  AnnotationIndex,
  AnnotationKind,
  LineRender,
  RenderContext,
  Segment,
  annotation::MarkRef,
  render::{
    Layer,
    Layers,
    SelectionStyle,
  },
};

const LAYERS: [(Layer, Layers); 3] = [
  (Layer::Background, Layers::BACKGROUND),
  (Layer::Tooltip, Layers::TOOLTIP),
  (Layer::Marking, Layers::MARKING),
];

fn symbol(mark: MarkRef<'_>) -> char {
  match mark.kind() {
    Some(AnnotationKind::Error) => '^',
    Some(AnnotationKind::Warning) => '~',
    Some(AnnotationKind::Info) => '-',
    Some(AnnotationKind::Annotation) => '=',
    Some(AnnotationKind::Question) => '?',
    None => '#',
  }
}

fn label(annotation: &Annotation) -> String {
  match annotation.id {
    Some(id) => format!("{}#{id}", annotation.kind),
    None => annotation.kind.to_string(),
  }
}

fn layer_name(layer: Layer) -> &'static str {
  match layer {
    Layer::Background => "background",
    Layer::Tooltip => "tooltip",
    Layer::Marking => "marking",
  }
}

fn layer_segments<'r, 'a>(render: &'r LineRender<'a>, layer: Layer) -> &'r [Segment<'a>] {
  match layer {
    Layer::Background => &render.background,
    Layer::Tooltip => &render.tooltip,
    Layer::Marking => &render.marking,
  }
}

/// Underline row for one layer, or `None` when nothing on it is marked.
///
/// Zero-width segments take no room in the row.
fn marker_row(segments: &[Segment<'_>]) -> Option<String> {
  if !segments.iter().any(Segment::is_marked) {
    return None;
  }

  let mut row = String::new();
  for segment in segments {
    let width = segment.text().chars().count();
    let fill = segment.marks().first().map_or(' ', |mark| symbol(*mark));
    row.extend(iter::repeat_n(fill, width));
  }
  Some(row.trim_end().to_string())
}

/// Writes `text` followed by one underline row per marked layer and the
/// messages of the annotations attached to the line.
pub fn write_line(
  out: &mut impl Write,
  text: &str,
  render: &LineRender<'_>,
  index: &AnnotationIndex<'_>,
  context: &RenderContext,
  layers: Layers,
) -> Result<()> {
  writeln!(out, "{:>4} | {text}", render.line)?;

  for (layer, flag) in LAYERS {
    if !layers.contains(flag) {
      continue;
    }
    if let Some(row) = marker_row(layer_segments(render, layer)) {
      writeln!(out, "     | {row}  ({})", layer_name(layer))?;
    }
  }

  for annotation in &render.full_line {
    writeln!(out, "     + {}: {}", label(annotation), annotation.text)?;
  }
  for annotation in index
    .ending_at(render.line)
    .filter(|annotation| context.is_visible(annotation))
  {
    writeln!(out, "     = {}: {}", label(annotation), annotation.text)?;
  }
  if render.has_hidden() {
    writeln!(out, "     ({} hidden)", render.hidden.len())?;
  }
  Ok(())
}

pub fn write_global(
  out: &mut impl Write,
  index: &AnnotationIndex<'_>,
  context: &RenderContext,
) -> Result<()> {
  for annotation in index
    .global()
    .filter(|annotation| context.is_visible(annotation))
  {
    writeln!(out, "   * {}: {}", label(annotation), annotation.text)?;
  }
  Ok(())
}

#[derive(Debug, Serialize)]
struct MarkOutput {
  #[serde(rename = "type")]
  kind: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  id:   Option<u64>,
}

impl From<MarkRef<'_>> for MarkOutput {
  fn from(mark: MarkRef<'_>) -> Self {
    match mark {
      MarkRef::Annotation(annotation) => {
        Self {
          kind: annotation.kind.as_str(),
          id:   annotation.id,
        }
      },
      MarkRef::Selection(_) => {
        Self {
          kind: "selection",
          id:   None,
        }
      },
    }
  }
}

#[derive(Debug, Serialize)]
struct RangeOutput<'a> {
  start:  usize,
  length: usize,
  text:   &'a str,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  marks:  Vec<MarkOutput>,
}

impl<'a> From<&Segment<'a>> for RangeOutput<'a> {
  fn from(segment: &Segment<'a>) -> Self {
    let length = match segment {
      Segment::Plain { text, .. } => text.chars().count(),
      Segment::Marked { length, .. } => *length,
    };
    Self {
      start: segment.start(),
      length,
      text: segment.text(),
      marks: segment.marks().iter().copied().map(MarkOutput::from).collect(),
    }
  }
}

/// The merged ranges of one display line, per requested layer.
#[derive(Debug, Serialize)]
pub struct LineOutput<'a> {
  line:       usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  background: Option<Vec<RangeOutput<'a>>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  tooltip:    Option<Vec<RangeOutput<'a>>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  marking:    Option<Vec<RangeOutput<'a>>>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  full_line:  Vec<MarkOutput>,
  hidden:     usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  selection:  Option<SelectionStyle>,
}

impl<'a> LineOutput<'a> {
  pub fn new(render: &LineRender<'a>, layers: Layers) -> Self {
    let ranges = |flag: Layers, segments: &[Segment<'a>]| -> Option<Vec<RangeOutput<'a>>> {
      layers
        .contains(flag)
        .then(|| segments.iter().map(RangeOutput::from).collect())
    };

    Self {
      line:       render.line,
      background: ranges(Layers::BACKGROUND, &render.background),
      tooltip:    ranges(Layers::TOOLTIP, &render.tooltip),
      marking:    ranges(Layers::MARKING, &render.marking),
      full_line:  render
        .full_line
        .iter()
        .copied()
        .map(|annotation| MarkOutput::from(MarkRef::Annotation(annotation)))
        .collect(),
      hidden:     render.hidden.len(),
      selection:  render.selection,
    }
  }
}

pub fn write_json(out: &mut impl Write, lines: &[LineOutput<'_>]) -> Result<()> {
  serde_json::to_writer_pretty(&mut *out, lines)?;
  writeln!(out)?;
  Ok(())
}
