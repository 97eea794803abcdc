//! Overlaying annotations onto the lines of a code listing.
//!
//! Each display line goes through the same pipeline: every annotation
//! touching the line is [projected](projection::project) to a character
//! range, the ranges are [merged](merge::merge_ranges) into a partition of
//! the line tagged with the covering annotations, and the partition is
//! [rendered](render::LineRenderer) into plain and marked segments per layer.
//!
//! ```
//! use the_marker::{
//!   annotation::{Annotation, AnnotationKind},
//!   index::AnnotationIndex,
//!   render::{LineRenderer, RenderContext},
//! };
//!
//! // Machine rows are zero-based: row 2 is display line 3.
//! let annotations = [Annotation::new(AnnotationKind::Error).at(2, 1).span(0, Some(3))];
//! let index = AnnotationIndex::new(&annotations);
//! let render = LineRenderer::new(&index, RenderContext::default()).render(3, "foo = bar");
//! let texts: Vec<_> = render.background.iter().map(|segment| segment.text()).collect();
//! assert_eq!(texts, ["foo", " = bar"]);
//! ```

pub mod annotation;
pub mod config;
pub mod index;
pub mod merge;
pub mod projection;
pub mod render;

pub use annotation::{
  Annotation,
  AnnotationKind,
  SelectedRange,
};
pub use index::AnnotationIndex;
pub use render::{
  LineRender,
  LineRenderer,
  RenderContext,
  Segment,
};
