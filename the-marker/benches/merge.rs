//! Benchmarks for the per-line annotation pipeline.
//!
//! Run with: `cargo bench -p the-marker --bench merge`

use divan::{
  Bencher,
  black_box,
};
use the_marker::{
  annotation::{
    Annotation,
    AnnotationKind,
  },
  index::AnnotationIndex,
  merge::merge_ranges,
  projection::ProjectedRange,
  render::{
    Layers,
    LineRenderer,
    RenderContext,
  },
};

fn main() {
  divan::main();
}

fn make_line(len: usize) -> String {
  "let value = compute(first, second) + other; "
    .chars()
    .cycle()
    .take(len)
    .collect()
}

fn make_ranges(len: usize, count: usize) -> Vec<ProjectedRange> {
  let step = (len / (count + 1)).max(1);
  (0..count)
    .map(|source| {
      let start = (source * step) % len.max(1);
      let length = if source % 5 == 0 { 0 } else { step * 2 };
      ProjectedRange {
        start,
        length: length.min(len - start),
        source,
      }
    })
    .collect()
}

fn make_annotations(count: usize) -> Vec<Annotation> {
  let kinds = AnnotationKind::ALL;
  (0..count)
    .map(|idx| {
      let kind = kinds[idx % kinds.len()];
      let row = if kind.is_machine() { 1 } else { 2 };
      Annotation::new(kind)
        .with_id(idx as u64)
        .at(row, 1)
        .span((idx * 7) as i64, Some(5))
    })
    .collect()
}

#[divan::bench(args = [(80, 2), (80, 16), (400, 32)])]
fn merge(bencher: Bencher, (len, count): (usize, usize)) {
  let ranges = make_ranges(len, count);
  bencher.bench(|| black_box(merge_ranges(black_box(len), black_box(&ranges))));
}

#[divan::bench(args = [4, 16, 64])]
fn render_line(bencher: Bencher, count: usize) {
  let line = make_line(120);
  let annotations = make_annotations(count);
  let index = AnnotationIndex::new(&annotations);
  let renderer = LineRenderer::new(&index, RenderContext::default()).with_layers(Layers::all());
  bencher.bench(|| black_box(renderer.render(black_box(2), black_box(&line))));
}
