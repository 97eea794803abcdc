//! Per-line lookup of the annotations of a listing.
//!
//! A line is "marked" by every annotation whose span touches it, and an
//! annotation's thread is shown below the last line it spans. Machine
//! annotations come before user annotations on every line, each group in
//! input order.
use std::collections::BTreeMap;

use crate::annotation::{
  Annotation,
  RowNumbering,
};

#[derive(Debug, Clone)]
pub struct AnnotationIndex<'a> {
  annotations: &'a [Annotation],
  marked:      BTreeMap<usize, Vec<usize>>,
  threads:     BTreeMap<usize, Vec<usize>>,
  global:      Vec<usize>,
}

impl<'a> AnnotationIndex<'a> {
  pub fn new(annotations: &'a [Annotation]) -> Self {
    let mut index = Self {
      annotations,
      marked: BTreeMap::new(),
      threads: BTreeMap::new(),
      global: Vec::new(),
    };

    for numbering in [RowNumbering::ZeroBased, RowNumbering::OneBased] {
      for (idx, annotation) in annotations.iter().enumerate() {
        if annotation.kind.numbering() == numbering {
          index.insert(idx, annotation);
        }
      }
    }
    index
  }

  fn insert(&mut self, idx: usize, annotation: &Annotation) {
    let Some(row) = annotation.row else {
      self.global.push(idx);
      return;
    };
    let row = row as usize;
    let rows = annotation.rows.unwrap_or(1) as usize;

    let (marked, thread) = match annotation.kind.numbering() {
      RowNumbering::ZeroBased => {
        let thread = if row != 0 { row + rows } else { 0 };
        (row + 1..=row + rows, thread)
      },
      RowNumbering::OneBased => {
        let last = if row != 0 && rows != 0 {
          row + rows - 1
        } else {
          0
        };
        (row..=last, last)
      },
    };

    for line in marked {
      self.marked.entry(line).or_default().push(idx);
    }
    self.threads.entry(thread).or_default().push(idx);
  }

  pub fn len(&self) -> usize {
    self.annotations.len()
  }

  pub fn is_empty(&self) -> bool {
    self.annotations.is_empty()
  }

  pub fn get(&self, idx: usize) -> Option<&'a Annotation> {
    self.annotations.get(idx)
  }

  pub fn annotations(&self) -> &'a [Annotation] {
    self.annotations
  }

  /// Annotations whose span touches display line `line`.
  pub fn marking(&self, line: usize) -> impl Iterator<Item = &'a Annotation> + '_ {
    self.resolve(self.marked.get(&line))
  }

  /// Annotations whose thread belongs below display line `line`.
  pub fn ending_at(&self, line: usize) -> impl Iterator<Item = &'a Annotation> + '_ {
    self.resolve(self.threads.get(&line))
  }

  /// Annotations that do not target a specific line.
  pub fn global(&self) -> impl Iterator<Item = &'a Annotation> + '_ {
    self.resolve(Some(&self.global))
  }

  /// Display lines marked by at least one annotation, ascending.
  pub fn marked_lines(&self) -> impl Iterator<Item = usize> + '_ {
    self.marked.keys().copied()
  }

  fn resolve<'s>(
    &'s self,
    indexes: Option<&'s Vec<usize>>,
  ) -> impl Iterator<Item = &'a Annotation> + 's {
    let annotations = self.annotations;
    indexes
      .into_iter()
      .flatten()
      .map(move |&idx| &annotations[idx])
  }
}
