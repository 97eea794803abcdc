use std::{
  fmt,
  str::FromStr,
};

use bitflags::bitflags;
use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

use crate::annotation::{
  Annotation,
  AnnotationKind,
};

/// Which annotations are drawn on the code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
  #[default]
  All,
  /// Errors, user annotations and questions only.
  Important,
  None,
}

impl Visibility {
  pub fn is_visible(self, kind: AnnotationKind) -> bool {
    match self {
      Self::All => true,
      Self::Important => kind.is_important(),
      Self::None => false,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::All => "all",
      Self::Important => "important",
      Self::None => "none",
    }
  }
}

impl fmt::Display for Visibility {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown visibility '{0}', expected one of: all, important, none")]
pub struct ParseVisibilityError(pub String);

impl FromStr for Visibility {
  type Err = ParseVisibilityError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "all" => Ok(Self::All),
      "important" => Ok(Self::Important),
      "none" => Ok(Self::None),
      _ => Err(ParseVisibilityError(s.to_string())),
    }
  }
}

/// Styling of the live selection, which depends on whether the user is
/// asking a question or writing an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionStyle {
  Annotation,
  Question,
}

/// Everything besides the annotations themselves that affects rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderContext {
  pub visibility:    Visibility,
  pub question_mode: bool,
  /// Id of the annotation under the pointer, drawn with intense colors.
  pub hovered:       Option<u64>,
}

impl RenderContext {
  pub fn is_visible(&self, annotation: &Annotation) -> bool {
    self.visibility.is_visible(annotation.kind)
  }

  pub fn selection_style(&self) -> SelectionStyle {
    if self.question_mode {
      SelectionStyle::Question
    } else {
      SelectionStyle::Annotation
    }
  }
}

/// A single visual layer of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
  /// Background colors and underlines of visible annotations.
  Background,
  /// Hover targets listing every annotation on a range, hidden ones included.
  Tooltip,
  /// Visible annotations together with the live selection.
  Marking,
}

impl FromStr for Layer {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "background" => Ok(Self::Background),
      "tooltip" => Ok(Self::Tooltip),
      "marking" => Ok(Self::Marking),
      _ => Err(format!("unknown layer '{s}'")),
    }
  }
}

bitflags! {
  /// The set of layers a [`crate::render::LineRenderer`] computes.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct Layers: u8 {
    const BACKGROUND = 1 << 0;
    const TOOLTIP    = 1 << 1;
    const MARKING    = 1 << 2;
  }
}

impl Default for Layers {
  fn default() -> Self {
    Self::BACKGROUND | Self::TOOLTIP
  }
}

impl From<Layer> for Layers {
  fn from(layer: Layer) -> Self {
    match layer {
      Layer::Background => Self::BACKGROUND,
      Layer::Tooltip => Self::TOOLTIP,
      Layer::Marking => Self::MARKING,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn important_visibility_keeps_errors_and_user_kinds() {
    let visible: Vec<_> = AnnotationKind::ALL
      .into_iter()
      .filter(|kind| Visibility::Important.is_visible(*kind))
      .collect();
    assert_eq!(visible, [
      AnnotationKind::Error,
      AnnotationKind::Annotation,
      AnnotationKind::Question,
    ]);
    assert!(
      AnnotationKind::ALL
        .into_iter()
        .all(|kind| Visibility::All.is_visible(kind))
    );
    assert!(
      AnnotationKind::ALL
        .into_iter()
        .all(|kind| !Visibility::None.is_visible(kind))
    );
  }

  #[test]
  fn visibility_parses() {
    assert_eq!("important".parse::<Visibility>(), Ok(Visibility::Important));
    assert_eq!(
      "some".parse::<Visibility>(),
      Err(ParseVisibilityError("some".into()))
    );
  }

  #[test]
  fn layers_collect_from_names() {
    let layers: Layers = ["marking", "background"]
      .into_iter()
      .map(|name| name.parse::<Layer>().map(Layers::from))
      .collect::<Result<_, _>>()
      .unwrap();
    assert_eq!(layers, Layers::MARKING | Layers::BACKGROUND);
    assert!("overlay".parse::<Layer>().is_err());
  }

  #[test]
  fn selection_style_follows_question_mode() {
    let mut context = RenderContext::default();
    assert_eq!(context.selection_style(), SelectionStyle::Annotation);
    context.question_mode = true;
    assert_eq!(context.selection_style(), SelectionStyle::Question);
  }
}
