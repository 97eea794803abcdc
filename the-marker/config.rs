//! Render configuration, read from TOML.
//!
//! ```toml
//! visibility    = "important"
//! question-mode = false
//! layers        = ["background", "tooltip", "marking"]
//! ```
use std::{
  fs,
  io,
  path::{
    Path,
    PathBuf,
  },
};

use serde::Deserialize;
use thiserror::Error;

use crate::render::{
  Layer,
  Layers,
  RenderContext,
  Visibility,
};

/// The configuration used when no file is given.
pub const DEFAULT_CONFIG: &str = include_str!("marker.toml");

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to read config file {path}")]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("failed to parse config: {0}")]
  Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
  pub visibility:    Visibility,
  pub question_mode: bool,
  pub layers:        Vec<Layer>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      visibility:    Visibility::default(),
      question_mode: false,
      layers:        vec![Layer::Background, Layer::Tooltip],
    }
  }
}

impl Config {
  pub fn from_toml(source: &str) -> Result<Self, Error> {
    Ok(toml::from_str(source)?)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| {
      Error::Io {
        path: path.to_path_buf(),
        source,
      }
    })?;
    let config = Self::from_toml(&source)?;
    tracing::debug!(path = %path.display(), ?config, "loaded render config");
    Ok(config)
  }

  pub fn layers(&self) -> Layers {
    self.layers.iter().copied().map(Layers::from).collect()
  }

  pub fn context(&self) -> RenderContext {
    RenderContext {
      visibility: self.visibility,
      question_mode: self.question_mode,
      hovered: None,
    }
  }
}
