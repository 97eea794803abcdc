use std::path::PathBuf;

use clap::{
  ArgAction,
  Parser,
};
use the_marker::{
  SelectedRange,
  config::Config,
  render::{
    Layer,
    Layers,
    RenderContext,
    Visibility,
  },
};

#[derive(Debug, Parser)]
#[command(name = "the-marker")]
#[command(about = "Print a source file with its annotations marked")]
pub struct Cli {
  /// Source file to annotate
  #[arg(value_name = "SOURCE")]
  pub source: PathBuf,

  /// JSON file holding an array of annotations
  #[arg(short = 'a', long = "annotations", value_name = "FILE")]
  pub annotations: PathBuf,

  /// Load render settings from a TOML file
  #[arg(short = 'c', long = "config", value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Which annotations to show: all, important or none
  #[arg(long, value_name = "VISIBILITY")]
  pub visibility: Option<Visibility>,

  /// Style the selection as a question
  #[arg(long)]
  pub question_mode: bool,

  /// Id of the annotation to draw as hovered
  #[arg(long, value_name = "ID")]
  pub hover: Option<u64>,

  /// Live selection, one-based
  #[arg(long, value_name = "ROW[:ROWS[:COL[:COLS]]]", value_parser = parse_selection)]
  pub select: Option<SelectedRange>,

  /// Only print display line N (one-based)
  #[arg(short = 'l', long, value_name = "N")]
  pub line: Option<usize>,

  /// Layers to print, overriding the config (repeatable)
  #[arg(long = "layer", value_name = "LAYER")]
  pub layers: Vec<Layer>,

  /// Print the merged ranges as JSON instead of text
  #[arg(long)]
  pub json: bool,

  /// Increase logging verbosity (repeat for more detail)
  #[arg(short = 'v', action = ArgAction::Count)]
  pub verbosity: u8,
}

impl Cli {
  pub fn log_filter(&self) -> &'static str {
    match self.verbosity {
      0 => "warn",
      1 => "info",
      2 => "debug",
      _ => "trace",
    }
  }

  /// Applies the command line overrides on top of `config`.
  pub fn context(&self, config: &Config) -> RenderContext {
    let mut context = config.context();
    if let Some(visibility) = self.visibility {
      context.visibility = visibility;
    }
    context.question_mode |= self.question_mode;
    context.hovered = self.hover;
    context
  }

  pub fn layers(&self, config: &Config) -> Layers {
    if self.layers.is_empty() {
      config.layers()
    } else {
      self.layers.iter().copied().map(Layers::from).collect()
    }
  }
}

fn parse_selection(value: &str) -> Result<SelectedRange, String> {
  let mut parts = value.split(':');
  let mut next = |name: &str| -> Result<Option<u32>, String> {
    parts
      .next()
      .map(|part| {
        part
          .parse::<u32>()
          .map_err(|err| format!("invalid {name} '{part}': {err}"))
      })
      .transpose()
  };

  let row = next("row")?.ok_or_else(|| "missing row".to_string())?;
  let rows = next("rows")?.unwrap_or(1);
  let column = next("column")?.map(i64::from);
  let columns = next("columns")?;
  if parts.next().is_some() {
    return Err(format!("too many fields in '{value}'"));
  }

  Ok(SelectedRange {
    column,
    columns,
    ..SelectedRange::new(row, rows)
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn selection_fields_are_optional() {
    assert_eq!(parse_selection("3").unwrap(), SelectedRange::new(3, 1));
    assert_eq!(parse_selection("3:2:4:5").unwrap(), SelectedRange {
      column: Some(4),
      columns: Some(5),
      ..SelectedRange::new(3, 2)
    });
    assert!(parse_selection("").is_err());
    assert!(parse_selection("3:x").is_err());
    assert!(parse_selection("1:1:1:1:1").is_err());
  }

  #[test]
  fn flags_override_config() {
    let cli = Cli::parse_from([
      "the-marker",
      "main.rs",
      "--annotations",
      "notes.json",
      "--visibility",
      "important",
      "--hover",
      "7",
      "--layer",
      "marking",
      "-vv",
    ]);
    let config = Config::default();
    let context = cli.context(&config);
    assert_eq!(context.visibility, Visibility::Important);
    assert_eq!(context.hovered, Some(7));
    assert!(!context.question_mode);
    assert_eq!(cli.layers(&config), Layers::MARKING);
    assert_eq!(cli.log_filter(), "debug");
  }

  #[test]
  fn config_layers_apply_without_flags() {
    let cli = Cli::parse_from(["the-marker", "main.rs", "-a", "notes.json"]);
    assert_eq!(cli.layers(&Config::default()), Layers::default());
    assert_eq!(cli.log_filter(), "warn");
  }
}
