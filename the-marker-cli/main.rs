//! Command line front end for the-marker.
//!
//! Reads a source file and a JSON array of annotations and prints every line
//! with its marked ranges underlined, or the merged ranges as JSON.

mod cli;
mod output;

use std::{
  fs,
  io::{
    self,
    BufWriter,
    Write,
  },
};

use clap::Parser;
use eyre::{
  Result,
  WrapErr,
  bail,
};
use the_marker::{
  Annotation,
  AnnotationIndex,
  LineRenderer,
  config::{
    Config,
    DEFAULT_CONFIG,
  },
};

use crate::{
  cli::Cli,
  output::LineOutput,
};

fn main() -> Result<()> {
  let cli = Cli::parse();
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
    .init();

  let config = match &cli.config {
    Some(path) => Config::load(path)?,
    None => Config::from_toml(DEFAULT_CONFIG).wrap_err("invalid built-in config")?,
  };
  let context = cli.context(&config);
  let layers = cli.layers(&config);

  let source = fs::read_to_string(&cli.source)
    .wrap_err_with(|| format!("failed to read {}", cli.source.display()))?;
  let annotations = fs::read_to_string(&cli.annotations)
    .wrap_err_with(|| format!("failed to read {}", cli.annotations.display()))?;
  let annotations: Vec<Annotation> = serde_json::from_str(&annotations)
    .wrap_err_with(|| format!("invalid annotations in {}", cli.annotations.display()))?;

  let index = AnnotationIndex::new(&annotations);
  tracing::info!(
    annotations = index.len(),
    marked_lines = index.marked_lines().count(),
    "indexed annotations"
  );
  let renderer = LineRenderer::new(&index, context)
    .with_layers(layers)
    .with_selection(cli.select.as_ref());

  let lines: Vec<(usize, &str)> = source
    .lines()
    .enumerate()
    .map(|(idx, text)| (idx + 1, text))
    .filter(|(line, _)| cli.line.is_none_or(|only| only == *line))
    .collect();
  if let (Some(line), true) = (cli.line, lines.is_empty()) {
    bail!(
      "line {line} is outside {} ({} lines)",
      cli.source.display(),
      source.lines().count()
    );
  }

  let mut out = BufWriter::new(io::stdout().lock());
  if cli.json {
    let renders: Vec<_> = lines
      .iter()
      .map(|&(line, text)| renderer.render(line, text))
      .collect();
    let outputs: Vec<_> = renders
      .iter()
      .map(|render| LineOutput::new(render, layers))
      .collect();
    output::write_json(&mut out, &outputs)?;
  } else {
    for &(line, text) in &lines {
      let render = renderer.render(line, text);
      output::write_line(&mut out, text, &render, &index, &context, layers)?;
    }
    if cli.line.is_none() {
      output::write_global(&mut out, &index, &context)?;
    }
  }
  out.flush()?;
  Ok(())
}
