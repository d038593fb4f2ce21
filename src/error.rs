use thiserror::Error;

/// A specialized `Result` type for `viewfire` operations.
pub type Result<T, E = ViewFireError> = std::result::Result<T, E>;

/// The primary error type for all `viewfire` operations.
#[derive(Debug, Error)]
pub enum ViewFireError {
  /// An error originating from the `liquid` engine (parse or render).
  #[error("Liquid rendering error: {0}")]
  Liquid(#[from] liquid::Error),

  /// An error originating from the `tera` templating engine.
  #[error("Tera rendering error: {0}")]
  Tera(#[from] tera::Error),

  /// An I/O error, typically from reading template files.
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  /// The configured output post-processor rejected the rendered HTML.
  #[error("Post-processing error: {0}")]
  PostProcess(#[source] anyhow::Error),

  /// A template path that is absolute or climbs out of the template root.
  #[error("Template path must stay inside the template root: {0}")]
  TemplatePath(String),

  /// An error that occurs when serializing a user's context.
  #[error("Context serialization error: {0}")]
  Serialization(String),

  /// The view layer was set up incorrectly. Raised by `ViewWebBuilder::build`.
  #[error("Configuration error: {0}")]
  Config(String),
}

impl From<serde_json::Error> for ViewFireError {
  fn from(err: serde_json::Error) -> Self {
    ViewFireError::Serialization(err.to_string())
  }
}
