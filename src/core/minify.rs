use crate::error::{Result, ViewFireError};

use serde_json::Value;
use std::fmt;

/// Free-form options handed to the minifier untouched.
pub type MinifierOptions = serde_json::Map<String, Value>;

/// The signature of a user-supplied HTML minifier.
pub type MinifyFn = dyn Fn(&str, &MinifierOptions) -> anyhow::Result<String> + Send + Sync;

/// Transforms rendered HTML before it is written to the response.
pub trait PostProcessor: Send + Sync {
  fn process(&self, html: &str) -> Result<String>;
}

/// A `PostProcessor` that runs a minifier function with fixed options.
pub struct HtmlMinifier {
  minify: Box<MinifyFn>,
  options: MinifierOptions,
}

impl HtmlMinifier {
  pub fn new<F>(minify: F, options: MinifierOptions) -> Self
  where
    F: Fn(&str, &MinifierOptions) -> anyhow::Result<String> + Send + Sync + 'static,
  {
    Self {
      minify: Box::new(minify),
      options,
    }
  }

  pub(crate) fn from_boxed(minify: Box<MinifyFn>, options: MinifierOptions) -> Self {
    Self { minify, options }
  }

  pub fn options(&self) -> &MinifierOptions {
    &self.options
  }
}

impl fmt::Debug for HtmlMinifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("HtmlMinifier")
      .field("options", &self.options)
      .finish_non_exhaustive()
  }
}

impl PostProcessor for HtmlMinifier {
  fn process(&self, html: &str) -> Result<String> {
    (self.minify)(html, &self.options).map_err(ViewFireError::PostProcess)
  }
}
