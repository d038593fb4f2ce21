use crate::core::context::Context;
use crate::core::engine::{RenderBackend, TemplateCache, read_template};
use crate::error::Result;

use async_trait::async_trait;
use liquid::{Parser, ParserBuilder, Template};
use std::fmt;
use std::path::Path;

/// A `RenderBackend` for Liquid templates, built on the `liquid` crate.
///
/// The parser starts from the Liquid standard library of tags and filters.
/// Custom tags, blocks, and filters are registered through
/// `LiquidEngineBuilder::configure_parser`.
pub struct LiquidEngine {
  parser: Parser,
  cache: TemplateCache<Template>,
}

impl LiquidEngine {
  /// A standard-library engine without template caching.
  pub fn new() -> Result<Self> {
    Self::builder().build()
  }

  pub fn builder() -> LiquidEngineBuilder {
    LiquidEngineBuilder::default()
  }

  async fn load(&self, path: &Path) -> Result<std::sync::Arc<Template>> {
    if let Some(template) = self.cache.get(path) {
      return Ok(template);
    }
    let source = read_template(path).await?;
    let template = self.parser.parse(&source)?;
    log::debug!("Compiled liquid template {:?}", path);
    Ok(self.cache.store(path, template))
  }
}

impl fmt::Debug for LiquidEngine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LiquidEngine").finish_non_exhaustive()
  }
}

#[async_trait]
impl RenderBackend for LiquidEngine {
  async fn render_file(&self, path: &Path, context: &Context) -> Result<String> {
    let template = self.load(path).await?;
    let globals = liquid::to_object(context)?;
    let html = template.render(&globals)?;
    Ok(html)
  }
}

/// A builder for `LiquidEngine`.
#[derive(Default)]
pub struct LiquidEngineBuilder {
  // Runs on the parser builder before it is finalized.
  parser_configurator: Option<Box<dyn FnOnce(ParserBuilder) -> ParserBuilder>>,
  cache: bool,
}

impl LiquidEngineBuilder {
  /// Provides a closure to extend the Liquid language before the parser is built.
  ///
  /// This is where custom tags, blocks, and filters are registered, e.g.
  /// `|builder| builder.tag(MyTag)`.
  pub fn configure_parser<F>(mut self, configurator: F) -> Self
  where
    F: FnOnce(ParserBuilder) -> ParserBuilder + 'static,
  {
    self.parser_configurator = Some(Box::new(configurator));
    self
  }

  /// Keeps compiled templates in memory, keyed by path.
  ///
  /// Off by default. Turn it on in production where templates don't change.
  pub fn cache(mut self, enabled: bool) -> Self {
    self.cache = enabled;
    self
  }

  pub fn build(self) -> Result<LiquidEngine> {
    let mut builder = ParserBuilder::with_stdlib();
    if let Some(configurator) = self.parser_configurator {
      builder = configurator(builder);
    }

    Ok(LiquidEngine {
      parser: builder.build()?,
      cache: TemplateCache::new(self.cache),
    })
  }
}
