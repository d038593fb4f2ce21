use crate::core::context::{Context, RenderRequest, resolve_context};
use crate::core::engine::RenderBackend;
use crate::core::minify::{HtmlMinifier, MinifierOptions, MinifyFn, PostProcessor};
use crate::error::{Result, ViewFireError};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// The `Content-Type` of every successful view response.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// The final output of a render call, ready to become an HTTP response.
///
/// This is the framework-agnostic half of a view response. Integration layers
/// turn it into their native response type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
  body: String,
}

impl RenderedView {
  pub fn body(&self) -> &str {
    &self.body
  }

  pub fn into_body(self) -> String {
    self.body
  }

  pub fn content_type(&self) -> &'static str {
    HTML_CONTENT_TYPE
  }

  /// Length of the body in bytes, not characters.
  pub fn content_length(&self) -> usize {
    self.body.len()
  }
}

/// Path-related settings that can be loaded from a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
  /// Directory every template path is resolved against.
  pub root: Option<PathBuf>,
  /// Extension appended to template paths that have none (e.g. `liquid`).
  pub view_ext: Option<String>,
}

/// The primary application state for viewfire, designed to be shared across threads.
///
/// It holds the template engine, the default context, and the optional
/// post-processor. It is created with `ViewWeb::builder()` and is cheap to clone.
#[derive(Clone)]
pub struct ViewWeb {
  pub(crate) engine_name: Arc<str>,
  pub(crate) engine: Arc<dyn RenderBackend>,
  /// Configured once at setup and never mutated afterwards.
  pub(crate) default_context: Option<Arc<Context>>,
  pub(crate) post_processor: Option<Arc<dyn PostProcessor>>,
  pub(crate) root: Arc<Path>,
  pub(crate) view_ext: Option<Arc<str>>,
}

impl fmt::Debug for ViewWeb {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ViewWeb")
      .field("engine", &self.engine_name)
      .field("default_context", &self.default_context)
      .field("post_processor", &self.post_processor.is_some())
      .field("root", &self.root)
      .field("view_ext", &self.view_ext)
      .finish()
  }
}

impl ViewWeb {
  /// Creates a new `ViewWebBuilder` to configure and build a `ViewWeb` instance.
  ///
  /// This is the main entry point for using the library.
  pub fn builder() -> ViewWebBuilder {
    ViewWebBuilder::new()
  }

  /// Name the engine was registered under.
  pub fn engine_name(&self) -> &str {
    &self.engine_name
  }

  pub fn default_context(&self) -> Option<&Context> {
    self.default_context.as_deref()
  }

  /// Joins `template_path` onto the root and appends the default extension if
  /// the path has none.
  ///
  /// Template paths are always relative to the root: absolute paths and `..`
  /// components are rejected with `ViewFireError::TemplatePath`.
  pub fn template_file(&self, template_path: &str) -> Result<PathBuf> {
    let relative = Path::new(template_path);
    let escapes = relative
      .components()
      .any(|c| matches!(c, Component::RootDir | Component::Prefix(_) | Component::ParentDir));
    if escapes {
      return Err(ViewFireError::TemplatePath(template_path.to_string()));
    }

    let mut path = self.root.join(relative);
    if let Some(ext) = &self.view_ext {
      if path.extension().is_none() {
        path.set_extension(&**ext);
      }
    }
    Ok(path)
  }

  /// Resolves the context, renders the template, and runs the post-processor.
  ///
  /// `locals` are the response locals of the current request, if any were set.
  pub async fn render(&self, request: RenderRequest, locals: Option<&Context>) -> Result<String> {
    let path = self.template_file(&request.template_path)?;
    let resolved = resolve_context(request.explicit_data, locals, self.default_context());
    log::debug!(
      "Rendering {:?} with {} ({:?} context)",
      path,
      self.engine_name,
      resolved.source
    );

    let html = self.engine.render_file(&path, &resolved.context).await?;

    match &self.post_processor {
      Some(processor) => processor.process(&html),
      None => Ok(html),
    }
  }

  /// Renders `request` into a complete HTML view.
  pub async fn respond(&self, request: RenderRequest, locals: Option<&Context>) -> Result<RenderedView> {
    let body = self.render(request, locals).await?;
    Ok(RenderedView { body })
  }
}

/// A builder for creating a configured `ViewWeb` instance.
pub struct ViewWebBuilder {
  engines: Vec<(String, Arc<dyn RenderBackend>)>,
  default_context: Option<Context>,
  minifier: Option<Box<MinifyFn>>,
  minifier_options: Option<MinifierOptions>,
  post_processor: Option<Arc<dyn PostProcessor>>,
  options: ViewOptions,
  // The first failure from a chained setter, reported by `build`.
  deferred_error: Option<ViewFireError>,
}

impl ViewWebBuilder {
  pub(crate) fn new() -> Self {
    Self {
      engines: Vec::new(),
      default_context: None,
      minifier: None,
      minifier_options: None,
      post_processor: None,
      options: ViewOptions::default(),
      deferred_error: None,
    }
  }

  /// Registers the template engine under `name`.
  ///
  /// Exactly one engine must be registered by the time `build` is called.
  pub fn engine<S: Into<String>, E: RenderBackend + 'static>(mut self, name: S, engine: E) -> Self {
    self.engines.push((name.into(), Arc::new(engine)));
    self
  }

  /// Sets the whole application-wide default context.
  ///
  /// Used only when a render call has neither explicit data nor response locals.
  pub fn default_context(mut self, context: Context) -> Self {
    self.default_context = Some(context);
    self
  }

  /// Adds a single variable to the default context.
  ///
  /// # Arguments
  ///
  /// * `key` - The name of the variable in the template (e.g., "site_name").
  /// * `value` - Any value that can be serialized (e.g., a string, a number, a struct).
  pub fn add_default<S: Into<String>, T: Serialize>(mut self, key: S, value: T) -> Self {
    match serde_json::to_value(value) {
      Ok(value) => {
        self.default_context.get_or_insert_with(Context::new).insert(key.into(), value);
      }
      Err(e) => {
        self.deferred_error.get_or_insert(e.into());
      }
    }
    self
  }

  /// Runs every rendered page through `minify` before it is sent.
  pub fn use_html_minifier<F>(mut self, minify: F) -> Self
  where
    F: Fn(&str, &MinifierOptions) -> anyhow::Result<String> + Send + Sync + 'static,
  {
    self.minifier = Some(Box::new(minify));
    self
  }

  /// Options handed verbatim to the minifier set with `use_html_minifier`.
  pub fn html_minifier_options(mut self, options: MinifierOptions) -> Self {
    self.minifier_options = Some(options);
    self
  }

  /// Installs an arbitrary output post-processor.
  ///
  /// Mutually exclusive with `use_html_minifier`.
  pub fn post_processor<P: PostProcessor + 'static>(mut self, processor: P) -> Self {
    self.post_processor = Some(Arc::new(processor));
    self
  }

  /// Sets the directory template paths are resolved against. Defaults to `.`.
  pub fn root<P: Into<PathBuf>>(mut self, root: P) -> Self {
    self.options.root = Some(root.into());
    self
  }

  /// Sets the extension appended to template paths without one.
  pub fn view_ext<S: Into<String>>(mut self, ext: S) -> Self {
    self.options.view_ext = Some(ext.into());
    self
  }

  /// Applies path settings loaded from configuration. Unset fields keep their current value.
  pub fn options(mut self, options: ViewOptions) -> Self {
    if options.root.is_some() {
      self.options.root = options.root;
    }
    if options.view_ext.is_some() {
      self.options.view_ext = options.view_ext;
    }
    self
  }

  /// Consumes the builder to construct the final `ViewWeb` application state.
  ///
  /// Fails with `ViewFireError::Config` when the engine map is empty or holds
  /// more than one engine, or when two post-processors are configured.
  pub fn build(self) -> Result<ViewWeb> {
    if let Some(err) = self.deferred_error {
      return Err(err);
    }

    let mut engines = self.engines.into_iter();
    let (engine_name, engine) = match (engines.next(), engines.next()) {
      (None, _) => return Err(ViewFireError::Config("Missing engine".to_string())),
      (Some(_), Some(_)) => {
        return Err(ViewFireError::Config(
          "Only one template engine may be registered".to_string(),
        ));
      }
      (Some(entry), None) => entry,
    };
    if engine_name.trim().is_empty() {
      return Err(ViewFireError::Config("Engine name must not be empty".to_string()));
    }

    let post_processor = match (self.minifier, self.post_processor) {
      (Some(_), Some(_)) => {
        return Err(ViewFireError::Config(
          "Configure either an HTML minifier or a post-processor, not both".to_string(),
        ));
      }
      (Some(minify), None) => {
        let options = self.minifier_options.unwrap_or_default();
        Some(Arc::new(HtmlMinifier::from_boxed(minify, options)) as Arc<dyn PostProcessor>)
      }
      (None, processor) => {
        if self.minifier_options.is_some() {
          log::warn!("HTML minifier options were given without a minifier, ignoring them");
        }
        processor
      }
    };

    // Only an explicit root is handed to the engine, so the working directory
    // is never scanned for templates.
    if let Some(root) = &self.options.root {
      engine.bind_root(root);
    }
    let root: PathBuf = self.options.root.unwrap_or_else(|| PathBuf::from("."));
    let view_ext = self
      .options
      .view_ext
      .map(|ext| ext.trim_start_matches('.').to_string())
      .filter(|ext| !ext.is_empty());

    log::info!("🔥 viewfire ready: engine '{}', root {:?}", engine_name, root);

    Ok(ViewWeb {
      engine_name: engine_name.into(),
      engine,
      default_context: self.default_context.map(Arc::new),
      post_processor,
      root: root.into(),
      view_ext: view_ext.map(Into::into),
    })
  }
}
