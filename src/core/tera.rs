use crate::core::context::Context;
use crate::core::engine::{RenderBackend, read_template};
use crate::error::Result;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tera::Tera;

/// A `RenderBackend` for Tera templates.
///
/// With a template root (set on the builder, or bound from `ViewWeb`'s root),
/// every template under it is registered by its root-relative name with `/`
/// separators, so `{% extends "base.html" %}` and `{% include %}` resolve.
/// Without caching the whole tree is re-read on every render.
///
/// Files outside the root are registered alone, under their full path.
#[derive(Clone, Debug)]
pub struct TeraEngine {
  /// The Tera instance, wrapped for thread-safe access and mutability (for reloads).
  tera: Arc<RwLock<Tera>>,
  template_root: Arc<RwLock<Option<PathBuf>>>,
  cache: bool,
}

impl TeraEngine {
  pub fn new() -> Self {
    Self::builder().build()
  }

  pub fn builder() -> TeraEngineBuilder {
    TeraEngineBuilder::default()
  }

  pub fn template_root(&self) -> Option<PathBuf> {
    self.template_root.read().clone()
  }

  fn is_loaded(&self, name: &str) -> bool {
    self.tera.read().get_template_names().any(|loaded| loaded == name)
  }
}

impl Default for TeraEngine {
  fn default() -> Self {
    Self::new()
  }
}

/// `path` relative to `root`, joined with `/`, or `None` if it lies outside.
fn relative_name(root: &Path, path: &Path) -> Option<String> {
  let relative = path.strip_prefix(root).ok()?;
  let parts = relative
    .components()
    .map(|component| match component {
      Component::Normal(part) => part.to_str(),
      _ => None,
    })
    .collect::<Option<Vec<_>>>()?;
  Some(parts.join("/"))
}

/// Reads every UTF-8 file under `root` as `(name, source)` pairs.
async fn read_tree(root: &Path) -> Result<Vec<(String, String)>> {
  let mut pending = vec![root.to_path_buf()];
  let mut templates = Vec::new();

  while let Some(dir) = pending.pop() {
    let mut entries = tokio::fs::read_dir(&dir).await?;
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if entry.file_type().await?.is_dir() {
        pending.push(path);
        continue;
      }
      let Some(name) = relative_name(root, &path) else {
        continue;
      };
      match tokio::fs::read_to_string(&path).await {
        Ok(source) => templates.push((name, source)),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
          log::debug!("Skipping non UTF-8 file {:?}", path);
        }
        Err(e) => return Err(e.into()),
      }
    }
  }

  Ok(templates)
}

#[async_trait]
impl RenderBackend for TeraEngine {
  async fn render_file(&self, path: &Path, context: &Context) -> Result<String> {
    let root = self.template_root();
    let in_root = root.as_deref().and_then(|root| relative_name(root, path).map(|name| (root, name)));

    let name = match in_root {
      Some((root, name)) => {
        if !(self.cache && self.is_loaded(&name)) {
          // A missing file should fail like any other missing template.
          tokio::fs::metadata(path).await?;
          let templates = read_tree(root).await?;
          self.tera.write().add_raw_templates(templates)?;
          log::debug!("Loaded tera templates under {:?}", root);
        }
        name
      }
      None => {
        let name = path.to_string_lossy().into_owned();
        if !(self.cache && self.is_loaded(&name)) {
          let source = read_template(path).await?;
          self.tera.write().add_raw_template(&name, &source)?;
          log::debug!("Compiled tera template {:?}", path);
        }
        name
      }
    };

    let context = tera::Context::from_value(Value::Object(context.clone()))?;
    let html = self.tera.read().render(&name, &context)?;
    Ok(html)
  }

  fn bind_root(&self, root: &Path) {
    let mut template_root = self.template_root.write();
    if template_root.is_none() {
      *template_root = Some(root.to_path_buf());
    }
  }
}

/// A builder for `TeraEngine`.
#[derive(Default)]
pub struct TeraEngineBuilder {
  // A closure to run on the Tera instance for advanced configuration.
  tera_configurator: Option<Box<dyn FnOnce(&mut Tera)>>,
  template_root: Option<PathBuf>,
  cache: bool,
}

impl TeraEngineBuilder {
  /// Provides a closure to run for advanced configuration of the `Tera` instance.
  ///
  /// This is the escape hatch to register custom functions, filters, testers,
  /// or change autoescaping before the engine is finalized.
  pub fn configure_tera<F>(mut self, configurator: F) -> Self
  where
    F: FnOnce(&mut Tera) + 'static,
  {
    self.tera_configurator = Some(Box::new(configurator));
    self
  }

  /// Directory whose templates are registered by relative name.
  ///
  /// Takes precedence over the root bound by `ViewWeb`.
  pub fn template_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
    self.template_root = Some(root.into());
    self
  }

  /// Keeps templates registered after their first render instead of re-reading them.
  pub fn cache(mut self, enabled: bool) -> Self {
    self.cache = enabled;
    self
  }

  pub fn build(self) -> TeraEngine {
    let mut tera = Tera::default();
    if let Some(configurator) = self.tera_configurator {
      configurator(&mut tera);
    }

    TeraEngine {
      tera: Arc::new(RwLock::new(tera)),
      template_root: Arc::new(RwLock::new(self.template_root)),
      cache: self.cache,
    }
  }
}
