use crate::core::context::Context;
use crate::error::Result;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A template engine that can turn a file and a context into HTML.
///
/// Implementations are shared across requests, so they must be `Send + Sync`.
/// Rendering is asynchronous because engines usually read the template from disk.
#[async_trait]
pub trait RenderBackend: Send + Sync {
  /// Renders the template at `path` with `context`.
  async fn render_file(&self, path: &Path, context: &Context) -> Result<String>;

  /// Called once by `ViewWebBuilder::build` with the configured template root.
  ///
  /// Engines that resolve template references (inheritance, includes) by name
  /// use it as the base directory for those names.
  fn bind_root(&self, _root: &Path) {}
}

#[async_trait]
impl<T: RenderBackend + ?Sized> RenderBackend for Arc<T> {
  async fn render_file(&self, path: &Path, context: &Context) -> Result<String> {
    (**self).render_file(path, context).await
  }

  fn bind_root(&self, root: &Path) {
    (**self).bind_root(root)
  }
}

/// Reads a template source from disk without blocking the runtime.
pub(crate) async fn read_template(path: &Path) -> Result<String> {
  let source = tokio::fs::read_to_string(path).await?;
  Ok(source)
}

/// Compiled templates keyed by path.
///
/// When disabled every lookup misses, so edits on disk show up on the next
/// render. Only compiled templates are stored, never contexts.
pub(crate) struct TemplateCache<T> {
  enabled: bool,
  entries: RwLock<HashMap<PathBuf, Arc<T>>>,
}

impl<T> TemplateCache<T> {
  pub(crate) fn new(enabled: bool) -> Self {
    Self {
      enabled,
      entries: RwLock::new(HashMap::new()),
    }
  }

  pub(crate) fn get(&self, path: &Path) -> Option<Arc<T>> {
    if !self.enabled {
      return None;
    }
    self.entries.read().get(path).cloned()
  }

  /// Wraps `template` and keeps a copy if caching is on.
  pub(crate) fn store(&self, path: &Path, template: T) -> Arc<T> {
    let template = Arc::new(template);
    if self.enabled {
      self.entries.write().insert(path.to_path_buf(), Arc::clone(&template));
    }
    template
  }

  #[cfg(test)]
  pub(crate) fn len(&self) -> usize {
    self.entries.read().len()
  }
}
