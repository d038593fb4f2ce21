use crate::error::{Result, ViewFireError};

use serde::Serialize;
use serde_json::Value;

/// The data handed to a template: variable names mapped to JSON-like values.
pub type Context = serde_json::Map<String, Value>;

/// Converts any serializable value into a `Context`.
///
/// The value must serialize to a map (a struct, a `HashMap`, a `json!({..})`
/// object). Anything else is rejected with `ViewFireError::Serialization`.
pub fn to_context<T: Serialize>(value: &T) -> Result<Context> {
  match serde_json::to_value(value)? {
    Value::Object(map) => Ok(map),
    other => Err(ViewFireError::Serialization(format!(
      "expected a map-like context, got {}",
      kind_of(&other)
    ))),
  }
}

fn kind_of(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// A single rendering invocation: which template, and optionally which data.
///
/// `explicit_data` distinguishes "omitted" (`None`) from "given, possibly
/// empty" (`Some`). An empty map is still explicit data.
#[derive(Debug, Clone)]
pub struct RenderRequest {
  pub(crate) template_path: String,
  pub(crate) explicit_data: Option<Context>,
}

impl RenderRequest {
  /// A request without explicit data. The context comes from locals or defaults.
  pub fn new<S: Into<String>>(template_path: S) -> Self {
    Self {
      template_path: template_path.into(),
      explicit_data: None,
    }
  }

  /// Attaches explicit data, which becomes the whole context for this render.
  pub fn with_data(mut self, data: Context) -> Self {
    self.explicit_data = Some(data);
    self
  }

  pub fn template_path(&self) -> &str {
    &self.template_path
  }

  pub fn explicit_data(&self) -> Option<&Context> {
    self.explicit_data.as_ref()
  }
}

/// Which layer supplied the resolved context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSource {
  Explicit,
  Locals,
  Default,
  Empty,
}

/// The context actually passed to the engine, together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContext {
  pub context: Context,
  pub source: ContextSource,
}

impl ResolvedContext {
  fn empty() -> Self {
    Self {
      context: Context::new(),
      source: ContextSource::Empty,
    }
  }
}

/// Picks the context for one render call.
///
/// The first present source wins and supplies the entire context: explicit
/// data, then response locals, then the application default context. Layers
/// are never merged, so `Some(Context::new())` as explicit data hides both
/// locals and defaults.
pub fn resolve_context(
  explicit: Option<Context>,
  locals: Option<&Context>,
  defaults: Option<&Context>,
) -> ResolvedContext {
  if let Some(context) = explicit {
    return ResolvedContext {
      context,
      source: ContextSource::Explicit,
    };
  }

  [(ContextSource::Locals, locals), (ContextSource::Default, defaults)]
    .into_iter()
    .find_map(|(source, layer)| {
      layer.map(|context| ResolvedContext {
        context: context.clone(),
        source,
      })
    })
    .unwrap_or_else(ResolvedContext::empty)
}
