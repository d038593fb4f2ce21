//! # viewfire
//!
//! View rendering for Actix Web. A handler names a template and optionally
//! passes data. viewfire picks the context, renders it with the configured
//! engine (Liquid by default, Tera also supported), optionally runs an HTML
//! minifier, and writes a `text/html; charset=utf-8` response with an exact
//! `Content-Length`.
//!
//! ## Context resolution
//!
//! The context is taken whole from the first source that is present:
//!
//! 1. data passed to `View::render` (an empty map counts),
//! 2. the request's `ResponseLocals`, set by `InjectLocals` or `LocalsExt`,
//! 3. the default context given to the builder,
//! 4. an empty map.
//!
//! Sources are never merged.
//!
//! Template paths are resolved against the builder's `root` and may not be
//! absolute or contain `..`. With a root set, the Tera backend registers every
//! template below it by relative name, so `extends` and `include` work.
//!
//! A runnable site lives in `demos/basic_site` (kept out of `examples/`).
//!
//! ## Quickstart
//!
//! ```rust,no_run
//! use actix_web::{web, App, HttpResponse, HttpServer};
//! use viewfire::{LiquidEngine, ViewFireError, ViewWeb, actix::View};
//!
//! async fn index(view: View) -> Result<HttpResponse, ViewFireError> {
//!   view.render("index", None).await
//! }
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!   let views = ViewWeb::builder()
//!     .engine("liquid", LiquidEngine::new().expect("liquid parser"))
//!     .root("templates")
//!     .view_ext("liquid")
//!     .add_default("site_name", "My Awesome Site")
//!     .build()
//!     .expect("Failed to build ViewWeb");
//!
//!   HttpServer::new(move || {
//!     App::new()
//!       .app_data(web::Data::new(views.clone()))
//!       .route("/", web::get().to(index))
//!   })
//!   .bind(("127.0.0.1", 3000))?
//!   .run()
//!   .await
//! }
//! ```

pub mod actix;
pub mod core;
pub mod error;

pub use crate::core::app::{HTML_CONTENT_TYPE, RenderedView, ViewOptions, ViewWeb, ViewWebBuilder};
pub use crate::core::context::{Context, ContextSource, RenderRequest, ResolvedContext, resolve_context, to_context};
pub use crate::core::engine::RenderBackend;
pub use crate::core::liquid::{LiquidEngine, LiquidEngineBuilder};
pub use crate::core::minify::{HtmlMinifier, MinifierOptions, PostProcessor};
pub use crate::core::tera::{TeraEngine, TeraEngineBuilder};
pub use crate::error::{Result, ViewFireError};
