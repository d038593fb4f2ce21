use crate::core::app::{RenderedView, ViewWeb};
use crate::core::context::{Context, RenderRequest};
use crate::error::{Result, ViewFireError};

use actix_web::{
  FromRequest, HttpRequest, HttpResponse, ResponseError,
  dev::Payload,
  http::{
    StatusCode,
    header::{CONTENT_LENGTH, ContentType},
  },
  web,
};
use futures_util::future::{self, Ready};

pub mod locals;

pub use locals::{InjectLocals, LocalsExt, ResponseLocals};

impl ResponseError for ViewFireError {
  fn status_code(&self) -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
  }

  // Details (paths, template excerpts) go to the log, not to the client.
  fn error_response(&self) -> HttpResponse {
    HttpResponse::build(self.status_code())
      .content_type(ContentType::plaintext())
      .body("Internal Server Error")
  }
}

impl From<RenderedView> for HttpResponse {
  fn from(view: RenderedView) -> Self {
    let length = view.content_length();
    HttpResponse::build(StatusCode::OK)
      .content_type(ContentType::html())
      .insert_header((CONTENT_LENGTH, length))
      .body(view.into_body())
  }
}

/// An extractor that renders views for the current request.
///
/// Handlers take a `View` argument and finish with `view.render(..)`. The
/// `ViewWeb` state must be registered with `App::app_data`, either bare or
/// wrapped in `web::Data`.
///
/// ```rust,no_run
/// use actix_web::HttpResponse;
/// use viewfire::{ViewFireError, actix::View};
///
/// async fn index(view: View) -> Result<HttpResponse, ViewFireError> {
///   view.render("index.liquid", None).await
/// }
/// ```
pub struct View {
  app: ViewWeb,
  req: HttpRequest,
}

impl View {
  /// Renders `template_path` and builds the response.
  ///
  /// `data`, when given (even empty), is the whole context. Otherwise the
  /// request's locals are used, then the application default context.
  /// Consumes the extractor: one render per handler.
  pub async fn render(self, template_path: &str, data: Option<Context>) -> Result<HttpResponse> {
    let request = match data {
      Some(data) => RenderRequest::new(template_path).with_data(data),
      None => RenderRequest::new(template_path),
    };
    self.render_request(request).await
  }

  pub async fn render_request(self, request: RenderRequest) -> Result<HttpResponse> {
    let locals = self.req.locals();
    let template = request.template_path().to_string();

    match self.app.respond(request, locals.as_ref()).await {
      Ok(view) => Ok(view.into()),
      Err(e) => {
        log::error!("Template rendering error for '{}': {:?}", template, e);
        Err(e)
      }
    }
  }

  /// Sets the locals of the current request from inside a handler.
  pub fn set_locals(&self, locals: Context) {
    self.req.set_locals(locals);
  }

  pub fn request(&self) -> &HttpRequest {
    &self.req
  }
}

impl FromRequest for View {
  type Error = actix_web::Error;
  type Future = Ready<std::result::Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let app = req
      .app_data::<web::Data<ViewWeb>>()
      .map(|data| data.get_ref().clone())
      .or_else(|| req.app_data::<ViewWeb>().cloned());

    match app {
      Some(app) => future::ok(View { app, req: req.clone() }),
      None => {
        log::error!("ViewWeb is not registered as app data, cannot render views");
        future::err(actix_web::error::ErrorInternalServerError(
          "view rendering is not configured",
        ))
      }
    }
  }
}
