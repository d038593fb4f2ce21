use crate::core::context::Context;

use actix_web::{
  Error, HttpMessage,
  dev::{Service, ServiceRequest, ServiceResponse, Transform},
};
use futures_util::future::{self, LocalBoxFuture};
use std::{rc::Rc, task::Poll};

/// Per-request template data, stored in the request extensions.
///
/// Set by hooks that run before the handler. Used as the whole render context
/// when a render call gets no explicit data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseLocals(pub Context);

/// Access to `ResponseLocals` on anything that carries request extensions.
pub trait LocalsExt {
  /// Replaces the locals of the current request.
  fn set_locals(&self, locals: Context);

  /// A copy of the current request's locals, if any were set.
  fn locals(&self) -> Option<Context>;
}

impl<T: HttpMessage> LocalsExt for T {
  fn set_locals(&self, locals: Context) {
    self.extensions_mut().insert(ResponseLocals(locals));
  }

  fn locals(&self) -> Option<Context> {
    self.extensions().get::<ResponseLocals>().map(|l| l.0.clone())
  }
}

/// Middleware that runs a hook on every request before the handler and stores
/// the returned map as the request's `ResponseLocals`.
///
/// A hook returning `None` leaves the locals untouched.
pub struct InjectLocals<F> {
  hook: Rc<F>,
}

impl<F> InjectLocals<F>
where
  F: Fn(&ServiceRequest) -> Option<Context> + 'static,
{
  pub fn new(hook: F) -> Self {
    Self { hook: Rc::new(hook) }
  }
}

impl<S, B, F> Transform<S, ServiceRequest> for InjectLocals<F>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  B: 'static,
  F: Fn(&ServiceRequest) -> Option<Context> + 'static,
{
  type Response = ServiceResponse<B>;
  type Error = Error;
  type Transform = InjectLocalsMiddleware<S, F>;
  type InitError = ();
  type Future = future::Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    future::ok(InjectLocalsMiddleware {
      service: Rc::new(service),
      hook: Rc::clone(&self.hook),
    })
  }
}

pub struct InjectLocalsMiddleware<S, F> {
  service: Rc<S>,
  hook: Rc<F>,
}

impl<S, B, F> Service<ServiceRequest> for InjectLocalsMiddleware<S, F>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  B: 'static,
  F: Fn(&ServiceRequest) -> Option<Context> + 'static,
{
  type Response = ServiceResponse<B>;
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  fn poll_ready(&self, cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
    self.service.poll_ready(cx)
  }

  fn call(&self, req: ServiceRequest) -> Self::Future {
    if let Some(locals) = (self.hook)(&req) {
      req.set_locals(locals);
    }

    let service = self.service.clone();
    Box::pin(async move { service.call(req).await })
  }
}
