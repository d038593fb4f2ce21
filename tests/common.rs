#![allow(dead_code)]

use actix_web::{HttpResponse, body::MessageBody, dev::ServiceResponse, http::header, test};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use viewfire::{Context, ViewFireError, actix::View, to_context};

pub const INDEX_TEMPLATE: &str = "<!DOCTYPE html>\n<html>\n  <head>\n    <title>Liquid</title>\n  </head>\n  <body>\n    <p>{{ text }}</p>\n  </body>\n</html>\n";

/// A temporary template root holding the given `(file name, contents)` pairs.
pub fn template_dir(files: &[(&str, &str)]) -> TempDir {
  let temp_dir = tempfile::tempdir().unwrap();
  for (name, contents) in files {
    fs::write(temp_dir.path().join(name), contents).unwrap();
  }
  temp_dir
}

pub fn template_path(dir: &TempDir, name: &str) -> PathBuf {
  dir.path().join(name)
}

pub fn ctx(value: Value) -> Context {
  to_context(&value).unwrap()
}

/// Renders `index.liquid` with whatever context the request resolves to.
pub async fn index_without_data(view: View) -> Result<HttpResponse, ViewFireError> {
  view.render("index.liquid", None).await
}

/// Renders `index.liquid` with an explicit empty map.
pub async fn index_with_empty_data(view: View) -> Result<HttpResponse, ViewFireError> {
  view.render("index.liquid", Some(Context::new())).await
}

/// Asserts the headers every successful view response carries and returns the body.
pub async fn read_html<B: MessageBody>(resp: ServiceResponse<B>) -> String {
  assert_eq!(resp.status(), 200);

  let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap().to_string();
  let content_length = resp
    .headers()
    .get(header::CONTENT_LENGTH)
    .unwrap()
    .to_str()
    .unwrap()
    .to_string();
  assert_eq!(content_type, "text/html; charset=utf-8");

  let body = test::read_body(resp).await;
  assert_eq!(content_length, body.len().to_string());

  String::from_utf8(body.to_vec()).unwrap()
}
