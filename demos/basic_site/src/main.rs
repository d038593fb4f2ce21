use actix_web::{App, HttpResponse, HttpServer, dev::ServiceRequest, web};
use serde_json::json;
use viewfire::{
  LiquidEngine, MinifierOptions, ViewFireError, ViewWeb,
  actix::{InjectLocals, View},
  to_context,
};

#[derive(serde::Serialize)]
struct User {
  name: String,
  email: String,
}

/// Renders the home page from the default context (or the locals, when set).
async fn index(view: View) -> Result<HttpResponse, ViewFireError> {
  view.render("index", None).await
}

/// Renders a page with more complex, explicit data.
async fn user_profile(view: View) -> Result<HttpResponse, ViewFireError> {
  let user = User {
    name: "alice".to_string(),
    email: "alice@example.com".to_string(),
  };
  let context = to_context(&json!({
    "site_name": "viewfire demo",
    "page_title": "User Profile",
    "user": user,
  }))?;
  view.render("user", Some(context)).await
}

/// Drops blank lines and indentation. A stand-in for a real HTML minifier.
fn collapse_whitespace(html: &str, options: &MinifierOptions) -> anyhow::Result<String> {
  if options.get("collapseWhitespace").and_then(|v| v.as_bool()) == Some(true) {
    Ok(html.lines().map(str::trim).filter(|line| !line.is_empty()).collect())
  } else {
    Ok(html.to_string())
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Initialize logging
  env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

  let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
  let mut templates_path = std::path::PathBuf::from(manifest_dir);
  templates_path.push("templates");

  let mut minifier_options = MinifierOptions::new();
  minifier_options.insert("collapseWhitespace".into(), json!(true));

  // 1. Configure and build the view state.
  let views = ViewWeb::builder()
    .engine("liquid", LiquidEngine::builder().cache(true).build().expect("liquid parser"))
    .root(templates_path)
    .view_ext("liquid")
    .add_default("site_name", "viewfire demo")
    .add_default("page_title", "Home")
    .add_default("message", "Welcome to the viewfire demo site!")
    .use_html_minifier(collapse_whitespace)
    .html_minifier_options(minifier_options)
    .build()
    .expect("Failed to build ViewWeb app");

  log::info!("🚀 Starting server at http://127.0.0.1:3000");

  HttpServer::new(move || {
    App::new()
      .app_data(web::Data::new(views.clone()))
      // 2. Visitors passing ?greet=... get their own locals instead of the defaults.
      .wrap(InjectLocals::new(|req: &ServiceRequest| {
        let greet = req.query_string().strip_prefix("greet=")?.to_string();
        to_context(&json!({
          "site_name": "viewfire demo",
          "page_title": "Greeting",
          "message": format!("Hello, {}!", greet),
        }))
        .ok()
      }))
      .route("/", web::get().to(index))
      .route("/profile", web::get().to(user_profile))
  })
  .bind(("127.0.0.1", 3000))?
  .run()
  .await
}
