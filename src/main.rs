#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use actix_web::{middleware::Logger, web, App, HttpRequest, HttpResponse, HttpServer};
use kit_session::{
    session::{CookieSession, SessionManager},
    settings::{self, SessionSettings},
    SessionError,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

#[derive(Debug, Deserialize)]
struct RefreshQuery {
    expires: Option<u64>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Load configuration from Session.toml and environment variables
    let settings = SessionSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e:#}")))?;
    let session_manager = SessionManager::from_settings(&settings, settings::is_production())
        .map_err(|e| std::io::Error::other(format!("Invalid session configuration: {e}")))?;

    let bind_address = format!(
        "{}:{}",
        std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
        std::env::var("PORT").unwrap_or_else(|_| "8080".to_string())
    );
    print_startup_info(&bind_address, &session_manager);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(session_manager.clone()))
            .wrap(Logger::default())
            .configure(configure_services)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg.route("/session", web::get().to(read_session))
        .route("/session", web::put().to(replace_session))
        .route("/session", web::patch().to(merge_session))
        .route("/session", web::delete().to(destroy_session))
        .route("/session/refresh", web::post().to(refresh_session))
        .route("/ping", web::get().to(health));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok", "version": kit_session::VERSION }))
}

async fn read_session(
    req: HttpRequest,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, SessionError> {
    let session = manager.load::<Value>(&req).await?;
    Ok(respond(session))
}

async fn replace_session(
    req: HttpRequest,
    manager: web::Data<SessionManager>,
    body: web::Json<Value>,
) -> Result<HttpResponse, SessionError> {
    let mut session = manager.load::<Value>(&req).await?;
    session.set(body.into_inner()).await?;
    Ok(respond(session))
}

async fn merge_session(
    req: HttpRequest,
    manager: web::Data<SessionManager>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, SessionError> {
    let mut session = manager.load::<Value>(&req).await?;
    let patch = body.into_inner();
    session
        .update(|current| {
            let mut merged = match current {
                Some(Value::Object(map)) => map,
                _ => Map::new(),
            };
            merged.extend(patch);
            Value::Object(merged)
        })
        .await?;
    Ok(respond(session))
}

async fn refresh_session(
    req: HttpRequest,
    manager: web::Data<SessionManager>,
    query: web::Query<RefreshQuery>,
) -> Result<HttpResponse, SessionError> {
    let mut session = manager.load::<Value>(&req).await?;
    let refreshed = session.refresh(query.expires).await?;
    log::debug!("Session refresh requested: refreshed={refreshed}");
    Ok(respond(session))
}

async fn destroy_session(
    req: HttpRequest,
    manager: web::Data<SessionManager>,
) -> Result<HttpResponse, SessionError> {
    let mut session = manager.load::<Value>(&req).await?;
    session.destroy();
    Ok(respond(session))
}

/// Render the session body and attach the outgoing cookie, if any
fn respond(session: CookieSession<Value>) -> HttpResponse {
    let body = json!({
        "data": session.data(),
        "expires": session.read().map(|data| data.expires),
        "flags": {
            "invalid_date": session.flags().invalid_date,
            "should_re_encrypt": session.flags().should_re_encrypt,
            "should_destroy": session.flags().should_destroy,
        }
    });

    let mut response = HttpResponse::Ok();
    if let Some(cookie) = session.finalize() {
        response.cookie(cookie);
    }
    response.json(body)
}

fn print_startup_info(bind_address: &str, manager: &SessionManager) {
    let config = manager.config();
    println!("Starting kit-session demo on http://{bind_address}");
    println!("Cookie: {} (secure={})", config.key(), config.cookie().secure);
    println!(
        "Secrets: {} (current id {})",
        config.secrets().len(),
        config.secrets().current().id()
    );
    println!();
    println!("Session endpoints:");
    println!("  GET    /session          - Read the current session");
    println!("  PUT    /session          - Replace the session payload");
    println!("  PATCH  /session          - Merge fields into the session payload");
    println!("  POST   /session/refresh  - Extend the session (?expires=N)");
    println!("  DELETE /session          - Destroy the session");
    println!("  GET    /ping             - Health check");
}
