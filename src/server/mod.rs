// src/server/mod.rs
use std::sync::Arc;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::{options, routes, Build, Request, Response, Rocket};
use tokio::sync::Mutex;
use tracing::info;

use crate::api;
use crate::config::AppConfig;
use crate::web_crawler::orchestrator::BatchOrchestrator;
use crate::web_crawler::progress::ProgressHandle;

pub mod routes;

/// Shared state handed to every request handler.
pub struct ServerState {
    pub config: AppConfig,
    pub progress: ProgressHandle,
    pub orchestrator: BatchOrchestrator,
    /// Held for the whole duration of a batch; try_lock failing means one
    /// is already running.
    pub batch_gate: Arc<Mutex<()>>,
}

/// Assembles the rocket with routes, CORS and shared state. Split from
/// launch so tests can mount the same instance on a local client.
pub fn build_rocket(config: AppConfig) -> Rocket<Build> {
    let progress = ProgressHandle::new();
    let orchestrator = BatchOrchestrator::new(
        config.crawler.clone(),
        config.break_policy.clone(),
        progress.clone(),
    );
    let cors = Cors {
        allowed_origin: config.server.frontend_origin.clone(),
    };

    info!(
        "🌐 API listening on port {} (CORS origin {})",
        config.server.port, config.server.frontend_origin
    );

    let figment = rocket::Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", "0.0.0.0"))
        .merge(("log_level", "off"));

    let state = ServerState {
        config,
        progress,
        orchestrator,
        batch_gate: Arc::new(Mutex::new(())),
    };

    rocket::custom(figment)
        .manage(state)
        .attach(cors)
        .mount(
            "/api",
            routes![
                routes::health::health_check,
                routes::health::index,
                api::scrape_urls,
                api::get_scraping_status,
                api::verify_email,
                cors_preflight,
            ],
        )
}

/// Answers CORS preflight for every API path.
#[options("/<_..>")]
pub async fn cors_preflight() {}

pub struct Cors {
    allowed_origin: String,
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new(
            "Access-Control-Allow-Origin",
            self.allowed_origin.clone(),
        ));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
    }
}
