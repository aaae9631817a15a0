// src/api/status.rs
use rocket::serde::json::Json;
use rocket::{get, State};

use crate::server::ServerState;
use crate::web_crawler::progress::BatchProgress;

/// Live progress of the current (or last finished) batch, served verbatim
/// so clients can poll it while /api/scrape is still running.
#[get("/scraping-status")]
pub async fn get_scraping_status(state: &State<ServerState>) -> Json<BatchProgress> {
    Json(state.progress.snapshot().await)
}
