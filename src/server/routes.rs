// src/server/routes.rs

pub mod health {
    use rocket::serde::json::Json;
    use rocket::get;
    use serde_json::{json, Value};

    #[get("/health")]
    pub async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "service": "contact-scraper-api"
        }))
    }

    #[get("/")]
    pub async fn index() -> Json<Value> {
        Json(json!({
            "name": "Contact Scraper API",
            "description": "Crawls websites and extracts contact details",
            "endpoints": {
                "health": "GET /api/health",
                "scrape": "POST /api/scrape",
                "status": "GET /api/scraping-status",
                "verify": "POST /api/verify"
            }
        }))
    }
}
