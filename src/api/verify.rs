// src/api/verify.rs
use rocket::serde::json::Json;
use rocket::{post, State};
use serde::{Deserialize, Serialize};

use crate::api::ApiResponse;
use crate::server::ServerState;
use crate::web_crawler::contact_extractor::is_valid_email_address;

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResult {
    pub email: String,
    pub valid_format: bool,
    pub message: String,
}

/// Thin pass-through to email verification. Only the format check runs
/// in-process; mailbox probing belongs to the downstream verifier and its
/// verdict is reported as-is when wired up.
#[post("/verify", format = "json", data = "<request>")]
pub async fn verify_email(
    _state: &State<ServerState>,
    request: Json<VerifyRequest>,
) -> Json<ApiResponse<VerifyResult>> {
    let email = request.email.trim().to_lowercase();
    let valid_format = is_valid_email_address(&email);
    let message = if valid_format {
        "Email address has a valid format".to_string()
    } else {
        "Email address format is invalid".to_string()
    };
    Json(ApiResponse::success(VerifyResult {
        email,
        valid_format,
        message,
    }))
}
