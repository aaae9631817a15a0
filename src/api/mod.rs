// src/api/mod.rs
pub mod scrape;
pub mod status;
pub mod verify;

pub use scrape::*;
pub use status::*;
pub use verify::*;

use serde::Serialize;

/// Standard envelope for endpoints that do not define their own shape.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
