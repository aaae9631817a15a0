// src/lib.rs

//! Contact scraping service: crawls batches of websites, extracts contact
//! details (emails, social profiles, phone numbers, addresses) and governs
//! batch failures so one bad stretch of URLs cannot burn the whole run.

pub mod api;
pub mod config;
pub mod export;
pub mod models;
pub mod server;
pub mod web_crawler;
