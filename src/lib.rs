//! FloodGuard Risk Service Library
//!
//! Flood risk scoring over weather observations, financial loss estimation,
//! and the HTTP layer that exposes them.
//!
//! # Modules
//!
//! - `scoring`: Heuristic score, risk level classification and risk factors.
//! - `financial`: Damage, business interruption and insurance payout estimates.
//! - `engine`: Scoring strategies (heuristic or trained model).
//! - `model`: Trained regression forest loading and prediction.
//! - `model_integrity`: SHA-256 checks for model files.
//! - `weather_client`: Current weather lookups.
//! - `circuit_breaker`: Circuit breaker for the weather API.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `extract`: Request extractors.
//! - `handlers`: HTTP request handlers.
//! - `routes`: Router assembly.
//! - `docs`: OpenAPI document and Swagger UI.
//! - `models`: Domain and API data models.

pub mod circuit_breaker;
pub mod config;
pub mod docs;
pub mod engine;
pub mod errors;
pub mod extract;
pub mod financial;
pub mod handlers;
pub mod model;
pub mod model_integrity;
pub mod models;
pub mod routes;
pub mod scoring;
pub mod weather_client;
