//! # Rates Hex
//!
//! Application service layer and HTTP adapter for the exchange rates service.
//!
//! ## Architecture
//!
//! - `service/` - Application service (validation and query orchestration)
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi` - OpenAPI document served by Swagger UI
//!
//! The service is generic over `R: RateRepository`, allowing
//! different repository implementations to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::RateService;
