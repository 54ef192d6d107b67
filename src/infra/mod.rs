//! Runtime adapters: HTTP surface, telemetry, embedded assets, the
//! list-service client.

pub mod assets;
pub mod error;
pub mod http;
pub mod list_service;
pub mod telemetry;
