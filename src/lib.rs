//! vetrina: a self-hosted landing and documentation site server.
//!
//! Layered layout: `config` resolves deployment settings, `domain` holds the
//! compiled-in site content and its invariants, `application` hosts the
//! services (code rendering, newsletter, chrome), `infra` binds them to the
//! runtime (HTTP, telemetry, embedded assets, the list-service client), and
//! `presentation` renders askama views.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
