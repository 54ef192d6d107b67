//! Public HTTP surface: routes, middleware, and the newsletter endpoints.

mod middleware;
mod newsletter;
mod public;

pub use public::{HttpState, build_router};
