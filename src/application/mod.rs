//! Services behind the HTTP layer: content rendering, chrome, newsletter.

pub mod chrome;
pub mod error;
pub mod highlight;
pub mod newsletter;
pub mod site;
pub mod stream;
