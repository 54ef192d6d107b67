//! Compiled-in site content and the invariants it upholds.

pub mod docs;
pub mod error;
pub mod navigation;
pub mod showcase;
