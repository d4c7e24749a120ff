//! AI-assisted candidate search: request analysis, candidate sourcing,
//! insight generation.

pub mod analyzer;
pub mod handlers;
pub mod insight;
pub mod pipeline;
