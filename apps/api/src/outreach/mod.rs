//! Personalized outreach generation and bulk campaigns.

pub mod generator;
pub mod handlers;
pub mod pipeline;
