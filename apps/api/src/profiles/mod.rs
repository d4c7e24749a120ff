//! Profile Store HTTP surface: bulk sync and demo seed data.

pub mod demo;
pub mod handlers;
