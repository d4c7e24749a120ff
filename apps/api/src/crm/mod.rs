//! CRM read surface over the Relationship Store.

pub mod handlers;
