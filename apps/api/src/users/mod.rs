//! User profile and onboarding endpoints.

pub mod handlers;
