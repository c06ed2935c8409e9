//! HTTP handlers for milestone-service.

pub mod generate;
pub mod health;
