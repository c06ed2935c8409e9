//! milestone-service: turns a skill name and goal into a ten-level
//! milestone plan using schema-constrained Gemini generation.
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::{build_router, AppState, Application};
