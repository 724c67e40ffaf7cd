//! commitgen: commit message suggestions from staged changes (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod cache;
pub mod config;
pub mod constants;
pub mod diff;
pub mod doctor;
pub mod env;
pub mod heuristics;
pub mod hook;
pub mod models;
pub mod orchestrator;
pub mod providers;
pub mod shell;
