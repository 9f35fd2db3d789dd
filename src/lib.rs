//! Report generation orchestration for audit campaigns: template compatibility,
//! AI widget overrides, request building, and single or streaming bulk dispatch
//! with progress tracking.

pub mod api;
pub mod cli;
pub mod client;
pub mod compat;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod models;
pub mod request;
pub mod session;
pub mod stream;
pub mod widgets;

pub use dispatch::GenerationSession;
pub use errors::ReportError;
