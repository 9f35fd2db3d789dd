//! Scope/template compatibility rules.

pub mod matrix;
pub mod select;

pub use matrix::{scope_accepts, supports_per_entity, validate, Verdict};
pub use select::{auto_select, compatible_templates};
