pub mod parser;
pub mod schema;
pub mod security;
pub mod types;

pub use parser::{parse_config, parse_config_str, schema_warnings};
pub use types::*;
