pub mod check;
pub mod commands;
pub mod context;
pub mod generate;
pub mod progress;
pub mod serve;
pub mod templates;
pub mod widgets;

pub use commands::{Cli, Commands};
