pub mod builder;
pub mod title;

pub use builder::build_request;
pub use title::default_title;
