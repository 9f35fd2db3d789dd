pub mod scope;
pub mod template;
pub mod target;
pub mod request;
pub mod progress;

pub use scope::*;
pub use template::*;
pub use target::*;
pub use request::*;
pub use progress::*;
