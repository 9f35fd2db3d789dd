pub mod mode;
pub mod session;

pub use mode::GenerationMode;
pub use session::{GenerationSession, PreparedGeneration, ABANDONED_MESSAGE, ACCEPTED_MESSAGE};
