pub mod manager;
pub mod selection;

pub use manager::{SessionCounts, SessionManager};
pub use selection::{OverrideEdit, SelectionState};
