pub mod extractor;

pub use extractor::{extract, fallback_widget_id, is_ai_capable};
