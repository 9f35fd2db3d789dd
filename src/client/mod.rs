pub mod backend;
pub mod catalog;
pub mod http;
pub mod sse;

pub use backend::{EventStream, GenerationBackend};
pub use catalog::{list_with_retry, TemplateCatalog, TemplateFilter};
pub use http::HttpReportClient;
