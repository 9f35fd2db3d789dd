pub mod types;
pub mod classification;
pub mod retry;

pub use types::ReportError;
pub use classification::{
    ErrorClassification, FailureClass, CONNECTION_LOST_MESSAGE, PERMISSION_DENIED_MESSAGE,
};
pub use retry::{RetryConfig, with_retry};
