
// Re-export model types and service functions
pub mod model;
pub mod service;
pub mod http;

pub use model::{Execution, ExecutionPhoto, ExecutionReceipt, REQUIRED_PHOTO_COUNT};
pub use service::*;
pub use http::*;
