
// Re-export model types and service functions
pub mod model;
pub mod service;
pub mod http;

pub use model::{CreateProposalPayload, Proposal};
pub use service::*;
pub use http::*;
