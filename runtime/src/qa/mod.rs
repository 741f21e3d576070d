pub mod context;
pub mod coordinator;
pub mod service;

pub use context::{RequestContext, validate_fields};
pub use coordinator::{AnswerResult, RequestCoordinator};
pub use service::{ProcessRequest, QaService};
