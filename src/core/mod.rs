//! Core business logic modules.

pub mod backup;
pub mod rollback;
pub mod workflow;

pub use workflow::{Workflow, WorkflowFailure};
