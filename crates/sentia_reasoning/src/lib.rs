//! # Sentia Reasoning
//!
//! Turn orchestration on top of the affect and expression layers, plus the
//! collaborators that feed it.
//!
//! - [`Session`]: one conversation, one turn at a time
//! - [`SessionManager`]: many independent sessions behind handles
//! - [`providers`]: HTTP, offline and scripted classifiers/generators

pub mod engine;
pub mod extraction;
pub mod manager;
pub mod prompts;
pub mod providers;
pub mod retry;

pub use engine::Session;
pub use manager::{SessionHandle, SessionManager};
