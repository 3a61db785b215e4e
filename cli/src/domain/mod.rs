//! Domain layer: pure types, descriptor construction, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod batch;
pub mod config;
pub mod error;
pub mod kernel;

pub use batch::{BatchDescriptor, JobInvocation, JobSource, PinnedSource};
pub use config::HandoffConfig;
pub use error::{ConfigError, HandoffError, HandoffFailure, Step};
pub use kernel::{Architecture, KernelArtifact, PublishedArtifactRef};
