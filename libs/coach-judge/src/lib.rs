//! Judging core: compile an untrusted submission, run it against its
//! test cases under a wall-clock budget, and assemble an immutable
//! evaluation report.
//!
//! Layering, leaf-first:
//! - [`workspace`] owns the per-request scratch directory lifecycle
//! - [`compiler`] drives the external toolchain inside a workspace
//! - [`executor`] supervises one artifact run per test case
//! - [`report`] is the pure report assembly step
//! - [`judge`] coordinates the pipeline for one submission
//!
//! The executor knows nothing about scoring, the report builder does
//! no I/O, and nothing outside [`workspace`] creates or removes files
//! under the scratch root.

pub mod compiler;
pub mod config;
pub mod error;
pub mod executor;
pub mod judge;
pub mod report;
pub mod workspace;

pub use config::JudgeConfig;
pub use error::JudgeError;
pub use judge::Judge;
pub use workspace::Workspace;
