//! opsgate: pipeline gates and declarative command synthesis for DevOps workflows.
//!
//! The crate is consumed by a host workflow engine through four surfaces:
//! - [`gates`]: pure functions from a context snapshot to a verdict literal
//! - [`handlers`]: compute-node handlers that turn operation descriptors into
//!   container and IaC commands, run them and normalize the result
//! - [`aggregate`]: fan-in transforms over results already in the context
//! - [`capabilities`]: typed capability settings with dual-backend storage
//!
//! [`workflow`] parses and validates YAML workflow definitions that wire these
//! together, and the `opsgate` binary exposes everything on the command line.

pub mod aggregate;
pub mod capabilities;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod gates;
pub mod handlers;
pub mod workflow;
