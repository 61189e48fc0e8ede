//! CLI command implementations.
//!
//! Each task group lives in its own submodule and talks to git, gh and the
//! user only through [`TaskContext`](crate::TaskContext).

pub mod branch;
pub mod checks;
pub mod containers;
pub mod docs;
mod gacp;
pub mod issues;
pub mod project;
pub mod setup;
pub mod shared;

pub use branch::{delete_branch, new_branch};
pub use containers::{MlServerOptions, RunOptions};
pub use docs::DocsOptions;
pub use gacp::gacp;
