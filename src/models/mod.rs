//! Data models for the JobFinder backend.
//!
//! Serialized with camelCase field names for the web client.

mod job;
mod profile;
mod saved_search;
mod user;

pub use job::*;
pub use profile::*;
pub use saved_search::*;
pub use user::*;
