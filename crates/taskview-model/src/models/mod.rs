//! Data types shared by every taskview crate.
//!
//! The task record is what the core reads; the registries describe how raw
//! status and priority strings should be interpreted.

mod registry;
mod task;

pub use registry::*;
pub use task::*;
