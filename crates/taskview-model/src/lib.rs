//! Task data model for taskview.
//!
//! # Quick Start
//!
//! For convenient imports, use the prelude:
//!
//! ```
//! use taskview_model::prelude::*;
//! ```
//!
//! This re-exports [`TaskRecord`](models::TaskRecord), the status and
//! priority registries, and the most used calendar helpers.

pub mod date;
pub mod models;
pub mod prelude;
