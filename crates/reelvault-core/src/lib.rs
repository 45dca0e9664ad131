//! reelvault-core: the error taxonomy and configuration schema shared by the
//! reelvault crates.
//!
//! Every fallible operation in the workspace returns [`Result`], whose error
//! side is one of three kinds: a configuration problem detected before any
//! side effect, an external command that failed, or a filesystem operation
//! that failed.

pub mod config;
pub mod error;

pub use error::{Error, Result};
