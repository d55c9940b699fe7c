pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod orchestrator;
pub mod release;
pub mod ui;
pub mod warning;

pub use error::{ReleaseError, Result};
