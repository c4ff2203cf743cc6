#![recursion_limit = "256"]

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod infra;
pub mod ml;

pub use error::{PipelineError, Result};
