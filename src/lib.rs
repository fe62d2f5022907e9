//! orq - versioned requirements and solutions in a single SQLite file.
//!
//! # Architecture
//!
//! - [`project`] - Project handle owning one store
//! - [`storage`] - SQLite storage engine, versioning controller, labels, media
//! - [`model`] - Data types (Requirement, Solution, ItemVersion, Label, Media)
//! - [`config`] - Project path resolution
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod project;
pub mod storage;

pub use error::{Error, Result};
pub use project::Project;
