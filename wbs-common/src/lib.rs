//! # WBS Sync Common Library
//!
//! Shared code for the WBS sync pipeline:
//! - Error taxonomy (`Error` / `Result`)
//! - Canonical item model (the normalized, source-agnostic work item)
//! - Configuration loading (credentials, people directory, status partition)

pub mod config;
pub mod error;
pub mod model;

pub use error::{Error, Result};
pub use model::{CanonicalItem, StatusGroup, WbsType};
