//! Shared utilities for the shellbridge workspace.
//!
//! This crate contains the small pieces every layer needs: error location
//! capture and HTTP-like status categorization. It has no business logic.
//!
//! ## Architecture
//!
//! - **common** (this crate): shared utilities
//! - **models**: pure data structures crossing the bridge
//! - **bridge-core**: the bridge engine operating on models
//!
//! This layered architecture keeps concerns separated and makes testing easier.

pub mod error;
pub mod http_status;

pub use error::error_location::ErrorLocation;
pub use http_status::HttpStatusCode;
