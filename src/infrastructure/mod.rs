//! Infrastructure layer providing external service integrations.
//!
//! This module contains the HTTP client for the captioning backend, the
//! on-disk session storage, configuration and log setup.

pub mod config;
pub mod http;
pub mod logging;
pub mod persistence;

pub use config::*;
pub use http::*;
pub use logging::*;
pub use persistence::*;
