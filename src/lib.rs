//! captui - Terminal client for an image-captioning service
//!
//! Log in, upload an image, read the generated caption and rate it. The
//! library exposes the session store, the access guard and the upload and
//! feedback workflows independently of the terminal front end.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
