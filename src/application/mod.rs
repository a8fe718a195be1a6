//! Application layer managing the session and the captioning workflow.
//!
//! This module coordinates between the domain layer and presentation layer:
//! who is logged in, which view is on screen, and what asynchronous work each
//! view has started.

pub mod feedback;
pub mod guard;
pub mod session;
pub mod state;
pub mod tasks;
pub mod upload;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use feedback::*;
pub use guard::*;
pub use session::*;
pub use state::*;
pub use tasks::*;
pub use upload::*;
pub use workflow::*;
