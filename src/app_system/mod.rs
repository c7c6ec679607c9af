//! System orchestration, configuration, startup and shutdown.

pub mod config;
pub mod error;
pub mod forms;
pub mod notify;
pub mod storefront;
pub mod tracing;

pub use config::*;
pub use error::*;
pub use forms::*;
pub use notify::*;
pub use storefront::*;
pub use self::tracing::*;
