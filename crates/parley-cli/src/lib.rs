//! Terminal dashboard for the parley proxy.
//!
//! The [`Dashboard`] drives every admin workflow through the proxy's HTTP
//! routes; the `parley` binary maps subcommands onto it and prints the
//! [`render`]ed result.

pub mod client;
pub mod dashboard;
pub mod overview;
pub mod render;
pub mod session;

pub use client::{ApiClient, ApiConfig};
pub use dashboard::Dashboard;
pub use session::SessionContext;

#[cfg(test)]
mod tests;
