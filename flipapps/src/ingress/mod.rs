//! Client ingress
//!
//! Clients authenticate with the shared password, then queue messages onto
//! the application over the same framed protocol used for the sign driver.

mod auth;
mod server;
mod service;

pub use auth::{AuthError, Authenticator, SessionAuthenticator};
pub use server::IngressServer;
pub use service::{FlipAppsService, ServiceError};
