//! GRDF Portal Client
//!
//! HTTP integration with the GRDF customer portal:
//! - Nonce-based login handshake (cookie `auth_nonce`)
//! - Authenticated consumption queries per PCE identifier
//! - The portal's two-phase fetch quirk (a warm-up request that returns no
//!   data, followed by the real fetch)
//!
//! A session lives for a single synchronization run and is discarded once
//! the fetch completes; nothing is persisted across runs.

#![warn(clippy::all)]

mod client;
mod error;
mod response;

pub use client::{AuthenticatedSession, PortalClient};
pub use error::{FetchError, LoginError};
pub use response::LoginResponse;
