//! Blocking client for a Supabase-style backend.
//!
//! # Overview
//! `Client` turns method calls into signed HTTP requests against the
//! PostgREST table API (`/rest/v1`), the storage API (`/storage/v1`) and the
//! auth API (`/auth/v1`) of one project, and maps transport failures and
//! unexpected statuses into a single `Error` type.
//!
//! # Design
//! - A client is built once, from `Config` or the environment, for one
//!   credential `Tier`, and is immutable afterwards. Share it by reference
//!   or `Arc`; `default_client` / `init_default` provide a lazily built
//!   process-wide instance for code without a composition root.
//! - Each operation is a pure `build_*` step, one call through the
//!   `HttpSend` seam, and a pure `parse_*` step, so status rules are
//!   testable without a network.
//! - Table reads, creates, updates and deletes return raw response bytes;
//!   only auth responses are parsed into `User` / `AuthResponse`.
//! - No retries: every error reaches the caller.

mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod global;
pub mod http;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{content_type_for, Client};
pub use config::{Config, Tier, DEFAULT_TIMEOUT};
pub use error::{AuthError, Error, Result, TransportError};
pub use global::{default_client, init_default, ClientSlot};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpSend};
pub use transport::UreqSender;
pub use types::{AuthResponse, User};
