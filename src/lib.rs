//! Authenticated API client for a table-ordering restaurant backend.
//!
//! ARCHITECTURE
//! ============
//! - [`net`]: the client. Decorates requests with the bearer token, and on a
//!   401 runs at most one token refresh at a time while every other failing
//!   request waits for it, then replays each exactly once.
//! - [`session`]: shared credential store, persisted between runs.
//! - [`api`]: typed wrappers for each backend resource.
//! - [`state`]: client-side derived state (bill totals, last table scan).
//! - [`config`]: environment-driven settings.

pub mod api;
pub mod config;
pub mod net;
pub mod session;
pub mod state;

pub use config::ClientConfig;
pub use net::{ApiClient, ApiError};
pub use session::{Session, SessionEvent, SessionStore};
