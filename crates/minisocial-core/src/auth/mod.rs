//! Authentication module for managing the client session.
//!
//! This module provides:
//! - `SessionManager`: hydrate/login/logout state machine with observers
//! - `TokenStore`: persistence for the single bearer token (file, OS
//!   keychain, or in-memory)
//! - `IdentityService`: the remote port the manager reconciles against
//!
//! Tokens carry no expiry metadata; validity is whatever `/auth/me` says.

pub mod error;
pub mod identity;
pub mod session;
pub mod token_store;

pub use error::AuthError;
pub use identity::IdentityService;
pub use session::{HydrateOutcome, SessionManager, SessionState};
pub use token_store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};
