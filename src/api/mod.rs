//! # API Module
//!
//! HTTP endpoint served on the loopback address while `radarcli auth` runs.
//!
//! - [`callback`] - Receives the authorization code from Spotify's
//!   authorization server and completes the PKCE exchange. The resulting
//!   token is handed back to the waiting auth flow through shared state.
//!
//! The server lives only for the duration of the authorization; the sync run
//! itself never starts it.

mod callback;

pub use callback::callback;
