//! # Spotify Integration Module
//!
//! Everything that speaks the Spotify Web API.
//!
//! ## Modules
//!
//! - [`auth`] - OAuth 2.0 authorization code flow with PKCE, plus the token
//!   refresh used by [`crate::management::TokenManager`]
//! - [`client`] - [`SpotifyCatalog`], the [`crate::catalog::CatalogClient`]
//!   used by `radarcli sync`
//!
//! ## Endpoints
//!
//! | Operation | Endpoint |
//! |---|---|
//! | validate playlist | `GET /playlists/{id}?fields=id` |
//! | playlist tracks | `GET /playlists/{id}/tracks` (offset) |
//! | followed artists | `GET /me/following?type=artist` (cursor) |
//! | artist releases | `GET /artists/{id}/albums?include_groups=album\|single` (offset) |
//! | release tracks | `GET /albums/{id}/tracks` (offset) |
//! | append | `POST /playlists/{id}/tracks` |
//!
//! ## Required scopes
//!
//! `user-follow-read`, `playlist-read-private`, `playlist-modify-public` and
//! `playlist-modify-private`. Override with `SPOTIFY_API_AUTH_SCOPE`.

pub mod auth;
pub mod client;

pub use client::SpotifyCatalog;
