//! Shared types for the Box Office ticketing API.
//!
//! `objects` holds the JSON request/response shapes used by the HTTP
//! boundary. The typed HTTP client lives behind the `client` feature.

#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
