//! # reckon - client for the Reckon accounting API
//!
//! A blocking Rust client for the Reckon REST API. It performs the OAuth2
//! authorization-code and refresh-token exchanges against the identity host
//! and reads cashbooks and contacts from the API host.
//!
//! ## Features
//!
//! - OAuth2 token exchange with HTTP Basic or form client authentication
//! - Bearer-authenticated resource requests with JSON decoding
//! - Explicit redirect handling that keeps credentials on trusted origins
//! - Typed errors separating transport, decoding and status failures
//! - Structured `tracing` diagnostics that never include secrets
//!
//! The client keeps no session state: tokens are handed back to the caller,
//! who stores them and decides when to refresh.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use reckon::ReckonClient;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ReckonClient::new(
//!         "authorization-code",
//!         "client_id",
//!         "client_secret",
//!         "https://app.example.com/callback",
//!     )?;
//!
//!     let grant = client.acquire_access_token()?;
//!
//!     for book in client.fetch_books(&grant.access_token)? {
//!         if let Some(id) = &book.id {
//!             let contacts = client.fetch_contacts(&grant.access_token, id)?;
//!             println!("{}: {} contacts", id, contacts.len());
//!         }
//!     }
//!
//!     // Later, before `grant.expires_at`
//!     let renewed = client.refresh_access_token(&grant.refresh_token)?;
//!     println!("token valid until {}", renewed.expires_at);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```no_run
//! use reckon::{ClientCredentials, Config, ExpiryUnit, ReckonClient};
//! use std::time::Duration;
//!
//! let config = Config::default()
//!     .with_timeout(Duration::from_secs(10))
//!     .with_expiry_unit(ExpiryUnit::Milliseconds)
//!     .with_scope("offline_access");
//!
//! let client = ReckonClient::with_config(
//!     "authorization-code",
//!     ClientCredentials::new("client_id", "client_secret"),
//!     "https://app.example.com/callback",
//!     config,
//! )?;
//! # Ok::<(), reckon::ReckonError>(())
//! ```

pub mod client;
pub mod credentials;
pub mod error;
pub mod models;
pub mod redirect;
pub mod rest;
pub mod token;

// Re-export main types for convenience
pub use client::Config;
pub use credentials::{ClientAuthMethod, ClientCredentials};
pub use error::{ReckonError, Result};
pub use models::{Book, Contact};
pub use rest::ReckonClient;
pub use token::{ExpiryUnit, TokenGrant, TokenRequest, TokenResponse};
