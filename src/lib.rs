//! Async Rust client library for Microsoft Graph user lifecycle, group
//! membership and identity-risk operations.
//!
//! Each operation is a single request against Graph v1.0 that must come
//! back with exactly one expected status; anything else is returned as
//! [`error::GraphError::Api`] with the status and raw body.
//!
//! # Modules
//!
//! - [`auth`] — `HeaderProvider` trait with client-credentials and static providers.
//! - [`client`] — `GraphClient`, which holds the session headers and sends requests.
//! - [`error`] — Typed error (`GraphError`) for all library operations.
//! - [`groups`] — Group member lookup.
//! - [`identity_protection`] — Risky-user listing and risk dismissal.
//! - [`users`] — Account state, group membership and authentication methods.
//!
//! # Quick Start
//!
//! ```ignore
//! use entra_ops::auth::ClientCredentialsProvider;
//! use entra_ops::client::GraphClient;
//! use entra_ops::users::disable_account;
//!
//! let client = GraphClient::new()?;
//! let provider = ClientCredentialsProvider::new()?;
//! client.authenticate(&provider, "tenant", "client_id", "secret").await?;
//! disable_account(&client, "alice@contoso.com").await?;
//! ```

#![warn(missing_docs)]

pub mod auth;
pub mod client;
pub mod error;
pub mod groups;
pub mod identity_protection;
pub mod users;
