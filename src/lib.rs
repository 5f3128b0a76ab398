//! Async Rust client for the Lyft rides API - OAuth 2.0 grant flows, transparent token refresh,
//! and typed access to ride endpoints.
//!
//! The crate is organized around three pieces:
//!
//! - [`flows::AuthFlow`] wraps one of the two supported grants ([`flows::ClientCredentialGrant`]
//!   or [`flows::AuthorizationCodeGrant`]) and produces a [`session::Session`].
//! - [`session::Session`] holds the current [`auth::OAuth2Credential`].
//! - [`client::ApiClient`] signs resource calls with the session's bearer token and refreshes the
//!   credential through the owning flow when it expires.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod session;

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
