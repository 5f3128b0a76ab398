//! Provider-facing data: grant identifiers, target environments, and the endpoint set.
//!
//! `endpoints` exposes validated URLs ([`ProviderEndpoints`]) for the authorization, token, and
//! revocation endpoints plus one resource base per [`Environment`]. `grant` names the OAuth 2.0
//! grants the client speaks.

pub mod endpoints;
pub mod grant;

pub use endpoints::*;
pub use grant::*;
