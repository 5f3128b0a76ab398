//! Token secrets and the credentials that carry them.

pub mod credential;
pub mod secret;
