//! Scope sets, token secrets, and OAuth 2.0 credentials.

pub mod scope;
pub mod token;

pub use scope::*;
pub use token::{credential::*, secret::*};
