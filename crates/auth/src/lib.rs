//! `quantii-auth`: the till login gate and session tokens.
//!
//! This crate is decoupled from HTTP and storage.

pub mod claims;
pub mod gate;
pub mod tokens;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use gate::AccessGate;
pub use tokens::{Hs256SessionTokens, IssuedToken, SessionTokens, TokenError};
