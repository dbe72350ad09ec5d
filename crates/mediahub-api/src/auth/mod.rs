//! Bearer token verification.
//!
//! Tokens are issued elsewhere; this module only checks the signature and
//! expiry and reads the owner identity.

pub mod claims;
pub mod decoder;

pub use claims::OwnerClaims;
pub use decoder::TokenDecoder;
