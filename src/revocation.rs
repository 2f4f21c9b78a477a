//! Token revocation (RFC 7009) request and response models.
//!
//! `request` carries the validated revocation call and its form parameters; `response`
//! pairs a request with whatever the revocation endpoint returned. Both round-trip through
//! the JSON persistence format, with the response embedding its request.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
