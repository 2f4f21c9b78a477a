//! Authorization request/response models for the browser-based code flow.
//!
//! The request renders into the authorization endpoint URL (with PKCE by default); the
//! response is parsed from the redirect URI and keeps its originating request.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
