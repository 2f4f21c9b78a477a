//! OpenID Connect RP-initiated logout request/response models.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
