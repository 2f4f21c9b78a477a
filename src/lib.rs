//! OAuth 2.0 / OpenID Connect client message models: validated builders, redirect dispatch,
//! and wire-compatible JSON persistence for authorization, end-session, and token revocation.
//!
//! Every message is immutable once built and serializes to a stable JSON shape, so an in-flight
//! request can be persisted while the user is in the browser and restored afterwards with
//! [`management::request_from`]. Network transport stays with the host; see [`oauth`] for the
//! bridge into the `oauth2` crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod authorization;
pub mod carrier;
pub mod config;
pub mod end_session;
pub mod error;
pub mod json;
pub mod management;
pub mod oauth;
pub mod obs;
pub mod params;
pub mod pkce;
pub mod revocation;

mod validate;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
	};

	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
#[cfg(test)] use color_eyre as _;
