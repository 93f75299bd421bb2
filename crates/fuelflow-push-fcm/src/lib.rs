//! Firebase Cloud Messaging push transport.
//!
//! [`FcmClient`] implements `fuelflow_core::push::PushTransport` over the FCM
//! legacy HTTP endpoint. Each call is a single attempt bounded by the
//! configured timeout; nothing is retried here.

mod client;
mod wire;

pub mod error;

pub use client::{DEFAULT_ENDPOINT, FcmClient, FcmConfig};
pub use error::{Error, Result};
