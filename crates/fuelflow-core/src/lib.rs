//! Core types and trait definitions for the fuel-request workflow.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the request state machine ([`lifecycle`]) and notification fan-out
//! ([`dispatch`]); storage and push delivery are injected through the traits
//! in [`store`] and [`push`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod notification;
pub mod push;
pub mod request;
pub mod store;
pub mod user;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;
