//! Incubator API client.
//!
//! This module provides the interface for communicating with the incubator's
//! REST collections.

pub mod auth;
mod client;
pub mod error;
mod store;

pub use auth::{EnvToken, KeyringToken, NoToken, StaticToken, TokenProvider};
pub use client::{CollectionClient, CollectionClientBuilder};
pub use error::ApiError;
pub use store::RecordStore;
