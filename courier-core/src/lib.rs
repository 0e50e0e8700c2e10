//! Core types and traits for the courier MQTT client.
//!
//! This crate provides the building blocks shared by the packet codec and
//! the client: encode/decode traits, the variable byte integer, MQTT
//! length-prefixed strings, quality-of-service levels and the application
//! message type. It is `no_std` compatible when the `std` feature is
//! disabled.
//!
//! ## Features
//!
//! - `std` (enabled by default): Enables standard library support. When
//!   disabled, the crate is `no_std` compatible and requires `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod codec;
pub mod error;
pub mod message;
pub mod protocol;
pub mod qos;

/// A specialized `Result` type for courier codec operations.
pub type Result<T> = core::result::Result<T, crate::error::Error>;
