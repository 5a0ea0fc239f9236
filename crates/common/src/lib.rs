//! Integration modules for a header-bidding host.
//!
//! This crate provides two thin integration surfaces: a user-identity
//! submodule that bridges the host's id-collection layer to the
//! externally-loaded OneKey consent/identity vendor, and a bid adapter
//! that delegates its request/response plumbing to a shared,
//! endpoint-parameterized utility module.
//!
//! # Modules
//!
//! - [`adapters`]: bid adapter seam and the VisibleMeasures registration
//! - [`error`]: error types shared across modules
//! - [`logging`]: log initialization helper
//! - [`settings`]: configuration management and validation
//! - [`test_support`]: testing utilities
//! - [`userid`]: user-identity submodule seam and the OneKey bridge

pub mod adapters;
pub mod error;
pub mod logging;
pub mod settings;
pub mod userid;
