//! **popkit** - a Rust library for parsing legacy PopCap game asset formats.
//!
//! # Supported formats
//! | Module | Format |
//! |--------|--------|
//! | [`formats::pak`]       | PAK - flat archive of named, timestamped blobs |
//! | [`formats::particles`] | Particle effect definitions and their keyframe tracks |
//!
//! Retail `.pak` files are XOR-obfuscated; see [`crypto::xor`].

pub mod crypto;
pub mod error;
pub mod formats;
pub mod utils;

pub use error::{Error, Result};
