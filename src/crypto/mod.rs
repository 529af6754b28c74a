//! De-obfuscation layers applied before parsing.
//!
//! Parsers in [`crate::formats`] always receive plain bytes. Retail archives
//! are wrapped in a trivial XOR cipher; undo it by handing the parser an
//! [`xor::XorReader`] instead of the raw file.
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`xor`] | Single-byte XOR stream adapter for `.pak` files |

pub mod xor;
