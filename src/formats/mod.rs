//! Parsers for PopCap asset formats.
//!
//! All parsers follow the same conventions:
//!
//! * **Binary formats are generic over** [`std::io::Read`] + [`std::io::Seek`] -
//!   pass a [`std::fs::File`], a [`std::io::Cursor`], or an
//!   [`XorReader`](crate::crypto::xor::XorReader) around either.
//! * **Metadata only** - [`pak::Pak::parse`] reads the directory and never
//!   loads entry data. [`pak::PakReader`] owns the reader and hands out
//!   bounded access to individual entries via [`std::io::Take<&mut R>`].
//! * **Read-only** - nothing here writes or modifies assets.
//! * **Fail whole** - a parse either returns a complete value or an
//!   [`Error`](crate::Error); there are no partial results.
//!
//! ## Format overview
//!
//! | Module        | Format    | Description |
//! |---------------|-----------|-------------|
//! | [`pak`]       | PAK       | Resource archive (`main.pak`); directory of names, sizes and FILETIMEs followed by raw data |
//! | [`particles`] | Particles | XML emitter definitions whose values are keyframe tracks like `[0.5 1] Random,0 0,100 EaseOut` |

pub mod pak;
pub mod particles;
