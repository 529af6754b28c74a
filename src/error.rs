//! Library-wide error and result types.

use std::io;

use thiserror::Error;

use crate::formats::particles::track::GrammarError;

/// Result alias used throughout popkit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Every error is fatal to the parse call that raised it; no parser returns
/// partially-built output.
#[derive(Error, Debug)]
pub enum Error {
    /// A magic/signature field did not match the expected value.
    #[error("bad magic value")]
    BadMagic,
    /// The stream ended before all expected bytes could be read.
    #[error("unexpected end of file")]
    UnexpectedEof,
    /// A directory entry name was not valid UTF-8.
    #[error("invalid entry name: {0}")]
    InvalidName(#[from] std::string::FromUtf8Error),
    /// A directory entry declared a negative size.
    #[error("entry '{name}' has negative size {size}")]
    NegativeSize { name: String, size: i32 },
    /// A FILETIME value cannot be represented as a date.
    #[error("timestamp out of range: {0}")]
    InvalidTimestamp(i64),
    /// A parameter track failed to parse outside of any markup context.
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    /// A parameter track inside markup element `tag` failed to parse.
    #[error("in <{tag}>: {source}")]
    Track {
        tag: String,
        #[source]
        source: GrammarError,
    },
    /// The particle markup is not well-formed.
    #[error("markup error: {0}")]
    Xml(#[from] quick_xml::Error),
    /// An element appeared where it is not allowed.
    #[error("unexpected <{tag}> inside <{parent}>")]
    UnexpectedTag { parent: &'static str, tag: String },
    /// A node other than an element appeared inside a container element.
    #[error("unexpected {kind} inside <{parent}>")]
    UnexpectedNode { parent: String, kind: &'static str },
    /// An end tag did not match the element it closes.
    #[error("expected </{expected}>, found </{found}>")]
    MismatchedEnd { expected: String, found: String },
    /// A leaf element held a value that does not parse as its type.
    #[error("invalid value '{value}' for <{tag}>")]
    InvalidValue { tag: String, value: String },
    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEof
        } else {
            Error::Io(e)
        }
    }
}
