//! PAK - PopCap flat archive container.
//!
//! A directory of named, timestamped blobs followed by their contents laid
//! out back to back. Retail files are additionally XOR-obfuscated; see
//! [`crate::crypto::xor`].
//!
//! ## Layout
//! ```text
//! [0x00] Magic C0 4A C0 BA        (4 bytes)
//! [0x04] Version (always 0)       (5 bytes)
//! [0x09] Directory records, repeated:
//!        NameLength               (u8)
//!        Name                     (NameLength bytes, UTF-8)
//!        Size                     (i32 LE)
//!        FileTime                 (i64 LE, 100 ns ticks since 1601-01-01 UTC)
//!        Terminator               (u8; 0 = another record follows)
//! [...]  FileData                 (entries contiguous, in directory order)
//! ```
//!
//! ## Notes
//! * Entry offsets are not stored; each is the running sum of the sizes
//!   before it, relative to the data section.
//! * The data section begins right after the terminating record.

use std::io::{Read, Seek, SeekFrom, Take};
use std::ops::Index;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::crypto::xor::{PAK_XOR_KEY, XorReader};
use crate::utils::{bytesv, le_i32, le_i64, magic, u8, u8_string};
use crate::{Error, Result};

/// Magic and version prefix of every PAK file (after de-obfuscation).
pub const PAK_MAGIC: [u8; 9] = [0xC0, 0x4A, 0xC0, 0xBA, 0, 0, 0, 0, 0];

/// FILETIME ticks per second.
const TICKS_PER_SECOND: i64 = 10_000_000;
/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_OFFSET: i64 = 11_644_473_600;

/// Parsed PAK container (metadata only).
///
/// Entry data is accessed via [`PakReader`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pak {
    /// All entries in directory order.
    pub entries: Vec<PakEntry>,
    /// Largest declared entry size; handy for sizing a reusable buffer.
    pub max_entry_size: u32,
    /// Absolute stream offset where the data section begins.
    pub(crate) data_offset: u64,
}

/// Metadata for a single entry inside a PAK.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PakEntry {
    /// Position of this entry in the directory.
    pub index: usize,
    /// Entry path, usually with `\` separators.
    pub name: String,
    /// Size in bytes.
    pub size: u32,
    /// Last-write time recorded by the packer.
    pub timestamp: DateTime<Utc>,
    /// Offset relative to the PAK data section.
    pub offset: u64,
}

impl Pak {
    /// Parse a PAK directory from `r`.
    ///
    /// The reader must be positioned at the magic and must yield plain
    /// (de-obfuscated) bytes. On success it is left at the start of the data
    /// section.
    pub fn parse<R: Read + Seek>(r: &mut R) -> Result<Self> {
        magic(r, &PAK_MAGIC)?;

        let mut entries = Vec::new();
        let mut max_entry_size = 0u32;
        let mut offset = 0u64;

        loop {
            let name = u8_string(r)?;
            let size = le_i32(r)?;
            let size = u32::try_from(size).map_err(|_| Error::NegativeSize {
                name: name.clone(),
                size,
            })?;
            let timestamp = filetime_to_datetime(le_i64(r)?)?;

            trace!(%name, size, offset, "pak entry");
            entries.push(PakEntry {
                index: entries.len(),
                name,
                size,
                timestamp,
                offset,
            });

            max_entry_size = max_entry_size.max(size);
            offset += u64::from(size);

            if u8(r)? != 0 {
                break;
            }
        }

        let data_offset = r.stream_position()?;
        debug!(entries = entries.len(), data_offset, "parsed pak directory");

        Ok(Self {
            entries,
            max_entry_size,
            data_offset,
        })
    }

    /// Absolute stream offset where the data section begins.
    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    /// Total number of bytes the directory says the data section holds.
    pub fn data_size(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.size)).sum()
    }
}

/// Streaming reader wrapper around a [`Pak`] container.
///
/// Owns the underlying reader and provides bounded access to entry contents
/// via [`Take<&mut R>`].
pub struct PakReader<R> {
    inner: R,
    /// Parsed metadata.
    pub pak: Pak,
}

impl<R: Read + Seek> PakReader<R> {
    /// Parse a PAK and wrap the provided reader.
    pub fn new(mut reader: R) -> Result<Self> {
        let pak = Pak::parse(&mut reader)?;
        Ok(Self { inner: reader, pak })
    }

    /// Open an entry for streaming access.
    ///
    /// Seeks to the entry's start and returns a [`Take`] limited to its byte
    /// range. The borrow ends when the [`Take`] is dropped.
    pub fn read_entry(&mut self, entry: &PakEntry) -> Result<Take<&mut R>> {
        self.inner
            .seek(SeekFrom::Start(self.pak.data_offset + entry.offset))?;
        Ok(self.inner.by_ref().take(u64::from(entry.size)))
    }

    /// Read an entry's full contents.
    ///
    /// Returns [`Error::UnexpectedEof`] if the data section is shorter than
    /// the directory claims.
    pub fn read_entry_bytes(&mut self, entry: &PakEntry) -> Result<Vec<u8>> {
        self.inner
            .seek(SeekFrom::Start(self.pak.data_offset + entry.offset))?;
        bytesv(&mut self.inner, entry.size as usize)
    }

    /// Iterate over all entries.
    pub fn entries(&self) -> impl Iterator<Item = &PakEntry> {
        self.pak.entries.iter()
    }

    /// Find an entry by name. Returns [`None`] if not found.
    ///
    /// Separators and case must match exactly.
    pub fn get_entry_by_name(&self, name: &str) -> Option<&PakEntry> {
        self.pak.entries.iter().find(|e| e.name == name)
    }

    /// Consume the reader, returning the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> PakReader<XorReader<R>> {
    /// Parse a retail (XOR-obfuscated) PAK such as `main.pak`.
    pub fn open_obfuscated(reader: R) -> Result<Self> {
        Self::new(XorReader::new(reader, PAK_XOR_KEY))
    }
}

impl<R: Read + Seek> Index<&str> for PakReader<R> {
    type Output = PakEntry;

    /// Index by entry name.
    ///
    /// # Panics
    /// Panics if the name does not exist in the archive.
    fn index(&self, index: &str) -> &Self::Output {
        self.get_entry_by_name(index)
            .unwrap_or_else(|| panic!("no entry '{index}' in PAK"))
    }
}

/// Convert a Windows FILETIME (100 ns ticks since 1601-01-01 UTC) to a date.
///
/// The conversion is exact; [`datetime_to_filetime`] restores the ticks.
pub fn filetime_to_datetime(ticks: i64) -> Result<DateTime<Utc>> {
    let secs = ticks.div_euclid(TICKS_PER_SECOND) - FILETIME_UNIX_OFFSET;
    let nanos = ticks.rem_euclid(TICKS_PER_SECOND) as u32 * 100;
    DateTime::from_timestamp(secs, nanos).ok_or(Error::InvalidTimestamp(ticks))
}

/// Convert a date back to Windows FILETIME ticks.
///
/// Sub-tick precision is truncated. Returns [`None`] if the date falls
/// outside the FILETIME range.
pub fn datetime_to_filetime(dt: &DateTime<Utc>) -> Option<i64> {
    let secs = i128::from(dt.timestamp()) + i128::from(FILETIME_UNIX_OFFSET);
    let ticks = secs * i128::from(TICKS_PER_SECOND) + i128::from(dt.timestamp_subsec_nanos() / 100);
    i64::try_from(ticks).ok()
}
