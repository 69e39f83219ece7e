//! JPT container codec.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! "JPT" | version | len1 | data1 (len1 bytes) | len2 | data2 (len2 bytes)
//! ```
//!
//! `len1`/`len2` are u32 in v1 and u64 in v2. Payload 1 is the JPEG-origin
//! file, payload 2 the PNG-origin file. Nothing may follow `data2`.

use crate::error::{FileRole, FormatError, JptError, Result};
use crate::header::{min_container_len, read_tag, FormatVersion, TAG_LEN};

/// One length-prefixed payload slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    length: u64,
    data: &'a [u8],
}

impl<'a> Entry<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            length: data.len() as u64,
            data,
        }
    }

    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

/// A JPEG-origin and a PNG-origin payload, borrowed from their backing buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container<'a> {
    version: FormatVersion,
    jpeg: Entry<'a>,
    png: Entry<'a>,
}

impl<'a> Container<'a> {
    pub fn new(jpeg: &'a [u8], png: &'a [u8]) -> Self {
        Self {
            version: FormatVersion::default(),
            jpeg: Entry::new(jpeg),
            png: Entry::new(png),
        }
    }

    pub fn with_version(mut self, version: FormatVersion) -> Self {
        self.version = version;
        self
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    pub fn jpeg(&self) -> Entry<'a> {
        self.jpeg
    }

    pub fn png(&self) -> Entry<'a> {
        self.png
    }

    /// Exact size of the serialized container
    pub fn encoded_len(&self) -> u64 {
        self.version.overhead() as u64 + self.jpeg.len() + self.png.len()
    }

    /// Serialize, failing only when a payload does not fit the version's length field
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        check_fits(self.version, FileRole::Jpeg, self.jpeg.len())?;
        check_fits(self.version, FileRole::Png, self.png.len())?;
        Ok(self.write_unchecked())
    }

    fn write_unchecked(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len() as usize);
        buf.extend_from_slice(&self.version.tag());
        for entry in [self.jpeg, self.png] {
            self.version.put_length(&mut buf, entry.len());
            buf.extend_from_slice(entry.data());
        }
        buf
    }

    /// Validate `buf` as a complete container and borrow both payloads from it.
    /// Length is checked before the magic, so any buffer under 12 bytes is
    /// `TruncatedHeader` even when it is not JPT data at all.
    pub fn parse(buf: &'a [u8]) -> std::result::Result<Self, FormatError> {
        let found = buf.len() as u64;
        let min = min_container_len();
        if buf.len() < min {
            return Err(FormatError::TruncatedHeader {
                needed: min as u64,
                found,
            });
        }

        let version = read_tag(buf)?;
        let overhead = version.overhead();
        if buf.len() < overhead {
            return Err(FormatError::TruncatedHeader {
                needed: overhead as u64,
                found,
            });
        }

        // Reserve room for the PNG length field while taking the JPEG entry
        let field = version.length_field_size();
        let (jpeg, pos) = take_entry(buf, TAG_LEN, version, FileRole::Jpeg, field)?;
        let (png, end) = take_entry(buf, pos, version, FileRole::Png, 0)?;

        if end != buf.len() {
            return Err(FormatError::TrailingBytes((buf.len() - end) as u64));
        }

        Ok(Self { version, jpeg, png })
    }

    /// Copy both payloads out of the backing buffer
    pub fn to_payloads(&self) -> (Vec<u8>, Vec<u8>) {
        (self.jpeg.data().to_vec(), self.png.data().to_vec())
    }
}

fn check_fits(version: FormatVersion, role: FileRole, len: u64) -> Result<()> {
    let max = version.max_payload_len();
    if len > max {
        return Err(JptError::PayloadTooLarge { role, len, max });
    }
    Ok(())
}

/// Read the length field at `pos` and the payload after it.
/// Returns the entry and the offset just past its data.
fn take_entry<'a>(
    buf: &'a [u8],
    pos: usize,
    version: FormatVersion,
    role: FileRole,
    reserve: usize,
) -> std::result::Result<(Entry<'a>, usize), FormatError> {
    let field = version.length_field_size();
    let declared = version.get_length(&buf[pos..pos + field]);
    let start = pos + field;
    let available = (buf.len() - start - reserve) as u64;
    if declared > available {
        return Err(FormatError::LengthOverrun {
            role,
            declared,
            available,
        });
    }
    let end = start + declared as usize;
    Ok((
        Entry {
            length: declared,
            data: &buf[start..end],
        },
        end,
    ))
}

/// Pack a JPEG-origin and a PNG-origin payload into a v2 container
pub fn encode(jpeg: &[u8], png: &[u8]) -> Vec<u8> {
    Container::new(jpeg, png).write_unchecked()
}

/// Pack two payloads using an explicit layout version
pub fn encode_versioned(version: FormatVersion, jpeg: &[u8], png: &[u8]) -> Result<Vec<u8>> {
    Container::new(jpeg, png).with_version(version).to_bytes()
}

/// Recover the JPEG-origin and PNG-origin payloads from a container
pub fn decode(buf: &[u8]) -> std::result::Result<(Vec<u8>, Vec<u8>), FormatError> {
    Container::parse(buf).map(|c| c.to_payloads())
}
