use crate::error::{FormatError, JptError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format identifier shared by every JPT version
pub const MAGIC: &[u8; 3] = b"JPT";

/// Magic plus the version byte
pub const TAG_LEN: usize = MAGIC.len() + 1;

/// Container layout version, stored in the byte after the magic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FormatVersion {
    /// 32-bit length fields, as read by the April engine loader
    V1,
    /// 64-bit length fields
    #[default]
    V2,
}

impl FormatVersion {
    pub fn code(self) -> u8 {
        match self {
            Self::V1 => 0x01,
            Self::V2 => 0x02,
        }
    }

    pub fn from_code(code: u8) -> std::result::Result<Self, FormatError> {
        match code {
            0x01 => Ok(Self::V1),
            0x02 => Ok(Self::V2),
            other => Err(FormatError::UnsupportedVersion(other)),
        }
    }

    /// Width in bytes of each entry's length field
    pub fn length_field_size(self) -> usize {
        match self {
            Self::V1 => 4,
            Self::V2 => 8,
        }
    }

    /// Largest payload a single entry can describe
    pub fn max_payload_len(self) -> u64 {
        match self {
            Self::V1 => u32::MAX as u64,
            Self::V2 => u64::MAX,
        }
    }

    /// Tag + both length fields, i.e. the size of a container holding two empty payloads
    pub fn overhead(self) -> usize {
        TAG_LEN + 2 * self.length_field_size()
    }

    pub fn tag(self) -> [u8; TAG_LEN] {
        [MAGIC[0], MAGIC[1], MAGIC[2], self.code()]
    }

    pub(crate) fn put_length(self, buf: &mut Vec<u8>, len: u64) {
        match self {
            Self::V1 => buf.extend_from_slice(&(len as u32).to_le_bytes()),
            Self::V2 => buf.extend_from_slice(&len.to_le_bytes()),
        }
    }

    /// Read a length field; `field` must be exactly `length_field_size()` bytes
    pub(crate) fn get_length(self, field: &[u8]) -> u64 {
        let mut wide = [0u8; 8];
        wide[..field.len()].copy_from_slice(field);
        u64::from_le_bytes(wide)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        })
    }
}

impl std::str::FromStr for FormatVersion {
    type Err = JptError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "v1" | "1" | "legacy" => Ok(Self::V1),
            "v2" | "2" => Ok(Self::V2),
            _ => Err(JptError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Smallest buffer that could be a container of any version
pub fn min_container_len() -> usize {
    TAG_LEN + 2 * FormatVersion::V1.length_field_size()
}

/// Identify the layout of a buffer from its leading tag
pub fn read_tag(buf: &[u8]) -> std::result::Result<FormatVersion, FormatError> {
    if buf.len() < TAG_LEN {
        return Err(FormatError::TruncatedHeader {
            needed: TAG_LEN as u64,
            found: buf.len() as u64,
        });
    }
    if &buf[..MAGIC.len()] != MAGIC {
        return Err(FormatError::BadMagic {
            found: hex::encode(&buf[..MAGIC.len()]),
        });
    }
    FormatVersion::from_code(buf[MAGIC.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        assert_eq!("v1".parse::<FormatVersion>().unwrap(), FormatVersion::V1);
        assert_eq!("Legacy".parse::<FormatVersion>().unwrap(), FormatVersion::V1);
        assert_eq!("V2".parse::<FormatVersion>().unwrap(), FormatVersion::V2);
        assert!("v3".parse::<FormatVersion>().is_err());
        assert_eq!(FormatVersion::default(), FormatVersion::V2);
    }

    #[test]
    fn test_layout_sizes() {
        assert_eq!(FormatVersion::V1.overhead(), 12);
        assert_eq!(FormatVersion::V2.overhead(), 20);
        assert_eq!(min_container_len(), 12);
        assert_eq!(&FormatVersion::V2.tag(), b"JPT\x02");
    }

    #[test]
    fn test_length_fields_are_little_endian() {
        let mut buf = Vec::new();
        FormatVersion::V1.put_length(&mut buf, 0x0102_0304);
        assert_eq!(buf, [0x04, 0x03, 0x02, 0x01]);
        assert_eq!(FormatVersion::V1.get_length(&buf), 0x0102_0304);

        let mut buf = Vec::new();
        FormatVersion::V2.put_length(&mut buf, 1 << 40);
        assert_eq!(buf.len(), 8);
        assert_eq!(FormatVersion::V2.get_length(&buf), 1 << 40);
    }

    #[test]
    fn test_read_tag() {
        assert_eq!(read_tag(b"JPT\x01rest"), Ok(FormatVersion::V1));
        assert_eq!(
            read_tag(b"JPT\x07"),
            Err(FormatError::UnsupportedVersion(0x07))
        );
        assert_eq!(
            read_tag(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Err(FormatError::BadMagic {
                found: "ffd8ff".into()
            })
        );
    }
}
