use crate::container::Container;
use crate::error::{FileRole, Result};
use crate::file::{read_source, write_atomic};
use crate::header::FormatVersion;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Options for the merge command
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Container layout to write
    pub format: FormatVersion,
}

/// Outcome of a successful merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub output: PathBuf,
    pub format: FormatVersion,
    pub jpeg_bytes: u64,
    pub png_bytes: u64,
    pub total_bytes: u64,
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Merged JPEG ({} bytes) and PNG ({} bytes) into {} ({} bytes, {})",
            self.jpeg_bytes,
            self.png_bytes,
            self.output.display(),
            self.total_bytes,
            self.format
        )
    }
}

/// Pack a JPEG file and a PNG file into a JPT container at `jpt_path`.
/// The destination is replaced atomically; on failure it is left as it was.
#[instrument(skip_all, fields(output = %jpt_path.display()))]
pub fn merge_files(
    jpt_path: &Path,
    jpeg_path: &Path,
    png_path: &Path,
    options: &MergeOptions,
) -> Result<MergeReport> {
    let jpeg = read_source(jpeg_path, FileRole::Jpeg)?;
    let png = read_source(png_path, FileRole::Png)?;

    let container = Container::new(&jpeg, &png).with_version(options.format);
    let bytes = container.to_bytes()?;
    debug!(format = %options.format, bytes = bytes.len(), "encoded container");

    write_atomic(jpt_path, FileRole::Jpt, &bytes)?;

    let report = MergeReport {
        output: jpt_path.to_path_buf(),
        format: options.format,
        jpeg_bytes: container.jpeg().len(),
        png_bytes: container.png().len(),
        total_bytes: bytes.len() as u64,
    };
    info!(
        jpeg = report.jpeg_bytes,
        png = report.png_bytes,
        total = report.total_bytes,
        "merged"
    );
    Ok(report)
}

/// Merge with default options, returning the outcome message
pub fn merge(jpt_destination: &Path, jpeg_source: &Path, png_source: &Path) -> Result<String> {
    merge_files(
        jpt_destination,
        jpeg_source,
        png_source,
        &MergeOptions::default(),
    )
    .map(|report| report.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::decode;
    use crate::error::{ErrorKind, JptError};
    use tempfile::tempdir;

    #[test]
    fn test_merge_writes_exact_container() {
        let dir = tempdir().unwrap();
        let jpeg = dir.path().join("photo.jpg");
        let png = dir.path().join("photo.png");
        let out = dir.path().join("out.jpt");

        let jpeg_data: Vec<u8> = (0..10482).map(|i| (i % 251) as u8).collect();
        let png_data: Vec<u8> = (0..3096).map(|i| (i % 13) as u8).collect();
        std::fs::write(&jpeg, &jpeg_data).unwrap();
        std::fs::write(&png, &png_data).unwrap();

        let report = merge_files(&out, &jpeg, &png, &MergeOptions::default()).unwrap();
        assert_eq!(report.total_bytes, 4 + 8 + 10482 + 8 + 3096);

        let written = std::fs::read(&out).unwrap();
        assert_eq!(written.len() as u64, report.total_bytes);
        assert_eq!(decode(&written).unwrap(), (jpeg_data, png_data));
    }

    #[test]
    fn test_merge_message_names_output() {
        let dir = tempdir().unwrap();
        let jpeg = dir.path().join("a.jpg");
        let png = dir.path().join("a.png");
        let out = dir.path().join("a.jpt");
        std::fs::write(&jpeg, b"jpeg").unwrap();
        std::fs::write(&png, b"png").unwrap();

        let message = merge(&out, &jpeg, &png).unwrap();
        assert!(message.starts_with("Merged JPEG (4 bytes) and PNG (3 bytes)"));
        assert!(message.contains("a.jpt"));
    }

    #[test]
    fn test_merge_overwrites_existing_destination() {
        let dir = tempdir().unwrap();
        let jpeg = dir.path().join("a.jpg");
        let png = dir.path().join("a.png");
        let out = dir.path().join("a.jpt");
        std::fs::write(&jpeg, b"j").unwrap();
        std::fs::write(&png, b"p").unwrap();
        std::fs::write(&out, vec![0u8; 4096]).unwrap();

        merge(&out, &jpeg, &png).unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), crate::container::encode(b"j", b"p"));
    }

    #[test]
    fn test_missing_source_leaves_destination_untouched() {
        let dir = tempdir().unwrap();
        let jpeg = dir.path().join("a.jpg");
        let out = dir.path().join("a.jpt");
        std::fs::write(&jpeg, b"jpeg").unwrap();
        std::fs::write(&out, b"previous").unwrap();

        let err = merge(&out, &jpeg, &dir.path().join("missing.png")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert!(matches!(err, JptError::Input { role: FileRole::Png, .. }));
        assert_eq!(std::fs::read(&out).unwrap(), b"previous");
    }

    #[test]
    fn test_directory_destination_is_rejected() {
        let dir = tempdir().unwrap();
        let jpeg = dir.path().join("a.jpg");
        let png = dir.path().join("a.png");
        let out = dir.path().join("taken");
        std::fs::write(&jpeg, b"jpeg").unwrap();
        std::fs::write(&png, b"png").unwrap();
        std::fs::create_dir(&out).unwrap();

        let err = merge(&out, &jpeg, &png).unwrap_err();
        assert!(matches!(err, JptError::Input { role: FileRole::Jpt, .. }));
        assert!(out.is_dir());
    }

    #[test]
    fn test_legacy_format_option() {
        let dir = tempdir().unwrap();
        let jpeg = dir.path().join("a.jpg");
        let png = dir.path().join("a.png");
        let out = dir.path().join("a.jpt");
        std::fs::write(&jpeg, b"jpeg").unwrap();
        std::fs::write(&png, b"png").unwrap();

        let options = MergeOptions {
            format: FormatVersion::V1,
        };
        let report = merge_files(&out, &jpeg, &png, &options).unwrap();
        assert_eq!(report.total_bytes, 4 + 4 + 4 + 4 + 3);

        let written = std::fs::read(&out).unwrap();
        assert_eq!(&written[..4], b"JPT\x01");
        assert_eq!(decode(&written).unwrap(), (b"jpeg".to_vec(), b"png".to_vec()));
    }
}
