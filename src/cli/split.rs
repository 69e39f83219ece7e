use crate::container::Container;
use crate::error::{FileRole, JptError, Result};
use crate::file::{read_source, same_path, StagedFile};
use crate::header::FormatVersion;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Outcome of a successful split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReport {
    pub input: PathBuf,
    pub format: FormatVersion,
    pub jpeg_output: PathBuf,
    pub png_output: PathBuf,
    pub jpeg_bytes: u64,
    pub png_bytes: u64,
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Split {} into {} ({} bytes) and {} ({} bytes)",
            self.input.display(),
            self.jpeg_output.display(),
            self.jpeg_bytes,
            self.png_output.display(),
            self.png_bytes
        )
    }
}

/// Recover the JPEG and PNG files packed in `jpt_path`.
///
/// Nothing is written unless the whole container validates. Both outputs are
/// staged next to their destinations and only renamed into place once both
/// are fully on disk.
#[instrument(skip_all, fields(input = %jpt_path.display()))]
pub fn split_file(jpt_path: &Path, jpeg_path: &Path, png_path: &Path) -> Result<SplitReport> {
    if !png_path.as_os_str().is_empty() && same_path(jpeg_path, png_path) {
        return Err(JptError::input(
            FileRole::Png,
            png_path,
            "the JPEG and PNG destinations are the same file",
        ));
    }

    let bytes = read_source(jpt_path, FileRole::Jpt)?;
    let container = Container::parse(&bytes)?;
    let (jpeg, png) = (container.jpeg(), container.png());
    debug!(
        format = %container.version(),
        jpeg = jpeg.len(),
        png = png.len(),
        "decoded container"
    );

    let staged_jpeg = StagedFile::stage(jpeg_path, FileRole::Jpeg, jpeg.data())?;
    let staged_png = StagedFile::stage(png_path, FileRole::Png, png.data())?;
    let jpeg_output = staged_jpeg.commit()?;
    let png_output = staged_png.commit()?;

    let report = SplitReport {
        input: jpt_path.to_path_buf(),
        format: container.version(),
        jpeg_output,
        png_output,
        jpeg_bytes: jpeg.len(),
        png_bytes: png.len(),
    };
    info!(jpeg = report.jpeg_bytes, png = report.png_bytes, "split");
    Ok(report)
}

/// Split a container, returning the outcome message
pub fn split(jpt_source: &Path, jpeg_destination: &Path, png_destination: &Path) -> Result<String> {
    split_file(jpt_source, jpeg_destination, png_destination).map(|report| report.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::merge::merge;
    use crate::error::{ErrorKind, FormatError};
    use tempfile::tempdir;

    #[test]
    fn test_split_roundtrip() {
        let dir = tempdir().unwrap();
        let jpeg = dir.path().join("photo.jpg");
        let png = dir.path().join("photo.png");
        let jpt = dir.path().join("out.jpt");
        let r_jpeg = dir.path().join("r.jpg");
        let r_png = dir.path().join("r.png");

        let jpeg_data: Vec<u8> = (0..10482).map(|i| (i * 7 % 256) as u8).collect();
        let png_data: Vec<u8> = (0..3096).map(|i| (i * 3 % 256) as u8).collect();
        std::fs::write(&jpeg, &jpeg_data).unwrap();
        std::fs::write(&png, &png_data).unwrap();

        merge(&jpt, &jpeg, &png).unwrap();
        let report = split_file(&jpt, &r_jpeg, &r_png).unwrap();

        assert_eq!(report.jpeg_bytes, 10482);
        assert_eq!(report.png_bytes, 3096);
        assert_eq!(std::fs::read(&r_jpeg).unwrap(), jpeg_data);
        assert_eq!(std::fs::read(&r_png).unwrap(), png_data);
    }

    #[test]
    fn test_split_message() {
        let dir = tempdir().unwrap();
        let jpt = dir.path().join("x.jpt");
        std::fs::write(&jpt, crate::container::encode(b"abc", b"de")).unwrap();

        let message = split(&jpt, &dir.path().join("x.jpg"), &dir.path().join("x.png")).unwrap();
        assert!(message.contains("x.jpg (3 bytes)"));
        assert!(message.contains("x.png (2 bytes)"));
    }

    #[test]
    fn test_plain_jpeg_creates_no_outputs() {
        let dir = tempdir().unwrap();
        let fake = dir.path().join("photo.jpt");
        let r_jpeg = dir.path().join("r.jpg");
        let r_png = dir.path().join("r.png");
        std::fs::write(&fake, [0xFF, 0xD8, 0xFF, 0xE0, 0, 16, b'J', b'F', b'I', b'F', 0, 1, 1]).unwrap();

        let err = split_file(&fake, &r_jpeg, &r_png).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(matches!(err, JptError::Format(FormatError::BadMagic { .. })));
        assert!(!r_jpeg.exists());
        assert!(!r_png.exists());
    }

    #[test]
    fn test_corrupt_container_keeps_existing_outputs() {
        let dir = tempdir().unwrap();
        let jpt = dir.path().join("x.jpt");
        let r_jpeg = dir.path().join("r.jpg");
        let r_png = dir.path().join("r.png");
        let mut bytes = crate::container::encode(b"abc", b"de");
        bytes.push(0);
        std::fs::write(&jpt, bytes).unwrap();
        std::fs::write(&r_jpeg, b"keep-jpeg").unwrap();
        std::fs::write(&r_png, b"keep-png").unwrap();

        let err = split_file(&jpt, &r_jpeg, &r_png).unwrap_err();
        assert!(matches!(err, JptError::Format(FormatError::TrailingBytes(1))));
        assert_eq!(std::fs::read(&r_jpeg).unwrap(), b"keep-jpeg");
        assert_eq!(std::fs::read(&r_png).unwrap(), b"keep-png");
    }

    #[test]
    fn test_unwritable_png_destination_writes_nothing() {
        let dir = tempdir().unwrap();
        let jpt = dir.path().join("x.jpt");
        let r_jpeg = dir.path().join("r.jpg");
        let r_png = dir.path().join("no-such-dir").join("r.png");
        std::fs::write(&jpt, crate::container::encode(b"abc", b"de")).unwrap();

        let err = split_file(&jpt, &r_jpeg, &r_png).unwrap_err();
        assert!(matches!(err, JptError::Input { role: FileRole::Png, .. }));
        assert!(!r_jpeg.exists());
    }

    #[test]
    fn test_same_destination_rejected() {
        let dir = tempdir().unwrap();
        let jpt = dir.path().join("x.jpt");
        let out = dir.path().join("both");
        std::fs::write(&jpt, crate::container::encode(b"abc", b"de")).unwrap();

        let err = split_file(&jpt, &out, &out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert!(!out.exists());
    }

    #[test]
    fn test_aliased_destination_rejected() {
        let dir = tempdir().unwrap();
        let jpt = dir.path().join("x.jpt");
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let out = dir.path().join("out");
        let alias = dir.path().join("sub").join("..").join("out");
        std::fs::write(&jpt, crate::container::encode(b"JPEGDATA", b"PNG")).unwrap();

        let err = split_file(&jpt, &out, &alias).unwrap_err();
        assert!(matches!(err, JptError::Input { role: FileRole::Png, .. }));
        assert!(!out.exists());

        std::fs::write(&out, b"previous").unwrap();
        assert!(split_file(&jpt, &alias, &out).is_err());
        assert_eq!(std::fs::read(&out).unwrap(), b"previous");
    }

    #[test]
    fn test_missing_container_is_input_error() {
        let dir = tempdir().unwrap();
        let err = split_file(
            &dir.path().join("missing.jpt"),
            &dir.path().join("r.jpg"),
            &dir.path().join("r.png"),
        )
        .unwrap_err();
        assert!(matches!(err, JptError::Input { role: FileRole::Jpt, .. }));
    }
}
