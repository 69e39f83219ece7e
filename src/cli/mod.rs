pub mod info;
pub mod merge;
pub mod split;

pub use info::*;
pub use merge::*;
pub use split::*;

use crate::error::{FileRole, JptError, Result};
use crate::file::same_path;
use std::path::{Path, PathBuf};

/// Default merge destination: the JPEG path with a `.jpt` extension
pub fn default_jpt_path(jpeg: &Path) -> PathBuf {
    jpeg.with_extension("jpt")
}

/// Default split destinations: the container path with `.jpg` and `.png` extensions
pub fn default_split_paths(jpt: &Path) -> (PathBuf, PathBuf) {
    (jpt.with_extension("jpg"), jpt.with_extension("png"))
}

/// Reject a derived output path that would overwrite one of the inputs
pub fn check_default_output(output: &Path, role: FileRole, inputs: &[&Path]) -> Result<()> {
    if inputs.iter().any(|input| same_path(output, input)) {
        return Err(JptError::input(
            role,
            output,
            "the default output path is one of the inputs; pass the output path explicitly",
        ));
    }
    Ok(())
}
