use crate::container::{Container, Entry};
use crate::error::{FileRole, Result};
use crate::file::read_source;
use crate::header::FormatVersion;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Summary of one packed payload
#[derive(Debug, Clone, Serialize)]
pub struct EntryInfo {
    pub role: FileRole,
    pub length: u64,
    /// BLAKE3 digest (hex) of the payload bytes
    pub blake3: String,
}

impl EntryInfo {
    fn new(role: FileRole, entry: Entry<'_>) -> Self {
        Self {
            role,
            length: entry.len(),
            blake3: hex::encode(blake3::hash(entry.data()).as_bytes()),
        }
    }
}

/// Summary of a validated container file
#[derive(Debug, Clone, Serialize)]
pub struct ContainerInfo {
    pub path: PathBuf,
    pub version: FormatVersion,
    pub total_bytes: u64,
    pub overhead_bytes: u64,
    pub entries: Vec<EntryInfo>,
}

impl ContainerInfo {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Fully validate a JPT file and describe its contents
pub fn inspect(path: &Path) -> Result<ContainerInfo> {
    let bytes = read_source(path, FileRole::Jpt)?;
    let container = Container::parse(&bytes)?;

    Ok(ContainerInfo {
        path: path.to_path_buf(),
        version: container.version(),
        total_bytes: bytes.len() as u64,
        overhead_bytes: container.version().overhead() as u64,
        entries: vec![
            EntryInfo::new(FileRole::Jpeg, container.jpeg()),
            EntryInfo::new(FileRole::Png, container.png()),
        ],
    })
}

/// Display information about a JPT file
pub fn show_info(path: &Path) -> Result<String> {
    let info = inspect(path)?;

    let mut output = String::new();

    output.push_str("JPT Container Information\n");
    output.push_str("=========================\n\n");

    output.push_str(&format!("File: {}\n", info.path.display()));
    output.push_str(&format!("Version: {}\n", info.version));
    output.push_str(&format!(
        "Total size: {} ({} bytes)\n",
        format_size(info.total_bytes),
        info.total_bytes
    ));
    output.push_str(&format!("Header overhead: {} bytes\n", info.overhead_bytes));
    output.push('\n');

    output.push_str("Payloads:\n");
    for entry in &info.entries {
        output.push_str(&format!(
            "  {}: {} bytes ({})\n",
            entry.role,
            entry.length,
            format_size(entry.length)
        ));
        output.push_str(&format!("    BLAKE3: {}\n", entry.blake3));
    }

    Ok(output)
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
